//! # 协议通信能力模块
//!
//! 向寄存器寻址的工业控制器写入整数寄存器：
//! - **Modbus TCP**：`write_single_register` 写保持寄存器
//!
//! ## 架构设计
//!
//! ```text
//! RegisterSink（daq-dispatch）
//!       │
//!       ▼
//! RegisterClient::connect ──► RegisterSession
//!       │                        ├── write_register(addr, word)
//!       │                        └── close()
//!       ▼
//! ModbusTcpClient（tokio-modbus）
//! ```
//!
//! ## 配置格式
//!
//! ```json
//! { "host": "192.168.1.100", "port": 502, "unit_id": 1, "connect_timeout_ms": 3000 }
//! ```

mod error;
mod modbus_tcp;
mod types;

pub use error::ProtocolError;
pub use modbus_tcp::{ModbusTcpClient, ModbusTcpConfig};
pub use types::*;

use async_trait::async_trait;

/// 寄存器客户端：每批写入建立一次会话。
#[async_trait]
pub trait RegisterClient: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn RegisterSession>, ProtocolError>;
}

/// 已建立的寄存器写会话。
#[async_trait]
pub trait RegisterSession: Send {
    /// 写单个 16 位保持寄存器
    async fn write_register(&mut self, address: u16, word: u16) -> Result<(), ProtocolError>;

    /// 关闭连接（尽力而为）
    async fn close(&mut self);
}
