//! Modbus TCP 客户端实现
//!
//! 连接控制器并写保持寄存器；每批写入建立一次连接，写完即断开。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! let client = ModbusTcpClient::new(ModbusTcpConfig {
//!     host: "192.168.1.100".to_string(),
//!     port: 502,
//!     unit_id: 1,
//!     connect_timeout_ms: 3000,
//! });
//! let mut session = client.connect().await?;
//! session.write_register(0, 1235).await?;
//! session.close().await;
//! ```

use crate::error::ProtocolError;
use crate::{RegisterClient, RegisterSession};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;
use tokio_modbus::prelude::*;
use tracing::{debug, info};

/// Modbus TCP 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModbusTcpConfig {
    /// 控制器主机地址
    pub host: String,
    /// 控制器端口（默认 502）
    #[serde(default = "default_modbus_port")]
    pub port: u16,
    /// 从站 ID
    #[serde(default = "default_unit_id")]
    pub unit_id: u8,
    /// 连接超时（毫秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
}

fn default_modbus_port() -> u16 {
    502
}

fn default_unit_id() -> u8 {
    1
}

fn default_connect_timeout() -> u64 {
    3000
}

/// Modbus TCP 寄存器客户端
pub struct ModbusTcpClient {
    config: ModbusTcpConfig,
}

impl ModbusTcpClient {
    /// 创建新的 Modbus TCP 客户端
    pub fn new(config: ModbusTcpConfig) -> Self {
        Self { config }
    }

    /// 从 JSON 配置字符串解析
    pub fn from_json(json: &str) -> Result<Self, ProtocolError> {
        let config: ModbusTcpConfig =
            serde_json::from_str(json).map_err(|e| ProtocolError::ConfigParse(e.to_string()))?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &ModbusTcpConfig {
        &self.config
    }

    async fn resolve(&self) -> Result<SocketAddr, ProtocolError> {
        tokio::net::lookup_host((self.config.host.as_str(), self.config.port))
            .await?
            .next()
            .ok_or_else(|| {
                ProtocolError::ConfigParse(format!(
                    "no address for {}:{}",
                    self.config.host, self.config.port
                ))
            })
    }
}

#[async_trait]
impl RegisterClient for ModbusTcpClient {
    async fn connect(&self) -> Result<Box<dyn RegisterSession>, ProtocolError> {
        let addr = self.resolve().await?;
        let timeout = Duration::from_millis(self.config.connect_timeout_ms);
        let ctx = tokio::time::timeout(
            timeout,
            tcp::connect_slave(addr, Slave(self.config.unit_id)),
        )
        .await
        .map_err(|_| {
            ProtocolError::Timeout(format!(
                "connect to {} after {}ms",
                addr, self.config.connect_timeout_ms
            ))
        })?
        .map_err(|e| ProtocolError::Connection(e.to_string()))?;

        info!(
            target: "daq.dispatch",
            remote = %addr,
            unit_id = self.config.unit_id,
            "modbus_connected"
        );
        Ok(Box::new(ModbusSession { ctx, addr }))
    }
}

struct ModbusSession {
    ctx: tokio_modbus::client::Context,
    addr: SocketAddr,
}

#[async_trait]
impl RegisterSession for ModbusSession {
    async fn write_register(&mut self, address: u16, word: u16) -> Result<(), ProtocolError> {
        self.ctx
            .write_single_register(address, word)
            .await
            .map_err(|e| ProtocolError::Modbus(e.to_string()))?
            .map_err(|e| ProtocolError::Exception(format!("{:?}", e)))?;
        debug!(
            target: "daq.dispatch",
            register = address,
            word = word,
            "modbus_register_written"
        );
        Ok(())
    }

    async fn close(&mut self) {
        if let Err(e) = self.ctx.disconnect().await {
            debug!(
                target: "daq.dispatch",
                remote = %self.addr,
                error = %e,
                "modbus_disconnect_failed"
            );
        }
    }
}
