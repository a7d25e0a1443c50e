//! # 通道采集能力模块
//!
//! 封装单个物理通道的一次采集：打开 → 读取 → 关闭，并在通道粒度上隔离错误。
//!
//! ```text
//! ChannelConfig
//!       │
//!       ▼
//! ChannelAcquirer ──► ChannelSource (open / read / close)
//!       │
//!       ▼
//! daq_filter::filter
//!       │
//!       ▼
//! Reading（数值或 NoData）
//! ```
//!
//! 硬件厂商相关的实现只需实现 [`ChannelSource`]；核心只依赖该契约。

mod acquirer;
mod simulated;

pub use acquirer::ChannelAcquirer;
pub use simulated::SimulatedChannelSource;

use async_trait::async_trait;
use domain::ChannelConfig;
use std::time::Duration;

/// 采集错误。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AcquireError {
    /// 通道无法占用（地址无效或已被占用）
    #[error("configuration error: {0}")]
    Configuration(String),
    /// 读取超时或硬件报告故障
    #[error("acquisition error: {0}")]
    Acquisition(String),
}

/// 已打开通道的句柄。
#[derive(Debug, PartialEq, Eq)]
pub struct ChannelHandle {
    id: u64,
    address: String,
}

impl ChannelHandle {
    pub fn new(id: u64, address: impl Into<String>) -> Self {
        Self {
            id,
            address: address.into(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

/// 通道数据源抽象（按硬件厂商替换实现）。
#[async_trait]
pub trait ChannelSource: Send + Sync {
    /// 占用并启动通道。
    async fn open(&self, channel: &ChannelConfig) -> Result<ChannelHandle, AcquireError>;

    /// 读取 `count` 个样本；实现应在 `timeout` 内返回。
    async fn read(
        &self,
        handle: &ChannelHandle,
        count: usize,
        timeout: Duration,
    ) -> Result<Vec<f64>, AcquireError>;

    /// 停止并释放通道（尽力而为）。
    async fn close(&self, handle: ChannelHandle);
}
