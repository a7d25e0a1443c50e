//! # 下发能力模块
//!
//! 把一个完整的读数集合分发给两个相互独立的下游：
//! - **导出文件**：供可视化工具读取的共享文本文件（每周期整体覆盖）
//! - **远端寄存器**：通过 Modbus TCP 写入控制器保持寄存器
//!
//! 任一下游失败只影响自身，不阻止也不回滚另一个。

mod export;
mod fanout;
mod register;

pub use export::{FileExportSink, NoDataPolicy, render_export};
pub use fanout::{DispatchFanout, DispatchReport, SinkOutcome};
pub use register::{RegisterSink, RegisterSinkConfig};

use async_trait::async_trait;
use domain::ReadingSet;

/// 下发错误。
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("export error: {0}")]
    Export(String),
    #[error("remote error: {0}")]
    Remote(String),
    #[error("sink {sink} timed out after {timeout_ms}ms")]
    Timeout { sink: &'static str, timeout_ms: u64 },
}

/// 单次下发的结果统计。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkReceipt {
    /// 写出的通道数
    pub written: usize,
    /// 跳过的通道数（无数据或无法编码）
    pub skipped: usize,
}

/// 读数下游抽象。
#[async_trait]
pub trait ReadingSink: Send + Sync {
    fn name(&self) -> &'static str;

    /// 是否启用（禁用的下游不计入投递指标）
    fn enabled(&self) -> bool {
        true
    }

    async fn deliver(&self, set: &ReadingSet) -> Result<SinkReceipt, SinkError>;
}

/// 空下游（用于禁用某一路下发）。
#[derive(Debug, Default)]
pub struct NoopSink;

#[async_trait]
impl ReadingSink for NoopSink {
    fn name(&self) -> &'static str {
        "noop"
    }

    fn enabled(&self) -> bool {
        false
    }

    async fn deliver(&self, _set: &ReadingSet) -> Result<SinkReceipt, SinkError> {
        Ok(SinkReceipt::default())
    }
}
