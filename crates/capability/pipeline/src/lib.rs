//! # 采集流水线模块
//!
//! 串起一个完整周期：按通道采集 → 组装读数集合 → 交接队列 → 落库 → 分发。
//!
//! ```text
//! 采集任务                                  分发任务
//! ┌──────────────────────┐                 ┌────────────────────────┐
//! │ interval tick        │                 │ HandoffQueue::pop      │
//! │ CycleOrchestrator    │ ── ReadingSet ─►│ Recorder::record       │
//! │ HandoffQueue::push   │                 │ DispatchFanout::dispatch│
//! └──────────────────────┘                 └────────────────────────┘
//! ```
//!
//! 两个任务只通过 [`HandoffQueue`] 通信；取消信号经 `CancellationToken` 传递。

mod orchestrator;
mod queue;
mod recorder;
mod supervisor;

pub use orchestrator::{CycleOrchestrator, CycleOutcome};
pub use queue::{HandoffQueue, OverflowPolicy, PushOutcome};
pub use recorder::{RecordResult, Recorder};
pub use supervisor::{Supervisor, SupervisorHandle, SupervisorSettings, SupervisorState};

/// 流水线处理错误。
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("persistence error: {0}")]
    Persistence(#[from] daq_storage::StorageError),
}
