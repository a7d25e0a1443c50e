use crate::{ReadingSink, SinkError, SinkReceipt};
use daq_telemetry::{
    record_export_failure, record_export_success, record_remote_failure, record_remote_success,
};
use domain::ReadingSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// 单个下游的投递结果。
#[derive(Debug)]
pub enum SinkOutcome {
    Delivered(SinkReceipt),
    Failed(SinkError),
    Disabled,
}

impl SinkOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// 一次分发的汇总。
#[derive(Debug)]
pub struct DispatchReport {
    pub export: SinkOutcome,
    pub remote: SinkOutcome,
}

/// 双下游并行分发。
///
/// 两路同时启动，各自受 `sink_timeout` 约束；一路失败或超时不影响另一路。
pub struct DispatchFanout {
    export: Arc<dyn ReadingSink>,
    remote: Arc<dyn ReadingSink>,
    sink_timeout: Duration,
}

impl DispatchFanout {
    pub fn new(
        export: Arc<dyn ReadingSink>,
        remote: Arc<dyn ReadingSink>,
        sink_timeout: Duration,
    ) -> Self {
        Self {
            export,
            remote,
            sink_timeout,
        }
    }

    pub async fn dispatch(&self, set: &ReadingSet) -> DispatchReport {
        let (export, remote) = tokio::join!(
            deliver(self.export.as_ref(), set, self.sink_timeout),
            deliver(self.remote.as_ref(), set, self.sink_timeout),
        );

        match &export {
            SinkOutcome::Delivered(_) => record_export_success(),
            SinkOutcome::Failed(_) => record_export_failure(),
            SinkOutcome::Disabled => {}
        }
        match &remote {
            SinkOutcome::Delivered(_) => record_remote_success(),
            SinkOutcome::Failed(_) => record_remote_failure(),
            SinkOutcome::Disabled => {}
        }

        info!(
            target: "daq.dispatch",
            cycle_id = %set.cycle_id(),
            export_ok = export.is_delivered(),
            remote_ok = remote.is_delivered(),
            "dispatch_completed"
        );
        DispatchReport { export, remote }
    }
}

async fn deliver(sink: &dyn ReadingSink, set: &ReadingSet, timeout: Duration) -> SinkOutcome {
    if !sink.enabled() {
        return SinkOutcome::Disabled;
    }
    // 超时会丢弃 deliver future，未关闭的连接随之释放
    let result = match tokio::time::timeout(timeout, sink.deliver(set)).await {
        Ok(result) => result,
        Err(_) => Err(SinkError::Timeout {
            sink: sink.name(),
            timeout_ms: timeout.as_millis() as u64,
        }),
    };
    match result {
        Ok(receipt) => SinkOutcome::Delivered(receipt),
        Err(err) => {
            warn!(
                target: "daq.dispatch",
                sink = sink.name(),
                cycle_id = %set.cycle_id(),
                error = %err,
                "sink_delivery_failed"
            );
            SinkOutcome::Failed(err)
        }
    }
}
