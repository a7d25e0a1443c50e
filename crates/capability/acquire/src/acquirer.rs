use crate::{AcquireError, ChannelHandle, ChannelSource};
use daq_telemetry::{record_channel_error, record_channel_no_data};
use domain::{ChannelConfig, NoDataReason, Reading, ReadingValue};
use std::sync::Arc;
use tracing::{debug, warn};

/// 已打开通道的释放守卫。
///
/// 正常路径调用 [`OpenChannel::close`]；若调用方的 future 在读取中途被丢弃，
/// `Drop` 会把 close 交给运行时后台执行，占用不会泄漏到后续周期。
struct OpenChannel {
    source: Arc<dyn ChannelSource>,
    handle: ChannelHandle,
    armed: bool,
}

impl OpenChannel {
    fn new(source: Arc<dyn ChannelSource>, handle: ChannelHandle) -> Self {
        Self {
            source,
            handle,
            armed: true,
        }
    }

    fn handle(&self) -> &ChannelHandle {
        &self.handle
    }

    fn take(&mut self) -> ChannelHandle {
        self.armed = false;
        std::mem::replace(&mut self.handle, ChannelHandle::new(0, String::new()))
    }

    async fn close(mut self) {
        let handle = self.take();
        self.source.close(handle).await;
    }
}

impl Drop for OpenChannel {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let handle = self.take();
        let source = self.source.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                debug!(
                    target: "daq.acquire",
                    address = %handle.address(),
                    "channel_close_deferred"
                );
                runtime.spawn(async move {
                    source.close(handle).await;
                });
            }
            Err(_) => warn!(
                target: "daq.acquire",
                address = %handle.address(),
                "channel_close_without_runtime"
            ),
        }
    }
}

/// 单通道采集器。
///
/// 每次调用 [`ChannelAcquirer::acquire`] 都会完整经历 open → read → close；
/// 只要 open 成功，close 在任何路径上都恰好执行一次。
#[derive(Clone)]
pub struct ChannelAcquirer {
    source: Arc<dyn ChannelSource>,
}

impl ChannelAcquirer {
    pub fn new(source: Arc<dyn ChannelSource>) -> Self {
        Self { source }
    }

    /// 采集并过滤一个通道，错误转换为 NoData 读数。
    pub async fn acquire(&self, channel: &ChannelConfig) -> Reading {
        let value = match self.read_batch(channel).await {
            Ok(batch) => {
                let summary = daq_filter::summarize(&batch, &channel.range);
                debug!(
                    target: "daq.acquire",
                    channel = %channel.name,
                    total = summary.total,
                    accepted = summary.accepted,
                    rejected = summary.rejected,
                    "channel_batch_filtered"
                );
                if summary.value.is_no_data() {
                    warn!(
                        target: "daq.acquire",
                        channel = %channel.name,
                        total = summary.total,
                        "channel_all_samples_rejected"
                    );
                }
                summary.value
            }
            Err(AcquireError::Configuration(reason)) => {
                record_channel_error();
                warn!(
                    target: "daq.acquire",
                    channel = %channel.name,
                    address = %channel.address,
                    error = %reason,
                    "channel_open_failed"
                );
                ReadingValue::NoData(NoDataReason::Configuration)
            }
            Err(AcquireError::Acquisition(reason)) => {
                record_channel_error();
                warn!(
                    target: "daq.acquire",
                    channel = %channel.name,
                    address = %channel.address,
                    error = %reason,
                    "channel_read_failed"
                );
                ReadingValue::NoData(NoDataReason::Acquisition)
            }
        };
        if value.is_no_data() {
            record_channel_no_data();
        }
        Reading::new(channel.name.clone(), channel.address.clone(), value)
    }

    /// 打开通道、读取一个原始批次并关闭通道。
    pub async fn read_batch(&self, channel: &ChannelConfig) -> Result<Vec<f64>, AcquireError> {
        let handle = self.source.open(channel).await?;
        let open = OpenChannel::new(self.source.clone(), handle);
        let timeout = channel.read_timeout();
        let result = match tokio::time::timeout(
            timeout,
            self.source.read(open.handle(), channel.samples_per_read, timeout),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(AcquireError::Acquisition(format!(
                "read timed out after {}ms",
                channel.read_timeout_ms
            ))),
        };
        open.close().await;
        result
    }
}
