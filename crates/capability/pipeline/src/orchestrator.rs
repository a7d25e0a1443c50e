use daq_acquire::ChannelAcquirer;
use daq_telemetry::{new_cycle_id, record_cycle_cancelled, record_cycle_completed};
use domain::{ChannelConfig, ReadingSet, now_epoch_ms};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// 周期执行结果。
#[derive(Debug)]
pub enum CycleOutcome {
    Complete(ReadingSet),
    /// 在通道边界收到取消信号；已采集的读数被丢弃
    Cancelled { acquired: usize },
}

/// 周期编排器：每周期按配置顺序把所有通道采集一遍。
#[derive(Clone)]
pub struct CycleOrchestrator {
    channels: Arc<[ChannelConfig]>,
    acquirer: ChannelAcquirer,
}

impl CycleOrchestrator {
    pub fn new(channels: Vec<ChannelConfig>, acquirer: ChannelAcquirer) -> Self {
        Self {
            channels: channels.into(),
            acquirer,
        }
    }

    pub fn channels(&self) -> &[ChannelConfig] {
        &self.channels
    }

    /// 完整跑一个周期（不可取消）。
    pub async fn run_cycle(&self) -> ReadingSet {
        let cycle_id = new_cycle_id();
        let ts_ms = now_epoch_ms();
        let mut readings = Vec::with_capacity(self.channels.len());
        for channel in self.channels.iter() {
            readings.push(self.acquirer.acquire(channel).await);
        }
        self.complete(cycle_id, ts_ms, readings)
    }

    /// 跑一个周期，每个通道开始前检查取消信号。
    ///
    /// 正在采集的通道总会完成 open/read/close 后才响应取消。
    pub async fn run_cycle_until(&self, cancel: &CancellationToken) -> CycleOutcome {
        let cycle_id = new_cycle_id();
        let ts_ms = now_epoch_ms();
        let mut readings = Vec::with_capacity(self.channels.len());

        for channel in self.channels.iter() {
            if cancel.is_cancelled() {
                record_cycle_cancelled();
                warn!(
                    target: "daq.pipeline",
                    cycle_id = %cycle_id,
                    acquired = readings.len(),
                    total = self.channels.len(),
                    "cycle_cancelled"
                );
                return CycleOutcome::Cancelled {
                    acquired: readings.len(),
                };
            }
            readings.push(self.acquirer.acquire(channel).await);
        }

        CycleOutcome::Complete(self.complete(cycle_id, ts_ms, readings))
    }

    fn complete(&self, cycle_id: String, ts_ms: i64, readings: Vec<domain::Reading>) -> ReadingSet {
        let set = ReadingSet::new(cycle_id, ts_ms, readings);
        record_cycle_completed();
        info!(
            target: "daq.pipeline",
            cycle_id = %set.cycle_id(),
            ts_ms = set.ts_ms(),
            channels = set.len(),
            numeric = set.len() - set.no_data_count(),
            no_data = set.no_data_count(),
            "cycle_completed"
        );
        set
    }
}
