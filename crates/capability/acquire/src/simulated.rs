//! 模拟通道源
//!
//! 未接入厂商驱动时使用：在通道区间中点附近生成带噪声的样本，
//! 并按固定比例混入越界尖峰，便于端到端演练过滤与下发链路。

use crate::{AcquireError, ChannelHandle, ChannelSource};
use async_trait::async_trait;
use domain::{ChannelConfig, ValidRange};
use rand_core::{OsRng, RngCore};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// 每多少个样本混入一个越界尖峰
const SPIKE_EVERY: u64 = 50;

#[derive(Debug, Clone, Copy)]
struct OpenChannel {
    range: ValidRange,
    sample_rate_hz: u32,
}

/// 模拟通道源
#[derive(Default)]
pub struct SimulatedChannelSource {
    next_id: AtomicU64,
    /// address -> handle id
    claims: Mutex<HashMap<String, u64>>,
    open: Mutex<HashMap<u64, OpenChannel>>,
    /// 是否按采样率模拟读取耗时
    pace: bool,
}

impl SimulatedChannelSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按采样率模拟读取耗时（`count / sample_rate_hz`）。
    pub fn paced() -> Self {
        Self {
            pace: true,
            ..Self::default()
        }
    }

    /// 当前占用中的地址数量。
    pub fn claimed(&self) -> usize {
        self.claims.lock().map(|claims| claims.len()).unwrap_or(0)
    }
}

#[async_trait]
impl ChannelSource for SimulatedChannelSource {
    async fn open(&self, channel: &ChannelConfig) -> Result<ChannelHandle, AcquireError> {
        if channel.address.trim().is_empty() {
            return Err(AcquireError::Configuration(format!(
                "channel {} has no physical address",
                channel.name
            )));
        }
        let mut claims = self
            .claims
            .lock()
            .map_err(|_| AcquireError::Configuration("claim table poisoned".to_string()))?;
        if claims.contains_key(&channel.address) {
            return Err(AcquireError::Configuration(format!(
                "address {} already in use",
                channel.address
            )));
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        claims.insert(channel.address.clone(), id);
        drop(claims);

        let mut open = self
            .open
            .lock()
            .map_err(|_| AcquireError::Configuration("channel table poisoned".to_string()))?;
        open.insert(
            id,
            OpenChannel {
                range: channel.range,
                sample_rate_hz: channel.sample_rate_hz.max(1),
            },
        );
        Ok(ChannelHandle::new(id, channel.address.clone()))
    }

    async fn read(
        &self,
        handle: &ChannelHandle,
        count: usize,
        timeout: Duration,
    ) -> Result<Vec<f64>, AcquireError> {
        let channel = self
            .open
            .lock()
            .map_err(|_| AcquireError::Acquisition("channel table poisoned".to_string()))?
            .get(&handle.id())
            .copied()
            .ok_or_else(|| {
                AcquireError::Acquisition(format!("handle {} is not open", handle.id()))
            })?;

        if self.pace {
            let duration =
                Duration::from_secs_f64(count as f64 / f64::from(channel.sample_rate_hz));
            if duration > timeout {
                tokio::time::sleep(timeout).await;
                return Err(AcquireError::Acquisition(format!(
                    "{} samples at {}Hz exceed timeout {:?}",
                    count, channel.sample_rate_hz, timeout
                )));
            }
            tokio::time::sleep(duration).await;
        }

        let span = channel.range.max - channel.range.min;
        let mid = channel.range.min + span / 2.0;
        let samples = (0..count as u64)
            .map(|index| {
                let unit = (OsRng.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
                if index % SPIKE_EVERY == SPIKE_EVERY - 1 {
                    channel.range.max + span * (1.0 + unit)
                } else {
                    mid + (unit - 0.5) * span * 0.2
                }
            })
            .collect();
        Ok(samples)
    }

    async fn close(&self, handle: ChannelHandle) {
        if let Ok(mut open) = self.open.lock() {
            open.remove(&handle.id());
        }
        if let Ok(mut claims) = self.claims.lock() {
            if claims.get(handle.address()) == Some(&handle.id()) {
                claims.remove(handle.address());
            }
        }
    }
}
