#![allow(dead_code)]

use async_trait::async_trait;
use daq_acquire::{AcquireError, ChannelHandle, ChannelSource};
use daq_dispatch::{ReadingSink, SinkError, SinkReceipt};
use domain::{ChannelConfig, ReadingSet, ValidRange};
use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// 固定返回同一值的通道源；可指定打不开或读不出的地址。
#[derive(Default)]
pub struct FixedSource {
    pub value: f64,
    pub unclaimable: HashSet<String>,
    pub faulty: HashSet<String>,
    pub read_delay: Option<Duration>,
    next_id: AtomicU64,
    pub opened: Mutex<Vec<u64>>,
    pub closed: Mutex<Vec<u64>>,
}

impl FixedSource {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            ..Self::default()
        }
    }

    pub fn unclaimable(mut self, address: &str) -> Self {
        self.unclaimable.insert(address.to_string());
        self
    }

    pub fn faulty(mut self, address: &str) -> Self {
        self.faulty.insert(address.to_string());
        self
    }

    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = Some(delay);
        self
    }

    /// 每个打开的句柄恰好关闭一次。
    pub fn assert_balanced(&self) {
        let mut opened = self.opened.lock().unwrap().clone();
        let mut closed = self.closed.lock().unwrap().clone();
        opened.sort_unstable();
        closed.sort_unstable();
        assert_eq!(opened, closed);
    }
}

#[async_trait]
impl ChannelSource for FixedSource {
    async fn open(&self, channel: &ChannelConfig) -> Result<ChannelHandle, AcquireError> {
        if self.unclaimable.contains(&channel.address) {
            return Err(AcquireError::Configuration(format!(
                "address {} already in use",
                channel.address
            )));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.opened.lock().unwrap().push(id);
        Ok(ChannelHandle::new(id, channel.address.clone()))
    }

    async fn read(
        &self,
        handle: &ChannelHandle,
        count: usize,
        _timeout: Duration,
    ) -> Result<Vec<f64>, AcquireError> {
        if let Some(delay) = self.read_delay {
            tokio::time::sleep(delay).await;
        }
        if self.faulty.contains(handle.address()) {
            return Err(AcquireError::Acquisition("hardware fault".to_string()));
        }
        Ok(vec![self.value; count.min(10)])
    }

    async fn close(&self, handle: ChannelHandle) {
        self.closed.lock().unwrap().push(handle.id());
    }
}

/// 记录收到的集合的下游；可选每次投递的耗时。
#[derive(Default)]
pub struct CollectingSink {
    pub delay: Option<Duration>,
    pub delivered: Mutex<Vec<ReadingSet>>,
}

impl CollectingSink {
    pub fn delayed(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn count(&self) -> usize {
        self.delivered.lock().unwrap().len()
    }
}

#[async_trait]
impl ReadingSink for CollectingSink {
    fn name(&self) -> &'static str {
        "collecting"
    }

    async fn deliver(&self, set: &ReadingSet) -> Result<SinkReceipt, SinkError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.delivered.lock().unwrap().push(set.clone());
        Ok(SinkReceipt {
            written: set.len(),
            skipped: 0,
        })
    }
}

pub fn channels(count: usize) -> Vec<ChannelConfig> {
    (0..count)
        .map(|index| {
            let mut channel = ChannelConfig::new(
                format!("ch{}", index),
                format!("Dev1/ai{}", index),
                ValidRange::inclusive(0.0, 100.0),
            );
            channel.read_timeout_ms = 1000;
            channel
        })
        .collect()
}
