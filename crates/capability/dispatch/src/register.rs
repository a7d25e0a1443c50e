//! 远端寄存器下游
//!
//! 第 i 个读数写入 `base_address + i`；无数据读数跳过，对应地址保持原值。
//! 传输层错误中止本批；设备异常应答只跳过该寄存器。

use crate::{ReadingSink, SinkError, SinkReceipt};
use async_trait::async_trait;
use daq_protocol::{RegisterClient, RegisterFormat, encode_register};
use daq_telemetry::record_registers_written;
use domain::ReadingSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// 寄存器映射配置。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegisterSinkConfig {
    pub base_address: u16,
    pub scale_factor: f64,
    pub format: RegisterFormat,
}

impl Default for RegisterSinkConfig {
    fn default() -> Self {
        Self {
            base_address: 0,
            scale_factor: 100.0,
            format: RegisterFormat::Int16,
        }
    }
}

/// 寄存器下游：每批一次连接，写完即关闭。
pub struct RegisterSink {
    client: Arc<dyn RegisterClient>,
    config: RegisterSinkConfig,
}

impl RegisterSink {
    pub fn new(client: Arc<dyn RegisterClient>, config: RegisterSinkConfig) -> Self {
        Self { client, config }
    }

    fn address_of(&self, index: usize) -> Option<u16> {
        u16::try_from(index)
            .ok()
            .and_then(|offset| self.config.base_address.checked_add(offset))
    }
}

#[async_trait]
impl ReadingSink for RegisterSink {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn deliver(&self, set: &ReadingSet) -> Result<SinkReceipt, SinkError> {
        let mut session = self
            .client
            .connect()
            .await
            .map_err(|err| SinkError::Remote(err.to_string()))?;

        let mut receipt = SinkReceipt::default();
        let mut failure = None;
        for (index, reading) in set.readings().iter().enumerate() {
            let Some(value) = reading.value.as_f64() else {
                receipt.skipped += 1;
                continue;
            };
            let Some(address) = self.address_of(index) else {
                warn!(
                    target: "daq.dispatch",
                    channel = %reading.channel,
                    index = index,
                    base_address = self.config.base_address,
                    "register_address_overflow"
                );
                receipt.skipped += 1;
                continue;
            };
            let word = match encode_register(value, self.config.scale_factor, self.config.format) {
                Ok(word) => word,
                Err(err) => {
                    warn!(
                        target: "daq.dispatch",
                        channel = %reading.channel,
                        register = address,
                        value = value,
                        error = %err,
                        "register_value_out_of_range"
                    );
                    receipt.skipped += 1;
                    continue;
                }
            };
            match session.write_register(address, word).await {
                Ok(()) => receipt.written += 1,
                Err(err) if err.is_transport() => {
                    failure = Some((address, err));
                    break;
                }
                Err(err) => {
                    warn!(
                        target: "daq.dispatch",
                        channel = %reading.channel,
                        register = address,
                        error = %err,
                        "register_write_rejected"
                    );
                    receipt.skipped += 1;
                }
            }
        }
        session.close().await;
        record_registers_written(receipt.written as u64);

        match failure {
            Some((address, err)) => Err(SinkError::Remote(format!(
                "register {}: {} ({} written before failure)",
                address, err, receipt.written
            ))),
            None => {
                debug!(
                    target: "daq.dispatch",
                    cycle_id = %set.cycle_id(),
                    written = receipt.written,
                    skipped = receipt.skipped,
                    "registers_written"
                );
                Ok(receipt)
            }
        }
    }
}
