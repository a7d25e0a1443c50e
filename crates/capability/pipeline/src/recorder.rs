use crate::PipelineError;
use daq_storage::{ReadingRecord, ReadingStore};
use daq_telemetry::{record_persist_failure, record_rows_persisted};
use domain::ReadingSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// 落库结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordResult {
    pub cycle_id: String,
    pub rows: usize,
}

/// 持久化记录器：每个读数集合一个事务。
#[derive(Clone)]
pub struct Recorder {
    store: Arc<dyn ReadingStore>,
}

impl Recorder {
    pub fn new(store: Arc<dyn ReadingStore>) -> Self {
        Self { store }
    }

    pub async fn record(&self, set: &ReadingSet) -> Result<RecordResult, PipelineError> {
        let records = to_records(set);
        match self.store.append_records(&records).await {
            Ok(rows) => {
                record_rows_persisted(rows as u64);
                debug!(
                    target: "daq.storage",
                    cycle_id = %set.cycle_id(),
                    rows = rows,
                    "reading_set_persisted"
                );
                Ok(RecordResult {
                    cycle_id: set.cycle_id().to_string(),
                    rows,
                })
            }
            Err(err) => {
                record_persist_failure();
                warn!(
                    target: "daq.storage",
                    cycle_id = %set.cycle_id(),
                    kind = err.kind(),
                    error = %err,
                    "reading_set_persist_failed"
                );
                Err(err.into())
            }
        }
    }
}

/// 读数集合 → 持久化记录（无数据写为 NULL）。
fn to_records(set: &ReadingSet) -> Vec<ReadingRecord> {
    set.readings()
        .iter()
        .map(|reading| {
            ReadingRecord::new(
                set.ts_ms(),
                reading.channel.clone(),
                reading.address.clone(),
                reading.value.as_f64(),
            )
        })
        .collect()
}
