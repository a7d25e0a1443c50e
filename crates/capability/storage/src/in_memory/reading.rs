//! 读数记录内存实现
//!
//! 整批先校验，再在一次写锁内追加，读者看不到半批数据。

use crate::error::StorageError;
use crate::models::{ReadingQuery, ReadingRecord};
use crate::traits::ReadingStore;
use crate::validation::ensure_records;
use std::sync::RwLock;

/// 读数记录内存存储
pub struct InMemoryReadingStore {
    records: RwLock<Vec<ReadingRecord>>,
}

impl InMemoryReadingStore {
    /// 创建新的内存存储
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    /// 获取当前累计的记录数量（用于测试）
    pub fn len(&self) -> usize {
        self.records.read().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryReadingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ReadingStore for InMemoryReadingStore {
    async fn append_records(&self, records: &[ReadingRecord]) -> Result<usize, StorageError> {
        ensure_records(records)?;
        let mut store = self
            .records
            .write()
            .map_err(|_| StorageError::Unavailable("lock poisoned".to_string()))?;
        store.extend(records.iter().cloned());
        Ok(records.len())
    }

    async fn list_records(&self, query: ReadingQuery) -> Result<Vec<ReadingRecord>, StorageError> {
        let records = self
            .records
            .read()
            .map_err(|_| StorageError::Unavailable("lock poisoned".to_string()))?;
        let mut selected: Vec<ReadingRecord> = records
            .iter()
            .filter(|record| match query.channel.as_deref() {
                Some(channel) => record.channel == channel,
                None => true,
            })
            .filter(|record| query.from_ms.is_none_or(|from| record.ts_ms >= from))
            .filter(|record| query.to_ms.is_none_or(|to| record.ts_ms <= to))
            .cloned()
            .collect();
        // 稳定排序，同一时间戳保持追加顺序
        selected.sort_by_key(|record| record.ts_ms);
        if query.limit > 0 {
            selected.truncate(query.limit);
        }
        Ok(selected)
    }

    async fn count_records(&self) -> Result<u64, StorageError> {
        Ok(self.len() as u64)
    }
}
