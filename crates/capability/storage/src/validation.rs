//! 验证辅助函数
//!
//! 写入前校验单条记录：
//! - 通道名非空
//! - 数值若存在必须是有限值（无数据用 `None` 表示，禁止 NaN 混入）

use crate::error::StorageError;
use crate::models::ReadingRecord;

/// 验证单条读数记录
pub fn ensure_record(record: &ReadingRecord) -> Result<(), StorageError> {
    if record.channel.is_empty() {
        return Err(StorageError::InvalidRecord("channel required".to_string()));
    }
    if let Some(value) = record.value {
        if !value.is_finite() {
            return Err(StorageError::InvalidRecord(format!(
                "non-finite value for channel {}",
                record.channel
            )));
        }
    }
    Ok(())
}

/// 验证整批记录（任意一条失败则整批失败）
pub fn ensure_records(records: &[ReadingRecord]) -> Result<(), StorageError> {
    records.iter().try_for_each(ensure_record)
}
