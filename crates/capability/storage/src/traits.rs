//! 存储接口 Trait 定义
//!
//! 设计原则：
//! - 所有接口返回 StorageError
//! - 使用 async_trait 支持动态分发

use crate::error::StorageError;
use crate::models::{ReadingQuery, ReadingRecord};
use async_trait::async_trait;

/// 读数存储接口
///
/// 只追加；`append_records` 必须整批原子提交。
#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// 在单个事务中追加一批记录，返回写入行数
    async fn append_records(&self, records: &[ReadingRecord]) -> Result<usize, StorageError>;

    /// 查询记录（时间升序）
    async fn list_records(&self, query: ReadingQuery) -> Result<Vec<ReadingRecord>, StorageError>;

    /// 统计全部记录数
    async fn count_records(&self) -> Result<u64, StorageError>;
}
