//! 存储层错误类型
//!
//! 按失败来源区分，调用方可据此决定是否值得重试：
//! - `Database`：SQL 执行或连接失败
//! - `InvalidRecord`：记录未通过写入前校验
//! - `Unavailable`：后端内部状态不可用（如锁中毒）

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("invalid record: {0}")]
    InvalidRecord(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    /// 日志字段用的失败类别。
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Database(_) => "database",
            Self::InvalidRecord(_) => "invalid_record",
            Self::Unavailable(_) => "unavailable",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlx_errors_map_to_database() {
        let err: StorageError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, StorageError::Database(_)));
        assert_eq!(err.kind(), "database");
    }
}
