//! 数据库连接管理
//!
//! 提供 SQLite 连接池初始化：
//! - connect_pool：建立连接池（文件不存在时自动创建）
//!
//! 设计原则：
//! - 文件库最大连接数为 4
//! - `:memory:` 库只保留单连接且不回收，否则每个连接各自持有一个空库

use crate::error::StorageError;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::str::FromStr;

/// 建立 SQLite 连接池
///
/// # 参数
/// - `database_url`：SQLite 连接字符串，例如 `sqlite://sensor_data.db` 或 `sqlite::memory:`
///
/// # 返回
/// - `Result<SqlitePool, StorageError>`：连接池或错误
pub async fn connect_pool(database_url: &str) -> Result<SqlitePool, StorageError> {
    let in_memory = database_url.contains(":memory:");
    let mut options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    if !in_memory {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }
    let pool = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?
    };
    Ok(pool)
}
