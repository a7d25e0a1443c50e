//! # DAQ Storage 模块
//!
//! 读数记录的持久化抽象层，支持多种存储后端实现。
//!
//! ## 架构设计
//!
//! 1. **接口抽象层** (`traits.rs`)：[`ReadingStore`] 异步 Trait
//! 2. **数据模型层** (`models.rs`)：[`ReadingRecord`]、[`ReadingQuery`]
//! 3. **错误处理层** (`error.rs`)：统一的 [`StorageError`]
//! 4. **验证辅助层** (`validation.rs`)：写入前的记录校验
//! 5. **连接管理层** (`connection.rs`)：SQLite 连接池
//! 6. **实现层**：
//!    - `in_memory/`：内存存储实现（用于测试和演示）
//!    - `sqlite/`：SQLite 存储实现（现场部署使用）
//!
//! ## 写入语义
//!
//! - **追加写**：记录只追加，不更新、不删除
//! - **整批原子**：一次 `append_records` 中的所有行要么全部提交，要么全部不可见
//! - **不去重**：`(ts_ms, channel)` 不设唯一约束，调用方负责不重复提交
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use daq_storage::{ReadingRecord, ReadingStore, SqliteReadingStore};
//!
//! let store = SqliteReadingStore::connect("sqlite://sensor_data.db").await?;
//! store
//!     .append_records(&[ReadingRecord::new(1_700_000_000_000, "flow", "Dev1/ai2", Some(12.5))])
//!     .await?;
//! ```

pub mod connection;
pub mod error;
pub mod in_memory;
pub mod models;
pub mod sqlite;
pub mod traits;
pub mod validation;

pub use connection::*;
pub use error::*;
pub use models::*;
pub use traits::*;
pub use validation::*;

pub use in_memory::InMemoryReadingStore;
pub use sqlite::SqliteReadingStore;
