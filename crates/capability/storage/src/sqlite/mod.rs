//! SQLite 存储实现模块
//!
//! 使用 sqlx 提供的运行时参数化查询；表结构在连接时自动创建。

pub mod reading;

pub use reading::*;
