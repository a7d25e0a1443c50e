//! 数据模型
//!
//! - ReadingRecord：持久化的单行读数（每周期每通道一行）
//! - ReadingQuery：读数查询条件

/// 持久化读数记录。
///
/// `value` 为 `None` 表示该周期该通道无数据。
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingRecord {
    pub ts_ms: i64,
    pub channel: String,
    pub address: String,
    pub value: Option<f64>,
}

impl ReadingRecord {
    pub fn new(
        ts_ms: i64,
        channel: impl Into<String>,
        address: impl Into<String>,
        value: Option<f64>,
    ) -> Self {
        Self {
            ts_ms,
            channel: channel.into(),
            address: address.into(),
            value,
        }
    }
}

/// 读数查询条件（按时间升序返回）。
#[derive(Debug, Clone, Default)]
pub struct ReadingQuery {
    pub channel: Option<String>,
    pub from_ms: Option<i64>,
    pub to_ms: Option<i64>,
    /// 0 表示不限制
    pub limit: usize,
}

impl ReadingQuery {
    pub fn channel(channel: impl Into<String>) -> Self {
        Self {
            channel: Some(channel.into()),
            ..Self::default()
        }
    }
}
