pub mod channel;
pub mod data;

pub use channel::{ChannelConfig, ValidRange};
pub use data::{NoDataReason, Reading, ReadingSet, ReadingValue};

/// 获取当前时间戳（毫秒）。
pub fn now_epoch_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
