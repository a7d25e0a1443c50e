//! 样本过滤：剔除越界样本并把一个批次归约为单个标量。
//!
//! 纯函数，不做 I/O，不持有共享状态。

use domain::{NoDataReason, ReadingValue, ValidRange};

/// 单批次过滤统计（用于日志）。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSummary {
    pub total: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub value: ReadingValue,
}

/// 过滤批次并返回读数值。
///
/// - 剔除区间外样本（含非有限值）
/// - 有剩余样本时取算术平均
/// - 无剩余样本（含空批次）时返回 `NoData(Filtered)`
pub fn filter(batch: &[f64], range: &ValidRange) -> ReadingValue {
    summarize(batch, range).value
}

/// 过滤批次并返回统计信息。
pub fn summarize(batch: &[f64], range: &ValidRange) -> FilterSummary {
    let mut accepted = 0usize;
    let mut sum = 0.0f64;
    let mut lowest = f64::INFINITY;
    let mut highest = f64::NEG_INFINITY;

    for &sample in batch.iter().filter(|sample| range.contains(**sample)) {
        accepted += 1;
        sum += sample;
        lowest = lowest.min(sample);
        highest = highest.max(sample);
    }

    let value = if accepted == 0 {
        ReadingValue::NoData(NoDataReason::Filtered)
    } else {
        // 均值夹到存活样本的观测区间内，避免舍入误差越界
        let mean = (sum / accepted as f64).clamp(lowest, highest);
        ReadingValue::Value(mean)
    };

    FilterSummary {
        total: batch.len(),
        accepted,
        rejected: batch.len() - accepted,
        value,
    }
}
