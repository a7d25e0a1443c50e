//! 通道配置：启动时加载一次，进程生命周期内不可变。

use serde::{Deserialize, Serialize};

/// 有效值区间。
///
/// 边界及其开闭均由配置决定；旧部署中固定的 `(0, 1000)` 仅作为
/// [`ValidRange::legacy_band`] 提供的默认值。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidRange {
    pub min: f64,
    pub max: f64,
    #[serde(default = "default_inclusive")]
    pub min_inclusive: bool,
    #[serde(default = "default_inclusive")]
    pub max_inclusive: bool,
}

fn default_inclusive() -> bool {
    true
}

impl ValidRange {
    /// 闭区间 `[min, max]`。
    pub fn inclusive(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            min_inclusive: true,
            max_inclusive: true,
        }
    }

    /// 开区间 `(min, max)`。
    pub fn exclusive(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            min_inclusive: false,
            max_inclusive: false,
        }
    }

    /// 旧采集脚本使用的 `(0, 1000)` 区间。
    pub fn legacy_band() -> Self {
        Self::exclusive(0.0, 1000.0)
    }

    /// 判断样本是否落在区间内（非有限值一律视为越界）。
    pub fn contains(&self, sample: f64) -> bool {
        if !sample.is_finite() {
            return false;
        }
        let above_min = if self.min_inclusive {
            sample >= self.min
        } else {
            sample > self.min
        };
        let below_max = if self.max_inclusive {
            sample <= self.max
        } else {
            sample < self.max
        };
        above_min && below_max
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(format!("range bounds must be finite: [{}, {}]", self.min, self.max));
        }
        if self.min >= self.max {
            return Err(format!("range min {} must be below max {}", self.min, self.max));
        }
        Ok(())
    }
}

/// 单个物理通道的配置。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// 通道名称（唯一键）
    pub name: String,
    /// 物理地址，例如 `Dev1/ai0`
    pub address: String,
    /// 有效值区间
    pub range: ValidRange,
    /// 每周期读取的样本数
    #[serde(default = "default_samples_per_read")]
    pub samples_per_read: usize,
    /// 采样率（Hz）
    #[serde(default = "default_sample_rate_hz")]
    pub sample_rate_hz: u32,
    /// 读取超时（毫秒）
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

fn default_samples_per_read() -> usize {
    1000
}

fn default_sample_rate_hz() -> u32 {
    1000
}

fn default_read_timeout_ms() -> u64 {
    10_000
}

impl ChannelConfig {
    /// 使用默认采样参数构造通道配置。
    pub fn new(name: impl Into<String>, address: impl Into<String>, range: ValidRange) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            range,
            samples_per_read: default_samples_per_read(),
            sample_rate_hz: default_sample_rate_hz(),
            read_timeout_ms: default_read_timeout_ms(),
        }
    }

    pub fn read_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.read_timeout_ms)
    }
}
