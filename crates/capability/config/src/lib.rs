//! 应用运行配置加载。
//!
//! 配置在启动时从环境变量构造一次，之后以不可变结构体显式传递给各组件。

use domain::{ChannelConfig, ValidRange};
use std::collections::HashSet;
use std::env;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env: {0}")]
    Missing(String),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 交接队列溢出策略。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueOverflow {
    /// 丢弃最旧的读数集合
    DropOldest,
    /// 有限等待，超时后丢弃新读数集合
    Block,
}

/// 导出文件中无数据读数的写法。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportNoData {
    Skip,
    Null,
}

/// 远端寄存器格式，与协议层编码共用同一类型。
pub use daq_protocol::RegisterFormat;

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub channels: Vec<ChannelConfig>,
    pub poll_interval_ms: u64,
    pub queue_capacity: usize,
    pub queue_overflow: QueueOverflow,
    pub queue_push_timeout_ms: u64,
    pub shutdown_grace_ms: u64,
    pub store_url: String,
    pub export_enabled: bool,
    pub export_path: String,
    pub export_no_data: ExportNoData,
    pub remote_enabled: bool,
    pub remote_host: String,
    pub remote_port: u16,
    pub remote_unit_id: u8,
    pub remote_base_address: u16,
    pub remote_scale_factor: f64,
    pub remote_register_format: RegisterFormat,
    pub remote_connect_timeout_ms: u64,
    pub sink_timeout_ms: u64,
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 从任意键值来源读取配置（测试时可传入 map）。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };
        let channels = read_channels(&vars)?;
        let poll_interval_ms = vars.u64_or("DAQ_POLL_INTERVAL_MS", 10_000)?;
        let queue_capacity = vars.u64_or("DAQ_QUEUE_CAPACITY", 1)? as usize;
        let queue_overflow = match vars.string_or("DAQ_QUEUE_OVERFLOW", "drop_oldest").as_str() {
            "drop_oldest" => QueueOverflow::DropOldest,
            "block" => QueueOverflow::Block,
            other => {
                return Err(ConfigError::Invalid(
                    "DAQ_QUEUE_OVERFLOW".to_string(),
                    other.to_string(),
                ));
            }
        };
        let queue_push_timeout_ms = vars.u64_or("DAQ_QUEUE_PUSH_TIMEOUT_MS", 1000)?;
        let shutdown_grace_ms = vars.u64_or("DAQ_SHUTDOWN_GRACE_MS", 5000)?;
        let store_url = vars.string_or("DAQ_STORE_URL", "sqlite://sensor_data.db");
        let export_enabled = vars.bool_or("DAQ_EXPORT_ENABLED", true)?;
        let export_path = vars.string_or("DAQ_EXPORT_PATH", "sensor_data.txt");
        let export_no_data = match vars.string_or("DAQ_EXPORT_NO_DATA", "skip").as_str() {
            "skip" => ExportNoData::Skip,
            "null" => ExportNoData::Null,
            other => {
                return Err(ConfigError::Invalid(
                    "DAQ_EXPORT_NO_DATA".to_string(),
                    other.to_string(),
                ));
            }
        };
        let remote_enabled = vars.bool_or("DAQ_REMOTE_ENABLED", true)?;
        let remote_host = vars.string_or("DAQ_REMOTE_HOST", "192.168.1.100");
        let remote_port = vars.parse_or("DAQ_REMOTE_PORT", 502u16)?;
        let remote_unit_id = vars.parse_or("DAQ_REMOTE_UNIT_ID", 1u8)?;
        let remote_base_address = vars.parse_or("DAQ_REMOTE_BASE_ADDRESS", 0u16)?;
        let remote_scale_factor = vars.parse_or("DAQ_REMOTE_SCALE_FACTOR", 100.0f64)?;
        let remote_register_format =
            match vars.string_or("DAQ_REMOTE_REGISTER_FORMAT", "int16").as_str() {
                "int16" => RegisterFormat::Int16,
                "uint16" => RegisterFormat::Uint16,
                other => {
                    return Err(ConfigError::Invalid(
                        "DAQ_REMOTE_REGISTER_FORMAT".to_string(),
                        other.to_string(),
                    ));
                }
            };
        let remote_connect_timeout_ms = vars.u64_or("DAQ_REMOTE_CONNECT_TIMEOUT_MS", 3000)?;
        let sink_timeout_ms = vars.u64_or("DAQ_SINK_TIMEOUT_MS", 5000)?;

        let config = Self {
            channels,
            poll_interval_ms,
            queue_capacity,
            queue_overflow,
            queue_push_timeout_ms,
            shutdown_grace_ms,
            store_url,
            export_enabled,
            export_path,
            export_no_data,
            remote_enabled,
            remote_host,
            remote_port,
            remote_unit_id,
            remote_base_address,
            remote_scale_factor,
            remote_register_format,
            remote_connect_timeout_ms,
            sink_timeout_ms,
        };
        config.validate()?;
        Ok(config)
    }

    /// 校验配置的一致性（任一失败均为启动期致命错误）。
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channels.is_empty() {
            return Err(invalid("channels", "at least one channel is required"));
        }
        let mut names = HashSet::new();
        for channel in &self.channels {
            if channel.name.trim().is_empty() {
                return Err(invalid("channels", "channel name must not be empty"));
            }
            if !names.insert(channel.name.as_str()) {
                return Err(invalid(
                    "channels",
                    format!("duplicate channel name: {}", channel.name),
                ));
            }
            if channel.address.trim().is_empty() {
                return Err(invalid(
                    "channels",
                    format!("channel {} has no address", channel.name),
                ));
            }
            channel
                .range
                .validate()
                .map_err(|err| invalid("channels", format!("channel {}: {}", channel.name, err)))?;
            if channel.samples_per_read == 0 {
                return Err(invalid(
                    "channels",
                    format!("channel {} reads zero samples", channel.name),
                ));
            }
            if channel.read_timeout_ms == 0 {
                return Err(invalid(
                    "channels",
                    format!("channel {} has zero read timeout", channel.name),
                ));
            }
        }
        if self.poll_interval_ms == 0 {
            return Err(invalid("DAQ_POLL_INTERVAL_MS", "0"));
        }
        if self.queue_capacity == 0 {
            return Err(invalid("DAQ_QUEUE_CAPACITY", "0"));
        }
        if !self.remote_scale_factor.is_finite() || self.remote_scale_factor <= 0.0 {
            return Err(invalid(
                "DAQ_REMOTE_SCALE_FACTOR",
                self.remote_scale_factor.to_string(),
            ));
        }
        if self.sink_timeout_ms == 0 {
            return Err(invalid("DAQ_SINK_TIMEOUT_MS", "0"));
        }
        Ok(())
    }
}

fn invalid(key: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(key.to_string(), reason.into())
}

/// 读取通道列表：文件优先，其次内联 JSON，最后回落到默认部署。
fn read_channels<F>(vars: &Vars<F>) -> Result<Vec<ChannelConfig>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = vars.optional("DAQ_CHANNELS_FILE") {
        let raw = std::fs::read_to_string(&path)
            .map_err(|err| invalid("DAQ_CHANNELS_FILE", format!("{}: {}", path, err)))?;
        return parse_channels("DAQ_CHANNELS_FILE", &raw);
    }
    if let Some(raw) = vars.optional("DAQ_CHANNELS") {
        return parse_channels("DAQ_CHANNELS", &raw);
    }
    Ok(default_channels())
}

fn parse_channels(key: &str, raw: &str) -> Result<Vec<ChannelConfig>, ConfigError> {
    serde_json::from_str(raw).map_err(|err| invalid(key, err.to_string()))
}

/// 默认部署的八个模拟量通道。
pub fn default_channels() -> Vec<ChannelConfig> {
    vec![
        ChannelConfig::new("temperature", "Dev1/ai0", ValidRange::inclusive(-50.0, 150.0)),
        ChannelConfig::new("pressure", "Dev1/ai1", ValidRange::inclusive(0.0, 100.0)),
        ChannelConfig::new("flow", "Dev1/ai2", ValidRange::inclusive(0.0, 500.0)),
        ChannelConfig::new("level", "Dev1/ai3", ValidRange::inclusive(0.0, 10.0)),
        ChannelConfig::new("position", "Dev1/ai4", ValidRange::inclusive(0.0, 100.0)),
        ChannelConfig::new("force", "Dev1/ai5", ValidRange::inclusive(0.0, 5000.0)),
        ChannelConfig::new("vibration", "Dev1/ai6", ValidRange::inclusive(0.0, 10.0)),
        ChannelConfig::new("humidity", "Dev1/ai7", ValidRange::inclusive(0.0, 100.0)),
    ]
}

struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, key: &str) -> Option<String> {
        match (self.lookup)(key) {
            Some(value) if !value.is_empty() => Some(value),
            _ => None,
        }
    }

    fn string_or(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn u64_or(&self, key: &str, default: u64) -> Result<u64, ConfigError> {
        self.parse_or(key, default)
    }

    fn parse_or<T: std::str::FromStr>(&self, key: &str, default: T) -> Result<T, ConfigError> {
        let value = match self.optional(key) {
            Some(value) => value,
            None => return Ok(default),
        };
        value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid(key.to_string(), value))
    }

    fn bool_or(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        let value = match self.optional(key) {
            Some(value) => value,
            None => return Ok(default),
        };
        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "on" | "yes" => Ok(true),
            "0" | "false" | "off" | "no" => Ok(false),
            _ => Err(ConfigError::Invalid(key.to_string(), value)),
        }
    }
}
