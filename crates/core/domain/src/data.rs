/// 无数据的原因。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoDataReason {
    /// 没有样本通过有效值过滤
    Filtered,
    /// 通道无法占用（地址无效或已被占用）
    Configuration,
    /// 读取超时或硬件故障
    Acquisition,
}

impl NoDataReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Filtered => "filtered",
            Self::Configuration => "configuration",
            Self::Acquisition => "acquisition",
        }
    }
}

/// 通道读数的值：数值或显式的“无数据”。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReadingValue {
    Value(f64),
    NoData(NoDataReason),
}

impl ReadingValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(*v),
            Self::NoData(_) => None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData(_))
    }
}

/// 单通道在一个周期内的读数。
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub channel: String,
    pub address: String,
    pub value: ReadingValue,
}

impl Reading {
    pub fn new(channel: impl Into<String>, address: impl Into<String>, value: ReadingValue) -> Self {
        Self {
            channel: channel.into(),
            address: address.into(),
            value,
        }
    }

    pub fn no_data(
        channel: impl Into<String>,
        address: impl Into<String>,
        reason: NoDataReason,
    ) -> Self {
        Self::new(channel, address, ReadingValue::NoData(reason))
    }
}

/// 一个周期的读数集合。
///
/// 按配置顺序保存每个通道的读数；组装后不可变，是采集与下游之间的交接单元。
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingSet {
    cycle_id: String,
    ts_ms: i64,
    readings: Vec<Reading>,
}

impl ReadingSet {
    pub fn new(cycle_id: impl Into<String>, ts_ms: i64, readings: Vec<Reading>) -> Self {
        Self {
            cycle_id: cycle_id.into(),
            ts_ms,
            readings,
        }
    }

    pub fn cycle_id(&self) -> &str {
        &self.cycle_id
    }

    /// 周期开始时采集的统一时间戳（毫秒）。
    pub fn ts_ms(&self) -> i64 {
        self.ts_ms
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn get(&self, channel: &str) -> Option<&Reading> {
        self.readings.iter().find(|reading| reading.channel == channel)
    }

    pub fn no_data_count(&self) -> usize {
        self.readings
            .iter()
            .filter(|reading| reading.value.is_no_data())
            .count()
    }
}
