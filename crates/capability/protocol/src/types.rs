//! 寄存器编码

use crate::error::ProtocolError;
use serde::{Deserialize, Serialize};

/// 寄存器数据格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegisterFormat {
    /// 16位有符号整数（补码写入）
    #[default]
    Int16,
    /// 16位无符号整数
    Uint16,
}

/// 四舍五入（.5 向正无穷方向进位）
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// 按缩放系数把读数编码为寄存器字。
///
/// 例如 `12.345 * 100` → `1235`。
pub fn encode_register(
    value: f64,
    scale_factor: f64,
    format: RegisterFormat,
) -> Result<u16, ProtocolError> {
    let scaled = round_half_up(value * scale_factor);
    if !scaled.is_finite() {
        return Err(ProtocolError::OutOfRange(format!("{} x {}", value, scale_factor)));
    }
    match format {
        RegisterFormat::Int16 => {
            if scaled < f64::from(i16::MIN) || scaled > f64::from(i16::MAX) {
                return Err(ProtocolError::OutOfRange(format!("{} does not fit int16", scaled)));
            }
            Ok(scaled as i16 as u16)
        }
        RegisterFormat::Uint16 => {
            if scaled < 0.0 || scaled > f64::from(u16::MAX) {
                return Err(ProtocolError::OutOfRange(format!("{} does not fit uint16", scaled)));
            }
            Ok(scaled as u16)
        }
    }
}
