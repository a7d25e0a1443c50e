//! 协议错误类型定义

/// 协议通信错误
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// 连接错误
    #[error("connection error: {0}")]
    Connection(String),

    /// IO 错误
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Modbus 错误
    #[error("modbus error: {0}")]
    Modbus(String),

    /// 设备以异常码拒绝了本次请求（连接仍可用）
    #[error("device exception: {0}")]
    Exception(String),

    /// 配置解析错误
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// 数值无法编码为寄存器
    #[error("value out of register range: {0}")]
    OutOfRange(String),

    /// 超时错误
    #[error("timeout: {0}")]
    Timeout(String),
}

impl ProtocolError {
    /// 是否为传输层错误（连接已不可用，后续写入没有意义）
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::Io(_) | Self::Timeout(_) | Self::Modbus(_)
        )
    }
}
