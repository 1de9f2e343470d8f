//! 协议错误类型定义
//!
//! 解码路径不产生错误：截断由 [`crate::StreamEnd`] 表达。
//! 这里的错误只来自编码与配置解析。

/// 协议错误
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// 单帧读数超过 1 字节计数上限
    #[error("too many readouts in one frame: {0} (max 255)")]
    TooManyReadouts(usize),

    /// 日志抓包格式要求帧携带节点地址
    #[error("frame has no node address but layout requires one")]
    MissingNodeAddress,

    /// 未知的读数间隔配置
    #[error("invalid readout gap: {0}")]
    InvalidReadoutGap(String),
}
