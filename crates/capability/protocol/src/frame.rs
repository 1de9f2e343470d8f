//! 帧语法定义
//!
//! 一条记录的线上布局（多字节整数均为小端）：
//!
//! ```text
//! [6 字节节点地址]            仅日志抓包格式
//! [4 字节无符号时间戳]
//! [1 字节读数个数 N]
//! [1 字节保留]                仅 ReadoutGap::AfterCount
//! N × { [1 字节传感器类型] [1 字节保留: 仅 AfterSensorType] [4 字节 IEEE-754 float] }
//! ```

use crate::error::ProtocolError;
use domain::NodeAddress;
use std::str::FromStr;

/// 时间戳字段长度
pub const TIMESTAMP_LEN: usize = 4;
/// 读数个数字段长度
pub const COUNT_LEN: usize = 1;
/// 传感器类型字段长度
pub const SENSOR_TYPE_LEN: usize = 1;
/// 读数值字段长度
pub const VALUE_LEN: usize = 4;
/// 保留字节长度
pub const GAP_LEN: usize = 1;
/// 单帧读数上限
pub const MAX_READOUTS: usize = u8::MAX as usize;

/// 节点身份来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeMode {
    /// 每帧以 6 字节节点地址开头（日志抓包）
    WithAddress,
    /// 身份由上下文（MQTT 主题）给出，帧内无地址
    AddressFromContext,
}

/// MQTT 格式中保留字节的位置
///
/// 已部署固件与历史解析脚本对该字节的位置并不一致，因此作为显式配置。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadoutGap {
    /// 无保留字节（日志抓包格式）
    None,
    /// 读数个数之后、第一条读数之前有 1 个保留字节
    AfterCount,
    /// 每条读数的类型字节与数值之间有 1 个保留字节
    AfterSensorType,
}

impl FromStr for ReadoutGap {
    type Err = ProtocolError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "after_count" => Ok(Self::AfterCount),
            "after_sensor_type" => Ok(Self::AfterSensorType),
            other => Err(ProtocolError::InvalidReadoutGap(other.to_string())),
        }
    }
}

/// 帧布局：身份来源 + 保留字节位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    pub mode: DecodeMode,
    pub gap: ReadoutGap,
}

impl FrameLayout {
    pub const fn new(mode: DecodeMode, gap: ReadoutGap) -> Self {
        Self { mode, gap }
    }

    /// 日志抓包格式：带地址、无保留字节
    pub const fn file_log() -> Self {
        Self::new(DecodeMode::WithAddress, ReadoutGap::None)
    }

    /// MQTT 格式：不带地址，保留字节位置由配置决定
    pub const fn mqtt(gap: ReadoutGap) -> Self {
        Self::new(DecodeMode::AddressFromContext, gap)
    }

    /// 读数区之前的字节数
    pub fn header_len(&self) -> usize {
        let address = match self.mode {
            DecodeMode::WithAddress => NodeAddress::LEN,
            DecodeMode::AddressFromContext => 0,
        };
        let gap = match self.gap {
            ReadoutGap::AfterCount => GAP_LEN,
            _ => 0,
        };
        address + TIMESTAMP_LEN + COUNT_LEN + gap
    }

    /// 单条读数的字节数
    pub fn readout_len(&self) -> usize {
        let gap = match self.gap {
            ReadoutGap::AfterSensorType => GAP_LEN,
            _ => 0,
        };
        SENSOR_TYPE_LEN + gap + VALUE_LEN
    }

    /// 含 `count` 条读数的整帧字节数
    pub fn frame_len(&self, count: usize) -> usize {
        self.header_len() + count * self.readout_len()
    }
}
