//! 传感器类型分类
//!
//! 固定映射表覆盖已知硬件类型；未知编号回退为 `sensor-<id>`，对 0–255 全域有定义。

use std::borrow::Cow;

/// 已知的传感器类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    SoilMoisture,
    SoilTemperature,
    AirTemperature,
    RelativeHumidity,
    Light,
    CameraLink1,
    CameraLink2,
}

impl SensorKind {
    pub const ALL: [SensorKind; 7] = [
        Self::SoilMoisture,
        Self::SoilTemperature,
        Self::AirTemperature,
        Self::RelativeHumidity,
        Self::Light,
        Self::CameraLink1,
        Self::CameraLink2,
    ];

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            3 => Some(Self::SoilMoisture),
            4 => Some(Self::SoilTemperature),
            12 => Some(Self::AirTemperature),
            13 => Some(Self::RelativeHumidity),
            22 => Some(Self::Light),
            64 => Some(Self::CameraLink1),
            65 => Some(Self::CameraLink2),
            _ => None,
        }
    }

    pub fn id(self) -> u8 {
        match self {
            Self::SoilMoisture => 3,
            Self::SoilTemperature => 4,
            Self::AirTemperature => 12,
            Self::RelativeHumidity => 13,
            Self::Light => 22,
            Self::CameraLink1 => 64,
            Self::CameraLink2 => 65,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::SoilMoisture => "soil-moisture",
            Self::SoilTemperature => "soil-temperature",
            Self::AirTemperature => "air-temperature",
            Self::RelativeHumidity => "relative-humidity",
            Self::Light => "light",
            Self::CameraLink1 => "camera-link-1",
            Self::CameraLink2 => "camera-link-2",
        }
    }
}

/// 传感器类型编号 → 语义名称
pub fn classify(sensor_type: u8) -> Cow<'static, str> {
    match SensorKind::from_id(sensor_type) {
        Some(kind) => Cow::Borrowed(kind.name()),
        None => Cow::Owned(format!("sensor-{sensor_type}")),
    }
}
