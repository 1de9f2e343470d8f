//! 数据模型
//!
//! - 网关模型：GatewayRecord
//! - 传感器模块模型：ModuleRecord
//! - 测量值模型：NewMeasurement（待写入）、MeasurementRecord（已落库）
//! - 写入结果：InsertOutcome

/// 网关记录
///
/// 首次出现时自动登记，`location_id` 与 `friendly_name` 为空即"未认领"。
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayRecord {
    pub id: i64,
    /// 硬件地址（规范形式）
    pub uuid: String,
    pub location_id: Option<i64>,
    pub friendly_name: Option<String>,
}

impl GatewayRecord {
    pub fn is_claimed(&self) -> bool {
        self.location_id.is_some()
    }
}

/// 传感器模块记录
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleRecord {
    pub id: i64,
    /// 硬件地址（规范形式）
    pub uuid: String,
    pub location_id: Option<i64>,
    pub friendly_name: Option<String>,
}

impl ModuleRecord {
    pub fn is_claimed(&self) -> bool {
        self.location_id.is_some()
    }
}

/// 待写入的测量值
///
/// 五元组 (ts_ms, module_id, sensor_type, gateway_id, value) 即去重键。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewMeasurement {
    pub ts_ms: i64,
    pub module_id: i64,
    pub sensor_type: u8,
    pub gateway_id: i64,
    pub value: f32,
}

/// 已落库的测量值
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementRecord {
    pub id: i64,
    pub ts_ms: i64,
    pub module_id: i64,
    pub sensor_type: u8,
    pub gateway_id: i64,
    pub value: f32,
}

/// 条件写入结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// 同一五元组已存在，未写入
    Duplicate,
}
