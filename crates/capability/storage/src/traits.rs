//! 存储接口 Trait 定义
//!
//! 入库引擎只依赖这里的窄接口，不假设任何查询语言：
//! - GatewayStore：网关查找与登记
//! - ModuleStore：传感器模块查找与登记
//! - MeasurementStore：测量值存在性检查与条件写入
//!
//! 设计原则：
//! - `create_*` 由唯一约束保证至多一个调用方成功，其余返回 Conflict
//! - `insert_measurement` 对五元组原子：重复写入报告 Duplicate 而不是错误
//! - 使用 async_trait 支持动态分发

use crate::error::StorageError;
use crate::models::{
    GatewayRecord, InsertOutcome, MeasurementRecord, ModuleRecord, NewMeasurement,
};
use async_trait::async_trait;

/// 网关存储接口
#[async_trait]
pub trait GatewayStore: Send + Sync {
    /// 按硬件地址查找网关
    async fn find_gateway(&self, uuid: &str) -> Result<Option<GatewayRecord>, StorageError>;

    /// 登记未认领网关；地址已存在时返回 Conflict
    async fn create_gateway(&self, uuid: &str) -> Result<GatewayRecord, StorageError>;

    /// 列出全部网关（按 id 升序）
    async fn list_gateways(&self) -> Result<Vec<GatewayRecord>, StorageError>;
}

/// 传感器模块存储接口
#[async_trait]
pub trait ModuleStore: Send + Sync {
    /// 按硬件地址查找模块
    async fn find_module(&self, uuid: &str) -> Result<Option<ModuleRecord>, StorageError>;

    /// 登记未认领模块（无位置、无名称）；地址已存在时返回 Conflict
    async fn create_module(&self, uuid: &str) -> Result<ModuleRecord, StorageError>;

    /// 列出全部模块（按 id 升序）
    async fn list_modules(&self) -> Result<Vec<ModuleRecord>, StorageError>;
}

/// 测量值存储接口
#[async_trait]
pub trait MeasurementStore: Send + Sync {
    /// 五元组是否已存在
    async fn measurement_exists(&self, measurement: &NewMeasurement) -> Result<bool, StorageError>;

    /// 条件写入：同一五元组只会落库一次
    async fn insert_measurement(
        &self,
        measurement: &NewMeasurement,
    ) -> Result<InsertOutcome, StorageError>;

    /// 列出模块最近的测量值（按时间倒序）
    async fn list_measurements(
        &self,
        module_id: i64,
        limit: i64,
    ) -> Result<Vec<MeasurementRecord>, StorageError>;
}
