//! 内存存储实现模块
//!
//! 用于测试和本地演示。唯一性在同一把写锁内检查并写入，
//! 与数据库唯一约束的语义一致。
//!
//! 包含以下实现：
//! - GatewayStore: InMemoryGatewayStore
//! - ModuleStore: InMemoryModuleStore
//! - MeasurementStore: InMemoryMeasurementStore

pub mod gateway;
pub mod measurement;
pub mod module;

mod identity;

pub use gateway::*;
pub use measurement::*;
pub use module::*;
