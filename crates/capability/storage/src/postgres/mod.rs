//! # PostgreSQL 存储实现模块
//!
//! 生产环境使用的存储实现，表结构见仓库根目录 `migrations/0001_init.sql`。
//!
//! ## 包含的实现
//!
//! - **GatewayStore** (`gateway.rs`)：`gateways` 表，`uuid` 唯一
//! - **ModuleStore** (`module.rs`)：`sensor_modules` 表，`uuid` 唯一
//! - **MeasurementStore** (`measurement.rs`)：`sensor_measurements` 表，
//!   五元组唯一约束 `uq_sensor_measurements_tuple`
//!
//! ## 并发语义
//!
//! - 登记网关/模块依赖唯一约束：并发首见同一地址时只有一条 insert 成功，
//!   失败方得到 `StorageErrorKind::Conflict`，由调用方重新查找
//! - 测量值写入使用 `on conflict do nothing`，检查与写入是同一条语句
//!
//! ## 安全考虑
//!
//! - 所有查询使用参数绑定（`$1`, `$2` 等），禁止字符串拼接构建 SQL

pub mod gateway;
pub mod measurement;
pub mod module;

pub use gateway::*;
pub use measurement::*;
pub use module::*;
