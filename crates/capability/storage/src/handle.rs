//! 存储句柄
//!
//! 进程启动时构造一次，显式传入入库引擎与采集源，不存在全局单例。

use crate::connection::{PoolSettings, connect_pool};
use crate::error::StorageError;
use crate::in_memory::{InMemoryGatewayStore, InMemoryMeasurementStore, InMemoryModuleStore};
use crate::postgres::{PgGatewayStore, PgMeasurementStore, PgModuleStore};
use crate::traits::{GatewayStore, MeasurementStore, ModuleStore};
use std::sync::Arc;

/// 三类存储的组合句柄
#[derive(Clone)]
pub struct StorageHandle {
    pub gateways: Arc<dyn GatewayStore>,
    pub modules: Arc<dyn ModuleStore>,
    pub measurements: Arc<dyn MeasurementStore>,
}

impl StorageHandle {
    pub fn new(
        gateways: Arc<dyn GatewayStore>,
        modules: Arc<dyn ModuleStore>,
        measurements: Arc<dyn MeasurementStore>,
    ) -> Self {
        Self {
            gateways,
            modules,
            measurements,
        }
    }

    /// 内存存储（测试与本地演示）
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryGatewayStore::new()),
            Arc::new(InMemoryModuleStore::new()),
            Arc::new(InMemoryMeasurementStore::new()),
        )
    }

    /// PostgreSQL 存储，三类存储共享同一个连接池
    pub async fn connect_postgres(
        database_url: &str,
        settings: &PoolSettings,
    ) -> Result<Self, StorageError> {
        let pool = connect_pool(database_url, settings).await?;
        Ok(Self::new(
            Arc::new(PgGatewayStore::new(pool.clone())),
            Arc::new(PgModuleStore::new(pool.clone())),
            Arc::new(PgMeasurementStore::new(pool)),
        ))
    }
}
