//! 数据库连接管理
//!
//! 提供数据库连接池初始化功能：
//! - connect_pool：建立 Postgres 连接池
//!
//! 设计原则：
//! - 获取连接有上限等待时间，连接池耗尽时以 Timeout 错误返回而不是无限挂起

use crate::error::StorageError;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

/// 连接池参数
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 8,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// 建立 Postgres 连接池
///
/// # 参数
/// - `database_url`：Postgres 连接字符串
/// - `settings`：最大连接数与获取连接的等待上限
pub async fn connect_pool(
    database_url: &str,
    settings: &PoolSettings,
) -> Result<PgPool, StorageError> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout)
        .connect(database_url)
        .await?;
    Ok(pool)
}
