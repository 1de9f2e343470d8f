//! Postgres 传感器模块存储实现

use crate::error::StorageError;
use crate::models::ModuleRecord;
use crate::traits::ModuleStore;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

pub struct PgModuleStore {
    pub pool: PgPool,
}

impl PgModuleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn module_from_row(row: &PgRow) -> Result<ModuleRecord, StorageError> {
    Ok(ModuleRecord {
        id: row.try_get("id")?,
        uuid: row.try_get("uuid")?,
        location_id: row.try_get("location_id")?,
        friendly_name: row.try_get("friendly_name")?,
    })
}

#[async_trait::async_trait]
impl ModuleStore for PgModuleStore {
    async fn find_module(&self, uuid: &str) -> Result<Option<ModuleRecord>, StorageError> {
        let row = sqlx::query(
            "select id, uuid, location_id, friendly_name from sensor_modules where uuid = $1",
        )
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(module_from_row(&row)?))
    }

    async fn create_module(&self, uuid: &str) -> Result<ModuleRecord, StorageError> {
        let row = sqlx::query(
            "insert into sensor_modules (uuid) values ($1) \
             returning id, uuid, location_id, friendly_name",
        )
        .bind(uuid)
        .fetch_one(&self.pool)
        .await?;
        module_from_row(&row)
    }

    async fn list_modules(&self) -> Result<Vec<ModuleRecord>, StorageError> {
        let rows = sqlx::query(
            "select id, uuid, location_id, friendly_name from sensor_modules order by id",
        )
        .fetch_all(&self.pool)
        .await?;
        let mut modules = Vec::with_capacity(rows.len());
        for row in rows {
            modules.push(module_from_row(&row)?);
        }
        Ok(modules)
    }
}
