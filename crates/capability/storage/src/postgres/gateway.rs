//! Postgres 网关存储实现

use crate::error::StorageError;
use crate::models::GatewayRecord;
use crate::traits::GatewayStore;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

pub struct PgGatewayStore {
    pub pool: PgPool,
}

impl PgGatewayStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn gateway_from_row(row: &PgRow) -> Result<GatewayRecord, StorageError> {
    Ok(GatewayRecord {
        id: row.try_get("id")?,
        uuid: row.try_get("uuid")?,
        location_id: row.try_get("location_id")?,
        friendly_name: row.try_get("friendly_name")?,
    })
}

#[async_trait::async_trait]
impl GatewayStore for PgGatewayStore {
    async fn find_gateway(&self, uuid: &str) -> Result<Option<GatewayRecord>, StorageError> {
        let row = sqlx::query(
            "select id, uuid, location_id, friendly_name from gateways where uuid = $1",
        )
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(gateway_from_row(&row)?))
    }

    /// 唯一约束冲突经 `From<sqlx::Error>` 转为 Conflict
    async fn create_gateway(&self, uuid: &str) -> Result<GatewayRecord, StorageError> {
        let row = sqlx::query(
            "insert into gateways (uuid) values ($1) \
             returning id, uuid, location_id, friendly_name",
        )
        .bind(uuid)
        .fetch_one(&self.pool)
        .await?;
        gateway_from_row(&row)
    }

    async fn list_gateways(&self) -> Result<Vec<GatewayRecord>, StorageError> {
        let rows = sqlx::query(
            "select id, uuid, location_id, friendly_name from gateways order by id",
        )
        .fetch_all(&self.pool)
        .await?;
        let mut gateways = Vec::with_capacity(rows.len());
        for row in rows {
            gateways.push(gateway_from_row(&row)?);
        }
        Ok(gateways)
    }
}
