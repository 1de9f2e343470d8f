//! Postgres 测量值存储实现

use crate::error::StorageError;
use crate::models::{InsertOutcome, MeasurementRecord, NewMeasurement};
use crate::traits::MeasurementStore;
use sqlx::{PgPool, Row};

pub struct PgMeasurementStore {
    pub pool: PgPool,
}

impl PgMeasurementStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MeasurementStore for PgMeasurementStore {
    async fn measurement_exists(&self, measurement: &NewMeasurement) -> Result<bool, StorageError> {
        let row = sqlx::query(
            "select exists( \
               select 1 from sensor_measurements \
               where ts = to_timestamp($1 / 1000.0) \
               and sensor_module_id = $2 \
               and sensor_type_id = $3 \
               and gateway_id = $4 \
               and value = $5 \
             ) as found",
        )
        .bind(measurement.ts_ms as f64)
        .bind(measurement.module_id)
        .bind(i16::from(measurement.sensor_type))
        .bind(measurement.gateway_id)
        .bind(measurement.value)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get("found")?)
    }

    /// 依赖 `uq_sensor_measurements_tuple`：重复五元组影响 0 行
    async fn insert_measurement(
        &self,
        measurement: &NewMeasurement,
    ) -> Result<InsertOutcome, StorageError> {
        let result = sqlx::query(
            "insert into sensor_measurements \
             (ts, sensor_module_id, sensor_type_id, gateway_id, value) \
             values (to_timestamp($1 / 1000.0), $2, $3, $4, $5) \
             on conflict on constraint uq_sensor_measurements_tuple do nothing",
        )
        .bind(measurement.ts_ms as f64)
        .bind(measurement.module_id)
        .bind(i16::from(measurement.sensor_type))
        .bind(measurement.gateway_id)
        .bind(measurement.value)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            Ok(InsertOutcome::Duplicate)
        } else {
            Ok(InsertOutcome::Inserted)
        }
    }

    async fn list_measurements(
        &self,
        module_id: i64,
        limit: i64,
    ) -> Result<Vec<MeasurementRecord>, StorageError> {
        let rows = sqlx::query(
            "select id, (extract(epoch from ts) * 1000)::bigint as ts_ms, \
             sensor_module_id, sensor_type_id, gateway_id, value \
             from sensor_measurements \
             where sensor_module_id = $1 \
             order by ts desc, id desc \
             limit $2",
        )
        .bind(module_id)
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let sensor_type: i16 = row.try_get("sensor_type_id")?;
            let sensor_type = u8::try_from(sensor_type)
                .map_err(|_| StorageError::new(format!("sensor_type_id out of range: {sensor_type}")))?;
            items.push(MeasurementRecord {
                id: row.try_get("id")?,
                ts_ms: row.try_get("ts_ms")?,
                module_id: row.try_get("sensor_module_id")?,
                sensor_type,
                gateway_id: row.try_get("gateway_id")?,
                value: row.try_get("value")?,
            });
        }
        Ok(items)
    }
}
