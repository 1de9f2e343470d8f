//! 测量值内存存储实现
//!
//! 存在性检查与写入在同一把写锁内完成，并发写入同一五元组只有一个成功。

use crate::error::StorageError;
use crate::models::{InsertOutcome, MeasurementRecord, NewMeasurement};
use crate::traits::MeasurementStore;
use std::collections::HashSet;
use std::sync::RwLock;

/// 去重键：浮点值按位比较
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct MeasurementKey {
    ts_ms: i64,
    module_id: i64,
    sensor_type: u8,
    gateway_id: i64,
    value_bits: u32,
}

impl From<&NewMeasurement> for MeasurementKey {
    fn from(m: &NewMeasurement) -> Self {
        Self {
            ts_ms: m.ts_ms,
            module_id: m.module_id,
            sensor_type: m.sensor_type,
            gateway_id: m.gateway_id,
            value_bits: m.value.to_bits(),
        }
    }
}

struct MeasurementState {
    keys: HashSet<MeasurementKey>,
    rows: Vec<MeasurementRecord>,
}

/// 测量值内存存储
pub struct InMemoryMeasurementStore {
    state: RwLock<MeasurementState>,
}

impl InMemoryMeasurementStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MeasurementState {
                keys: HashSet::new(),
                rows: Vec::new(),
            }),
        }
    }

    /// 当前落库的测量值数量（用于测试）
    pub fn len(&self) -> usize {
        self.state.read().map(|s| s.rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryMeasurementStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl MeasurementStore for InMemoryMeasurementStore {
    async fn measurement_exists(&self, measurement: &NewMeasurement) -> Result<bool, StorageError> {
        let state = self
            .state
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(state.keys.contains(&MeasurementKey::from(measurement)))
    }

    async fn insert_measurement(
        &self,
        measurement: &NewMeasurement,
    ) -> Result<InsertOutcome, StorageError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        if !state.keys.insert(MeasurementKey::from(measurement)) {
            return Ok(InsertOutcome::Duplicate);
        }
        let id = state.rows.len() as i64 + 1;
        state.rows.push(MeasurementRecord {
            id,
            ts_ms: measurement.ts_ms,
            module_id: measurement.module_id,
            sensor_type: measurement.sensor_type,
            gateway_id: measurement.gateway_id,
            value: measurement.value,
        });
        Ok(InsertOutcome::Inserted)
    }

    async fn list_measurements(
        &self,
        module_id: i64,
        limit: i64,
    ) -> Result<Vec<MeasurementRecord>, StorageError> {
        let state = self
            .state
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        let mut selected: Vec<MeasurementRecord> = state
            .rows
            .iter()
            .filter(|row| row.module_id == module_id)
            .cloned()
            .collect();
        selected.sort_by(|a, b| b.ts_ms.cmp(&a.ts_ms).then(b.id.cmp(&a.id)));
        if limit > 0 {
            selected.truncate(limit as usize);
        }
        Ok(selected)
    }
}
