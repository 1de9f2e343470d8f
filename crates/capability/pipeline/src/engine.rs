use domain::{Readout, now_epoch_ms};
use mms_storage::{InsertOutcome, NewMeasurement, StorageError, StorageHandle};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

/// 单条读数的入库结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Inserted,
    /// 同一五元组已存在（重投），不是错误。
    DuplicateSkipped,
}

/// 入库引擎错误。
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid reading: sensor_type={sensor_type} value={value}")]
    InvalidReading { sensor_type: u8, value: f32 },
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// 引擎参数。
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// 单次存储调用的最长等待。
    pub storage_timeout: Duration,
    /// 登记冲突后重新解析的最多轮数。
    pub provision_attempts: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            storage_timeout: Duration::from_millis(5_000),
            provision_attempts: 3,
        }
    }
}

/// 入库引擎
///
/// 持有显式传入的存储句柄；可被多个采集源并发共享（`Arc<IngestEngine>`）。
pub struct IngestEngine {
    storage: StorageHandle,
    config: EngineConfig,
}

impl IngestEngine {
    pub fn new(storage: StorageHandle) -> Self {
        Self::with_config(storage, EngineConfig::default())
    }

    pub fn with_config(storage: StorageHandle, mut config: EngineConfig) -> Self {
        if config.provision_attempts == 0 {
            config.provision_attempts = 1;
        }
        Self { storage, config }
    }

    pub fn storage(&self) -> &StorageHandle {
        &self.storage
    }

    /// 入库一条读数。
    ///
    /// `source_ts` 为节点上报的 Unix 秒，原样入库（包括 0）；缺失时以当前时间代替。
    /// NaN/无穷值返回 [`EngineError::InvalidReading`]，不触碰存储。
    pub async fn ingest(
        &self,
        module: &str,
        gateway: &str,
        sensor_type: u8,
        value: f32,
        source_ts: Option<u32>,
    ) -> Result<IngestOutcome, EngineError> {
        if !Readout::new(sensor_type, value).is_persistable() {
            return Err(EngineError::InvalidReading { sensor_type, value });
        }
        let gateway_id = self.resolve_gateway(gateway).await?;
        let module_id = self.resolve_module(module).await?;
        let measurement = NewMeasurement {
            ts_ms: resolve_ts_ms(source_ts),
            module_id,
            sensor_type,
            gateway_id,
            value: normalize_value(value),
        };

        let exists = self
            .bounded(
                "measurement_exists",
                self.storage.measurements.measurement_exists(&measurement),
            )
            .await?;
        if exists {
            return Ok(IngestOutcome::DuplicateSkipped);
        }
        let outcome = self
            .bounded(
                "insert_measurement",
                self.storage.measurements.insert_measurement(&measurement),
            )
            .await?;
        Ok(match outcome {
            InsertOutcome::Inserted => IngestOutcome::Inserted,
            InsertOutcome::Duplicate => IngestOutcome::DuplicateSkipped,
        })
    }

    async fn resolve_gateway(&self, uuid: &str) -> Result<i64, StorageError> {
        for _ in 0..self.config.provision_attempts {
            let found = self
                .bounded("find_gateway", self.storage.gateways.find_gateway(uuid))
                .await?;
            if let Some(gateway) = found {
                return Ok(gateway.id);
            }
            match self
                .bounded("create_gateway", self.storage.gateways.create_gateway(uuid))
                .await
            {
                Ok(gateway) => {
                    info!(
                        target: "mms.ingest",
                        gateway = %uuid,
                        gateway_id = gateway.id,
                        "gateway_provisioned"
                    );
                    return Ok(gateway.id);
                }
                Err(err) if err.is_conflict() => {
                    debug!(target: "mms.ingest", gateway = %uuid, "gateway_provision_conflict");
                }
                Err(err) => return Err(err),
            }
        }
        Err(StorageError::conflict(format!(
            "gateway {uuid} unresolved after provisioning conflicts"
        )))
    }

    async fn resolve_module(&self, uuid: &str) -> Result<i64, StorageError> {
        for _ in 0..self.config.provision_attempts {
            let found = self
                .bounded("find_module", self.storage.modules.find_module(uuid))
                .await?;
            if let Some(module) = found {
                return Ok(module.id);
            }
            match self
                .bounded("create_module", self.storage.modules.create_module(uuid))
                .await
            {
                Ok(module) => {
                    info!(
                        target: "mms.ingest",
                        module = %uuid,
                        module_id = module.id,
                        "module_provisioned"
                    );
                    return Ok(module.id);
                }
                Err(err) if err.is_conflict() => {
                    debug!(target: "mms.ingest", module = %uuid, "module_provision_conflict");
                }
                Err(err) => return Err(err),
            }
        }
        Err(StorageError::conflict(format!(
            "module {uuid} unresolved after provisioning conflicts"
        )))
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, StorageError>>,
    ) -> Result<T, StorageError> {
        match tokio::time::timeout(self.config.storage_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(StorageError::timeout(format!(
                "{operation} exceeded {}ms",
                self.config.storage_timeout.as_millis()
            ))),
        }
    }
}

fn resolve_ts_ms(source_ts: Option<u32>) -> i64 {
    match source_ts {
        Some(secs) => i64::from(secs) * 1000,
        None => now_epoch_ms(),
    }
}

// -0.0 与 0.0 视为同一个值
fn normalize_value(value: f32) -> f32 {
    if value == 0.0 { 0.0 } else { value }
}
