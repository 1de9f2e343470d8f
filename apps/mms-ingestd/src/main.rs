//! 传感器遥测采集守护进程：MQTT 实时订阅与十六进制日志回放，写入测量库。

mod ingest;

use mms_config::{AppConfig, ConfigError, StorageBackend};
use mms_pipeline::{DeliveryProcessor, EngineConfig, IngestEngine};
use mms_storage::{PoolSettings, StorageHandle};
use mms_telemetry::{init_tracing, metrics};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 从环境变量加载运行配置
    let config = AppConfig::from_env()?;
    // 初始化结构化日志
    init_tracing();

    // 存储句柄在此构造一次，显式传入引擎
    let storage = match config.storage {
        StorageBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or_else(|| ConfigError::Missing("MMS_DATABASE_URL".to_string()))?;
            let settings = PoolSettings {
                max_connections: config.db_max_connections,
                acquire_timeout: config.storage_timeout,
            };
            // 需先执行 migrations/0001_init.sql
            StorageHandle::connect_postgres(database_url, &settings).await?
        }
        StorageBackend::Memory => {
            warn!(target: "mms.ingest", "storage_in_memory");
            StorageHandle::in_memory()
        }
    };

    let engine = Arc::new(IngestEngine::with_config(
        storage,
        EngineConfig {
            storage_timeout: config.storage_timeout,
            ..EngineConfig::default()
        },
    ));
    let processor = DeliveryProcessor::new(engine, config.mqtt_readout_gap);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut tasks = ingest::spawn_ingest(&config, processor, shutdown_rx);
    if tasks.is_empty() {
        warn!(target: "mms.ingest", "no_source_enabled");
        return Ok(());
    }

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            if let Err(err) = signal {
                warn!(target: "mms.ingest", error = %err, "signal_listener_failed");
            }
            info!(target: "mms.ingest", "shutdown_requested");
        }
        _ = drain(&mut tasks) => {}
    }
    // 源在当前投递处理完后返回
    let _ = shutdown_tx.send(true);
    drain(&mut tasks).await;

    info!(target: "mms.ingest", metrics = ?metrics().snapshot(), "ingest_stopped");
    Ok(())
}

async fn drain(tasks: &mut JoinSet<()>) {
    while let Some(joined) = tasks.join_next().await {
        if let Err(err) = joined {
            warn!(target: "mms.ingest", error = %err, "source_task_panicked");
        }
    }
}
