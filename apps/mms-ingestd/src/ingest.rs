//! 采集链路装配
//!
//! 把采集源（MQTT、日志回放）与投递处理器接在一起，并在每次投递后
//! 汇总计数指标与结构化日志。

use async_trait::async_trait;
use domain::RawDelivery;
use mms_config::AppConfig;
use mms_ingest::{
    FileLogSource, FileLogSourceConfig, IngestError, MqttSource, MqttSourceConfig,
    RawDeliveryHandler, Source,
};
use mms_pipeline::{DeliveryProcessor, DeliveryReport};
use mms_telemetry::{
    record_delivery, record_delivery_failure, record_delivery_latency_ms, record_frames_decoded,
    record_readouts_duplicate, record_readouts_failed, record_readouts_inserted,
    record_readouts_invalid, record_truncated_stream,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// 投递处理器
///
/// 单条读数的失败已在处理器内部隔离；存在存储失败时向采集源返回错误，
/// 由源记录后继续下一次投递。
struct ProcessingHandler {
    processor: DeliveryProcessor,
}

#[async_trait]
impl RawDeliveryHandler for ProcessingHandler {
    async fn handle(&self, delivery: RawDelivery) -> Result<(), IngestError> {
        record_delivery();
        info!(
            target: "mms.ingest",
            delivery_id = %delivery.delivery_id,
            origin = %delivery.origin,
            payload_size = delivery.payload.len(),
            received_at_ms = delivery.received_at_ms,
            "delivery_received"
        );

        let started_at = Instant::now();
        let report = self.processor.process(&delivery).await;
        record_delivery_latency_ms(started_at.elapsed().as_millis() as u64);
        record_report(&report);

        info!(
            target: "mms.ingest",
            delivery_id = %delivery.delivery_id,
            frames = report.frames,
            inserted = report.inserted,
            duplicates = report.duplicates,
            invalid = report.invalid,
            failed = report.failed,
            truncated = report.end.is_truncated(),
            "delivery_processed"
        );

        if report.failed > 0 {
            record_delivery_failure();
            return Err(IngestError::Handler(format!(
                "{} of {} readouts failed to persist",
                report.failed,
                report.readouts()
            )));
        }
        Ok(())
    }
}

fn record_report(report: &DeliveryReport) {
    record_frames_decoded(report.frames as u64);
    record_readouts_inserted(report.inserted as u64);
    record_readouts_duplicate(report.duplicates as u64);
    record_readouts_invalid(report.invalid as u64);
    record_readouts_failed(report.failed as u64);
    if report.end.is_truncated() {
        record_truncated_stream();
    }
}

/// 启动采集任务
///
/// 按配置启动日志回放与 MQTT 订阅，两者共享同一个处理器；
/// 返回的任务集合在停机信号后逐个结束。
pub fn spawn_ingest(
    config: &AppConfig,
    processor: DeliveryProcessor,
    shutdown: watch::Receiver<bool>,
) -> JoinSet<()> {
    let handler: Arc<dyn RawDeliveryHandler> = Arc::new(ProcessingHandler { processor });
    let mut sources: Vec<(&'static str, Arc<dyn Source>)> = Vec::new();

    if !config.file_logs.is_empty() {
        info!(
            target: "mms.ingest",
            files = config.file_logs.len(),
            marker = %config.file_log_marker,
            "source_file_log"
        );
        sources.push((
            "file_log",
            Arc::new(FileLogSource::new(FileLogSourceConfig {
                paths: config.file_logs.clone(),
                marker: config.file_log_marker.clone(),
            })),
        ));
    }

    if config.mqtt_enabled {
        let mqtt_config = MqttSourceConfig {
            host: config.mqtt_host.clone(),
            port: config.mqtt_port,
            username: config.mqtt_username.clone(),
            password: config.mqtt_password.clone(),
            topic_prefix: config.mqtt_topic_prefix.clone(),
            client_id: config.mqtt_client_id.clone(),
        };
        info!(
            target: "mms.ingest",
            host = %mqtt_config.host,
            port = mqtt_config.port,
            prefix = %mqtt_config.topic_prefix,
            readout_gap = ?config.mqtt_readout_gap,
            "source_mqtt"
        );
        sources.push(("mqtt", Arc::new(MqttSource::new(mqtt_config))));
    }

    let mut tasks = JoinSet::new();
    for (name, source) in sources {
        let handler = handler.clone();
        let shutdown = shutdown.clone();
        tasks.spawn(async move {
            if let Err(err) = source.run(handler, shutdown).await {
                warn!(target: "mms.ingest", source = name, error = %err, "source_stopped");
            }
        });
    }
    tasks
}
