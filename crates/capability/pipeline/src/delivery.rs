use crate::engine::{EngineError, IngestEngine, IngestOutcome};
use domain::{DeliveryIdentity, Frame, RawDelivery, canonical_identity};
use mms_protocol::{FrameLayout, ReadoutGap, StreamEnd, classify, decode};
use std::sync::Arc;
use tracing::{debug, warn};

/// 一次投递的处理汇总。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub frames: usize,
    pub inserted: usize,
    pub duplicates: usize,
    /// NaN/无穷而丢弃的读数
    pub invalid: usize,
    /// 存储错误导致失败的读数
    pub failed: usize,
    pub end: StreamEnd,
}

impl DeliveryReport {
    fn new() -> Self {
        Self {
            frames: 0,
            inserted: 0,
            duplicates: 0,
            invalid: 0,
            failed: 0,
            end: StreamEnd::Clean,
        }
    }

    pub fn readouts(&self) -> usize {
        self.inserted + self.duplicates + self.invalid + self.failed
    }
}

/// 投递处理器
///
/// 日志回放（身份嵌在帧内）按带地址布局解码，模块与网关都取帧内节点地址；
/// MQTT 投递按主题身份、无地址布局解码，保留字节位置由配置决定。
/// 单条读数失败只影响该读数，处理继续。
#[derive(Clone)]
pub struct DeliveryProcessor {
    engine: Arc<IngestEngine>,
    mqtt_gap: ReadoutGap,
}

impl DeliveryProcessor {
    pub fn new(engine: Arc<IngestEngine>, mqtt_gap: ReadoutGap) -> Self {
        Self { engine, mqtt_gap }
    }

    pub fn engine(&self) -> &Arc<IngestEngine> {
        &self.engine
    }

    pub async fn process(&self, delivery: &RawDelivery) -> DeliveryReport {
        let mut report = DeliveryReport::new();
        match &delivery.identity {
            DeliveryIdentity::Topic { gateway, module } => {
                let gateway = canonical_identity(gateway);
                let module = canonical_identity(module);
                let mut frames = decode(&delivery.payload, FrameLayout::mqtt(self.mqtt_gap));
                for frame in frames.by_ref() {
                    report.frames += 1;
                    self.ingest_frame(delivery, &frame, &module, &gateway, &mut report)
                        .await;
                }
                report.end = frames.end().unwrap_or(StreamEnd::Clean);
            }
            DeliveryIdentity::Embedded => {
                let mut frames = decode(&delivery.payload, FrameLayout::file_log());
                for frame in frames.by_ref() {
                    report.frames += 1;
                    let Some(node) = frame.node else {
                        report.failed += frame.readout_count();
                        continue;
                    };
                    let identity = node.to_string();
                    self.ingest_frame(delivery, &frame, &identity, &identity, &mut report)
                        .await;
                }
                report.end = frames.end().unwrap_or(StreamEnd::Clean);
            }
        }
        if let StreamEnd::Truncated { offset, remaining } = report.end {
            warn!(
                target: "mms.ingest",
                delivery_id = %delivery.delivery_id,
                origin = %delivery.origin,
                offset = offset,
                remaining = remaining,
                "stream_truncated"
            );
        }
        report
    }

    async fn ingest_frame(
        &self,
        delivery: &RawDelivery,
        frame: &Frame,
        module: &str,
        gateway: &str,
        report: &mut DeliveryReport,
    ) {
        for readout in &frame.readouts {
            let result = self
                .engine
                .ingest(
                    module,
                    gateway,
                    readout.sensor_type,
                    readout.value,
                    Some(frame.source_ts),
                )
                .await;
            match result {
                Ok(IngestOutcome::Inserted) => {
                    report.inserted += 1;
                    debug!(
                        target: "mms.ingest",
                        delivery_id = %delivery.delivery_id,
                        module = %module,
                        gateway = %gateway,
                        sensor = %classify(readout.sensor_type),
                        value = readout.value,
                        source_ts = frame.source_ts,
                        "readout_ingested"
                    );
                }
                Ok(IngestOutcome::DuplicateSkipped) => {
                    report.duplicates += 1;
                    debug!(
                        target: "mms.ingest",
                        delivery_id = %delivery.delivery_id,
                        module = %module,
                        sensor = %classify(readout.sensor_type),
                        "readout_duplicate"
                    );
                }
                Err(EngineError::InvalidReading { sensor_type, value }) => {
                    report.invalid += 1;
                    warn!(
                        target: "mms.ingest",
                        delivery_id = %delivery.delivery_id,
                        module = %module,
                        sensor = %classify(sensor_type),
                        value = %value,
                        "readout_dropped"
                    );
                }
                Err(EngineError::Storage(err)) => {
                    report.failed += 1;
                    warn!(
                        target: "mms.ingest",
                        delivery_id = %delivery.delivery_id,
                        module = %module,
                        gateway = %gateway,
                        error = %err,
                        "readout_failed"
                    );
                }
            }
        }
    }
}
