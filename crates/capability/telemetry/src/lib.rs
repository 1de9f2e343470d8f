//! 追踪、计数指标与投递 ID 生成。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 基础指标快照。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub deliveries: u64,
    pub delivery_failures: u64,
    pub frames_decoded: u64,
    pub truncated_streams: u64,
    pub readouts_inserted: u64,
    pub readouts_duplicate: u64,
    pub readouts_invalid: u64,
    pub readouts_failed: u64,
    pub delivery_latency_ms_total: u64,
    pub delivery_latency_ms_count: u64,
}

/// 进程级计数指标。
pub struct TelemetryMetrics {
    deliveries: AtomicU64,
    delivery_failures: AtomicU64,
    frames_decoded: AtomicU64,
    truncated_streams: AtomicU64,
    readouts_inserted: AtomicU64,
    readouts_duplicate: AtomicU64,
    readouts_invalid: AtomicU64,
    readouts_failed: AtomicU64,
    delivery_latency_ms_total: AtomicU64,
    delivery_latency_ms_count: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            deliveries: AtomicU64::new(0),
            delivery_failures: AtomicU64::new(0),
            frames_decoded: AtomicU64::new(0),
            truncated_streams: AtomicU64::new(0),
            readouts_inserted: AtomicU64::new(0),
            readouts_duplicate: AtomicU64::new(0),
            readouts_invalid: AtomicU64::new(0),
            readouts_failed: AtomicU64::new(0),
            delivery_latency_ms_total: AtomicU64::new(0),
            delivery_latency_ms_count: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            deliveries: self.deliveries.load(Ordering::Relaxed),
            delivery_failures: self.delivery_failures.load(Ordering::Relaxed),
            frames_decoded: self.frames_decoded.load(Ordering::Relaxed),
            truncated_streams: self.truncated_streams.load(Ordering::Relaxed),
            readouts_inserted: self.readouts_inserted.load(Ordering::Relaxed),
            readouts_duplicate: self.readouts_duplicate.load(Ordering::Relaxed),
            readouts_invalid: self.readouts_invalid.load(Ordering::Relaxed),
            readouts_failed: self.readouts_failed.load(Ordering::Relaxed),
            delivery_latency_ms_total: self.delivery_latency_ms_total.load(Ordering::Relaxed),
            delivery_latency_ms_count: self.delivery_latency_ms_count.load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局指标实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 delivery_id，用于串联一次投递的全部日志。
pub fn new_delivery_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// 记录投递接收次数。
pub fn record_delivery() {
    metrics().deliveries.fetch_add(1, Ordering::Relaxed);
}

/// 记录至少有一条读数因存储错误失败的投递。
pub fn record_delivery_failure() {
    metrics().delivery_failures.fetch_add(1, Ordering::Relaxed);
}

/// 记录解出的帧数。
pub fn record_frames_decoded(count: u64) {
    metrics().frames_decoded.fetch_add(count, Ordering::Relaxed);
}

/// 记录以截断结束的字节流。
pub fn record_truncated_stream() {
    metrics().truncated_streams.fetch_add(1, Ordering::Relaxed);
}

/// 记录写入成功的读数条数。
pub fn record_readouts_inserted(count: u64) {
    metrics().readouts_inserted.fetch_add(count, Ordering::Relaxed);
}

/// 记录因重复而跳过的读数。
pub fn record_readouts_duplicate(count: u64) {
    metrics().readouts_duplicate.fetch_add(count, Ordering::Relaxed);
}

/// 记录因 NaN/无穷而丢弃的读数。
pub fn record_readouts_invalid(count: u64) {
    metrics().readouts_invalid.fetch_add(count, Ordering::Relaxed);
}

/// 记录因存储错误而失败的读数。
pub fn record_readouts_failed(count: u64) {
    metrics().readouts_failed.fetch_add(count, Ordering::Relaxed);
}

/// 记录整次投递的处理耗时（毫秒）。
pub fn record_delivery_latency_ms(latency_ms: u64) {
    let metrics = metrics();
    metrics
        .delivery_latency_ms_total
        .fetch_add(latency_ms, Ordering::Relaxed);
    metrics
        .delivery_latency_ms_count
        .fetch_add(1, Ordering::Relaxed);
}
