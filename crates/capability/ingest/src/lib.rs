//! 采集源：把外部输入变成 [`RawDelivery`] 交给处理器。
//!
//! - [`MqttSource`]：订阅 `<prefix>/#`，主题第二、三段为网关与模块身份
//! - [`FileLogSource`]：回放十六进制日志抓包，每个文件一次投递
//!
//! 两者都在投递之间检查停机信号，不会跨停机边界读取半条消息。

mod file_log;
mod mqtt;

use async_trait::async_trait;
use domain::RawDelivery;
use std::sync::Arc;
use tokio::sync::watch;

pub use file_log::{FileLogSource, FileLogSourceConfig, normalize_hex_log};
pub use mqtt::{MqttSource, MqttSourceConfig};

/// 采集错误。
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("handler error: {0}")]
    Handler(String),
    #[error("source error: {0}")]
    Source(String),
    #[error("invalid hex payload: {0}")]
    InvalidHex(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 原始投递处理器。
#[async_trait]
pub trait RawDeliveryHandler: Send + Sync {
    async fn handle(&self, delivery: RawDelivery) -> Result<(), IngestError>;
}

/// 采集源抽象。
///
/// `shutdown` 变为 `true`（或发送端关闭）后，源在当前投递处理完后返回。
#[async_trait]
pub trait Source: Send + Sync {
    async fn run(
        &self,
        handler: Arc<dyn RawDeliveryHandler>,
        shutdown: watch::Receiver<bool>,
    ) -> Result<(), IngestError>;
}

fn stop_requested(shutdown: &watch::Receiver<bool>) -> bool {
    *shutdown.borrow()
}
