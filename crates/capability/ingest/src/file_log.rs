use crate::{IngestError, RawDeliveryHandler, Source, stop_requested};
use async_trait::async_trait;
use domain::{DeliveryIdentity, RawDelivery, now_epoch_ms};
use mms_telemetry::new_delivery_id;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

/// 串口抓包日志中十六进制载荷前的固定标记。
pub const DEFAULT_MARKER: &str = "INFO b'";

/// 日志回放源配置。
#[derive(Debug, Clone)]
pub struct FileLogSourceConfig {
    pub paths: Vec<PathBuf>,
    /// 为空时整行都视为十六进制载荷。
    pub marker: String,
}

impl FileLogSourceConfig {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            marker: DEFAULT_MARKER.to_string(),
        }
    }
}

/// 十六进制日志回放源
///
/// 按顺序读取每个文件，规整为字节后作为一次身份内嵌的投递交给处理器。
/// 单个文件读取或规整失败只跳过该文件。
#[derive(Debug, Clone)]
pub struct FileLogSource {
    config: FileLogSourceConfig,
}

impl FileLogSource {
    pub fn new(config: FileLogSourceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FileLogSourceConfig {
        &self.config
    }

    async fn load(&self, path: &PathBuf) -> Result<Vec<u8>, IngestError> {
        let text = tokio::fs::read_to_string(path).await?;
        normalize_hex_log(&text, &self.config.marker)
    }
}

#[async_trait]
impl Source for FileLogSource {
    async fn run(
        &self,
        handler: Arc<dyn RawDeliveryHandler>,
        shutdown: watch::Receiver<bool>,
    ) -> Result<(), IngestError> {
        for path in &self.config.paths {
            if stop_requested(&shutdown) {
                info!(target: "mms.ingest", "file_log_replay_interrupted");
                break;
            }
            let payload = match self.load(path).await {
                Ok(payload) => payload,
                Err(err) => {
                    warn!(
                        target: "mms.ingest",
                        path = %path.display(),
                        error = %err,
                        "file_log_skipped"
                    );
                    continue;
                }
            };
            let delivery = RawDelivery {
                delivery_id: new_delivery_id(),
                origin: path.display().to_string(),
                identity: DeliveryIdentity::Embedded,
                payload,
                received_at_ms: now_epoch_ms(),
            };
            if let Err(err) = handler.handle(delivery).await {
                warn!(
                    target: "mms.ingest",
                    path = %path.display(),
                    error = %err,
                    "delivery_handler_failed"
                );
            }
        }
        Ok(())
    }
}

/// 把十六进制日志文本规整为原始字节。
///
/// 只取含 `marker` 的行（标记为空时取所有行）标记之后的部分，去掉抓包工具
/// 追加的 `\r\n'` 尾巴与全部空白后拼接解码。末尾落单的半个字节被丢弃，
/// 交由解码器按截断处理。
pub fn normalize_hex_log(text: &str, marker: &str) -> Result<Vec<u8>, IngestError> {
    let mut digits = String::with_capacity(text.len());
    for line in text.lines() {
        let segment = if marker.is_empty() {
            line
        } else {
            match line.find(marker) {
                Some(index) => &line[index + marker.len()..],
                None => continue,
            }
        };
        let segment = strip_capture_suffix(segment);
        digits.extend(segment.chars().filter(|c| !c.is_whitespace()));
    }
    if digits.len() % 2 == 1 {
        warn!(target: "mms.ingest", digits = digits.len(), "hex_log_odd_nibble_dropped");
        digits.pop();
    }
    hex::decode(&digits).map_err(|err| IngestError::InvalidHex(err.to_string()))
}

fn strip_capture_suffix(segment: &str) -> &str {
    let segment = segment.trim_end();
    let segment = segment.strip_suffix('\'').unwrap_or(segment);
    segment.strip_suffix("\\r\\n").unwrap_or(segment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_capture_suffix_removes_literal_crlf_and_quote() {
        assert_eq!(strip_capture_suffix("0a1b\\r\\n'"), "0a1b");
        assert_eq!(strip_capture_suffix("0a1b'  "), "0a1b");
        assert_eq!(strip_capture_suffix("0a1b"), "0a1b");
    }
}
