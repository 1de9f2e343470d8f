use crate::{IngestError, RawDeliveryHandler, Source, stop_requested};
use async_trait::async_trait;
use domain::{DeliveryIdentity, RawDelivery, now_epoch_ms};
use mms_telemetry::new_delivery_id;
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// MQTT 采集源配置。
#[derive(Debug, Clone)]
pub struct MqttSourceConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub topic_prefix: String,
    pub client_id: String,
}

/// MQTT 采集源
///
/// 每条 publish 即一次投递；连接错误只记录并等待 rumqttc 重连。
#[derive(Debug, Clone)]
pub struct MqttSource {
    config: MqttSourceConfig,
}

impl MqttSource {
    pub fn new(config: MqttSourceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MqttSourceConfig {
        &self.config
    }

    fn subscription(&self) -> String {
        let prefix = self.config.topic_prefix.trim_matches('/');
        if prefix.is_empty() {
            "#".to_string()
        } else {
            format!("{prefix}/#")
        }
    }
}

#[async_trait]
impl Source for MqttSource {
    async fn run(
        &self,
        handler: Arc<dyn RawDeliveryHandler>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), IngestError> {
        let client_id = format!("{}-{}", self.config.client_id, now_epoch_ms());
        let mut options = MqttOptions::new(client_id, self.config.host.clone(), self.config.port);
        options.set_keep_alive(Duration::from_secs(30));
        if let (Some(username), Some(password)) =
            (self.config.username.as_ref(), self.config.password.as_ref())
        {
            options.set_credentials(username, password);
        }

        let (client, mut eventloop) = AsyncClient::new(options, 10);
        let topic = self.subscription();

        while !stop_requested(&shutdown) {
            let event = tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
                event = eventloop.poll() => event,
            };
            match event {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    // clean session 下重连会丢失订阅
                    client
                        .try_subscribe(topic.clone(), QoS::AtMostOnce)
                        .map_err(|err| IngestError::Source(err.to_string()))?;
                    info!(
                        target: "mms.ingest",
                        host = %self.config.host,
                        port = self.config.port,
                        topic = %topic,
                        "mqtt_subscribed"
                    );
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    let Some((gateway, module)) =
                        extract_identities(&self.config.topic_prefix, &publish.topic)
                    else {
                        warn!(target: "mms.ingest", topic = %publish.topic, "mqtt_topic_skipped");
                        continue;
                    };
                    let delivery = RawDelivery {
                        delivery_id: new_delivery_id(),
                        origin: publish.topic.clone(),
                        identity: DeliveryIdentity::Topic { gateway, module },
                        payload: publish.payload.to_vec(),
                        received_at_ms: now_epoch_ms(),
                    };
                    if let Err(err) = handler.handle(delivery).await {
                        warn!(target: "mms.ingest", topic = %publish.topic, error = %err, "delivery_handler_failed");
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(target: "mms.ingest", error = %err, "mqtt_connection_error");
                    tokio::select! {
                        _ = shutdown.changed() => {}
                        _ = tokio::time::sleep(RECONNECT_DELAY) => {}
                    }
                }
            }
        }
        let _ = client.try_disconnect();
        info!(target: "mms.ingest", "mqtt_source_stopped");
        Ok(())
    }
}

/// 从 `<prefix>/<gateway>/<module>[/...]` 中取出网关与模块身份。
fn extract_identities(prefix: &str, topic: &str) -> Option<(String, String)> {
    let prefix = prefix.trim_matches('/');
    let topic = topic.trim_matches('/');
    let rest = if prefix.is_empty() {
        topic
    } else {
        topic.strip_prefix(prefix)?.strip_prefix('/')?
    };
    let mut parts = rest.split('/');
    let gateway = parts.next().filter(|part| !part.is_empty())?;
    let module = parts.next().filter(|part| !part.is_empty())?;
    Some((gateway.to_string(), module.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_identities_reads_gateway_then_module() {
        let identities = extract_identities("fornalab", "fornalab/F4:CF:A2:BD:1F:B8/A0:B7:65:4C:2E:10");
        assert_eq!(
            identities,
            Some((
                "F4:CF:A2:BD:1F:B8".to_string(),
                "A0:B7:65:4C:2E:10".to_string()
            ))
        );
    }

    #[test]
    fn extract_identities_tolerates_slashes_and_extra_segments() {
        let identities = extract_identities("/fornalab/", "fornalab/gw-1/node-7/raw");
        assert_eq!(
            identities,
            Some(("gw-1".to_string(), "node-7".to_string()))
        );
    }

    #[test]
    fn extract_identities_rejects_foreign_or_short_topics() {
        assert_eq!(extract_identities("fornalab", "other/gw/node"), None);
        assert_eq!(extract_identities("fornalab", "fornalabx/gw/node"), None);
        assert_eq!(extract_identities("fornalab", "fornalab/gw"), None);
        assert_eq!(extract_identities("fornalab", "fornalab//node"), None);
    }

    #[test]
    fn extract_identities_without_prefix() {
        assert_eq!(
            extract_identities("", "gw/node"),
            Some(("gw".to_string(), "node".to_string()))
        );
    }

    #[test]
    fn subscription_uses_prefix_wildcard() {
        let source = MqttSource::new(MqttSourceConfig {
            host: "127.0.0.1".to_string(),
            port: 1883,
            username: None,
            password: None,
            topic_prefix: "fornalab/".to_string(),
            client_id: "mms-ingest".to_string(),
        });
        assert_eq!(source.subscription(), "fornalab/#");
    }
}
