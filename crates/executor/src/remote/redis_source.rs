use async_trait::async_trait;
use common::config::RedisConfig;
use futures_util::StreamExt;
use redis::aio::PubSub;
use tracing::{debug, info, warn};
use url::Url;

use crate::traits::{ChannelEvent, SignalSource, SourceError};

/// Redis pub/sub subscription. Every `subscribe` opens a fresh connection, so
/// the same call serves both the first connect and reconnects.
pub struct RedisSignalSource {
    client: redis::Client,
    pubsub: Option<PubSub>,
    channel: Option<String>,
    pending_ack: Option<String>,
}

impl RedisSignalSource {
    pub fn new(config: &RedisConfig) -> anyhow::Result<Self> {
        let url = connection_url(config)?;
        info!(
            "Redis endpoint: {}:{} db={}",
            config.host, config.port, config.db
        );
        Ok(Self {
            client: redis::Client::open(url.as_str())?,
            pubsub: None,
            channel: None,
            pending_ack: None,
        })
    }
}

#[async_trait]
impl SignalSource for RedisSignalSource {
    async fn subscribe(&mut self, channel: &str) -> Result<(), SourceError> {
        // Drop any half-dead connection before dialing again.
        self.pubsub = None;

        let mut pubsub = self
            .client
            .get_async_pubsub()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        pubsub
            .subscribe(channel)
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        self.pubsub = Some(pubsub);
        self.channel = Some(channel.to_string());
        self.pending_ack = Some(channel.to_string());
        Ok(())
    }

    async fn next_event(&mut self) -> Result<ChannelEvent, SourceError> {
        if let Some(channel) = self.pending_ack.take() {
            return Ok(ChannelEvent::Subscribed(channel));
        }

        let pubsub = self
            .pubsub
            .as_mut()
            .ok_or_else(|| SourceError::Transport("not connected".to_string()))?;

        let next = {
            let stream = pubsub.on_message();
            tokio::pin!(stream);
            stream.next().await
        };
        match next {
            Some(msg) => {
                debug!("Message on {}", msg.get_channel_name());
                msg.get_payload::<String>()
                    .map(ChannelEvent::Message)
                    .map_err(|e| SourceError::Payload(e.to_string()))
            }
            None => {
                self.pubsub = None;
                Err(SourceError::Transport("connection closed".to_string()))
            }
        }
    }

    async fn close(&mut self) {
        if let Some(mut pubsub) = self.pubsub.take() {
            if let Some(channel) = self.channel.as_deref() {
                if let Err(e) = pubsub.unsubscribe(channel).await {
                    warn!("Failed to unsubscribe from {}: {}", channel, e);
                }
            }
        }
        info!("Redis connection released");
    }
}

/// `redis://[:password@]host:port/db`, with the password percent-encoded.
fn connection_url(config: &RedisConfig) -> anyhow::Result<Url> {
    let mut url = Url::parse(&format!(
        "redis://{}:{}/{}",
        config.host, config.port, config.db
    ))?;
    if let Some(password) = config.password.as_deref() {
        url.set_password(Some(password))
            .map_err(|_| anyhow::anyhow!("Cannot set password on redis url"))?;
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_without_password() {
        let url = connection_url(&RedisConfig::default()).unwrap();
        assert_eq!(url.as_str(), "redis://localhost:6379/0");
    }

    #[test]
    fn test_url_password_is_encoded() {
        let config = RedisConfig {
            host: "10.0.0.5".to_string(),
            port: 6380,
            password: Some("p@ss:word".to_string()),
            db: 3,
            channel: "signals".to_string(),
        };

        let url = connection_url(&config).unwrap();
        assert_eq!(url.as_str(), "redis://:p%40ss%3Aword@10.0.0.5:6380/3");
    }

    #[tokio::test]
    async fn test_next_event_before_subscribe_is_transport_error() {
        let mut source = RedisSignalSource::new(&RedisConfig::default()).unwrap();
        let err = source.next_event().await.unwrap_err();
        assert!(matches!(err, SourceError::Transport(_)));
    }
}
