use std::fmt;
use std::future::Future;
use std::time::Duration;

use anyhow::Context;
use common::config::ListenerConfig;
use common::models::OrderResult;
use tokio::time;
use tracing::{debug, error, info, warn};

use crate::services::signal_pipeline::{PipelineOutcome, SignalPipeline};
use crate::traits::{ChannelEvent, SignalSource, SourceError};

/// Counters for one run of the listener, logged on shutdown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListenerStats {
    pub received: u64,
    pub executed: u64,
    pub failed: u64,
    pub ignored: u64,
    pub rejected: u64,
    pub reconnects: u64,
}

impl fmt::Display for ListenerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "received={} executed={} failed={} ignored={} rejected={} reconnects={}",
            self.received, self.executed, self.failed, self.ignored, self.rejected, self.reconnects
        )
    }
}

/// Owns the channel subscription and feeds every message, one at a time and
/// in arrival order, through the signal pipeline.
pub struct SignalListener<S: SignalSource> {
    source: S,
    channel: String,
    pipeline: SignalPipeline,
    reconnect_delay: Duration,
    error_delay: Duration,
    stats: ListenerStats,
}

impl<S: SignalSource> SignalListener<S> {
    pub fn new(
        source: S,
        channel: impl Into<String>,
        pipeline: SignalPipeline,
        config: &ListenerConfig,
    ) -> Self {
        Self {
            source,
            channel: channel.into(),
            pipeline,
            reconnect_delay: config.reconnect_delay(),
            error_delay: config.error_delay(),
            stats: ListenerStats::default(),
        }
    }

    /// Runs until `shutdown` resolves. Only the initial subscribe can fail;
    /// after that every error is logged and the loop carries on.
    ///
    /// Shutdown interrupts waiting (for a message or a delay) but never an
    /// order that is already being placed.
    pub async fn run<F>(mut self, shutdown: F) -> anyhow::Result<ListenerStats>
    where
        F: Future<Output = ()>,
    {
        info!("Subscribing to channel: {}", self.channel);
        self.source
            .subscribe(&self.channel)
            .await
            .with_context(|| format!("Failed to subscribe to channel {}", self.channel))?;

        tokio::pin!(shutdown);

        loop {
            let event = tokio::select! {
                _ = &mut shutdown => break,
                event = self.source.next_event() => event,
            };

            match event {
                Ok(ChannelEvent::Subscribed(channel)) => {
                    info!("Subscription confirmed: {}", channel);
                }
                Ok(ChannelEvent::Message(payload)) => {
                    self.on_message(&payload).await;
                }
                Err(SourceError::Transport(reason)) => {
                    warn!(
                        "Channel connection error: {}. Re-subscribing in {:?}",
                        reason, self.reconnect_delay
                    );
                    tokio::select! {
                        _ = &mut shutdown => break,
                        _ = time::sleep(self.reconnect_delay) => {}
                    }

                    self.stats.reconnects += 1;
                    match self.source.subscribe(&self.channel).await {
                        Ok(()) => info!("Re-subscribed to {}", self.channel),
                        // The next receive reports the dead connection again.
                        Err(e) => error!("Re-subscribe to {} failed: {}", self.channel, e),
                    }
                }
                Err(e @ SourceError::Payload(_)) => {
                    error!("Message processing error: {}", e);
                    tokio::select! {
                        _ = &mut shutdown => break,
                        _ = time::sleep(self.error_delay) => {}
                    }
                }
            }
        }

        info!("Shutdown requested, closing subscription to {}", self.channel);
        self.source.close().await;
        info!("Listener stopped: {}", self.stats);

        Ok(self.stats)
    }

    async fn on_message(&mut self, payload: &str) {
        self.stats.received += 1;
        info!("Received signal: {}", payload.trim());

        match self.pipeline.handle(payload).await {
            PipelineOutcome::Ignored(e) if e.is_expected() => {
                self.stats.ignored += 1;
                debug!("Skipped: {}", e);
            }
            PipelineOutcome::Ignored(e) => {
                self.stats.ignored += 1;
                info!("No signal: {}", e);
            }
            PipelineOutcome::Rejected(_) => {
                // Already reported by the validator.
                self.stats.rejected += 1;
            }
            PipelineOutcome::Executed(OrderResult::Placed { .. }) => {
                self.stats.executed += 1;
            }
            PipelineOutcome::Executed(OrderResult::Failed { .. }) => {
                self.stats.failed += 1;
            }
        }
    }
}
