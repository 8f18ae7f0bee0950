use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// The broker confirmed a subscription.
    Subscribed(String),
    Message(String),
}

#[derive(Error, Debug)]
pub enum SourceError {
    /// The connection is gone; re-subscribing may bring it back.
    #[error("Transport error: {0}")]
    Transport(String),
    /// An event arrived but could not be turned into text.
    #[error("Unreadable event: {0}")]
    Payload(String),
}

/// A pub/sub channel delivering raw signal text.
#[async_trait]
pub trait SignalSource: Send {
    /// (Re)connects if needed and subscribes to `channel`.
    async fn subscribe(&mut self, channel: &str) -> Result<(), SourceError>;

    /// Waits for the next event. Must be cancel-safe: the listener drops this
    /// future when shutdown is requested.
    async fn next_event(&mut self) -> Result<ChannelEvent, SourceError>;

    /// Unsubscribes and releases the connection.
    async fn close(&mut self);
}
