//! Event publishers
//!
//! `EventPublisher` is the seam to the external event bus. The stub
//! `LogPublisher` stands in for a real broker client and only logs the
//! serialized message; `BroadcastPublisher` fans events out to in-process
//! subscribers (dashboards, SSE streams).

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::info;

use crate::ActivityEventMessage;

/// Errors a publisher implementation may report
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("serialization error: {message}")]
    Serialization { message: String },

    #[error("event bus unavailable: {message}")]
    BusUnavailable { message: String },
}

pub type Result<T> = std::result::Result<T, PublishError>;

/// Sink for activity events bound for the external event bus
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Forward one event. At-most-once; callers treat failure as loss.
    async fn publish(&self, message: ActivityEventMessage) -> Result<()>;
}

/// Stub publisher: serializes the event and logs it.
///
/// Stands in for a broker client publishing to the `user-activities` topic.
#[derive(Debug, Clone, Default)]
pub struct LogPublisher;

impl LogPublisher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventPublisher for LogPublisher {
    async fn publish(&self, message: ActivityEventMessage) -> Result<()> {
        let payload = serde_json::to_string(&message).map_err(|e| PublishError::Serialization {
            message: e.to_string(),
        })?;
        info!(target: "user_activities", event = %message.summary(), %payload, "activity event published");
        Ok(())
    }
}

/// In-process fan-out to broadcast subscribers
#[derive(Debug, Clone)]
pub struct BroadcastPublisher {
    events: broadcast::Sender<ActivityEventMessage>,
}

impl BroadcastPublisher {
    /// Create a publisher with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity);
        Self { events }
    }

    /// Subscribe to published events
    pub fn subscribe(&self) -> broadcast::Receiver<ActivityEventMessage> {
        self.events.subscribe()
    }
}

impl Default for BroadcastPublisher {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[async_trait]
impl EventPublisher for BroadcastPublisher {
    async fn publish(&self, message: ActivityEventMessage) -> Result<()> {
        // Ignore send errors (no receivers)
        let _ = self.events.send(message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn sample() -> ActivityEventMessage {
        ActivityEventMessage {
            user_id: "user_abc".to_string(),
            event_type: "login".to_string(),
            description: "User logged in".to_string(),
            entity_type: None,
            entity_id: None,
            session_id: None,
            props: Map::new(),
            occurred_at: "2026-01-01T00:00:00.000Z".to_string(),
        }
    }

    #[tokio::test]
    async fn test_log_publisher_resolves() {
        let publisher = LogPublisher::new();
        assert!(publisher.publish(sample()).await.is_ok());
    }

    #[tokio::test]
    async fn test_broadcast_reaches_subscriber() {
        let publisher = BroadcastPublisher::new(16);
        let mut rx = publisher.subscribe();

        publisher.publish(sample()).await.unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.event_type, "login");
    }

    #[tokio::test]
    async fn test_broadcast_without_subscribers_is_ok() {
        let publisher = BroadcastPublisher::new(16);
        assert!(publisher.publish(sample()).await.is_ok());
    }
}
