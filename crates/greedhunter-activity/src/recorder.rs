//! Activity recorder
//!
//! The single entry point controllers call for an audit trail. `record`
//! never returns an error: store failures are logged and swallowed, and the
//! downstream publish runs as a detached task the caller does not await.

use std::sync::Arc;

use greedhunter_events::EventPublisher;
use greedhunter_types::UserId;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::builder::ActivityEventBuilder;
use crate::entry::ActivityEntry;
use crate::store::ActivityLog;

/// Recorder configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// Also record rejected wallet operations (audit of attempts). The source
    /// platform only wires the success path, so this defaults to off.
    pub log_failed_wallet_ops: bool,
}

/// Facade over the activity store and the downstream publisher
#[derive(Clone)]
pub struct ActivityRecorder {
    log: Arc<dyn ActivityLog>,
    publisher: Arc<dyn EventPublisher>,
    config: RecorderConfig,
}

impl ActivityRecorder {
    pub fn new(log: Arc<dyn ActivityLog>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self::with_config(log, publisher, RecorderConfig::default())
    }

    pub fn with_config(
        log: Arc<dyn ActivityLog>,
        publisher: Arc<dyn EventPublisher>,
        config: RecorderConfig,
    ) -> Self {
        Self { log, publisher, config }
    }

    /// Record one activity for a user. Never fails.
    ///
    /// The entry is appended to the user's log; the same event is then handed
    /// to the downstream publisher on a detached task. Failures on either
    /// path are surfaced only through diagnostics.
    pub async fn record(&self, user_id: &UserId, activity: ActivityEventBuilder<'_>) {
        let entry = activity.build();
        let message = entry.to_message(user_id);

        if let Err(e) = self.log.append(user_id, entry).await {
            warn!(user_id = %user_id, error = %e, "failed to append activity entry");
        }

        // Fire-and-forget: the caller's response must not wait on the bus
        let publisher = self.publisher.clone();
        tokio::spawn(async move {
            if let Err(e) = publisher.publish(message).await {
                warn!(error = %e, "failed to publish activity event downstream");
            }
        });
    }

    /// Whether rejected wallet operations should also be recorded
    pub fn log_failed_wallet_ops(&self) -> bool {
        self.config.log_failed_wallet_ops
    }
}
