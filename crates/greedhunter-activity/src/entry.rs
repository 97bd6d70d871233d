//! Activity entries
//!
//! One immutable record of a user action, enriched with device and network
//! context at construction time.

use chrono::{DateTime, Utc};
use greedhunter_events::ActivityEventMessage;
use greedhunter_types::{ActivityEntryId, UserId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Well-known event type tags
pub mod event_types {
    pub const LOGIN: &str = "login";
    pub const LOGOUT: &str = "logout";
    pub const REGISTRATION: &str = "registration";
    pub const QUIZ_PARTICIPATION: &str = "quiz_participation";
    pub const EVENT_PARTICIPATION: &str = "event_participation";
    pub const WALLET_TRANSACTION: &str = "wallet_transaction";
    pub const WALLET_STATUS: &str = "wallet_status";
}

/// A single entry in a user's activity log, immutable once written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// Unique ID for this entry
    pub id: ActivityEntryId,
    /// Event tag, e.g. "login" or "wallet_transaction"
    pub event_type: String,
    /// Caller-supplied description
    pub description: String,
    /// Optional subject resource type (quiz, event, wallet, ...)
    pub entity_type: Option<String>,
    /// Subject resource ID; invalid inputs are stored as None
    pub entity_id: Option<Uuid>,
    /// Token or fallback session id active at the time. Correlates entries
    /// to a login session, not a foreign key.
    pub session_id: Option<String>,
    /// Flat contextual metadata: geo_location, ip_address, device, browser,
    /// platform, plus caller extras
    pub props: Map<String, Value>,
    /// Set once at build time
    pub created_at: DateTime<Utc>,
    /// Always equal to `created_at`; entries are never updated
    pub updated_at: DateTime<Utc>,
}

impl ActivityEntry {
    /// Project into the flat transport shape for downstream publishing
    pub fn to_message(&self, user_id: &UserId) -> ActivityEventMessage {
        ActivityEventMessage {
            user_id: user_id.to_string(),
            event_type: self.event_type.clone(),
            description: self.description.clone(),
            entity_type: self.entity_type.clone(),
            entity_id: self.entity_id.map(|id| id.to_string()),
            session_id: self.session_id.clone(),
            props: self.props.clone(),
            occurred_at: ActivityEventMessage::format_timestamp(self.created_at),
        }
    }
}
