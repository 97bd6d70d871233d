//! Transport shape for activity events
//!
//! A flattened projection of an activity entry suitable for cross-process
//! transport: IDs are stringified, the timestamp is an ISO-8601 string, and
//! props travel as a JSON map.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One activity event on the wire, destined for the `user-activities` topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEventMessage {
    /// Stringified user ID
    pub user_id: String,
    /// Event tag, e.g. "login" or "wallet_transaction"
    pub event_type: String,
    /// Caller-supplied description
    pub description: String,
    /// Optional subject resource type
    pub entity_type: Option<String>,
    /// Stringified subject resource ID, when one was valid
    pub entity_id: Option<String>,
    /// Session token or fallback session id active at the time
    pub session_id: Option<String>,
    /// Contextual metadata (geo, ip, device, caller extras)
    pub props: Map<String, Value>,
    /// ISO-8601 timestamp of the underlying entry
    pub occurred_at: String,
}

impl ActivityEventMessage {
    /// Format a timestamp the way this message expects it
    pub fn format_timestamp(at: DateTime<Utc>) -> String {
        at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Short description for diagnostics
    pub fn summary(&self) -> String {
        format!("{}: {} ({})", self.user_id, self.event_type, self.occurred_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ActivityEventMessage {
        let mut props = Map::new();
        props.insert("device".into(), Value::String("Desktop".into()));
        ActivityEventMessage {
            user_id: "user_1234".to_string(),
            event_type: "quiz_participation".to_string(),
            description: "Completed weekly quiz".to_string(),
            entity_type: Some("quiz".to_string()),
            entity_id: None,
            session_id: Some("session-abc".to_string()),
            props,
            occurred_at: ActivityEventMessage::format_timestamp(Utc::now()),
        }
    }

    #[test]
    fn test_message_serialization_roundtrip() {
        let msg = sample();
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("quiz_participation"));

        let back: ActivityEventMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn test_summary_names_event() {
        let msg = sample();
        let summary = msg.summary();
        assert!(summary.contains("user_1234"));
        assert!(summary.contains("quiz_participation"));
    }

    #[test]
    fn test_timestamp_is_iso8601() {
        let formatted = ActivityEventMessage::format_timestamp(Utc::now());
        assert!(formatted.ends_with('Z'));
        assert!(formatted.contains('T'));
    }
}
