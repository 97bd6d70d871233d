//! GreedHunter Events - Downstream activity-event publishing
//!
//! Activity entries are projected into a flat, string-safe message and
//! forwarded to an external event bus. Delivery is at-most-once and
//! best-effort: publishing must never block or fail the business operation
//! the event describes, so every failure stops at this crate's boundary.

pub mod message;
pub mod publisher;

pub use message::ActivityEventMessage;
pub use publisher::{BroadcastPublisher, EventPublisher, LogPublisher, PublishError};
