//! GreedHunter Activity - Per-user activity logging
//!
//! The activity log is:
//! - Per-user (one log per user, created on first write)
//! - Append-only (entries are never mutated or removed)
//! - Context-enriched (session token, IP, device profile, geo)
//! - Best-effort (a failed log write never fails the business operation)
//!
//! # Flow
//!
//! ```text
//! controller ──> ActivityRecorder::record
//!                  ├─> extract_context / classify_user_agent
//!                  ├─> ActivityEventBuilder -> ActivityEntry
//!                  ├─> ActivityLog::append          (errors swallowed, logged)
//!                  └─> EventPublisher::publish      (detached task, not awaited)
//! ```

pub mod builder;
pub mod entry;
pub mod recorder;
pub mod store;

pub use builder::{ActivityEventBuilder, GeoPoint};
pub use entry::{event_types, ActivityEntry};
pub use recorder::{ActivityRecorder, RecorderConfig};
pub use store::{ActivityLog, ActivityLogError, InMemoryActivityLog};
