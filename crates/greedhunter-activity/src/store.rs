//! Activity log store
//!
//! One log per user, created on first write. Appends preserve insertion
//! order; nothing in this subsystem ever mutates or removes an entry.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use greedhunter_types::UserId;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::entry::ActivityEntry;

/// Errors a store implementation may report. The recorder swallows these.
#[derive(Error, Debug)]
pub enum ActivityLogError {
    #[error("storage error: {message}")]
    Storage { message: String },
}

pub type Result<T> = std::result::Result<T, ActivityLogError>;

/// Store seam for per-user activity logs
#[async_trait]
pub trait ActivityLog: Send + Sync {
    /// Append an entry, creating the user's log on first write
    async fn append(&self, user_id: &UserId, entry: ActivityEntry) -> Result<()>;

    /// All entries for a user, in append order. Empty when no log exists.
    async fn entries(&self, user_id: &UserId) -> Result<Vec<ActivityEntry>>;

    /// Number of entries for a user
    async fn entry_count(&self, user_id: &UserId) -> Result<usize>;

    /// The newest `limit` entries, newest first
    async fn recent(&self, user_id: &UserId, limit: usize) -> Result<Vec<ActivityEntry>>;
}

/// In-memory activity log keyed by user
#[derive(Clone, Default)]
pub struct InMemoryActivityLog {
    logs: Arc<RwLock<HashMap<UserId, Vec<ActivityEntry>>>>,
}

impl InMemoryActivityLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ActivityLog for InMemoryActivityLog {
    async fn append(&self, user_id: &UserId, entry: ActivityEntry) -> Result<()> {
        let mut logs = self.logs.write().await;
        logs.entry(user_id.clone()).or_default().push(entry);
        Ok(())
    }

    async fn entries(&self, user_id: &UserId) -> Result<Vec<ActivityEntry>> {
        let logs = self.logs.read().await;
        Ok(logs.get(user_id).cloned().unwrap_or_default())
    }

    async fn entry_count(&self, user_id: &UserId) -> Result<usize> {
        let logs = self.logs.read().await;
        Ok(logs.get(user_id).map(Vec::len).unwrap_or(0))
    }

    async fn recent(&self, user_id: &UserId, limit: usize) -> Result<Vec<ActivityEntry>> {
        let logs = self.logs.read().await;
        Ok(logs
            .get(user_id)
            .map(|entries| entries.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}
