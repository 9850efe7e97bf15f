//! In-memory email send log
//!
//! Bounded, newest-first history of send attempts for the logs tab. Not
//! persisted: the history starts empty on every restart.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Outcome of one send attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SendStatus {
    Sent,
    Failed,
}

/// One send attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailLogEntry {
    pub id: Uuid,
    pub candidate_email: String,
    pub candidate_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    pub sent_at: DateTime<Utc>,
    pub status: SendStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tat_minutes: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Shared bounded log; cloning shares the same history
#[derive(Debug, Clone)]
pub struct EmailLog {
    entries: Arc<RwLock<VecDeque<EmailLogEntry>>>,
    capacity: usize,
}

impl EmailLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Arc::new(RwLock::new(VecDeque::with_capacity(capacity.min(1024)))),
            capacity,
        }
    }

    /// Append an entry, evicting the oldest when full
    pub async fn record(&self, entry: EmailLogEntry) {
        let mut entries = self.entries.write().await;
        entries.push_front(entry);
        entries.truncate(self.capacity);
    }

    /// All entries, newest first
    pub async fn entries(&self) -> Vec<EmailLogEntry> {
        self.entries.read().await.iter().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
