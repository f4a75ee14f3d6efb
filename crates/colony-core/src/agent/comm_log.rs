//! Bounded communication log
//!
//! Every dispatch is recorded here. The buffer is a fixed-capacity ring:
//! once the cap is exceeded the oldest entries are dropped.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::agent::envelope::ResponseStatus;

const DEFAULT_CAPACITY: usize = 1000;

/// One dispatch record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommEntry {
    pub timestamp: DateTime<Utc>,
    pub agent_id: String,
    pub task_id: String,
    pub request: String,
    pub status: ResponseStatus,
}

/// In-memory ring buffer of dispatch records.
pub struct CommunicationLog {
    entries: RwLock<VecDeque<CommEntry>>,
    capacity: usize,
}

impl Default for CommunicationLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl CommunicationLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity.min(64))),
            capacity,
        }
    }

    pub async fn record(&self, entry: CommEntry) {
        let mut entries = self.entries.write().await;
        while self.capacity > 0 && entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Most recent `n` entries, oldest first.
    pub async fn recent(&self, n: usize) -> Vec<CommEntry> {
        let entries = self.entries.read().await;
        let skip = entries.len().saturating_sub(n);
        entries.iter().skip(skip).cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(i: usize) -> CommEntry {
        CommEntry {
            timestamp: Utc::now(),
            agent_id: "a1".to_string(),
            task_id: format!("task-{i}"),
            request: "do".to_string(),
            status: ResponseStatus::Success,
        }
    }

    #[tokio::test]
    async fn test_log_never_exceeds_capacity() {
        let log = CommunicationLog::new(5);
        for i in 0..12 {
            log.record(entry(i)).await;
        }

        assert_eq!(log.len().await, 5);
        let recent = log.recent(10).await;
        assert_eq!(recent.len(), 5);
        // Oldest entries dropped, newest kept.
        assert_eq!(recent.first().unwrap().task_id, "task-7");
        assert_eq!(recent.last().unwrap().task_id, "task-11");
    }

    #[tokio::test]
    async fn test_recent_returns_tail_in_order() {
        let log = CommunicationLog::new(10);
        for i in 0..4 {
            log.record(entry(i)).await;
        }

        let recent = log.recent(2).await;
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].task_id, "task-2");
        assert_eq!(recent[1].task_id, "task-3");
    }
}
