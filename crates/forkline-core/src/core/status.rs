//! Derived per-branch display status.
//!
//! Computed from the live thread on every render; nothing is cached.

use chrono::{DateTime, Utc};

use crate::core::thread::Thread;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchStatus {
    /// User and assistant messages only.
    pub message_count: usize,
    pub last_activity: DateTime<Utc>,
}

impl BranchStatus {
    pub fn of(thread: &Thread) -> Self {
        Self {
            message_count: thread
                .messages
                .iter()
                .filter(|m| m.role.is_conversational())
                .count(),
            last_activity: thread.last_modified,
        }
    }

    /// "1 message" / "{n} messages".
    pub fn message_label(&self) -> String {
        if self.message_count == 1 {
            "1 message".to_string()
        } else {
            format!("{} messages", self.message_count)
        }
    }
}
