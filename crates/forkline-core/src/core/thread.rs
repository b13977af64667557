//! Thread model.
//!
//! A `Thread` is one linear conversation path. Branches are threads that
//! carry a `BranchOrigin` pointing at the thread they were forked from.
//!
//! ## Serialized shape
//!
//! ```json
//! { "id": "…", "branchNote": "Exploring fix", "createdAt": "…",
//!   "lastModified": "2025-01-01T10:00:00Z",
//!   "messages": [{ "role": "user", "content": "…", "timestamp": "…" }],
//!   "origin": { "parentId": "…", "branchPointIndex": 2, "kind": "manual_fork" } }
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use enum_map::Enum;
use serde::{Deserialize, Serialize};

/// Opaque, immutable thread identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(String);

impl ThreadId {
    /// Generates a fresh thread ID using UUID v4.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a shortened ID for display.
    pub fn short(&self) -> String {
        match self.0.char_indices().nth(8) {
            Some((end, _)) => format!("{}…", &self.0[..end]),
            None => self.0.clone(),
        }
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ThreadId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ThreadId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Role of a message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    Tool,
}

impl Role {
    /// Returns true for roles that count toward user-facing message totals.
    pub fn is_conversational(self) -> bool {
        matches!(self, Role::User | Role::Assistant)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
            Role::Tool => "tool",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRoleError(String);

impl fmt::Display for ParseRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown role '{}' (expected user, assistant, system or tool)",
            self.0
        )
    }
}

impl std::error::Error for ParseRoleError {}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            "system" => Ok(Role::System),
            "tool" => Ok(Role::Tool),
            _ => Err(ParseRoleError(s.to_string())),
        }
    }
}

/// A single turn in a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp,
        }
    }
}

/// How a branch came to exist.
///
/// Views resolve icons from this through a lookup table, so adding a kind
/// only needs a new table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchKind {
    /// The user forked the conversation at a chosen message.
    ManualFork,
    /// The pipeline snapshotted the conversation automatically.
    AutoCheckpoint,
    /// The conversation continued in a fresh thread.
    Handoff,
}

impl BranchKind {
    pub fn label(self) -> &'static str {
        match self {
            BranchKind::ManualFork => "fork",
            BranchKind::AutoCheckpoint => "checkpoint",
            BranchKind::Handoff => "handoff",
        }
    }
}

/// Where a branch diverged from its parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchOrigin {
    pub parent_id: ThreadId,
    /// Number of parent messages copied into the branch (`messages[..index]`).
    pub branch_point_index: usize,
    pub kind: BranchKind,
}

/// One linear conversation path within the branch forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub id: ThreadId,
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<BranchOrigin>,
}

impl Thread {
    pub fn parent_id(&self) -> Option<&ThreadId> {
        self.origin.as_ref().map(|origin| &origin.parent_id)
    }

    pub fn is_root(&self) -> bool {
        self.origin.is_none()
    }

    /// Returns the branch note, or `fallback` when none is set.
    pub fn display_note<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.branch_note.as_deref().unwrap_or(fallback)
    }
}

/// Trims a note and maps blank notes to `None`.
pub fn normalize_note(note: Option<String>) -> Option<String> {
    let trimmed = note?.trim().to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
