//! Typed errors returned by the thread registry.

use std::fmt;

use crate::core::thread::ThreadId;

/// Errors produced by registry operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No thread with this id exists (or it was deleted).
    NotFound { id: ThreadId },
    /// The id has already been issued by this registry.
    DuplicateId { id: ThreadId },
    /// A branch point past the end of the parent's messages.
    BranchPointOutOfRange {
        id: ThreadId,
        index: usize,
        len: usize,
    },
}

impl RegistryError {
    /// Returns the thread id the error refers to.
    pub fn thread_id(&self) -> &ThreadId {
        match self {
            RegistryError::NotFound { id }
            | RegistryError::DuplicateId { id }
            | RegistryError::BranchPointOutOfRange { id, .. } => id,
        }
    }
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::NotFound { id } => write!(f, "thread not found: {id}"),
            RegistryError::DuplicateId { id } => write!(f, "thread id already issued: {id}"),
            RegistryError::BranchPointOutOfRange { id, index, len } => write!(
                f,
                "branch point {index} is out of range for thread {id} ({len} messages)"
            ),
        }
    }
}

impl std::error::Error for RegistryError {}

pub type RegistryResult<T> = Result<T, RegistryError>;
