//! Terminal views over the forkline thread registry.
//!
//! Views are stateless: each one re-derives its rows from registry data when
//! built and only borrows that data for the lifetime of a render.

pub mod branch;
pub mod common;
pub mod thread;

pub use branch::{BranchHistoryView, BranchMarkerView, BranchNavigator, open_branch};
