//! Core module: UI-agnostic domain.
//!
//! This module contains:
//! - `thread`: Thread, message and branch-origin types
//! - `registry`: The thread branch registry (forest + active pointer)
//! - `events`: Registry events and the subscriber fan-out
//! - `clock`: Time sources for the registry
//! - `error`: Typed registry errors
//! - `status`: Derived per-branch display status
//! - `time`: Relative-time formatting

pub mod clock;
pub mod error;
pub mod events;
pub mod registry;
pub mod status;
pub mod thread;
pub mod time;
