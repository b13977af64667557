//! Branch views.
//!
//! - `history`: list of a thread's branches, most recent first
//! - `marker`: one branch as an inline call-to-action
//! - `icon`: per-kind icon lookup table
//! - `navigator`: the registry seam views read from and switch through

mod history;
mod icon;
mod marker;
mod navigator;

pub use history::{BranchHistoryView, BranchRow};
pub use icon::{BranchIcon, icon_for};
pub use marker::BranchMarkerView;
pub use navigator::{BranchNavigator, open_branch};
