//! Shared helpers for rendering.

mod text;

pub use text::{line_to_plain, single_line, truncate_with_ellipsis};
