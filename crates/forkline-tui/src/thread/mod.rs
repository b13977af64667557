//! Whole-forest thread overview.

mod render;
mod tree;

pub use render::tree_lines;
pub use tree::{ThreadDisplayItem, flatten_as_tree, flatten_registry};
