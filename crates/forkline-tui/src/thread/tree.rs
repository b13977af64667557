//! Thread tree derivation for hierarchical display.
//!
//! Transforms a flat list of threads into a depth-first flattened tree for
//! the overview listing.
//!
//! ## Design
//!
//! - **Source of truth**: the registry's threads; the tree is derived on demand
//! - **Orphan handling**: threads whose parent is not in the input appear at
//!   root level

use std::collections::{HashMap, HashSet};

use forkline_core::core::registry::ThreadRegistry;
use forkline_core::core::thread::{BranchKind, Thread};

/// A thread prepared for hierarchical display.
#[derive(Debug, Clone)]
pub struct ThreadDisplayItem<'a> {
    pub thread: &'a Thread,
    /// Nesting depth (0 = root, 1 = child of root, etc.).
    pub depth: usize,
    /// How the thread branched off, `None` for roots.
    pub kind: Option<BranchKind>,
}

fn visit<'a>(
    threads: &[&'a Thread],
    idx: usize,
    depth: usize,
    children_by_parent: &HashMap<&str, Vec<usize>>,
    visited: &mut HashSet<usize>,
    result: &mut Vec<ThreadDisplayItem<'a>>,
) {
    if !visited.insert(idx) {
        return;
    }

    let thread = threads[idx];
    result.push(ThreadDisplayItem {
        thread,
        depth,
        kind: thread.origin.as_ref().map(|o| o.kind),
    });

    if let Some(children) = children_by_parent.get(thread.id.as_str()) {
        for &child_idx in children {
            visit(
                threads,
                child_idx,
                depth + 1,
                children_by_parent,
                visited,
                result,
            );
        }
    }
}

/// Transforms a flat list of threads into a depth-first flattened tree.
///
/// Root order follows the input, and children appear right after their
/// parent in input order. Pass threads sorted newest-first to get roots and
/// siblings in branch-history order.
///
/// # Example
///
/// Given threads A (root), B (from A), C (root), D (from B), the output is
/// A (0), B (1), D (2), C (0).
pub fn flatten_as_tree<'a>(threads: &[&'a Thread]) -> Vec<ThreadDisplayItem<'a>> {
    if threads.is_empty() {
        return Vec::new();
    }

    let thread_ids: HashSet<&str> = threads.iter().map(|t| t.id.as_str()).collect();
    let mut children_by_parent: HashMap<&str, Vec<usize>> = HashMap::new();
    let mut root_indices: Vec<usize> = Vec::new();

    for (idx, thread) in threads.iter().enumerate() {
        match thread.parent_id() {
            Some(parent_id) if thread_ids.contains(parent_id.as_str()) => {
                children_by_parent
                    .entry(parent_id.as_str())
                    .or_default()
                    .push(idx);
            }
            _ => root_indices.push(idx),
        }
    }

    let mut result = Vec::with_capacity(threads.len());
    let mut visited = HashSet::new();
    for root_idx in root_indices {
        visit(
            threads,
            root_idx,
            0,
            &children_by_parent,
            &mut visited,
            &mut result,
        );
    }

    result
}

/// Flattens every thread in the registry, most recent first at each level.
pub fn flatten_registry(registry: &ThreadRegistry) -> Vec<ThreadDisplayItem<'_>> {
    flatten_as_tree(&registry.threads_by_recency())
}
