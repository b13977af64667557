//! Thread branch registry.
//!
//! Owns every thread, the parent/child links between them and the single
//! active-thread pointer. All mutation goes through `&mut self`, and each
//! successful mutation is broadcast to subscribers before the call returns.
//!
//! ## Ordering
//!
//! Branch history and roots are ordered by `last_modified` descending, with
//! ties broken by id ascending, so equal timestamps still sort stably.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::core::clock::{Clock, SystemClock};
use crate::core::error::{RegistryError, RegistryResult};
use crate::core::events::{Broadcaster, RegistryEvent, RegistryEventRx};
use crate::core::thread::{
    BranchKind, BranchOrigin, Message, Role, Thread, ThreadId, normalize_note,
};

pub struct ThreadRegistry {
    threads: HashMap<ThreadId, Thread>,
    children: HashMap<ThreadId, Vec<ThreadId>>,
    /// Every id ever handed out, including deleted ones.
    issued: HashSet<ThreadId>,
    active: Option<ThreadId>,
    clock: Box<dyn Clock>,
    broadcaster: Broadcaster,
}

impl Default for ThreadRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreadRegistry {
    /// Creates an empty registry backed by the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            threads: HashMap::new(),
            children: HashMap::new(),
            issued: HashSet::new(),
            active: None,
            clock: Box::new(clock),
            broadcaster: Broadcaster::new(),
        }
    }

    /// Registers an observer. The receiver gets every event emitted after
    /// this call.
    pub fn subscribe(&mut self) -> RegistryEventRx {
        self.broadcaster.subscribe()
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Returns the direct children of `thread_id`, most recent first.
    ///
    /// Unknown ids and childless threads both yield an empty list.
    pub fn get_branch_history(&self, thread_id: &ThreadId) -> Vec<&Thread> {
        let mut branches: Vec<&Thread> = self
            .children
            .get(thread_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.threads.get(id))
            .collect();
        branches.sort_by(|a, b| by_recency(a, b));
        branches
    }

    /// Returns parentless threads, most recent first.
    pub fn roots(&self) -> Vec<&Thread> {
        let mut roots: Vec<&Thread> = self.threads.values().filter(|t| t.is_root()).collect();
        roots.sort_by(|a, b| by_recency(a, b));
        roots
    }

    /// Returns the path from the root down to `thread_id` (inclusive).
    pub fn lineage(&self, thread_id: &ThreadId) -> Vec<&Thread> {
        let mut path = Vec::new();
        let mut cursor = self.threads.get(thread_id);
        while let Some(thread) = cursor {
            path.push(thread);
            if path.len() > self.threads.len() {
                break;
            }
            cursor = thread.parent_id().and_then(|id| self.threads.get(id));
        }
        path.reverse();
        path
    }

    pub fn thread(&self, thread_id: &ThreadId) -> Option<&Thread> {
        self.threads.get(thread_id)
    }

    pub fn contains(&self, thread_id: &ThreadId) -> bool {
        self.threads.contains_key(thread_id)
    }

    pub fn len(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }

    /// Iterates over all live threads in no particular order.
    pub fn threads(&self) -> impl Iterator<Item = &Thread> {
        self.threads.values()
    }

    /// All live threads, most recent first.
    pub fn threads_by_recency(&self) -> Vec<&Thread> {
        let mut all: Vec<&Thread> = self.threads.values().collect();
        all.sort_by(|a, b| by_recency(a, b));
        all
    }

    pub fn active_thread_id(&self) -> Option<&ThreadId> {
        self.active.as_ref()
    }

    pub fn active_thread(&self) -> Option<&Thread> {
        self.active.as_ref().and_then(|id| self.threads.get(id))
    }

    // ------------------------------------------------------------------
    // Switch
    // ------------------------------------------------------------------

    /// Makes `thread_id` the active thread and notifies subscribers.
    ///
    /// # Errors
    /// Returns `NotFound` for unknown ids; the pointer is left unchanged and
    /// nothing is emitted.
    pub fn switch_to_thread(&mut self, thread_id: &ThreadId) -> RegistryResult<()> {
        if !self.threads.contains_key(thread_id) {
            debug!(thread_id = %thread_id, "switch rejected: unknown thread");
            return Err(not_found(thread_id));
        }

        let previous = self.active.replace(thread_id.clone());
        debug!(thread_id = %thread_id, "active thread switched");
        self.broadcaster.broadcast(RegistryEvent::ActiveThreadChanged {
            previous,
            current: Some(thread_id.clone()),
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Starts a new root thread with a generated id.
    pub fn create_root(&mut self, note: Option<String>) -> ThreadId {
        let id = self.fresh_id();
        self.insert_thread(id.clone(), note, Vec::new(), None);
        id
    }

    /// Starts a new root thread with a caller-supplied id.
    ///
    /// # Errors
    /// Returns `DuplicateId` if the id was ever issued, even if that thread
    /// has since been deleted.
    pub fn create_root_with_id(
        &mut self,
        id: ThreadId,
        note: Option<String>,
    ) -> RegistryResult<ThreadId> {
        if self.issued.contains(&id) {
            return Err(RegistryError::DuplicateId { id });
        }
        self.insert_thread(id.clone(), note, Vec::new(), None);
        Ok(id)
    }

    /// Forks `parent_id`, copying its first `branch_point_index` messages.
    ///
    /// The parent is left untouched.
    ///
    /// # Errors
    /// `NotFound` for an unknown parent, `BranchPointOutOfRange` when the
    /// index exceeds the parent's message count.
    pub fn create_branch(
        &mut self,
        parent_id: &ThreadId,
        branch_point_index: usize,
        note: Option<String>,
        kind: BranchKind,
    ) -> RegistryResult<ThreadId> {
        let parent = self
            .threads
            .get(parent_id)
            .ok_or_else(|| not_found(parent_id))?;
        let len = parent.messages.len();
        if branch_point_index > len {
            return Err(RegistryError::BranchPointOutOfRange {
                id: parent_id.clone(),
                index: branch_point_index,
                len,
            });
        }
        let prefix = parent.messages[..branch_point_index].to_vec();

        let id = self.fresh_id();
        let origin = BranchOrigin {
            parent_id: parent_id.clone(),
            branch_point_index,
            kind,
        };
        self.insert_thread(id.clone(), note, prefix, Some(origin));
        Ok(id)
    }

    /// Appends a message and returns its index.
    ///
    /// # Errors
    /// Returns `NotFound` for unknown ids.
    pub fn append_message(
        &mut self,
        thread_id: &ThreadId,
        role: Role,
        content: impl Into<String>,
    ) -> RegistryResult<usize> {
        let now = self.clock.now();
        let thread = self
            .threads
            .get_mut(thread_id)
            .ok_or_else(|| not_found(thread_id))?;
        thread.messages.push(Message::new(role, content, now));
        touch(thread, now);
        let index = thread.messages.len() - 1;

        debug!(thread_id = %thread_id, index, %role, "message appended");
        self.broadcaster.broadcast(RegistryEvent::MessageAppended {
            id: thread_id.clone(),
            index,
        });
        Ok(index)
    }

    /// Sets or clears the branch note.
    ///
    /// # Errors
    /// Returns `NotFound` for unknown ids.
    pub fn set_branch_note(
        &mut self,
        thread_id: &ThreadId,
        note: Option<String>,
    ) -> RegistryResult<()> {
        let now = self.clock.now();
        let thread = self
            .threads
            .get_mut(thread_id)
            .ok_or_else(|| not_found(thread_id))?;
        thread.branch_note = normalize_note(note);
        touch(thread, now);

        self.broadcaster.broadcast(RegistryEvent::BranchNoteChanged {
            id: thread_id.clone(),
        });
        Ok(())
    }

    /// Removes a thread and returns it.
    ///
    /// Children move up to the deleted thread's parent, keeping only the
    /// prefix both sides still share. Children of a deleted root become
    /// roots. Deleting the active thread clears the active pointer.
    ///
    /// # Errors
    /// Returns `NotFound` for unknown ids.
    pub fn delete_thread(&mut self, thread_id: &ThreadId) -> RegistryResult<Thread> {
        let removed = self
            .threads
            .remove(thread_id)
            .ok_or_else(|| not_found(thread_id))?;

        if let Some(parent_id) = removed.parent_id()
            && let Some(siblings) = self.children.get_mut(parent_id)
        {
            siblings.retain(|id| id != thread_id);
        }

        let orphans = self.children.remove(thread_id).unwrap_or_default();
        for child_id in &orphans {
            let Some(child) = self.threads.get_mut(child_id) else {
                continue;
            };
            child.origin = match (&removed.origin, child.origin.take()) {
                (Some(grand), Some(own)) => Some(BranchOrigin {
                    parent_id: grand.parent_id.clone(),
                    branch_point_index: own.branch_point_index.min(grand.branch_point_index),
                    kind: own.kind,
                }),
                _ => None,
            };
        }
        if let Some(grand) = &removed.origin {
            self.children
                .entry(grand.parent_id.clone())
                .or_default()
                .extend(orphans.iter().cloned());
        }

        debug!(
            thread_id = %thread_id,
            reparented = orphans.len(),
            "thread deleted"
        );
        self.broadcaster.broadcast(RegistryEvent::ThreadDeleted {
            id: thread_id.clone(),
        });

        if self.active.as_ref() == Some(thread_id) {
            let previous = self.active.take();
            self.broadcaster.broadcast(RegistryEvent::ActiveThreadChanged {
                previous,
                current: None,
            });
        }

        Ok(removed)
    }

    fn fresh_id(&self) -> ThreadId {
        loop {
            let id = ThreadId::generate();
            if !self.issued.contains(&id) {
                return id;
            }
        }
    }

    fn insert_thread(
        &mut self,
        id: ThreadId,
        note: Option<String>,
        messages: Vec<Message>,
        origin: Option<BranchOrigin>,
    ) {
        let now = self.clock.now();
        let parent_id = origin.as_ref().map(|o| o.parent_id.clone());
        if let Some(parent_id) = &parent_id {
            self.children
                .entry(parent_id.clone())
                .or_default()
                .push(id.clone());
        }
        self.issued.insert(id.clone());
        self.threads.insert(
            id.clone(),
            Thread {
                id: id.clone(),
                messages,
                branch_note: normalize_note(note),
                created_at: now,
                last_modified: now,
                origin,
            },
        );

        debug!(thread_id = %id, parent_id = ?parent_id, "thread created");
        self.broadcaster
            .broadcast(RegistryEvent::ThreadCreated { id, parent_id });
    }
}

/// Most recently modified first; ids ascending on ties.
fn by_recency(a: &Thread, b: &Thread) -> Ordering {
    b.last_modified
        .cmp(&a.last_modified)
        .then_with(|| a.id.cmp(&b.id))
}

/// Bumps `last_modified` without ever moving it backwards.
fn touch(thread: &mut Thread, now: DateTime<Utc>) {
    thread.last_modified = thread.last_modified.max(now);
}

fn not_found(id: &ThreadId) -> RegistryError {
    RegistryError::NotFound { id: id.clone() }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::core::clock::ManualClock;

    fn ten_am() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap()
    }

    fn registry_at(start: DateTime<Utc>) -> (ThreadRegistry, ManualClock) {
        let clock = ManualClock::new(start);
        (ThreadRegistry::with_clock(clock.clone()), clock)
    }

    fn ids(threads: &[&Thread]) -> Vec<ThreadId> {
        threads.iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn test_branch_history_orders_most_recent_first() {
        let (mut reg, clock) = registry_at(ten_am());
        let root = reg
            .create_root_with_id(ThreadId::from("root"), None)
            .unwrap();
        reg.append_message(&root, Role::User, "hi").unwrap();

        let b1 = reg
            .create_branch(&root, 1, Some("Exploring fix".into()), BranchKind::ManualFork)
            .unwrap();
        clock.advance(Duration::minutes(5));
        let b2 = reg
            .create_branch(&root, 1, None, BranchKind::ManualFork)
            .unwrap();

        let history = reg.get_branch_history(&root);
        assert_eq!(ids(&history), vec![b2.clone(), b1.clone()]);
        assert_eq!(history[0].display_note("Untitled branch"), "Untitled branch");
        assert_eq!(history[1].display_note("Untitled branch"), "Exploring fix");
    }

    #[test]
    fn test_branch_history_breaks_ties_by_id() {
        let (mut reg, _clock) = registry_at(ten_am());
        let root = reg.create_root(None);
        let mut created: Vec<ThreadId> = (0..5)
            .map(|_| {
                reg.create_branch(&root, 0, None, BranchKind::AutoCheckpoint)
                    .unwrap()
            })
            .collect();
        created.sort();

        assert_eq!(ids(&reg.get_branch_history(&root)), created);
    }

    #[test]
    fn test_branch_history_only_includes_direct_children() {
        let (mut reg, clock) = registry_at(ten_am());
        let root = reg.create_root(None);
        let child = reg
            .create_branch(&root, 0, None, BranchKind::ManualFork)
            .unwrap();
        clock.advance(Duration::minutes(1));
        let grandchild = reg
            .create_branch(&child, 0, None, BranchKind::ManualFork)
            .unwrap();
        let other_root = reg.create_root(None);

        assert_eq!(ids(&reg.get_branch_history(&root)), vec![child.clone()]);
        assert_eq!(ids(&reg.get_branch_history(&child)), vec![grandchild.clone()]);
        assert!(reg.get_branch_history(&grandchild).is_empty());
        assert!(reg.get_branch_history(&other_root).is_empty());
        assert!(reg.get_branch_history(&ThreadId::from("missing")).is_empty());
    }

    #[test]
    fn test_appending_moves_branch_to_front() {
        let (mut reg, clock) = registry_at(ten_am());
        let root = reg.create_root(None);
        let older = reg
            .create_branch(&root, 0, None, BranchKind::ManualFork)
            .unwrap();
        clock.advance(Duration::minutes(1));
        let newer = reg
            .create_branch(&root, 0, None, BranchKind::ManualFork)
            .unwrap();
        clock.advance(Duration::minutes(1));
        reg.append_message(&older, Role::Assistant, "reply").unwrap();

        assert_eq!(ids(&reg.get_branch_history(&root)), vec![older, newer]);
    }

    #[test]
    fn test_create_branch_copies_prefix_and_leaves_parent_untouched() {
        let (mut reg, clock) = registry_at(ten_am());
        let root = reg.create_root(None);
        for text in ["a", "b", "c"] {
            reg.append_message(&root, Role::User, text).unwrap();
        }
        let parent_before = reg.thread(&root).unwrap().clone();

        clock.advance(Duration::minutes(3));
        let branch = reg
            .create_branch(&root, 2, Some("  alt  ".into()), BranchKind::ManualFork)
            .unwrap();

        let thread = reg.thread(&branch).unwrap();
        let contents: Vec<_> = thread.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["a", "b"]);
        assert_eq!(thread.branch_note.as_deref(), Some("alt"));
        assert_eq!(thread.last_modified, ten_am() + Duration::minutes(3));
        assert_eq!(
            thread.origin,
            Some(BranchOrigin {
                parent_id: root.clone(),
                branch_point_index: 2,
                kind: BranchKind::ManualFork,
            })
        );
        assert_eq!(reg.thread(&root).unwrap(), &parent_before);
    }

    #[test]
    fn test_create_branch_rejects_bad_input() {
        let (mut reg, _clock) = registry_at(ten_am());
        let root = reg.create_root(None);
        reg.append_message(&root, Role::User, "only").unwrap();

        assert_eq!(
            reg.create_branch(&root, 2, None, BranchKind::ManualFork),
            Err(RegistryError::BranchPointOutOfRange {
                id: root.clone(),
                index: 2,
                len: 1
            })
        );
        let missing = ThreadId::from("missing");
        assert_eq!(
            reg.create_branch(&missing, 0, None, BranchKind::ManualFork),
            Err(RegistryError::NotFound { id: missing })
        );
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_branching_at_full_length_copies_everything() {
        let (mut reg, _clock) = registry_at(ten_am());
        let root = reg.create_root(None);
        reg.append_message(&root, Role::User, "q").unwrap();
        reg.append_message(&root, Role::Assistant, "a").unwrap();

        let branch = reg
            .create_branch(&root, 2, None, BranchKind::Handoff)
            .unwrap();
        assert_eq!(reg.thread(&branch).unwrap().messages.len(), 2);
    }

    #[test]
    fn test_last_modified_never_moves_backwards() {
        let (mut reg, clock) = registry_at(ten_am());
        let root = reg.create_root(None);
        clock.advance(Duration::minutes(-30));
        reg.append_message(&root, Role::User, "late clock").unwrap();
        reg.set_branch_note(&root, Some("note".into())).unwrap();

        assert_eq!(reg.thread(&root).unwrap().last_modified, ten_am());
    }

    #[test]
    fn test_append_returns_index_and_bumps_timestamp() {
        let (mut reg, clock) = registry_at(ten_am());
        let root = reg.create_root(None);
        assert_eq!(reg.append_message(&root, Role::User, "one").unwrap(), 0);
        clock.advance(Duration::minutes(2));
        assert_eq!(reg.append_message(&root, Role::Assistant, "two").unwrap(), 1);

        let thread = reg.thread(&root).unwrap();
        assert_eq!(thread.last_modified, ten_am() + Duration::minutes(2));
        assert_eq!(thread.messages[1].timestamp, ten_am() + Duration::minutes(2));
        assert_eq!(thread.created_at, ten_am());
    }

    #[test]
    fn test_set_branch_note_normalizes() {
        let (mut reg, _clock) = registry_at(ten_am());
        let root = reg.create_root(Some("first".into()));
        reg.set_branch_note(&root, Some("   ".into())).unwrap();
        assert_eq!(reg.thread(&root).unwrap().branch_note, None);

        let missing = ThreadId::from("missing");
        assert!(reg.set_branch_note(&missing, None).is_err());
    }

    #[test]
    fn test_switch_to_unknown_thread_keeps_pointer_and_emits_nothing() {
        let (mut reg, _clock) = registry_at(ten_am());
        let root = reg.create_root(None);
        reg.switch_to_thread(&root).unwrap();
        let rx = reg.subscribe();

        let missing = ThreadId::from("missing");
        assert_eq!(
            reg.switch_to_thread(&missing),
            Err(RegistryError::NotFound { id: missing })
        );
        assert_eq!(reg.active_thread_id(), Some(&root));
        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn test_switch_notifies_every_observer_exactly_once() {
        let (mut reg, _clock) = registry_at(ten_am());
        let root = reg.create_root(None);
        let branch = reg
            .create_branch(&root, 0, None, BranchKind::ManualFork)
            .unwrap();
        reg.switch_to_thread(&root).unwrap();

        let rx1 = reg.subscribe();
        let rx2 = reg.subscribe();
        reg.switch_to_thread(&branch).unwrap();

        let expected = RegistryEvent::ActiveThreadChanged {
            previous: Some(root.clone()),
            current: Some(branch.clone()),
        };
        for rx in [&rx1, &rx2] {
            let events: Vec<_> = rx.try_iter().collect();
            assert_eq!(events.len(), 1);
            assert_eq!(*events[0], expected);
        }
        assert_eq!(reg.active_thread().map(|t| &t.id), Some(&branch));
    }

    #[test]
    fn test_reselecting_active_thread_still_notifies() {
        let (mut reg, _clock) = registry_at(ten_am());
        let root = reg.create_root(None);
        reg.switch_to_thread(&root).unwrap();
        let rx = reg.subscribe();

        reg.switch_to_thread(&root).unwrap();

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            events.iter().map(|e| (**e).clone()).collect::<Vec<_>>(),
            vec![RegistryEvent::ActiveThreadChanged {
                previous: Some(root.clone()),
                current: Some(root.clone()),
            }]
        );
    }

    #[test]
    fn test_switch_does_not_mutate_threads() {
        let (mut reg, clock) = registry_at(ten_am());
        let root = reg.create_root(None);
        let before = reg.thread(&root).unwrap().clone();
        clock.advance(Duration::hours(1));
        reg.switch_to_thread(&root).unwrap();
        assert_eq!(reg.thread(&root).unwrap(), &before);
    }

    #[test]
    fn test_ids_are_never_reused() {
        let (mut reg, _clock) = registry_at(ten_am());
        let id = ThreadId::from("fixed");
        reg.create_root_with_id(id.clone(), None).unwrap();
        assert_eq!(
            reg.create_root_with_id(id.clone(), None),
            Err(RegistryError::DuplicateId { id: id.clone() })
        );

        reg.delete_thread(&id).unwrap();
        assert!(!reg.contains(&id));
        assert_eq!(
            reg.create_root_with_id(id.clone(), None),
            Err(RegistryError::DuplicateId { id })
        );
    }

    #[test]
    fn test_delete_reparents_children_to_grandparent() {
        let (mut reg, _clock) = registry_at(ten_am());
        let root = reg.create_root(None);
        for text in ["1", "2", "3", "4"] {
            reg.append_message(&root, Role::User, text).unwrap();
        }
        let middle = reg
            .create_branch(&root, 2, None, BranchKind::ManualFork)
            .unwrap();
        reg.append_message(&middle, Role::Assistant, "m").unwrap();
        let deep = reg
            .create_branch(&middle, 3, None, BranchKind::AutoCheckpoint)
            .unwrap();
        let shallow = reg
            .create_branch(&middle, 1, None, BranchKind::ManualFork)
            .unwrap();

        let removed = reg.delete_thread(&middle).unwrap();
        assert_eq!(removed.id, middle);

        let deep_origin = reg.thread(&deep).unwrap().origin.clone().unwrap();
        assert_eq!(deep_origin.parent_id, root);
        assert_eq!(deep_origin.branch_point_index, 2);
        assert_eq!(deep_origin.kind, BranchKind::AutoCheckpoint);

        let shallow_origin = reg.thread(&shallow).unwrap().origin.clone().unwrap();
        assert_eq!(shallow_origin.branch_point_index, 1);

        let mut history = ids(&reg.get_branch_history(&root));
        history.sort();
        let mut expected = vec![deep, shallow];
        expected.sort();
        assert_eq!(history, expected);
    }

    #[test]
    fn test_deleting_root_promotes_children() {
        let (mut reg, _clock) = registry_at(ten_am());
        let root = reg.create_root(None);
        let child = reg
            .create_branch(&root, 0, None, BranchKind::ManualFork)
            .unwrap();

        reg.delete_thread(&root).unwrap();

        assert!(reg.thread(&child).unwrap().is_root());
        assert_eq!(ids(&reg.roots()), vec![child]);
        assert!(reg.get_branch_history(&root).is_empty());
    }

    #[test]
    fn test_deleting_active_thread_clears_pointer() {
        let (mut reg, _clock) = registry_at(ten_am());
        let root = reg.create_root(None);
        reg.switch_to_thread(&root).unwrap();
        let rx = reg.subscribe();

        reg.delete_thread(&root).unwrap();

        assert_eq!(reg.active_thread_id(), None);
        let events: Vec<RegistryEvent> = rx.try_iter().map(|e| (*e).clone()).collect();
        assert_eq!(
            events,
            vec![
                RegistryEvent::ThreadDeleted { id: root.clone() },
                RegistryEvent::ActiveThreadChanged {
                    previous: Some(root),
                    current: None,
                },
            ]
        );
    }

    #[test]
    fn test_lineage_walks_from_root() {
        let (mut reg, _clock) = registry_at(ten_am());
        let root = reg.create_root(None);
        let child = reg
            .create_branch(&root, 0, None, BranchKind::ManualFork)
            .unwrap();
        let grandchild = reg
            .create_branch(&child, 0, None, BranchKind::ManualFork)
            .unwrap();

        assert_eq!(
            ids(&reg.lineage(&grandchild)),
            vec![root.clone(), child, grandchild]
        );
        assert_eq!(ids(&reg.lineage(&root)), vec![root]);
        assert!(reg.lineage(&ThreadId::from("missing")).is_empty());
    }

    #[test]
    fn test_write_events_are_emitted_in_order() {
        let (mut reg, _clock) = registry_at(ten_am());
        let rx = reg.subscribe();
        let root = reg.create_root(None);
        reg.append_message(&root, Role::User, "hi").unwrap();
        let branch = reg
            .create_branch(&root, 1, None, BranchKind::ManualFork)
            .unwrap();
        reg.set_branch_note(&branch, Some("n".into())).unwrap();

        let events: Vec<RegistryEvent> = rx.try_iter().map(|e| (*e).clone()).collect();
        assert_eq!(
            events,
            vec![
                RegistryEvent::ThreadCreated {
                    id: root.clone(),
                    parent_id: None
                },
                RegistryEvent::MessageAppended {
                    id: root.clone(),
                    index: 0
                },
                RegistryEvent::ThreadCreated {
                    id: branch.clone(),
                    parent_id: Some(root)
                },
                RegistryEvent::BranchNoteChanged { id: branch },
            ]
        );
    }

    #[test]
    fn test_failed_writes_emit_nothing() {
        let (mut reg, _clock) = registry_at(ten_am());
        let rx = reg.subscribe();
        let missing = ThreadId::from("missing");

        assert!(reg.append_message(&missing, Role::User, "x").is_err());
        assert!(reg.delete_thread(&missing).is_err());
        assert!(
            reg.create_branch(&missing, 0, None, BranchKind::ManualFork)
                .is_err()
        );
        assert_eq!(rx.try_iter().count(), 0);
    }
}
