//! The registry surface branch views depend on.

use forkline_core::core::error::RegistryResult;
use forkline_core::core::registry::ThreadRegistry;
use forkline_core::core::thread::{Thread, ThreadId};
use tracing::warn;

/// Read and switch operations a branch view needs.
pub trait BranchNavigator {
    /// Children of `thread_id`, most recent first. Possibly empty.
    fn get_branch_history(&self, thread_id: &ThreadId) -> Vec<&Thread>;

    fn switch_to_thread(&mut self, thread_id: &ThreadId) -> RegistryResult<()>;
}

impl BranchNavigator for ThreadRegistry {
    fn get_branch_history(&self, thread_id: &ThreadId) -> Vec<&Thread> {
        ThreadRegistry::get_branch_history(self, thread_id)
    }

    fn switch_to_thread(&mut self, thread_id: &ThreadId) -> RegistryResult<()> {
        ThreadRegistry::switch_to_thread(self, thread_id)
    }
}

/// Activates a branch picked in a view.
///
/// Returns false, logging a warning, when the switch is rejected (for
/// example the branch was deleted after the view was built).
pub fn open_branch<N: BranchNavigator + ?Sized>(nav: &mut N, thread_id: &ThreadId) -> bool {
    match nav.switch_to_thread(thread_id) {
        Ok(()) => true,
        Err(err) => {
            warn!(thread_id = %thread_id, error = %err, "branch activation ignored");
            false
        }
    }
}
