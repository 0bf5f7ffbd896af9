//! Per-project write serialization.
//!
//! Every operation that mutates tasks or the status registry of a project
//! runs while holding that project's write lock. This makes the
//! "read maximum order, then write" sequence of a transition atomic, makes
//! commit-time status re-validation race-free, and keeps event publication
//! in commit order for each project.
//!
//! The lock is not re-entrant: code holding a guard must not call another
//! operation that acquires the same project's lock.

use crate::project::domain::ProjectId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Guard proving exclusive write access to one project.
pub type ProjectWriteGuard = OwnedMutexGuard<()>;

/// Registry of per-project async write locks.
#[derive(Debug, Default)]
pub struct ProjectWriteLocks {
    locks: Mutex<HashMap<ProjectId, Arc<AsyncMutex<()>>>>,
}

impl ProjectWriteLocks {
    /// Creates an empty lock registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive write access to a project.
    pub async fn acquire(&self, project_id: ProjectId) -> ProjectWriteGuard {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(project_id).or_default())
        };
        lock.lock_owned().await
    }

    /// Drops the lock entry of a deleted project once nobody holds or waits
    /// on it.
    ///
    /// An entry still shared with a guard or a queued writer is kept, so a
    /// later caller queues on the same lock instead of a fresh one.
    pub fn forget(&self, project_id: ProjectId) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if locks
            .get(&project_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&project_id);
        }
    }
}
