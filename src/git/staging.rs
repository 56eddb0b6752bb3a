//! Auto-staging that can be undone without touching the user's own staging.
//!
//! `atomic_stage_all` records which paths it newly staged; a
//! [`StagingGuard`] unstages exactly that set unless the commit succeeded.

use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};

use crate::error::GitError;
use crate::git::repo::{Git, StagedSet};

/// Serialises snapshot-stage-snapshot within this process. The index file
/// itself is the only cross-process arbiter.
static STAGE_LOCK: Mutex<()> = Mutex::new(());

/// Outcome of [`StagingReconciler::atomic_stage_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageResult {
    pub previously_staged: StagedSet,
    pub newly_staged: StagedSet,
    pub total_staged: StagedSet,
}

/// Paths in `after` that were not in `before`.
pub fn newly_staged(before: &StagedSet, after: &StagedSet) -> StagedSet {
    after.difference(before).cloned().collect()
}

/// Staging operations over one repository.
#[derive(Debug, Clone)]
pub struct StagingReconciler {
    git: Git,
}

impl StagingReconciler {
    pub fn new(git: Git) -> Self {
        Self { git }
    }

    /// The exact set of currently staged paths.
    pub fn snapshot_staged_files(&self) -> Result<StagedSet, GitError> {
        self.git.list_staged_files()
    }

    /// Stage everything and report what this call added to the index.
    ///
    /// A failed `git add` is reported as `StageFailed`; nothing is cleaned up.
    pub fn atomic_stage_all(&self) -> Result<StageResult, GitError> {
        let _lock = STAGE_LOCK.lock().unwrap_or_else(PoisonError::into_inner);

        let before = self.snapshot_staged_files()?;
        self.git.stage_all()?;
        let after = self.snapshot_staged_files()?;

        let result = StageResult {
            newly_staged: newly_staged(&before, &after),
            previously_staged: before,
            total_staged: after,
        };

        debug!(
            "Staged {} new file(s), {} total",
            result.newly_staged.len(),
            result.total_staged.len()
        );
        Ok(result)
    }

    /// Unstage exactly `paths`. No-op for an empty set.
    pub fn unstage_files(&self, paths: &StagedSet) -> Result<(), GitError> {
        self.git.unstage(paths)
    }
}

/// Scoped release of auto-staged files.
///
/// Holds the newly staged set for the length of a session. Unless
/// [`disarm`](Self::disarm) is called after a successful commit, the set is
/// unstaged exactly once: by an explicit [`release`](Self::release) or, as a
/// last resort, on drop.
#[derive(Debug)]
pub struct StagingGuard {
    reconciler: StagingReconciler,
    newly_staged: StagedSet,
    settled: bool,
}

impl StagingGuard {
    pub fn new(reconciler: StagingReconciler) -> Self {
        Self {
            reconciler,
            newly_staged: StagedSet::new(),
            settled: false,
        }
    }

    /// Add paths this session staged.
    pub fn track(&mut self, paths: StagedSet) {
        self.newly_staged.extend(paths);
    }

    pub fn newly_staged(&self) -> &StagedSet {
        &self.newly_staged
    }

    /// The commit went through: keep everything staged.
    pub fn disarm(&mut self) {
        self.settled = true;
    }

    /// Unstage the tracked paths. Later calls (and drop) do nothing.
    pub fn release(&mut self) -> Result<(), GitError> {
        if self.settled {
            return Ok(());
        }
        self.settled = true;

        if !self.newly_staged.is_empty() {
            debug!("Unstaging {} file(s) staged by rune", self.newly_staged.len());
        }
        self.reconciler.unstage_files(&self.newly_staged)
    }
}

impl Drop for StagingGuard {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!("Failed to unstage files staged by rune: {}", e);
        }
    }
}
