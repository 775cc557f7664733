//! In-memory project lock table: the default backend for the long-lived
//! "this pull request owns plan/apply rights over this project+workspace"
//! claim.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::domain::{AppError, Project, PullRequest, User};
use crate::ports::{LockAttempt, ProjectLockGuard, ProjectLocker};

/// A held project lock.
#[derive(Debug, Clone)]
pub struct ProjectLock {
    pub project: Project,
    pub workspace: String,
    pub pull: PullRequest,
    pub user: User,
    pub acquired_at: DateTime<Utc>,
}

/// Project locker backed by a process-local table. Lock keys are
/// `<repo full name>/<project path>/<workspace>`; the pull request number is
/// deliberately not part of the key, so a second pull request contending for
/// the same project is denied until the holder releases.
///
/// Locks do not survive the process. Exclusion across separate invocations
/// (a lock URL outliving the command that printed it) needs a persistent
/// backend behind [`ProjectLocker`].
#[derive(Default)]
pub struct InMemoryProjectLocker {
    locks: Arc<Mutex<HashMap<String, ProjectLock>>>,
}

impl InMemoryProjectLocker {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(project: &Project, workspace: &str) -> String {
        format!("{}/{}/{}", project.repo_full_name, project.path, workspace)
    }

    /// Currently held lock for a key, if any.
    pub fn get(&self, key: &str) -> Option<ProjectLock> {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).get(key).cloned()
    }
}

impl ProjectLocker for InMemoryProjectLocker {
    fn try_lock(
        &self,
        pull: &PullRequest,
        user: &User,
        workspace: &str,
        project: &Project,
    ) -> Result<LockAttempt, AppError> {
        let key = Self::key(project, workspace);
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(current) = locks.get(&key) {
            // Re-planning from the holding pull request is allowed; it
            // refreshes the claim rather than contending with itself.
            if current.pull.num != pull.num {
                return Ok(LockAttempt::Denied {
                    reason: format!(
                        "This project is currently locked by pull request #{} (since {}). The locking plan must be applied or discarded before future plans can execute.",
                        current.pull.num,
                        current.acquired_at.format("%Y-%m-%d %H:%M:%S UTC"),
                    ),
                });
            }
        }
        locks.insert(
            key.clone(),
            ProjectLock {
                project: project.clone(),
                workspace: workspace.to_string(),
                pull: pull.clone(),
                user: user.clone(),
                acquired_at: Utc::now(),
            },
        );
        drop(locks);

        let table = Arc::clone(&self.locks);
        let release_key = key.clone();
        Ok(LockAttempt::Acquired(ProjectLockGuard::new(key, move || {
            table.lock().unwrap_or_else(|e| e.into_inner()).remove(&release_key);
            Ok(())
        })))
    }
}
