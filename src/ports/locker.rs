use crate::domain::{AppError, Project, PullRequest, User};

/// Scoped hold on the working directory for one repo/pull/workspace.
///
/// Releases on drop, so every exit path of the acquiring call gives the
/// checkout back.
pub struct WorkingDirGuard {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl WorkingDirGuard {
    pub fn new<F: FnOnce() + Send + 'static>(release: F) -> Self {
        WorkingDirGuard { release: Some(Box::new(release)) }
    }
}

impl Drop for WorkingDirGuard {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for WorkingDirGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkingDirGuard").finish_non_exhaustive()
    }
}

/// Serializes filesystem access to the checkout shared by all projects of one
/// repo/pull/workspace. Non-blocking: an attempt on a held key fails
/// immediately instead of waiting.
pub trait WorkingDirLocker: Send + Sync {
    fn try_lock(
        &self,
        repo_full_name: &str,
        pull_num: u64,
        workspace: &str,
    ) -> Result<WorkingDirGuard, AppError>;
}

/// Handle on a held project lock.
///
/// Unlike [`WorkingDirGuard`] this is long-lived: dropping it leaves the lock
/// held, because the claim "this pull request owns plan/apply rights for this
/// project+workspace" outlives the call that acquired it. Release is explicit
/// and consumes the guard, so it cannot run twice.
pub struct ProjectLockGuard {
    key: String,
    release: Box<dyn FnOnce() -> Result<(), AppError> + Send>,
}

impl ProjectLockGuard {
    pub fn new<F>(key: String, release: F) -> Self
    where
        F: FnOnce() -> Result<(), AppError> + Send + 'static,
    {
        ProjectLockGuard { key, release: Box::new(release) }
    }

    /// Opaque lock identifier, used to build the user-facing lock URL.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn release(self) -> Result<(), AppError> {
        (self.release)()
    }
}

impl std::fmt::Debug for ProjectLockGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectLockGuard").field("key", &self.key).finish_non_exhaustive()
    }
}

/// Outcome of requesting the project lock.
#[derive(Debug)]
pub enum LockAttempt {
    Acquired(ProjectLockGuard),
    /// Held by another pull request; `reason` is rendered to the user as-is.
    Denied { reason: String },
}

/// Long-lived, cross-request claim on a (repo, directory, workspace) project.
pub trait ProjectLocker: Send + Sync {
    fn try_lock(
        &self,
        pull: &PullRequest,
        user: &User,
        workspace: &str,
        project: &Project,
    ) -> Result<LockAttempt, AppError>;
}

/// Builds the user-facing URL referencing a held project lock.
pub trait LockUrlGenerator: Send + Sync {
    fn generate_lock_url(&self, lock_key: &str) -> String;
}
