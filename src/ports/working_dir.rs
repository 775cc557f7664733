use std::path::PathBuf;

use crate::domain::{AppError, PullRequest, Repo};

/// Manages the on-disk checkout shared by every project within one
/// pull request and workspace.
pub trait WorkingDir: Send + Sync {
    /// Ensure a fresh checkout of the pull request's branch exists and return
    /// its path. Idempotent: calling again for an already-cloned
    /// pull/workspace succeeds and refreshes the copy in place.
    fn clone_repo(
        &self,
        base_repo: &Repo,
        head_repo: &Repo,
        pull: &PullRequest,
        rebase: bool,
        workspace: &str,
    ) -> Result<PathBuf, AppError>;

    /// Path of an existing checkout. Fails with a not-found error kind when
    /// no prior clone exists for this repo/pull/workspace.
    fn get_working_dir(
        &self,
        repo: &Repo,
        pull: &PullRequest,
        workspace: &str,
    ) -> Result<PathBuf, AppError>;

    /// Remove every workspace checkout for the pull request.
    fn delete(&self, repo: &Repo, pull: &PullRequest) -> Result<(), AppError>;

    /// Remove one workspace's checkout for the pull request.
    fn delete_for_workspace(
        &self,
        repo: &Repo,
        pull: &PullRequest,
        workspace: &str,
    ) -> Result<(), AppError>;
}
