use crate::domain::{AppError, PullRequest, Repo};

/// Narrow view onto the VCS host: is this pull request approved?
pub trait PullApprovedChecker: Send + Sync {
    fn pull_is_approved(&self, repo: &Repo, pull: &PullRequest) -> Result<bool, AppError>;
}
