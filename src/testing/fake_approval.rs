use std::sync::Mutex;

use crate::domain::{AppError, PullRequest, Repo};
use crate::ports::PullApprovedChecker;

/// Scripted approval check.
pub struct FakeApprovalChecker {
    approved: bool,
    error: Option<String>,
    pub calls: Mutex<u32>,
}

impl FakeApprovalChecker {
    pub fn approving(approved: bool) -> Self {
        FakeApprovalChecker { approved, error: None, calls: Mutex::new(0) }
    }

    pub fn erroring(details: &str) -> Self {
        FakeApprovalChecker { error: Some(details.to_string()), ..Self::approving(false) }
    }
}

impl PullApprovedChecker for FakeApprovalChecker {
    fn pull_is_approved(&self, _repo: &Repo, _pull: &PullRequest) -> Result<bool, AppError> {
        *self.calls.lock().unwrap() += 1;
        match &self.error {
            Some(details) => Err(AppError::api_error("listing pull request reviews", details)),
            None => Ok(self.approved),
        }
    }
}
