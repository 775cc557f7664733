use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::domain::{AppError, PullRequest, Repo};
use crate::ports::WorkingDir;

/// In-memory stand-in for the checkout manager.
pub struct FakeWorkingDir {
    dir: PathBuf,
    exists: bool,
    lookup_error: Option<String>,
    clone_error: Mutex<Option<String>>,
    pub clone_calls: Mutex<u32>,
}

impl FakeWorkingDir {
    /// Behaves as if the pull was already cloned to a fixed path.
    pub fn cloned() -> Self {
        FakeWorkingDir {
            dir: PathBuf::from("/tmp/groundwork-test/repos/octo/infra/7/default"),
            exists: true,
            lookup_error: None,
            clone_error: Mutex::new(None),
            clone_calls: Mutex::new(0),
        }
    }

    /// Behaves as if no clone ever happened.
    pub fn missing() -> Self {
        FakeWorkingDir { exists: false, ..Self::cloned() }
    }

    /// Lookup fails with a non-not-found error.
    pub fn erroring(details: &str) -> Self {
        FakeWorkingDir { lookup_error: Some(details.to_string()), ..Self::cloned() }
    }

    /// Make the next (and all further) clone calls fail.
    pub fn fail_clone_with(&self, details: &str) {
        *self.clone_error.lock().unwrap() = Some(details.to_string());
    }
}

impl WorkingDir for FakeWorkingDir {
    fn clone_repo(
        &self,
        _base_repo: &Repo,
        _head_repo: &Repo,
        _pull: &PullRequest,
        _rebase: bool,
        _workspace: &str,
    ) -> Result<PathBuf, AppError> {
        *self.clone_calls.lock().unwrap() += 1;
        if let Some(details) = self.clone_error.lock().unwrap().clone() {
            return Err(AppError::Git { command: "git clone".to_string(), details });
        }
        Ok(self.dir.clone())
    }

    fn get_working_dir(
        &self,
        repo: &Repo,
        pull: &PullRequest,
        workspace: &str,
    ) -> Result<PathBuf, AppError> {
        if let Some(details) = &self.lookup_error {
            return Err(AppError::Io(io::Error::other(details.clone())));
        }
        if !self.exists {
            return Err(AppError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no working dir for {}/{}/{}", repo.full_name, pull.num, workspace),
            )));
        }
        Ok(self.dir.clone())
    }

    fn delete(&self, _repo: &Repo, _pull: &PullRequest) -> Result<(), AppError> {
        Ok(())
    }

    fn delete_for_workspace(
        &self,
        _repo: &Repo,
        _pull: &PullRequest,
        _workspace: &str,
    ) -> Result<(), AppError> {
        Ok(())
    }
}
