use std::sync::{Arc, Mutex};

use crate::domain::{AppError, Project, PullRequest, User};
use crate::ports::{LockAttempt, ProjectLockGuard, ProjectLocker};

enum Mode {
    Acquire,
    Deny(String),
    Fail(String),
}

/// Scripted project locker. Records attempted keys and releases.
pub struct FakeProjectLocker {
    mode: Mode,
    pub attempts: Mutex<Vec<String>>,
    pub released: Arc<Mutex<Vec<String>>>,
}

impl FakeProjectLocker {
    pub fn acquiring() -> Self {
        Self::with_mode(Mode::Acquire)
    }

    pub fn denying(reason: &str) -> Self {
        Self::with_mode(Mode::Deny(reason.to_string()))
    }

    pub fn failing(details: &str) -> Self {
        Self::with_mode(Mode::Fail(details.to_string()))
    }

    fn with_mode(mode: Mode) -> Self {
        FakeProjectLocker {
            mode,
            attempts: Mutex::new(Vec::new()),
            released: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl ProjectLocker for FakeProjectLocker {
    fn try_lock(
        &self,
        _pull: &PullRequest,
        _user: &User,
        workspace: &str,
        project: &Project,
    ) -> Result<LockAttempt, AppError> {
        let key = format!("{}/{}/{}", project.repo_full_name, project.path, workspace);
        self.attempts.lock().unwrap().push(key.clone());
        match &self.mode {
            Mode::Acquire => {
                let released = Arc::clone(&self.released);
                let release_key = key.clone();
                Ok(LockAttempt::Acquired(ProjectLockGuard::new(key, move || {
                    released.lock().unwrap().push(release_key);
                    Ok(())
                })))
            }
            Mode::Deny(reason) => Ok(LockAttempt::Denied { reason: reason.clone() }),
            Mode::Fail(details) => Err(AppError::Lock(details.clone())),
        }
    }
}
