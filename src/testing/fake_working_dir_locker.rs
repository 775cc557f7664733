use std::sync::Mutex;

use crate::domain::AppError;
use crate::ports::{WorkingDirGuard, WorkingDirLocker};

/// Always-granting working dir locker that records requested keys.
#[derive(Default)]
pub struct FakeWorkingDirLocker {
    pub calls: Mutex<Vec<String>>,
    fail: Mutex<bool>,
}

impl FakeWorkingDirLocker {
    pub fn fail_next(&self) {
        *self.fail.lock().unwrap() = true;
    }
}

impl WorkingDirLocker for FakeWorkingDirLocker {
    fn try_lock(
        &self,
        repo_full_name: &str,
        pull_num: u64,
        workspace: &str,
    ) -> Result<WorkingDirGuard, AppError> {
        let mut fail = self.fail.lock().unwrap();
        if *fail {
            *fail = false;
            return Err(AppError::WorkspaceInUse { workspace: workspace.to_string() });
        }
        self.calls.lock().unwrap().push(format!("{repo_full_name}/{pull_num}/{workspace}"));
        Ok(WorkingDirGuard::new(|| {}))
    }
}
