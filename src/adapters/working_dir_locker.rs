use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::domain::AppError;
use crate::ports::{WorkingDirGuard, WorkingDirLocker};

/// In-process non-blocking lock over checkout directories, keyed by
/// repo/pull/workspace. Two requests sharing a key share one on-disk
/// checkout and must not touch it concurrently.
#[derive(Default)]
pub struct DefaultWorkingDirLocker {
    locks: Arc<Mutex<HashSet<String>>>,
}

impl DefaultWorkingDirLocker {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(repo_full_name: &str, pull_num: u64, workspace: &str) -> String {
        format!("{repo_full_name}/{pull_num}/{workspace}")
    }
}

impl WorkingDirLocker for DefaultWorkingDirLocker {
    fn try_lock(
        &self,
        repo_full_name: &str,
        pull_num: u64,
        workspace: &str,
    ) -> Result<WorkingDirGuard, AppError> {
        let key = Self::key(repo_full_name, pull_num, workspace);
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        if !locks.insert(key.clone()) {
            return Err(AppError::WorkspaceInUse { workspace: workspace.to_string() });
        }
        drop(locks);

        let locks = Arc::clone(&self.locks);
        Ok(WorkingDirGuard::new(move || {
            locks.lock().unwrap_or_else(|e| e.into_inner()).remove(&key);
        }))
    }
}
