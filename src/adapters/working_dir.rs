//! Filesystem checkout manager: one directory per repo/pull/workspace under
//! the data dir, cloned with git2 and refreshed in place on reuse.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use git2::build::RepoBuilder;
use git2::{Repository, ResetType};
use tracing::debug;

use crate::domain::{AppError, PullRequest, Repo};
use crate::ports::WorkingDir;

pub struct FileWorkspace {
    data_dir: PathBuf,
}

fn git_err(command: &'static str, e: git2::Error) -> AppError {
    AppError::Git { command: command.to_string(), details: e.message().to_string() }
}

impl FileWorkspace {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        FileWorkspace { data_dir: data_dir.into() }
    }

    fn pull_dir(&self, repo: &Repo, pull: &PullRequest) -> PathBuf {
        self.data_dir.join("repos").join(&repo.full_name).join(pull.num.to_string())
    }

    fn checkout_dir(&self, repo: &Repo, pull: &PullRequest, workspace: &str) -> PathBuf {
        self.pull_dir(repo, pull).join(workspace)
    }

    /// Refresh an existing checkout: fetch the head branch and hard-reset
    /// onto what was fetched, discarding any leftover local state.
    fn update(&self, dir: &Path, pull: &PullRequest) -> Result<(), AppError> {
        let repo = Repository::open(dir).map_err(|e| git_err("git2::Repository::open", e))?;
        let mut remote = repo
            .find_remote("origin")
            .map_err(|e| git_err("git2::Repository::find_remote", e))?;
        remote
            .fetch(&[pull.head_branch.as_str()], None, None)
            .map_err(|e| git_err("git2::Remote::fetch", e))?;
        let fetched = repo
            .refname_to_id("FETCH_HEAD")
            .map_err(|e| git_err("git2::Repository::refname_to_id", e))?;
        let object = repo
            .find_object(fetched, None)
            .map_err(|e| git_err("git2::Repository::find_object", e))?;
        repo.reset(&object, ResetType::Hard, None)
            .map_err(|e| git_err("git2::Repository::reset", e))?;
        Ok(())
    }

    /// Merge the latest base branch into the checkout. Mutating porcelain is
    /// easier to drive through the git binary than through libgit2.
    fn merge_base(&self, dir: &Path, base_repo: &Repo, pull: &PullRequest) -> Result<(), AppError> {
        self.run_git(&["fetch", &base_repo.clone_url, &pull.base_branch], dir)?;
        self.run_git(&["merge", "--no-edit", "-q", "FETCH_HEAD"], dir)?;
        Ok(())
    }

    fn run_git(&self, args: &[&str], cwd: &Path) -> Result<String, AppError> {
        let output = Command::new("git").args(args).current_dir(cwd).output().map_err(|e| {
            AppError::Git { command: format!("git {}", args.join(" ")), details: e.to_string() }
        })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(AppError::Git {
                command: format!("git {}", args.join(" ")),
                details: if stderr.is_empty() { "unknown error".to_string() } else { stderr },
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl WorkingDir for FileWorkspace {
    fn clone_repo(
        &self,
        base_repo: &Repo,
        head_repo: &Repo,
        pull: &PullRequest,
        rebase: bool,
        workspace: &str,
    ) -> Result<PathBuf, AppError> {
        let dir = self.checkout_dir(base_repo, pull, workspace);
        if dir.join(".git").exists() {
            debug!(dir = %dir.display(), "checkout exists, refreshing");
            self.update(&dir, pull)?;
        } else {
            if let Some(parent) = dir.parent() {
                fs::create_dir_all(parent)?;
            }
            debug!(
                repo = %head_repo.full_name,
                branch = %pull.head_branch,
                dir = %dir.display(),
                "cloning"
            );
            RepoBuilder::new()
                .branch(&pull.head_branch)
                .clone(&head_repo.clone_url, &dir)
                .map_err(|e| git_err("git2::build::RepoBuilder::clone", e))?;
        }
        if rebase {
            self.merge_base(&dir, base_repo, pull)?;
        }
        Ok(dir)
    }

    fn get_working_dir(
        &self,
        repo: &Repo,
        pull: &PullRequest,
        workspace: &str,
    ) -> Result<PathBuf, AppError> {
        let dir = self.checkout_dir(repo, pull, workspace);
        if !dir.join(".git").exists() {
            return Err(AppError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no checkout at {}", dir.display()),
            )));
        }
        Ok(dir)
    }

    fn delete(&self, repo: &Repo, pull: &PullRequest) -> Result<(), AppError> {
        let dir = self.pull_dir(repo, pull);
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
        }
        Ok(())
    }

    fn delete_for_workspace(
        &self,
        repo: &Repo,
        pull: &PullRequest,
        workspace: &str,
    ) -> Result<(), AppError> {
        let dir = self.checkout_dir(repo, pull, workspace);
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
        }
        Ok(())
    }
}
