use serde::Serialize;

use crate::domain::error::AppError;
use crate::domain::workflow::{ProjectConfig, RepoWorkflows};

/// A git repository hosted on a VCS provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Repo {
    /// Owner and name joined, e.g. `octo/infra`.
    pub full_name: String,
    pub owner: String,
    pub name: String,
    /// URL used for cloning, may embed credentials.
    #[serde(skip_serializing)]
    pub clone_url: String,
    pub hostname: String,
}

impl Repo {
    /// Build a repo descriptor from its `owner/name` full name.
    pub fn from_full_name(full_name: &str, hostname: &str, clone_url: &str) -> Result<Self, AppError> {
        let (owner, name) = full_name.split_once('/').ok_or_else(|| {
            AppError::config_error(format!(
                "repository '{full_name}' is not in the form owner/name"
            ))
        })?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(AppError::config_error(format!(
                "repository '{full_name}' is not in the form owner/name"
            )));
        }
        Ok(Repo {
            full_name: full_name.to_string(),
            owner: owner.to_string(),
            name: name.to_string(),
            clone_url: clone_url.to_string(),
            hostname: hostname.to_string(),
        })
    }
}

/// A pull (merge) request on a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequest {
    pub num: u64,
    pub head_commit: String,
    pub url: String,
    pub head_branch: String,
    pub base_branch: String,
    pub author: String,
}

/// The user whose comment triggered the command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub username: String,
}

/// One independently planned/applied unit: a directory of a repository.
///
/// The project lock key is derived from this plus a workspace, so the path is
/// normalized at construction (no leading `./`, empty means repo root).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Project {
    pub repo_full_name: String,
    pub path: String,
}

impl Project {
    pub fn new(repo_full_name: &str, path: &str) -> Self {
        let trimmed = path.trim_start_matches("./").trim_end_matches('/');
        let path = if trimmed.is_empty() { "." } else { trimmed };
        Project { repo_full_name: repo_full_name.to_string(), path: path.to_string() }
    }
}

/// Immutable descriptor of one requested plan or apply, resolved to a single
/// project and workspace before it reaches the runner.
#[derive(Debug, Clone)]
pub struct ProjectCommandContext {
    pub base_repo: Repo,
    /// Repo the pull request's branch lives on (a fork, or `base_repo` again).
    pub head_repo: Repo,
    pub pull: PullRequest,
    pub user: User,
    /// Named environment within the project, `default` if none was requested.
    pub workspace: String,
    /// Project directory relative to the repo root.
    pub repo_rel_dir: String,
    /// Resolved per-project configuration, when the repo carries one.
    pub project_config: Option<ProjectConfig>,
    /// Server-wide workflow definitions the project config may reference.
    pub workflows: RepoWorkflows,
    /// Merge the latest base branch into the checkout before running steps.
    pub rebase: bool,
    /// Pre-rendered command text echoed back to the user on plan success.
    pub re_plan_cmd: String,
    pub apply_cmd: String,
}

impl ProjectCommandContext {
    pub fn project_name(&self) -> Option<String> {
        self.project_config.as_ref().and_then(|c| c.name.clone())
    }
}

/// The result of a successful plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSuccess {
    /// Output from the plan steps, joined in execution order.
    pub terraform_output: String,
    /// URL to the project lock held by this plan.
    pub lock_url: String,
    /// Command for the user to re-plan this project.
    pub re_plan_cmd: String,
    /// Command for the user to apply this plan.
    pub apply_cmd: String,
}

/// Exactly one of these is produced by every plan or apply call.
///
/// `Failure` is an expected business outcome (lock contention, unmet apply
/// requirement) rendered as-is to the user; `Error` is operational.
#[derive(Debug)]
pub enum CommandOutcome {
    PlanSuccess(PlanSuccess),
    ApplySuccess(String),
    Failure(String),
    Error(AppError),
}

/// Outcome of running one command on one project, with identity echoed back
/// so callers can group results when a pull spans several projects.
#[derive(Debug)]
pub struct ProjectResult {
    pub outcome: CommandOutcome,
    pub repo_rel_dir: String,
    pub workspace: String,
    pub project_name: Option<String>,
}

impl ProjectResult {
    pub fn is_error(&self) -> bool {
        matches!(self.outcome, CommandOutcome::Error(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, CommandOutcome::Failure(_))
    }
}

/// Payload delivered to webhook receivers after every apply.
#[derive(Debug, Clone, Serialize)]
pub struct ApplyOutcome {
    pub workspace: String,
    pub user: User,
    pub repo: Repo,
    pub pull: PullRequest,
    pub success: bool,
}
