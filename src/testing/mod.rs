//! Shared fakes for the capability ports, used by unit tests.

mod fake_approval;
mod fake_project_locker;
mod fake_step_runner;
mod fake_webhooks;
mod fake_working_dir;
mod fake_working_dir_locker;

pub use fake_approval::FakeApprovalChecker;
pub use fake_project_locker::FakeProjectLocker;
pub use fake_step_runner::{FakeCustomStepRunner, FakeStepRunner};
pub use fake_webhooks::FakeWebhooksSender;
pub use fake_working_dir::FakeWorkingDir;
pub use fake_working_dir_locker::FakeWorkingDirLocker;

use crate::domain::{ProjectCommandContext, PullRequest, Repo, RepoWorkflows, User};

/// A plan/apply context against `octo/infra` pull 7, project at the repo
/// root, `default` workspace.
pub fn context() -> ProjectCommandContext {
    let repo = Repo {
        full_name: "octo/infra".to_string(),
        owner: "octo".to_string(),
        name: "infra".to_string(),
        clone_url: "https://github.com/octo/infra.git".to_string(),
        hostname: "github.com".to_string(),
    };
    ProjectCommandContext {
        base_repo: repo.clone(),
        head_repo: repo,
        pull: PullRequest {
            num: 7,
            head_commit: "0123abcd".to_string(),
            url: "https://github.com/octo/infra/pull/7".to_string(),
            head_branch: "feature".to_string(),
            base_branch: "main".to_string(),
            author: "contributor".to_string(),
        },
        user: User { username: "commenter".to_string() },
        workspace: "default".to_string(),
        repo_rel_dir: ".".to_string(),
        project_config: None,
        workflows: RepoWorkflows::default(),
        rebase: false,
        re_plan_cmd: "groundwork plan -d . -w default".to_string(),
        apply_cmd: "groundwork apply -d . -w default".to_string(),
    }
}
