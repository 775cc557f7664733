//! Wiring: build the runner from config, turn CLI options into a command
//! context, render results for the terminal.

pub mod config;

use std::env;
use std::sync::Arc;

pub use config::{load_config, ServerConfig};

use crate::adapters::{
    ApplyStepRunner, DefaultLockUrlGenerator, DefaultWorkingDirLocker, FileWorkspace,
    GithubClient, HttpWebhooksSender, InMemoryProjectLocker, InitStepRunner, PlanStepRunner,
    ShellStepRunner, TerraformClient,
};
use crate::domain::{
    AppError, CommandOutcome, ProjectCommandContext, ProjectConfig, ProjectResult, PullRequest,
    Repo, User,
};
use crate::ports::PullApprovedChecker;
use crate::runner::ProjectCommandRunner;

/// One command invocation, already resolved to a single project+workspace.
#[derive(Debug, Clone)]
pub struct CommandOptions {
    /// Repository full name, `owner/name`.
    pub repo: String,
    pub pull: u64,
    pub head_branch: String,
    pub base_branch: String,
    /// Project directory relative to the repo root.
    pub dir: String,
    pub workspace: String,
    pub user: String,
    /// Named workflow overriding the built-in stages.
    pub workflow: Option<String>,
    /// Require pull-request approval before this project may be applied.
    pub require_approval: bool,
    /// Merge the latest base branch into the checkout before running steps.
    pub rebase: bool,
}

/// Run plan for the described project.
pub fn plan(config: &ServerConfig, opts: &CommandOptions) -> Result<ProjectResult, AppError> {
    let runner = build_runner(config);
    let ctx = build_context(config, opts)?;
    Ok(runner.plan(&ctx))
}

/// Run apply for the described project.
pub fn apply(config: &ServerConfig, opts: &CommandOptions) -> Result<ProjectResult, AppError> {
    let runner = build_runner(config);
    let ctx = build_context(config, opts)?;
    Ok(runner.apply(&ctx))
}

/// Approval checker that resolves GitHub credentials from the environment
/// only when a check actually runs, so commands that never contact GitHub
/// (a plan with no approval requirement) need no credentials.
struct EnvGithubChecker {
    hostname: String,
    credentials: Option<(String, String)>,
}

impl EnvGithubChecker {
    fn from_env(hostname: &str) -> Self {
        let credentials =
            env::var("GROUNDWORK_GH_USER").ok().zip(env::var("GROUNDWORK_GH_TOKEN").ok());
        EnvGithubChecker { hostname: hostname.to_string(), credentials }
    }
}

impl PullApprovedChecker for EnvGithubChecker {
    fn pull_is_approved(&self, repo: &Repo, pull: &PullRequest) -> Result<bool, AppError> {
        let (user, token) = self.credentials.as_ref().ok_or_else(|| {
            AppError::config_error(
                "GROUNDWORK_GH_USER and GROUNDWORK_GH_TOKEN environment variables must be set to check pull request approval",
            )
        })?;
        GithubClient::new(&self.hostname, user, token)?.pull_is_approved(repo, pull)
    }
}

fn build_runner(config: &ServerConfig) -> ProjectCommandRunner {
    let terraform = Arc::new(TerraformClient::new(&config.terraform_bin));

    ProjectCommandRunner {
        locker: Arc::new(InMemoryProjectLocker::new()),
        lock_url_generator: Arc::new(DefaultLockUrlGenerator::new(config.base_url.clone())),
        init_step_runner: Arc::new(InitStepRunner { terraform: terraform.clone() }),
        plan_step_runner: Arc::new(PlanStepRunner { terraform: terraform.clone() }),
        apply_step_runner: Arc::new(ApplyStepRunner { terraform }),
        run_step_runner: Arc::new(ShellStepRunner),
        pull_approved_checker: Arc::new(EnvGithubChecker::from_env(&config.github_hostname)),
        working_dir: Arc::new(FileWorkspace::new(&config.data_dir)),
        webhooks: Arc::new(HttpWebhooksSender::new(config.webhooks.clone())),
        working_dir_locker: Arc::new(DefaultWorkingDirLocker::new()),
        require_approval_override: config.require_approval,
    }
}

fn build_context(
    config: &ServerConfig,
    opts: &CommandOptions,
) -> Result<ProjectCommandContext, AppError> {
    let clone_url = format!("https://{}/{}.git", config.github_hostname, opts.repo);
    let repo = Repo::from_full_name(&opts.repo, &config.github_hostname, &clone_url)?;
    let project_config = if opts.workflow.is_some() || opts.require_approval {
        Some(ProjectConfig {
            name: None,
            workflow: opts.workflow.clone(),
            apply_requirements: if opts.require_approval {
                vec![crate::domain::ApplyRequirement::Approved]
            } else {
                Vec::new()
            },
        })
    } else {
        None
    };
    Ok(ProjectCommandContext {
        base_repo: repo.clone(),
        head_repo: repo,
        pull: PullRequest {
            num: opts.pull,
            head_commit: String::new(),
            url: format!("https://{}/{}/pull/{}", config.github_hostname, opts.repo, opts.pull),
            head_branch: opts.head_branch.clone(),
            base_branch: opts.base_branch.clone(),
            author: String::new(),
        },
        user: User { username: opts.user.clone() },
        workspace: opts.workspace.clone(),
        repo_rel_dir: opts.dir.clone(),
        project_config,
        workflows: config.workflows.clone(),
        rebase: opts.rebase,
        re_plan_cmd: format!("groundwork plan -d {} -w {}", opts.dir, opts.workspace),
        apply_cmd: format!("groundwork apply -d {} -w {}", opts.dir, opts.workspace),
    })
}

/// Render a project result for the terminal.
pub fn render(result: &ProjectResult) -> String {
    let heading = format!("dir: `{}` workspace: `{}`", result.repo_rel_dir, result.workspace);
    match &result.outcome {
        CommandOutcome::PlanSuccess(success) => format!(
            "Ran Plan in {heading}\n\n{}\n\n* To apply this plan, run `{}`\n* To plan again, run `{}`\n* Lock: {}",
            success.terraform_output, success.apply_cmd, success.re_plan_cmd, success.lock_url
        ),
        CommandOutcome::ApplySuccess(output) => {
            format!("Ran Apply in {heading}\n\n{output}")
        }
        CommandOutcome::Failure(reason) => format!("Failed in {heading}: {reason}"),
        CommandOutcome::Error(err) => format!("Error in {heading}: {err}"),
    }
}
