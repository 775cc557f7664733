//! The project command runner: orchestrates locking, checkout preparation,
//! apply gating and step execution for one plan or apply request.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::domain::{
    AppError, ApplyOutcome, ApplyRequirement, CommandOutcome, PlanSuccess, Project,
    ProjectCommandContext, ProjectResult, Stage, Step,
};
use crate::ports::{
    CustomStepRunner, LockAttempt, LockUrlGenerator, ProjectLockGuard, ProjectLocker,
    PullApprovedChecker, StepRunner, WebhooksSender, WorkingDir, WorkingDirLocker,
};

/// A step failed partway through a stage. Output gathered from the steps that
/// ran before it is kept for diagnosis.
#[derive(Debug)]
struct PipelineFailure {
    outputs: Vec<String>,
    source: AppError,
}

impl PipelineFailure {
    /// Collapse into one error message, accumulated output first.
    fn into_error(self) -> AppError {
        if self.outputs.is_empty() {
            AppError::Step(self.source.to_string())
        } else {
            AppError::Step(format!("{}\n{}", self.outputs.join("\n"), self.source))
        }
    }
}

/// Runs plan and apply for a single project. Collaborators are injected at
/// construction so tests can substitute fakes for any of them.
pub struct ProjectCommandRunner {
    pub locker: Arc<dyn ProjectLocker>,
    pub lock_url_generator: Arc<dyn LockUrlGenerator>,
    pub init_step_runner: Arc<dyn StepRunner>,
    pub plan_step_runner: Arc<dyn StepRunner>,
    pub apply_step_runner: Arc<dyn StepRunner>,
    pub run_step_runner: Arc<dyn CustomStepRunner>,
    pub pull_approved_checker: Arc<dyn PullApprovedChecker>,
    pub working_dir: Arc<dyn WorkingDir>,
    pub webhooks: Arc<dyn WebhooksSender>,
    pub working_dir_locker: Arc<dyn WorkingDirLocker>,
    /// Server-wide switch forcing the `approved` requirement on every apply,
    /// replacing whatever the project configured.
    pub require_approval_override: bool,
}

impl ProjectCommandRunner {
    /// Run plan for the project described by `ctx`.
    pub fn plan(&self, ctx: &ProjectCommandContext) -> ProjectResult {
        let outcome = match self.do_plan(ctx) {
            Ok(outcome) => outcome,
            Err(err) => CommandOutcome::Error(err),
        };
        ProjectResult {
            outcome,
            repo_rel_dir: ctx.repo_rel_dir.clone(),
            workspace: ctx.workspace.clone(),
            project_name: ctx.project_name(),
        }
    }

    /// Run apply for the project described by `ctx`.
    pub fn apply(&self, ctx: &ProjectCommandContext) -> ProjectResult {
        let outcome = match self.do_apply(ctx) {
            Ok(outcome) => outcome,
            Err(err) => CommandOutcome::Error(err),
        };
        ProjectResult {
            outcome,
            repo_rel_dir: ctx.repo_rel_dir.clone(),
            workspace: ctx.workspace.clone(),
            project_name: ctx.project_name(),
        }
    }

    fn do_plan(&self, ctx: &ProjectCommandContext) -> Result<CommandOutcome, AppError> {
        // Claim plan/apply rights over this project+workspace. The claim
        // outlives this call: it backs the lock URL until an explicit unlock.
        let project = Project::new(&ctx.base_repo.full_name, &ctx.repo_rel_dir);
        let attempt = self
            .locker
            .try_lock(&ctx.pull, &ctx.user, &ctx.workspace, &project)
            .map_err(|e| AppError::Lock(format!("acquiring project lock: {e}")))?;
        let lock = match attempt {
            LockAttempt::Acquired(lock) => lock,
            LockAttempt::Denied { reason } => return Ok(CommandOutcome::Failure(reason)),
        };
        debug!(
            repo = %ctx.base_repo.full_name,
            pull = ctx.pull.num,
            workspace = %ctx.workspace,
            dir = %ctx.repo_rel_dir,
            "acquired project lock"
        );

        // Guard the shared checkout; released on every exit path below.
        let _working_dir_guard = self.working_dir_locker.try_lock(
            &ctx.base_repo.full_name,
            ctx.pull.num,
            &ctx.workspace,
        )?;

        let repo_dir = match self.working_dir.clone_repo(
            &ctx.base_repo,
            &ctx.head_repo,
            &ctx.pull,
            ctx.rebase,
            &ctx.workspace,
        ) {
            Ok(dir) => dir,
            Err(clone_err) => {
                // The long-lived lock must not survive a plan that failed.
                self.release_after_error(lock, "plan");
                return Err(clone_err);
            }
        };
        let abs_path = repo_dir.join(&ctx.repo_rel_dir);

        let stage = self.plan_stage(ctx);
        match self.run_steps(&stage.steps, ctx, &abs_path) {
            Ok(outputs) => {
                let lock_url = self.lock_url_generator.generate_lock_url(lock.key());
                Ok(CommandOutcome::PlanSuccess(PlanSuccess {
                    terraform_output: outputs.join("\n"),
                    lock_url,
                    re_plan_cmd: ctx.re_plan_cmd.clone(),
                    apply_cmd: ctx.apply_cmd.clone(),
                }))
            }
            Err(failure) => {
                self.release_after_error(lock, "plan");
                Err(failure.into_error())
            }
        }
    }

    fn do_apply(&self, ctx: &ProjectCommandContext) -> Result<CommandOutcome, AppError> {
        let repo_dir = match self.working_dir.get_working_dir(
            &ctx.base_repo,
            &ctx.pull,
            &ctx.workspace,
        ) {
            Ok(dir) => dir,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::PullNotCloned);
            }
            Err(err) => return Err(err),
        };
        let abs_path = repo_dir.join(&ctx.repo_rel_dir);

        // todo: resolve the effective requirement list in the context builder
        // so this layer stops knowing about the server-wide override.
        let requirements: Vec<ApplyRequirement> = if self.require_approval_override {
            vec![ApplyRequirement::Approved]
        } else {
            ctx.project_config.as_ref().map(|c| c.apply_requirements.clone()).unwrap_or_default()
        };
        for requirement in &requirements {
            match requirement {
                ApplyRequirement::Approved => {
                    let approved = self
                        .pull_approved_checker
                        .pull_is_approved(&ctx.base_repo, &ctx.pull)
                        .map_err(|e| AppError::ApprovalCheck(e.to_string()))?;
                    if !approved {
                        return Ok(CommandOutcome::Failure(
                            "Pull request must be approved before running apply.".to_string(),
                        ));
                    }
                }
            }
        }

        // No project lock here: apply relies on the one plan acquired.
        let _working_dir_guard = self.working_dir_locker.try_lock(
            &ctx.base_repo.full_name,
            ctx.pull.num,
            &ctx.workspace,
        )?;

        let stage = self.apply_stage(ctx);
        let result = self.run_steps(&stage.steps, ctx, &abs_path);

        let outcome = ApplyOutcome {
            workspace: ctx.workspace.clone(),
            user: ctx.user.clone(),
            repo: ctx.base_repo.clone(),
            pull: ctx.pull.clone(),
            success: result.is_ok(),
        };
        if let Err(err) = self.webhooks.send(&outcome) {
            warn!(
                repo = %ctx.base_repo.full_name,
                pull = ctx.pull.num,
                error = %err,
                "failed to send webhooks for apply result"
            );
        }

        match result {
            Ok(outputs) => Ok(CommandOutcome::ApplySuccess(outputs.join("\n"))),
            Err(failure) => Err(failure.into_error()),
        }
    }

    /// Execute steps strictly in order, accumulating non-empty output.
    /// Stops at the first error; output gathered so far rides along with it.
    fn run_steps(
        &self,
        steps: &[Step],
        ctx: &ProjectCommandContext,
        abs_path: &Path,
    ) -> Result<Vec<String>, PipelineFailure> {
        let mut outputs: Vec<String> = Vec::new();
        for step in steps {
            let result = match step {
                Step::Init { extra_args } => self.init_step_runner.run(ctx, extra_args, abs_path),
                Step::Plan { extra_args } => self.plan_step_runner.run(ctx, extra_args, abs_path),
                Step::Apply { extra_args } => {
                    self.apply_step_runner.run(ctx, extra_args, abs_path)
                }
                Step::Run { command } => self.run_step_runner.run(ctx, command, abs_path),
                Step::Unknown { name } => {
                    // Skipped for forward compatibility with configs written
                    // for newer versions.
                    debug!(step = %name, "skipping unrecognized step");
                    continue;
                }
            };
            match result {
                Ok(output) => {
                    if !output.is_empty() {
                        outputs.push(output);
                    }
                }
                Err(source) => return Err(PipelineFailure { outputs, source }),
            }
        }
        Ok(outputs)
    }

    fn plan_stage(&self, ctx: &ProjectCommandContext) -> Stage {
        if let Some(config) = &ctx.project_config {
            if let Some(workflow) = &config.workflow {
                debug!(workflow = %workflow, "project configured to use workflow");
                if let Some(stage) = ctx.workflows.plan_stage(workflow) {
                    return stage.clone();
                }
            }
        }
        Stage::default_plan()
    }

    fn apply_stage(&self, ctx: &ProjectCommandContext) -> Stage {
        if let Some(config) = &ctx.project_config {
            if let Some(workflow) = &config.workflow {
                if let Some(stage) = ctx.workflows.apply_stage(workflow) {
                    return stage.clone();
                }
            }
        }
        Stage::default_apply()
    }

    fn release_after_error(&self, lock: ProjectLockGuard, command: &str) {
        if let Err(err) = lock.release() {
            error!(error = %err, "error unlocking project after {command} error");
        }
    }
}
