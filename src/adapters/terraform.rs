//! Step runners that shell out to the terraform binary (and, for `run`
//! steps, to the shell).

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use tracing::debug;

use crate::domain::{AppError, ProjectCommandContext};
use crate::ports::{CustomStepRunner, StepRunner};

/// Thin wrapper around the terraform binary.
pub struct TerraformClient {
    bin: PathBuf,
}

impl TerraformClient {
    pub fn new(bin: impl Into<PathBuf>) -> Self {
        TerraformClient { bin: bin.into() }
    }

    fn run(&self, args: &[String], path: &Path) -> Result<String, AppError> {
        debug!(bin = %self.bin.display(), args = ?args, dir = %path.display(), "running terraform");
        let output = Command::new(&self.bin).args(args).current_dir(path).output().map_err(
            |e| AppError::Step(format!("running '{} {}': {e}", self.bin.display(), args.join(" "))),
        )?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
            let details = if stderr.is_empty() { stdout } else { stderr };
            return Err(AppError::Step(format!(
                "'{} {}' failed: {details}",
                self.bin.display(),
                args.join(" ")
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Make `workspace` the active terraform workspace, creating it on first
    /// use. The default workspace always exists.
    fn select_workspace(&self, workspace: &str, path: &Path) -> Result<(), AppError> {
        if workspace == "default" {
            return Ok(());
        }
        let select = vec!["workspace".to_string(), "select".to_string(), workspace.to_string()];
        if self.run(&select, path).is_err() {
            let new = vec!["workspace".to_string(), "new".to_string(), workspace.to_string()];
            self.run(&new, path)?;
        }
        Ok(())
    }
}

fn plan_file(workspace: &str) -> String {
    format!("{workspace}.tfplan")
}

fn with_args(base: &[&str], extra_args: &[String], trailing: &[String]) -> Vec<String> {
    base.iter()
        .map(|s| s.to_string())
        .chain(extra_args.iter().cloned())
        .chain(trailing.iter().cloned())
        .collect()
}

pub struct InitStepRunner {
    pub terraform: Arc<TerraformClient>,
}

impl StepRunner for InitStepRunner {
    fn run(
        &self,
        _ctx: &ProjectCommandContext,
        extra_args: &[String],
        path: &Path,
    ) -> Result<String, AppError> {
        let args = with_args(&["init", "-input=false", "-no-color"], extra_args, &[]);
        self.terraform.run(&args, path)
    }
}

pub struct PlanStepRunner {
    pub terraform: Arc<TerraformClient>,
}

impl StepRunner for PlanStepRunner {
    fn run(
        &self,
        ctx: &ProjectCommandContext,
        extra_args: &[String],
        path: &Path,
    ) -> Result<String, AppError> {
        self.terraform.select_workspace(&ctx.workspace, path)?;
        let out = plan_file(&ctx.workspace);
        let args = with_args(
            &["plan", "-input=false", "-refresh", "-no-color", "-out", &out],
            extra_args,
            &[],
        );
        self.terraform.run(&args, path)
    }
}

pub struct ApplyStepRunner {
    pub terraform: Arc<TerraformClient>,
}

impl StepRunner for ApplyStepRunner {
    fn run(
        &self,
        ctx: &ProjectCommandContext,
        extra_args: &[String],
        path: &Path,
    ) -> Result<String, AppError> {
        self.terraform.select_workspace(&ctx.workspace, path)?;
        let args = with_args(
            &["apply", "-input=false", "-no-color"],
            extra_args,
            &[plan_file(&ctx.workspace)],
        );
        self.terraform.run(&args, path)
    }
}

/// Executes a `run` step's command through the shell in the project dir,
/// with the request's identity exposed as environment variables.
pub struct ShellStepRunner;

impl CustomStepRunner for ShellStepRunner {
    fn run(
        &self,
        ctx: &ProjectCommandContext,
        command: &str,
        path: &Path,
    ) -> Result<String, AppError> {
        debug!(command = %command, dir = %path.display(), "running custom step");
        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(path)
            .env("WORKSPACE", &ctx.workspace)
            .env("BASE_REPO", &ctx.base_repo.full_name)
            .env("PULL_NUM", ctx.pull.num.to_string())
            .env("HEAD_BRANCH", &ctx.pull.head_branch)
            .env("BASE_BRANCH", &ctx.pull.base_branch)
            .output()
            .map_err(|e| AppError::Step(format!("running '{command}': {e}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(AppError::Step(format!("'{command}' failed: {stderr}")));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::context;

    // Pointing the client at `echo` turns every invocation into its own
    // argument list, which is enough to verify command assembly.
    fn echo_client() -> Arc<TerraformClient> {
        Arc::new(TerraformClient::new("echo"))
    }

    #[test]
    fn init_assembles_default_arguments() {
        let runner = InitStepRunner { terraform: echo_client() };
        let tmp = tempfile::tempdir().unwrap();
        let out = runner.run(&context(), &["-upgrade".to_string()], tmp.path()).unwrap();
        assert_eq!(out, "init -input=false -no-color -upgrade");
    }

    #[test]
    fn plan_writes_a_workspace_named_plan_file() {
        let runner = PlanStepRunner { terraform: echo_client() };
        let tmp = tempfile::tempdir().unwrap();
        let out = runner.run(&context(), &[], tmp.path()).unwrap();
        assert!(out.contains("-out default.tfplan"), "unexpected args: {out}");
    }

    #[test]
    fn apply_consumes_the_plan_file_last() {
        let runner = ApplyStepRunner { terraform: echo_client() };
        let tmp = tempfile::tempdir().unwrap();
        let out = runner.run(&context(), &["-backup=-".to_string()], tmp.path()).unwrap();
        assert!(out.ends_with("default.tfplan"), "unexpected args: {out}");
        assert!(out.contains("-backup=-"));
    }

    #[test]
    fn missing_binary_is_a_step_error() {
        let client = TerraformClient::new("groundwork-no-such-binary");
        let tmp = tempfile::tempdir().unwrap();
        let err = client.run(&["version".to_string()], tmp.path()).unwrap_err();
        assert!(matches!(err, AppError::Step(_)));
    }

    #[test]
    fn shell_step_sees_context_environment() {
        let tmp = tempfile::tempdir().unwrap();
        let out = ShellStepRunner
            .run(&context(), "echo $WORKSPACE:$PULL_NUM", tmp.path())
            .unwrap();
        assert_eq!(out, "default:7");
    }

    #[test]
    fn shell_step_failure_carries_stderr() {
        let tmp = tempfile::tempdir().unwrap();
        let err = ShellStepRunner
            .run(&context(), "echo nope >&2; exit 3", tmp.path())
            .unwrap_err();
        assert!(err.to_string().contains("nope"));
    }
}
