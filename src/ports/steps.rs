use std::path::Path;

use crate::domain::{AppError, ProjectCommandContext};

/// Runs one built-in step kind (init, plan or apply) rooted at the project's
/// absolute path. Output is opaque text the pipeline accumulates.
pub trait StepRunner: Send + Sync {
    fn run(
        &self,
        ctx: &ProjectCommandContext,
        extra_args: &[String],
        path: &Path,
    ) -> Result<String, AppError>;
}

/// Runs a free-form `run` step's command in the project directory.
pub trait CustomStepRunner: Send + Sync {
    fn run(
        &self,
        ctx: &ProjectCommandContext,
        command: &str,
        path: &Path,
    ) -> Result<String, AppError>;
}
