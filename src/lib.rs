//! groundwork: pull-request driven terraform plan/apply automation with
//! project-level locking.

pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;
pub mod runner;

#[cfg(test)]
pub(crate) mod testing;

use std::path::Path;

pub use app::CommandOptions;
pub use domain::{AppError, CommandOutcome, PlanSuccess, ProjectResult};
pub use runner::ProjectCommandRunner;

/// Run plan for one project, using the server config at `config_path`.
pub fn plan(config_path: &Path, opts: &CommandOptions) -> Result<ProjectResult, AppError> {
    let config = app::load_config(config_path)?;
    app::plan(&config, opts)
}

/// Run apply for one project, using the server config at `config_path`.
pub fn apply(config_path: &Path, opts: &CommandOptions) -> Result<ProjectResult, AppError> {
    let config = app::load_config(config_path)?;
    app::apply(&config, opts)
}
