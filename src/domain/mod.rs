pub mod error;
pub mod models;
pub mod workflow;

pub use error::AppError;
pub use models::{
    ApplyOutcome, CommandOutcome, PlanSuccess, Project, ProjectCommandContext, ProjectResult,
    PullRequest, Repo, User,
};
pub use workflow::{ApplyRequirement, ProjectConfig, RepoWorkflows, Stage, Step, Workflow};
