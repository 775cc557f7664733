use std::io;

use thiserror::Error;

/// Library-wide error type for groundwork operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Configuration or environment issue.
    #[error("{0}")]
    Configuration(String),

    /// Server config file could not be parsed.
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Lock subsystem failure (not contention).
    #[error("{0}")]
    Lock(String),

    /// The checkout for this pull/workspace is already being operated on.
    #[error(
        "the {workspace} workspace is currently locked by another command running for this pull request. Wait until the previous command is complete and try again"
    )]
    WorkspaceInUse { workspace: String },

    /// Apply was requested before any successful plan created a checkout.
    #[error("project has not been cloned. Did you run plan?")]
    PullNotCloned,

    /// Git execution failed.
    #[error("git error running '{command}': {details}")]
    Git { command: String, details: String },

    /// The approval check against the VCS host failed.
    #[error("checking if pull request was approved: {0}")]
    ApprovalCheck(String),

    /// A pipeline step failed; the message embeds output gathered before the failure.
    #[error("{0}")]
    Step(String),

    /// HTTP request failed.
    #[error("{context}: {details}")]
    Api { context: String, details: String },
}

impl AppError {
    pub fn config_error<S: Into<String>>(message: S) -> Self {
        AppError::Configuration(message.into())
    }

    pub fn api_error<C: Into<String>, D: Into<String>>(context: C, details: D) -> Self {
        AppError::Api { context: context.into(), details: details.into() }
    }

    /// Provide an `io::ErrorKind`-like view for callers branching on error class.
    pub fn kind(&self) -> io::ErrorKind {
        match self {
            AppError::Io(err) => err.kind(),
            AppError::Configuration(_) | AppError::YamlParse(_) => io::ErrorKind::InvalidInput,
            AppError::PullNotCloned => io::ErrorKind::NotFound,
            AppError::WorkspaceInUse { .. } => io::ErrorKind::WouldBlock,
            AppError::Lock(_)
            | AppError::Git { .. }
            | AppError::ApprovalCheck(_)
            | AppError::Step(_)
            | AppError::Api { .. } => io::ErrorKind::Other,
        }
    }
}
