//! Server configuration loading.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use url::Url;

use crate::domain::{AppError, RepoWorkflows};

fn default_base_url() -> Url {
    Url::parse("http://localhost:4141").expect("static url")
}

fn default_github_hostname() -> String {
    "github.com".to_string()
}

fn default_terraform_bin() -> PathBuf {
    PathBuf::from("terraform")
}

/// Server-side settings: where checkouts live, which workflows exist, where
/// apply results are announced.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Root directory for checkout storage.
    pub data_dir: PathBuf,
    /// Public base URL, used to build lock URLs.
    #[serde(default = "default_base_url")]
    pub base_url: Url,
    /// URLs that receive an apply-outcome POST.
    #[serde(default)]
    pub webhooks: Vec<Url>,
    /// Force the `approved` apply requirement for every project.
    #[serde(default)]
    pub require_approval: bool,
    #[serde(default = "default_github_hostname")]
    pub github_hostname: String,
    #[serde(default = "default_terraform_bin")]
    pub terraform_bin: PathBuf,
    /// Named workflows projects may reference instead of the built-in stages.
    #[serde(default)]
    pub workflows: RepoWorkflows,
}

/// Load and parse the server config from a YAML file.
pub fn load_config(path: &Path) -> Result<ServerConfig, AppError> {
    let content = fs::read_to_string(path).map_err(|e| {
        AppError::config_error(format!("reading config file {}: {e}", path.display()))
    })?;
    let config: ServerConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}
