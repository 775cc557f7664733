//! GitHub API client, reduced to the one capability the runner consumes:
//! checking whether a pull request is approved.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use url::Url;

use crate::domain::{AppError, PullRequest, Repo};
use crate::ports::PullApprovedChecker;

const USER_AGENT: &str = concat!("groundwork/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
pub struct GithubClient {
    client: Client,
    base_url: Url,
    user: String,
    token: String,
}

impl std::fmt::Debug for GithubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubClient")
            .field("base_url", &self.base_url)
            .field("user", &self.user)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct Review {
    state: String,
}

impl GithubClient {
    /// Client for github.com or, for any other hostname, a GitHub
    /// Enterprise instance at `https://<hostname>/api/v3/`.
    pub fn new(hostname: &str, user: &str, token: &str) -> Result<Self, AppError> {
        let base_url = if hostname == "github.com" {
            Url::parse("https://api.github.com/")
        } else {
            Url::parse(&format!("https://{hostname}/api/v3/"))
        }
        .map_err(|e| {
            AppError::config_error(format!("invalid github hostname '{hostname}': {e}"))
        })?;
        Ok(Self::with_base_url(base_url, user, token))
    }

    /// Client against an explicit API base URL.
    pub fn with_base_url(base_url: Url, user: &str, token: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        GithubClient {
            client,
            base_url,
            user: user.trim().to_string(),
            token: token.trim().to_string(),
        }
    }

    fn get(&self, path: &str) -> Result<reqwest::blocking::Response, AppError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| AppError::api_error("building github url", e.to_string()))?;
        self.client
            .get(url)
            .basic_auth(&self.user, Some(&self.token))
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .map_err(|e| AppError::api_error("requesting github api", e.to_string()))
    }
}

impl PullApprovedChecker for GithubClient {
    fn pull_is_approved(&self, repo: &Repo, pull: &PullRequest) -> Result<bool, AppError> {
        let path = format!("repos/{}/pulls/{}/reviews?per_page=100", repo.full_name, pull.num);
        let response = self.get(&path)?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::api_error(
                "listing pull request reviews",
                format!("github returned {status}"),
            ));
        }
        let reviews: Vec<Review> = response
            .json()
            .map_err(|e| AppError::api_error("decoding pull request reviews", e.to_string()))?;
        Ok(reviews.iter().any(|r| r.state == "APPROVED"))
    }
}
