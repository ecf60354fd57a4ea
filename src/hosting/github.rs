//! GitHub contents API implementation

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{DEFAULT_GITHUB_URL, USER_AGENT};
use crate::hosting::{FetchError, FileContent, RepositoryId, SourceHost};

/// Response from the GitHub contents API (file variant)
#[derive(Debug, Deserialize)]
struct ContentsResponse {
    content: String,
    encoding: String,
}

/// Source host backed by the GitHub REST API
pub struct GitHubHost {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubHost {
    /// Creates a new GitHubHost with a custom base URL
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn retry_after(response: &reqwest::Response) -> Option<u64> {
        response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
    }

    fn rate_limit_exhausted(response: &reqwest::Response) -> bool {
        response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.trim() == "0")
    }
}

impl Default for GitHubHost {
    fn default() -> Self {
        Self::new(DEFAULT_GITHUB_URL, None)
    }
}

#[async_trait::async_trait]
impl SourceHost for GitHubHost {
    async fn get_file_content(
        &self,
        repository: &RepositoryId,
        path: &str,
    ) -> Result<FileContent, FetchError> {
        let url = format!(
            "{}/repos/{}/{}/contents/{}",
            self.base_url,
            repository.owner(),
            repository.name(),
            path.trim_start_matches('/')
        );
        debug!("Fetching {}", url);

        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        match status {
            reqwest::StatusCode::NOT_FOUND => {
                return Err(FetchError::NotFound(format!("{}/{}", repository, path)));
            }
            reqwest::StatusCode::UNAUTHORIZED => {
                return Err(FetchError::Unauthorized(repository.to_string()));
            }
            reqwest::StatusCode::TOO_MANY_REQUESTS => {
                return Err(FetchError::RateLimited {
                    retry_after_secs: Self::retry_after(&response),
                });
            }
            reqwest::StatusCode::FORBIDDEN => {
                if Self::rate_limit_exhausted(&response) {
                    return Err(FetchError::RateLimited {
                        retry_after_secs: Self::retry_after(&response),
                    });
                }
                return Err(FetchError::Unauthorized(repository.to_string()));
            }
            _ => {}
        }

        if !status.is_success() {
            warn!("GitHub API returned status {}: {}", status, url);
            return Err(FetchError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        let contents: ContentsResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse GitHub contents response: {}", e);
            FetchError::InvalidResponse(e.to_string())
        })?;

        Ok(FileContent {
            content: contents.content,
            encoding: contents.encoding,
        })
    }
}
