//! npm registry API implementation

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{DEFAULT_NPM_URL, LOOKUP_TIMEOUT_MS, USER_AGENT};
use crate::version::error::RegistryError;
use crate::version::registry::Registry;
use crate::version::semver::find_semantic_max;

/// Abbreviated package metadata, much smaller than the full document
const ABBREVIATED_METADATA: &str = "application/vnd.npm.install-v1+json";

/// Response from npm registry API
#[derive(Debug, Deserialize)]
struct NpmPackageResponse {
    #[serde(rename = "dist-tags", default)]
    dist_tags: HashMap<String, String>,
    #[serde(default)]
    versions: HashMap<String, serde_json::Value>,
}

/// Registry implementation for npm registry API
#[derive(Clone)]
pub struct NpmRegistry {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl NpmRegistry {
    /// Creates a new NpmRegistry with a custom base URL
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, Duration::from_millis(LOOKUP_TIMEOUT_MS))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// Encode package name for URL (handles scoped packages)
    fn encode_package_name(package_name: &str) -> String {
        if package_name.starts_with('@') {
            // Scoped package: @scope/name -> @scope%2Fname
            package_name.replace('/', "%2F")
        } else {
            package_name.to_string()
        }
    }
}

impl Default for NpmRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_NPM_URL)
    }
}

#[async_trait::async_trait]
impl Registry for NpmRegistry {
    /// Prefers the "latest" dist-tag, falling back to the semantic maximum
    /// of all published versions.
    async fn latest_version(&self, package_name: &str) -> Result<String, RegistryError> {
        let encoded_name = Self::encode_package_name(package_name);
        let url = format!("{}/{}", self.base_url, encoded_name);

        let response = self
            .client
            .get(&url)
            .header("Accept", ABBREVIATED_METADATA)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RegistryError::Timeout(self.timeout.as_millis() as u64)
                } else {
                    RegistryError::Network(e)
                }
            })?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound(package_name.to_string()));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(RegistryError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            warn!("npm registry returned status {}: {}", status, url);
            return Err(RegistryError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        let package_info: NpmPackageResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse npm registry response: {}", e);
            RegistryError::InvalidResponse(e.to_string())
        })?;

        if let Some(latest) = package_info.dist_tags.get("latest") {
            debug!("{} latest (dist-tag): {}", package_name, latest);
            return Ok(latest.clone());
        }

        let versions: Vec<String> = package_info.versions.into_keys().collect();
        find_semantic_max(&versions)
            .inspect(|latest| debug!("{} latest (semantic max): {}", package_name, latest))
            .ok_or_else(|| RegistryError::NotFound(package_name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn latest_version_returns_dist_tag_latest() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/lodash")
            .match_header("accept", ABBREVIATED_METADATA)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "name": "lodash",
                    "dist-tags": { "latest": "4.17.21", "next": "5.0.0-beta.1" },
                    "versions": {
                        "4.17.21": {},
                        "4.17.20": {},
                        "5.0.0-beta.1": {}
                    }
                }"#,
            )
            .create_async()
            .await;

        let registry = NpmRegistry::new(&server.url());
        let result = registry.latest_version("lodash").await.unwrap();

        mock.assert_async().await;
        assert_eq!(result, "4.17.21");
    }

    #[tokio::test]
    async fn latest_version_falls_back_to_semantic_max_without_dist_tag() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/left-pad")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "name": "left-pad",
                    "versions": {
                        "1.1.0": {},
                        "1.3.0": {},
                        "1.2.0": {}
                    }
                }"#,
            )
            .create_async()
            .await;

        let registry = NpmRegistry::new(&server.url());
        let result = registry.latest_version("left-pad").await.unwrap();

        mock.assert_async().await;
        assert_eq!(result, "1.3.0");
    }

    #[tokio::test]
    async fn latest_version_returns_not_found_for_nonexistent_package() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/nonexistent-package")
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": "Not found"}"#)
            .create_async()
            .await;

        let registry = NpmRegistry::new(&server.url());
        let result = registry.latest_version("nonexistent-package").await;

        mock.assert_async().await;
        assert!(matches!(result, Err(RegistryError::NotFound(_))));
    }

    #[tokio::test]
    async fn latest_version_handles_scoped_package() {
        let mut server = Server::new_async().await;

        // Scoped packages use URL encoding: @types/node -> @types%2Fnode
        let mock = server
            .mock("GET", "/@types%2Fnode")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "name": "@types/node",
                    "dist-tags": { "latest": "20.0.0" },
                    "versions": { "20.0.0": {}, "18.0.0": {} }
                }"#,
            )
            .create_async()
            .await;

        let registry = NpmRegistry::new(&server.url());
        let result = registry.latest_version("@types/node").await.unwrap();

        mock.assert_async().await;
        assert_eq!(result, "20.0.0");
    }

    #[tokio::test]
    async fn latest_version_returns_not_found_for_package_without_versions() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/empty-package")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"name": "empty-package", "versions": {}}"#)
            .create_async()
            .await;

        let registry = NpmRegistry::new(&server.url());
        let result = registry.latest_version("empty-package").await;

        mock.assert_async().await;
        assert!(matches!(result, Err(RegistryError::NotFound(_))));
    }

    #[tokio::test]
    async fn latest_version_returns_rate_limited_on_429() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/lodash")
            .with_status(429)
            .with_header("retry-after", "30")
            .create_async()
            .await;

        let registry = NpmRegistry::new(&server.url());
        let result = registry.latest_version("lodash").await;

        mock.assert_async().await;
        assert!(matches!(
            result,
            Err(RegistryError::RateLimited {
                retry_after_secs: Some(30)
            })
        ));
    }

    #[tokio::test]
    async fn latest_version_returns_invalid_response_on_server_error() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/lodash")
            .with_status(500)
            .create_async()
            .await;

        let registry = NpmRegistry::new(&server.url());
        let result = registry.latest_version("lodash").await;

        mock.assert_async().await;
        assert!(matches!(result, Err(RegistryError::InvalidResponse(_))));
    }
}
