//! Source-hosting provider layer
//!
//! - [`SourceHost`]: trait for fetching a file's content from a repository
//! - [`github`]: GitHub contents API implementation
//! - [`error`]: fetch error type

pub mod error;
pub mod github;

use std::fmt;

#[cfg(test)]
use mockall::automock;

pub use error::FetchError;
pub use github::GitHubHost;

/// Coordinates of a hosted repository
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryId {
    owner: String,
    name: String,
}

/// Error returned when a repository identifier has an empty component
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid repository identifier: {0}")]
pub struct InvalidRepositoryId(String);

impl RepositoryId {
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, InvalidRepositoryId> {
        let owner = owner.into();
        let name = name.into();

        if owner.trim().is_empty() || name.trim().is_empty() {
            return Err(InvalidRepositoryId(format!("{}/{}", owner, name)));
        }

        Ok(Self { owner, name })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stable string key used by the report cache
    pub fn cache_key(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl std::str::FromStr for RepositoryId {
    type Err = InvalidRepositoryId;

    /// Parses `owner/name`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((owner, name)) = s.split_once('/') else {
            return Err(InvalidRepositoryId(s.to_string()));
        };
        if name.contains('/') {
            return Err(InvalidRepositoryId(s.to_string()));
        }
        Self::new(owner, name)
    }
}

/// Raw file content as returned by the host, still encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    pub content: String,
    /// Encoding tag, e.g. "base64"
    pub encoding: String,
}

/// Trait for reading files from a hosted repository
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait SourceHost: Send + Sync {
    /// Fetches the content of the file at `path` on the default branch
    async fn get_file_content(
        &self,
        repository: &RepositoryId,
        path: &str,
    ) -> Result<FileContent, FetchError>;
}
