//! Registry trait for looking up the latest published version of a package

#[cfg(test)]
use mockall::automock;

use crate::version::error::RegistryError;

/// Trait for querying a package registry
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Registry: Send + Sync {
    /// Returns the latest published version of a package
    ///
    /// # Arguments
    /// * `package_name` - The name of the package (e.g., "@types/node")
    ///
    /// # Returns
    /// * `Ok(String)` - The latest version string as published
    /// * `Err(RegistryError)` - If the registry is unreachable, the package
    ///   does not exist, or the response cannot be used
    async fn latest_version(&self, package_name: &str) -> Result<String, RegistryError>;
}
