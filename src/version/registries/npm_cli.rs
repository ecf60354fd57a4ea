//! Latest-version lookup through the `npm` command line client

use tokio::process::Command;
use tracing::{debug, warn};

use crate::version::error::RegistryError;
use crate::version::registry::Registry;

/// Registry implementation that shells out to `npm view <name> version`.
///
/// Uses whatever registry and credentials the local npm is configured with.
pub struct NpmCliRegistry {
    program: String,
    registry_url: Option<String>,
}

impl NpmCliRegistry {
    pub fn new(program: impl Into<String>, registry_url: Option<String>) -> Self {
        Self {
            program: program.into(),
            registry_url,
        }
    }

    /// Arguments for `npm view`; options come before `--` so a package name
    /// starting with `-` is never read as a flag
    fn view_args(&self, package_name: &str) -> Vec<String> {
        let mut args = vec!["view".to_string()];
        if let Some(url) = &self.registry_url {
            args.push("--registry".to_string());
            args.push(url.clone());
        }
        args.extend(["--".to_string(), package_name.to_string(), "version".to_string()]);
        args
    }
}

impl Default for NpmCliRegistry {
    fn default() -> Self {
        Self::new("npm", None)
    }
}

/// Interpret the result of `npm view <name> version`
fn parse_view_output(
    package_name: &str,
    success: bool,
    stdout: &str,
    stderr: &str,
) -> Result<String, RegistryError> {
    if !success {
        if stderr.contains("E404") {
            return Err(RegistryError::NotFound(package_name.to_string()));
        }
        let message = stderr.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
        return Err(RegistryError::Command(message.trim().to_string()));
    }

    // `npm view` may print one `name@version 'version'` line per match; the
    // last is newest
    stdout
        .lines()
        .filter_map(|l| l.split_whitespace().last())
        .last()
        .map(|v| v.trim_matches('\'').to_string())
        .ok_or_else(|| {
            RegistryError::InvalidResponse(format!("npm view printed no version for {}", package_name))
        })
}

#[async_trait::async_trait]
impl Registry for NpmCliRegistry {
    async fn latest_version(&self, package_name: &str) -> Result<String, RegistryError> {
        let mut command = Command::new(&self.program);
        command.args(self.view_args(package_name));

        debug!("Running {} view {} version", self.program, package_name);

        let output = command.kill_on_drop(true).output().await.map_err(|e| {
            warn!("Failed to run {}: {}", self.program, e);
            RegistryError::Command(e.to_string())
        })?;

        parse_view_output(
            package_name,
            output.status.success(),
            &String::from_utf8_lossy(&output.stdout),
            &String::from_utf8_lossy(&output.stderr),
        )
    }
}
