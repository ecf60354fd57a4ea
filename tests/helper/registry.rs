//! Registry test utilities

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use depstale::version::error::RegistryError;
use depstale::version::registry::Registry;

/// In-memory registry with a fixed latest version per package
#[derive(Default)]
pub struct FakeRegistry {
    latest: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    calls: AtomicUsize,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latest(mut self, package: &str, version: &str) -> Self {
        self.latest
            .insert(package.to_string(), version.to_string());
        self
    }

    /// Delay the answer for `package`, to control completion order
    pub fn with_delay(mut self, package: &str, delay: Duration) -> Self {
        self.delays.insert(package.to_string(), delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Registry for FakeRegistry {
    async fn latest_version(&self, package_name: &str) -> Result<String, RegistryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(package_name) {
            tokio::time::sleep(*delay).await;
        }
        self.latest
            .get(package_name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(package_name.to_string()))
    }
}
