//! Source host test utilities

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use depstale::hosting::{FetchError, FileContent, RepositoryId, SourceHost};
use depstale::service::pipeline::Pipeline;
use depstale::version::cache::{MemoryReportStore, ReportStore};
use depstale::version::registry::Registry;

/// In-memory source host serving `package.json` per repository.
///
/// Manifests can be replaced while tests run to simulate new commits.
#[derive(Default)]
pub struct FakeHost {
    manifests: Mutex<HashMap<String, String>>,
    delays: Mutex<HashMap<String, Duration>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_manifest(self, repository: &str, manifest: &str) -> Self {
        self.set_manifest(repository, manifest);
        self
    }

    pub fn set_manifest(&self, repository: &str, manifest: &str) {
        self.manifests
            .lock()
            .unwrap()
            .insert(repository.to_string(), manifest.to_string());
    }

    pub fn set_delay(&self, repository: &str, delay: Duration) {
        self.delays
            .lock()
            .unwrap()
            .insert(repository.to_string(), delay);
    }
}

#[async_trait]
impl SourceHost for FakeHost {
    async fn get_file_content(
        &self,
        repository: &RepositoryId,
        path: &str,
    ) -> Result<FileContent, FetchError> {
        let key = repository.cache_key();
        let (manifest, delay) = {
            let manifests = self.manifests.lock().unwrap();
            let delays = self.delays.lock().unwrap();
            (manifests.get(&key).cloned(), delays.get(&key).copied())
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let manifest =
            manifest.ok_or_else(|| FetchError::NotFound(format!("{}/{}", key, path)))?;
        Ok(FileContent {
            content: STANDARD.encode(manifest),
            encoding: "base64".to_string(),
        })
    }
}

pub fn repo(slug: &str) -> RepositoryId {
    slug.parse().unwrap()
}

/// Create a pipeline over the given fakes with a fresh in-memory store
pub fn create_test_pipeline(
    host: Arc<FakeHost>,
    registry: Arc<dyn Registry>,
) -> (Arc<MemoryReportStore>, Pipeline) {
    let store = Arc::new(MemoryReportStore::new());
    let pipeline = Pipeline::new(host, registry, store.clone() as Arc<dyn ReportStore>);
    (store, pipeline)
}
