//! Dependency resolution pipeline
//!
//! fetch manifest -> decode -> look up latest versions (bounded fan-out)
//! -> evaluate -> cache

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, info};

use crate::config::{DEFAULT_CONCURRENCY, LOOKUP_TIMEOUT_MS, RegistryKind, ServiceConfig};
use crate::hosting::{FetchError, GitHubHost, RepositoryId, SourceHost};
use crate::parser::{DependencyDeclaration, ManifestError, ManifestParser, PackageJsonParser, decode_manifest};
use crate::version::cache::ReportStore;
use crate::version::checker::build_report;
use crate::version::error::RegistryError;
use crate::version::matcher::VersionMatcher;
use crate::version::matchers::NpmVersionMatcher;
use crate::version::registries::{NpmCliRegistry, NpmRegistry};
use crate::version::registry::Registry;
use crate::version::types::StalenessReport;

/// Why a resolution produced no report
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Failed to fetch manifest: {0}")]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("Failed to resolve {dependency}: {source}")]
    Resolution {
        dependency: String,
        #[source]
        source: RegistryError,
    },

    #[error("Lookup task failed: {0}")]
    Task(String),
}

/// Groups the collaborators needed to resolve a repository's staleness report
pub struct Pipeline {
    host: Arc<dyn SourceHost>,
    parser: Arc<dyn ManifestParser>,
    registry: Arc<dyn Registry>,
    matcher: Arc<dyn VersionMatcher>,
    store: Arc<dyn ReportStore>,
    manifest_path: String,
    concurrency: usize,
    lookup_timeout: Duration,
}

impl Pipeline {
    /// Create a pipeline for npm manifests with default limits
    pub fn new(
        host: Arc<dyn SourceHost>,
        registry: Arc<dyn Registry>,
        store: Arc<dyn ReportStore>,
    ) -> Self {
        let parser = PackageJsonParser::new();
        Self {
            host,
            manifest_path: parser.manifest_name().to_string(),
            parser: Arc::new(parser),
            registry,
            matcher: Arc::new(NpmVersionMatcher),
            store,
            concurrency: DEFAULT_CONCURRENCY,
            lookup_timeout: Duration::from_millis(LOOKUP_TIMEOUT_MS),
        }
    }

    /// Build the production pipeline described by `config`
    pub fn from_config(config: &ServiceConfig, store: Arc<dyn ReportStore>) -> Self {
        let lookup_timeout = Duration::from_millis(config.pipeline.lookup_timeout_ms);
        let host = GitHubHost::new(&config.github.base_url, config.github.token.clone());
        let registry: Arc<dyn Registry> = match config.registry.kind {
            RegistryKind::Http => Arc::new(NpmRegistry::with_timeout(
                &config.registry.base_url,
                lookup_timeout,
            )),
            RegistryKind::Cli => Arc::new(NpmCliRegistry::new(
                "npm",
                Some(config.registry.base_url.clone()),
            )),
        };

        Self::new(Arc::new(host), registry, store)
            .with_manifest_path(&config.github.manifest_path)
            .with_concurrency(config.pipeline.concurrency)
            .with_lookup_timeout(lookup_timeout)
    }

    /// Maximum registry lookups in flight; values below 1 are treated as 1
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    pub fn with_manifest_path(mut self, path: &str) -> Self {
        self.manifest_path = path.to_string();
        self
    }

    pub fn store(&self) -> &Arc<dyn ReportStore> {
        &self.store
    }

    /// Resolve the staleness report for a repository and cache it.
    ///
    /// Any failure aborts the whole resolution and leaves the cache untouched.
    pub async fn resolve(&self, repository: &RepositoryId) -> Result<StalenessReport, ResolveError> {
        let sequence = self.store.next_sequence(repository);
        info!("Resolving {} (#{})", repository, sequence);

        let file = self
            .host
            .get_file_content(repository, &self.manifest_path)
            .await?;
        let declarations = decode_manifest(&*self.parser, &file)?;
        debug!("{} declares {} dependencies", repository, declarations.len());

        let latest = self.lookup_latest_versions(&declarations).await?;

        let report = build_report(
            &*self.matcher,
            declarations
                .iter()
                .zip(latest.iter().map(String::as_str)),
        );

        if self.store.put_if_newer(repository, sequence, report.clone()) {
            info!(
                "{}: {} of {} dependencies outdated",
                repository,
                report.len(),
                declarations.len()
            );
        } else {
            info!("{}: newer report already cached, result #{} dropped", repository, sequence);
        }

        Ok(report)
    }

    /// Look up every declaration's latest version with at most
    /// `self.concurrency` lookups in flight.
    ///
    /// Returns versions in declaration order. The first failure is returned
    /// immediately; lookups still waiting for a permit are skipped and
    /// in-flight ones finish in the background.
    async fn lookup_latest_versions(
        &self,
        declarations: &[DependencyDeclaration],
    ) -> Result<Vec<String>, ResolveError> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let aborted = Arc::new(AtomicBool::new(false));
        let timeout = self.lookup_timeout;

        let mut pending: FuturesUnordered<_> = declarations
            .iter()
            .enumerate()
            .map(|(index, declaration)| {
                let (package, _) = declaration.lookup_target();
                let package = package.to_string();
                let registry = self.registry.clone();
                let semaphore = semaphore.clone();
                let aborted = aborted.clone();

                tokio::spawn(async move {
                    let Ok(_permit) = semaphore.acquire_owned().await else {
                        return (index, None);
                    };
                    if aborted.load(Ordering::Acquire) {
                        return (index, None);
                    }

                    debug!("Looking up latest version of {}", package);
                    let result = tokio::time::timeout(timeout, registry.latest_version(&package))
                        .await
                        .unwrap_or_else(|_| Err(RegistryError::Timeout(timeout.as_millis() as u64)));
                    // Set before the permit is released so queued lookups see it
                    if result.is_err() {
                        aborted.store(true, Ordering::Release);
                    }
                    (index, Some(result))
                })
            })
            .collect();

        let mut latest: Vec<Option<String>> = vec![None; declarations.len()];

        while let Some(joined) = pending.next().await {
            let (index, result) = joined.map_err(|e| ResolveError::Task(e.to_string()))?;
            match result {
                Some(Ok(version)) => latest[index] = Some(version),
                Some(Err(source)) => {
                    aborted.store(true, Ordering::Release);
                    return Err(ResolveError::Resolution {
                        dependency: declarations[index].name.clone(),
                        source,
                    });
                }
                None => {}
            }
        }

        latest
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| ResolveError::Task("lookup skipped without failure".to_string()))
    }
}
