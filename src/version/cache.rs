//! In-memory report cache keyed by repository

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

use crate::hosting::RepositoryId;
use crate::version::types::StalenessReport;

/// Most recent successful resolution for a repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub report: StalenessReport,
    pub resolved_at: DateTime<Utc>,
    /// Sequence number of the resolution that produced this entry
    pub sequence: u64,
}

/// Trait for storing and retrieving staleness reports
#[cfg_attr(test, automock)]
pub trait ReportStore: Send + Sync + 'static {
    /// Latest cached entry, if any resolution has succeeded yet
    fn get(&self, repository: &RepositoryId) -> Option<CacheEntry>;

    /// Store a report unconditionally (last writer wins)
    fn put(&self, repository: &RepositoryId, report: StalenessReport);

    /// Reserve the next sequence number for a resolution of `repository`
    fn next_sequence(&self, repository: &RepositoryId) -> u64;

    /// Store a report unless an entry from a later resolution is already cached
    ///
    /// Returns whether the report was stored.
    fn put_if_newer(
        &self,
        repository: &RepositoryId,
        sequence: u64,
        report: StalenessReport,
    ) -> bool;

    /// Number of repositories with a cached report
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Concurrent in-memory store, lives for the lifetime of the process
#[derive(Default)]
pub struct MemoryReportStore {
    entries: DashMap<String, CacheEntry>,
    sequences: DashMap<String, u64>,
}

impl MemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReportStore for MemoryReportStore {
    fn get(&self, repository: &RepositoryId) -> Option<CacheEntry> {
        self.entries
            .get(&repository.cache_key())
            .map(|entry| entry.value().clone())
    }

    fn put(&self, repository: &RepositoryId, report: StalenessReport) {
        let sequence = self.next_sequence(repository);
        self.put_if_newer(repository, sequence, report);
    }

    fn next_sequence(&self, repository: &RepositoryId) -> u64 {
        let mut counter = self.sequences.entry(repository.cache_key()).or_insert(0);
        *counter += 1;
        *counter
    }

    fn put_if_newer(
        &self,
        repository: &RepositoryId,
        sequence: u64,
        report: StalenessReport,
    ) -> bool {
        let entry = CacheEntry {
            report,
            resolved_at: Utc::now(),
            sequence,
        };

        match self.entries.entry(repository.cache_key()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().sequence > sequence {
                    debug!(
                        "Discarding report #{} for {}: #{} already cached",
                        sequence,
                        repository,
                        occupied.get().sequence
                    );
                    return false;
                }
                occupied.insert(entry);
            }
            Entry::Vacant(vacant) => {
                vacant.insert(entry);
            }
        }

        debug!("Cached report #{} for {}", sequence, repository);
        true
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
