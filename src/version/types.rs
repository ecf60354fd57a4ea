//! Resolution result types

use serde::Serialize;

/// Outcome of checking one declared dependency against its latest version
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyStatus {
    pub name: String,
    #[serde(rename = "current")]
    pub declared_range: String,
    #[serde(rename = "latest")]
    pub latest_version: String,
    #[serde(skip)]
    pub satisfied: bool,
}

/// Dependencies whose latest version falls outside the declared range,
/// in manifest declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StalenessReport {
    outdated: Vec<DependencyStatus>,
}

impl StalenessReport {
    /// Build a report from statuses in declaration order, keeping only the
    /// unsatisfied ones
    pub fn from_statuses(statuses: impl IntoIterator<Item = DependencyStatus>) -> Self {
        Self {
            outdated: statuses.into_iter().filter(|s| !s.satisfied).collect(),
        }
    }

    pub fn outdated(&self) -> &[DependencyStatus] {
        &self.outdated
    }

    pub fn is_up_to_date(&self) -> bool {
        self.outdated.is_empty()
    }

    pub fn len(&self) -> usize {
        self.outdated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outdated.is_empty()
    }
}
