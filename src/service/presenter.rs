//! Read-side rendering of cached reports

use std::fmt;
use std::str::FromStr;

use crate::hosting::RepositoryId;
use crate::version::cache::ReportStore;
use crate::version::types::StalenessReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Json,
    Text,
    Status,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            "status" => Ok(Self::Status),
            other => Err(format!("Unknown report format: {}", other)),
        }
    }
}

/// Binary summary of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeStatus {
    UpToDate,
    Outdated,
}

impl BadgeStatus {
    pub fn of(report: &StalenessReport) -> Self {
        if report.is_up_to_date() {
            Self::UpToDate
        } else {
            Self::Outdated
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UpToDate => "up to date",
            Self::Outdated => "outdated",
        }
    }
}

impl fmt::Display for BadgeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presentation {
    /// No resolution has succeeded for the repository yet
    NotAvailable,
    Json(StalenessReport),
    Text(String),
    Status(BadgeStatus),
}

/// Render the cached report for `repository` in the requested format
pub fn present(
    store: &dyn ReportStore,
    repository: &RepositoryId,
    format: ReportFormat,
) -> Presentation {
    let Some(entry) = store.get(repository) else {
        return Presentation::NotAvailable;
    };

    match format {
        ReportFormat::Json => Presentation::Json(entry.report),
        ReportFormat::Text => Presentation::Text(render_text(repository, &entry.report)),
        ReportFormat::Status => Presentation::Status(BadgeStatus::of(&entry.report)),
    }
}

fn render_text(repository: &RepositoryId, report: &StalenessReport) -> String {
    if report.is_up_to_date() {
        return format!("{}: all dependencies up to date", repository);
    }

    let noun = if report.len() == 1 {
        "dependency"
    } else {
        "dependencies"
    };
    let mut text = format!("{}: {} outdated {}", repository, report.len(), noun);
    for status in report.outdated() {
        text.push_str(&format!(
            "\n  {}  {} -> {}",
            status.name, status.declared_range, status.latest_version
        ));
    }
    text
}
