//! Staleness evaluation for declared dependencies

use crate::parser::types::DependencyDeclaration;
use crate::version::matcher::VersionMatcher;
use crate::version::types::{DependencyStatus, StalenessReport};

/// Compare a declaration with the latest published version of its package
///
/// npm aliases are checked against the aliased range; the status keeps the
/// range exactly as declared.
pub fn check_dependency(
    matcher: &dyn VersionMatcher,
    declaration: &DependencyDeclaration,
    latest_version: &str,
) -> DependencyStatus {
    let (_, range) = declaration.lookup_target();

    DependencyStatus {
        name: declaration.name.clone(),
        declared_range: declaration.declared_range.clone(),
        latest_version: latest_version.to_string(),
        satisfied: matcher.is_satisfied(range, latest_version),
    }
}

/// Evaluate declarations paired with their latest versions into a report
pub fn build_report<'a>(
    matcher: &dyn VersionMatcher,
    resolved: impl IntoIterator<Item = (&'a DependencyDeclaration, &'a str)>,
) -> StalenessReport {
    StalenessReport::from_statuses(
        resolved
            .into_iter()
            .map(|(declaration, latest)| check_dependency(matcher, declaration, latest)),
    )
}
