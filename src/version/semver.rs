use semver::Version;

/// Parse a fully specified version (major.minor.patch), allowing a leading `v` or `=`
pub fn parse_full_version(version: &str) -> Option<Version> {
    Version::parse(strip_version_prefix(version.trim())).ok()
}

fn strip_version_prefix(version: &str) -> &str {
    version.trim_start_matches('=').trim_start_matches('v').trim()
}

/// Find the semantically maximum version from a list
///
/// Invalid versions are skipped.
pub fn find_semantic_max(versions: &[String]) -> Option<String> {
    versions
        .iter()
        .filter_map(|v| parse_full_version(v).map(|parsed| (v, parsed)))
        .max_by(|(_, a), (_, b)| a.cmp(b))
        .map(|(original, _)| original.clone())
}
