//! Version matching abstraction

/// Trait for registry-specific range satisfaction logic
///
/// Each ecosystem writes ranges differently; npm uses `^1.0.0`, `~1.2`,
/// `>=1.0.0 <2.0.0 || 3.x` and so on.
pub trait VersionMatcher: Send + Sync {
    /// Check whether `latest_version` falls inside `declared_range`
    ///
    /// Returns false when either side cannot be parsed, since compatibility
    /// cannot be verified.
    fn is_satisfied(&self, declared_range: &str, latest_version: &str) -> bool;
}
