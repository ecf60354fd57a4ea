//! npm version matcher
//!
//! Supports npm semver range specifications:
//! - `1.2.3`, `=1.2.3`, `v1.2.3` - exact match
//! - `^1.2.3` - compatible with version (>=1.2.3 <2.0.0)
//! - `~1.2.3` - approximately equivalent (>=1.2.3 <1.3.0)
//! - `>=1.2.3`, `>1.2.3`, `<=1.2.3`, `<1.2.3` - comparison operators
//! - `1.2.x`, `1.x`, `1`, `1.2`, `*`, `""`, `latest` - wildcards
//! - `1.0.0 - 2.0.0` - hyphen ranges
//! - `>=1.0.0 <2.0.0` (AND) and `^1.0.0 || ^2.0.0` (OR)
//!
//! Pre-release versions only satisfy a comparator set that names a
//! pre-release on the same `major.minor.patch`.

use semver::{BuildMetadata, Prerelease, Version};

use crate::version::matcher::VersionMatcher;
use crate::version::semver::parse_full_version;

pub struct NpmVersionMatcher;

/// Top-level version specification
#[derive(Debug)]
enum VersionSpec {
    /// Single range (^1.0.0, >=1.0.0, etc.)
    Single(VersionRange),
    /// AND of ranges (>=1.0.0 <2.0.0) - space-separated, all must satisfy
    And(Vec<VersionRange>),
    /// OR of specs (^1.0.0 || ^2.0.0) - any must satisfy
    Or(Vec<VersionSpec>),
}

impl VersionSpec {
    /// Parse a version specification string
    fn parse(spec: &str) -> Option<Self> {
        let spec = spec.trim();

        // OR has the lowest precedence
        if spec.contains("||") {
            let specs: Option<Vec<VersionSpec>> =
                spec.split("||").map(Self::parse_and_or_single).collect();
            return specs.map(VersionSpec::Or);
        }

        Self::parse_and_or_single(spec)
    }

    /// Parse a spec that may be AND (space-separated) or a single range
    fn parse_and_or_single(spec: &str) -> Option<Self> {
        let spec = spec.trim();

        // "" and "latest" accept anything
        if spec.is_empty() || spec == "latest" {
            return Some(VersionSpec::Single(VersionRange::Any));
        }

        let mut ranges: Vec<VersionRange> = Self::split_and_parts(spec)
            .into_iter()
            .map(|part| VersionRange::parse(&part))
            .collect::<Option<_>>()?;

        if ranges.len() == 1 {
            ranges.pop().map(VersionSpec::Single)
        } else {
            Some(VersionSpec::And(ranges))
        }
    }

    /// Split spec into AND parts.
    ///
    /// Operators separated from their version by whitespace (`>= 1.2.3`) are
    /// rejoined, and `a - b` is kept together as a hyphen range.
    fn split_and_parts(spec: &str) -> Vec<String> {
        let tokens: Vec<&str> = spec.split_whitespace().collect();
        let mut parts = Vec::new();
        let mut i = 0;

        while i < tokens.len() {
            let token = tokens[i];

            if tokens.get(i + 1) == Some(&"-") && i + 2 < tokens.len() {
                parts.push(format!("{} - {}", token, tokens[i + 2]));
                i += 3;
            } else if is_bare_operator(token) && i + 1 < tokens.len() {
                parts.push(format!("{}{}", token, tokens[i + 1]));
                i += 2;
            } else {
                parts.push(token.to_string());
                i += 1;
            }
        }

        parts
    }

    /// Check if a version satisfies this spec
    fn satisfies(&self, version: &Version) -> bool {
        match self {
            VersionSpec::Single(range) => set_satisfies(std::slice::from_ref(range), version),
            VersionSpec::And(ranges) => set_satisfies(ranges, version),
            VersionSpec::Or(specs) => specs.iter().any(|s| s.satisfies(version)),
        }
    }
}

fn is_bare_operator(token: &str) -> bool {
    matches!(token, ">=" | "<=" | ">" | "<" | "=" | "^" | "~")
}

/// A comparator set is satisfied when every range accepts the version and,
/// for a pre-release version, some range names a pre-release on the same tuple.
fn set_satisfies(ranges: &[VersionRange], version: &Version) -> bool {
    if !ranges.iter().all(|r| r.satisfies(version)) {
        return false;
    }

    version.pre.is_empty() || ranges.iter().any(|r| r.allows_prerelease_of(version))
}

/// A version that may have wildcard or missing components (`1`, `1.2.x`, `*`)
#[derive(Debug, Clone)]
struct Partial {
    major: Option<u64>,
    minor: Option<u64>,
    patch: Option<u64>,
    pre: Prerelease,
}

impl Partial {
    fn parse(input: &str) -> Option<Self> {
        let input = input.trim().trim_start_matches('=').trim_start_matches('v');
        if input.is_empty() {
            return None;
        }

        // Build metadata never affects matching
        let input = input.split('+').next().unwrap_or(input);

        let (core, pre) = match input.split_once('-') {
            Some((core, pre)) => (core, Some(pre)),
            None => (input, None),
        };

        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() > 3 {
            return None;
        }

        let mut numbers = [None; 3];
        let mut seen_wildcard = false;
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            if matches!(*part, "x" | "X" | "*") {
                seen_wildcard = true;
                continue;
            }
            // Numeric component after a wildcard (1.x.3) is invalid
            if seen_wildcard {
                return None;
            }
            // Upper bounds add one to a component, so u64::MAX has no successor
            *slot = Some(part.parse::<u64>().ok().filter(|n| *n < u64::MAX)?);
        }

        let pre = match pre {
            // Pre-release only makes sense on a full version
            Some(pre) if numbers.iter().all(Option::is_some) => Prerelease::new(pre).ok()?,
            Some(_) => return None,
            None => Prerelease::EMPTY,
        };

        Some(Self {
            major: numbers[0],
            minor: numbers[1],
            patch: numbers[2],
            pre,
        })
    }

    fn is_full(&self) -> bool {
        self.patch.is_some()
    }

    fn is_any(&self) -> bool {
        self.major.is_none()
    }

    /// Lowest version the partial covers (`1.2` -> `1.2.0`)
    fn floor(&self) -> Version {
        let mut v = Version::new(
            self.major.unwrap_or(0),
            self.minor.unwrap_or(0),
            self.patch.unwrap_or(0),
        );
        v.pre = self.pre.clone();
        v
    }

    /// First version past what an X-range covers (`1` -> `2.0.0`, `1.2` -> `1.3.0`)
    fn x_range_end(&self) -> Version {
        let major = self.major.unwrap_or(0);
        match (self.minor, self.patch) {
            (None, _) => Version::new(major + 1, 0, 0),
            (Some(minor), None) => Version::new(major, minor + 1, 0),
            (Some(minor), Some(patch)) => Version::new(major, minor, patch + 1),
        }
    }
}

/// `version < bound`, treating pre-releases of `bound` as already past it
fn below(version: &Version, bound: &Version) -> bool {
    let mut exclusive = bound.clone();
    exclusive.pre = Prerelease::new("0").unwrap_or(Prerelease::EMPTY);
    version < &exclusive
}

/// Represents a parsed npm version range
#[derive(Debug)]
enum VersionRange {
    /// Exact version match
    Exact(Version),
    /// Caret range: ^1.2.3 means >=1.2.3 <2.0.0 (or special cases for 0.x)
    Caret(Partial),
    /// Tilde range: ~1.2.3 means >=1.2.3 <1.3.0
    Tilde(Partial),
    /// Greater than or equal
    Gte(Partial),
    /// Greater than
    Gt(Partial),
    /// Less than or equal
    Lte(Partial),
    /// Less than
    Lt(Partial),
    /// Any version: * matches all versions
    Any,
    /// X-range: 1.x / 1 means >=1.0.0 <2.0.0, 1.2.x / 1.2 means >=1.2.0 <1.3.0
    Wildcard(Partial),
    /// Hyphen range: 1.0.0 - 2.0.0 means >=1.0.0 <=2.0.0
    Hyphen { from: Partial, to: Partial },
}

impl VersionRange {
    /// Parse a single comparator into a VersionRange
    fn parse(spec: &str) -> Option<Self> {
        let spec = spec.trim();

        if let Some((from, to)) = spec.split_once(" - ") {
            let from = Partial::parse(from)?;
            let to = Partial::parse(to)?;
            return Some(VersionRange::Hyphen { from, to });
        }

        if let Some(rest) = spec.strip_prefix(">=") {
            Self::bounded(rest, VersionRange::Gte, true)
        } else if let Some(rest) = spec.strip_prefix('>') {
            Self::bounded(rest, VersionRange::Gt, false)
        } else if let Some(rest) = spec.strip_prefix("<=") {
            Self::bounded(rest, VersionRange::Lte, true)
        } else if let Some(rest) = spec.strip_prefix('<') {
            Self::bounded(rest, VersionRange::Lt, false)
        } else if let Some(rest) = spec.strip_prefix('^') {
            Self::bounded(rest, VersionRange::Caret, true)
        } else if let Some(rest) = spec.strip_prefix('~') {
            Self::bounded(rest, VersionRange::Tilde, true)
        } else {
            let partial = Partial::parse(spec)?;
            if partial.is_any() {
                Some(VersionRange::Any)
            } else if partial.is_full() {
                Some(VersionRange::Exact(partial.floor()))
            } else {
                Some(VersionRange::Wildcard(partial))
            }
        }
    }

    /// Build an operator range; a wildcard operand is `Any` for inclusive
    /// operators and unsatisfiable (None) for strict ones.
    fn bounded(rest: &str, make: fn(Partial) -> Self, inclusive: bool) -> Option<Self> {
        let partial = Partial::parse(rest)?;
        if partial.is_any() {
            return inclusive.then_some(VersionRange::Any);
        }
        Some(make(partial))
    }

    /// Check if a version satisfies this range
    fn satisfies(&self, version: &Version) -> bool {
        match self {
            VersionRange::Exact(v) => version == v,
            VersionRange::Caret(p) => {
                if version < &p.floor() {
                    return false;
                }
                // ^1.2.3 -> <2.0.0, ^0.2.3 -> <0.3.0, ^0.0.3 -> <0.0.4
                // ^0 -> <1.0.0, ^0.0 -> <0.1.0
                let major = p.major.unwrap_or(0);
                let end = match (p.minor, p.patch) {
                    _ if major > 0 => Version::new(major + 1, 0, 0),
                    (None, _) => Version::new(1, 0, 0),
                    (Some(minor), _) if minor > 0 => Version::new(0, minor + 1, 0),
                    (Some(_), None) => Version::new(0, 1, 0),
                    (Some(_), Some(patch)) => Version::new(0, 0, patch + 1),
                };
                below(version, &end)
            }
            VersionRange::Tilde(p) => {
                // ~1.2.3 -> >=1.2.3 <1.3.0, ~1 -> >=1.0.0 <2.0.0
                let major = p.major.unwrap_or(0);
                let end = match p.minor {
                    Some(minor) => Version::new(major, minor + 1, 0),
                    None => Version::new(major + 1, 0, 0),
                };
                version >= &p.floor() && below(version, &end)
            }
            VersionRange::Gte(p) => version >= &p.floor(),
            VersionRange::Gt(p) => {
                if p.is_full() {
                    version > &p.floor()
                } else {
                    // >1.2 -> >=1.3.0
                    version >= &p.x_range_end()
                }
            }
            VersionRange::Lte(p) => {
                if p.is_full() {
                    version <= &p.floor()
                } else {
                    // <=1.2 -> <1.3.0
                    below(version, &p.x_range_end())
                }
            }
            VersionRange::Lt(p) => {
                if p.is_full() {
                    version < &p.floor()
                } else {
                    // <1.2 -> <1.2.0
                    below(version, &p.floor())
                }
            }
            VersionRange::Any => true,
            VersionRange::Wildcard(p) => {
                version >= &p.floor() && below(version, &p.x_range_end())
            }
            VersionRange::Hyphen { from, to } => {
                let upper_ok = if to.is_any() {
                    true
                } else if to.is_full() {
                    version <= &to.floor()
                } else {
                    below(version, &to.x_range_end())
                };
                version >= &from.floor() && upper_ok
            }
        }
    }

    /// Whether this range names a pre-release on the same major.minor.patch
    fn allows_prerelease_of(&self, version: &Version) -> bool {
        let same_tuple = |v: &Version| {
            !v.pre.is_empty()
                && v.major == version.major
                && v.minor == version.minor
                && v.patch == version.patch
        };

        match self {
            VersionRange::Exact(v) => same_tuple(v),
            VersionRange::Caret(p)
            | VersionRange::Tilde(p)
            | VersionRange::Gte(p)
            | VersionRange::Gt(p)
            | VersionRange::Lte(p)
            | VersionRange::Lt(p)
            | VersionRange::Wildcard(p) => same_tuple(&p.floor()),
            VersionRange::Hyphen { from, to } => {
                same_tuple(&from.floor()) || same_tuple(&to.floor())
            }
            VersionRange::Any => false,
        }
    }
}

impl VersionMatcher for NpmVersionMatcher {
    fn is_satisfied(&self, declared_range: &str, latest_version: &str) -> bool {
        let Some(mut latest) = parse_full_version(latest_version) else {
            return false;
        };
        latest.build = BuildMetadata::EMPTY;

        let Some(spec) = VersionSpec::parse(declared_range) else {
            return false;
        };

        spec.satisfies(&latest)
    }
}
