//! Common types for manifest parsers

/// A dependency as declared in a manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyDeclaration {
    /// Key under which the dependency is declared
    pub name: String,
    /// Version range exactly as written in the manifest
    pub declared_range: String,
}

impl DependencyDeclaration {
    pub fn new(name: impl Into<String>, declared_range: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_range: declared_range.into(),
        }
    }

    /// Registry package and range to check.
    ///
    /// npm aliases (`npm:package@range`) resolve to the aliased package;
    /// anything else resolves to the declared name and range.
    pub fn lookup_target(&self) -> (&str, &str) {
        parse_npm_alias(&self.declared_range)
            .unwrap_or((self.name.as_str(), self.declared_range.as_str()))
    }
}

/// Parse npm alias format: npm:package@version or npm:@scope/package@version
/// Returns (actual_package_name, version)
fn parse_npm_alias(value: &str) -> Option<(&str, &str)> {
    let rest = value.strip_prefix("npm:")?;

    // Scoped packages start with '@', so the version separator is the '@'
    // after the first '/'
    let search_from = if rest.starts_with('@') {
        rest.find('/')? + 1
    } else {
        0
    };

    match rest[search_from..].find('@') {
        Some(at_pos) => {
            let split = search_from + at_pos;
            Some((&rest[..split], &rest[split + 1..]))
        }
        // No version: use "latest"
        None => Some((rest, "latest")),
    }
}
