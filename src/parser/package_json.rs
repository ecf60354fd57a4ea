//! package.json parser

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::parser::traits::{ManifestError, ManifestParser};
use crate::parser::types::DependencyDeclaration;

/// Dependency groups read from package.json, in document order
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageJson {
    dependencies: Option<IndexMap<String, String>>,
    dev_dependencies: Option<IndexMap<String, String>>,
}

/// Parser for package.json files
pub struct PackageJsonParser;

impl PackageJsonParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PackageJsonParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ManifestParser for PackageJsonParser {
    fn manifest_name(&self) -> &'static str {
        "package.json"
    }

    /// Runtime dependencies first, then devDependencies overlaid on top.
    /// A name present in both keeps its runtime position and takes the
    /// devDependencies range.
    fn parse(&self, content: &str) -> Result<Vec<DependencyDeclaration>, ManifestError> {
        let manifest: PackageJson = serde_json::from_str(content).map_err(|e| {
            warn!("Failed to parse package.json: {}", e);
            ManifestError::Parse(e.to_string())
        })?;

        let mut merged = manifest.dependencies.unwrap_or_default();
        for (name, range) in manifest.dev_dependencies.unwrap_or_default() {
            merged.insert(name, range);
        }

        debug!("Extracted {} dependencies from package.json", merged.len());

        Ok(merged
            .into_iter()
            .map(|(name, range)| DependencyDeclaration::new(name, range))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decl(name: &str, range: &str) -> DependencyDeclaration {
        DependencyDeclaration::new(name, range)
    }

    #[test]
    fn parse_extracts_dependencies() {
        let parser = PackageJsonParser::new();
        let content = r#"{
  "name": "my-app",
  "dependencies": {
    "lodash": "4.17.21"
  }
}"#;
        let result = parser.parse(content).unwrap();
        assert_eq!(result, vec![decl("lodash", "4.17.21")]);
    }

    #[test]
    fn parse_extracts_dev_dependencies() {
        let parser = PackageJsonParser::new();
        let content = r#"{
  "name": "my-app",
  "devDependencies": {
    "typescript": "5.0.0"
  }
}"#;
        let result = parser.parse(content).unwrap();
        assert_eq!(result, vec![decl("typescript", "5.0.0")]);
    }

    #[test]
    fn parse_merges_disjoint_groups_in_declaration_order() {
        let parser = PackageJsonParser::new();
        let content = r#"{
  "devDependencies": {
    "typescript": "^5.0.0",
    "eslint": "^8.0.0"
  },
  "dependencies": {
    "react": "^18.2.0",
    "lodash": "^4.17.21"
  }
}"#;
        let result = parser.parse(content).unwrap();
        assert_eq!(
            result,
            vec![
                decl("react", "^18.2.0"),
                decl("lodash", "^4.17.21"),
                decl("typescript", "^5.0.0"),
                decl("eslint", "^8.0.0"),
            ]
        );
    }

    #[test]
    fn parse_lets_dev_dependencies_override_runtime_range() {
        let parser = PackageJsonParser::new();
        let content = r#"{
  "dependencies": {
    "react": "^17.0.0",
    "lodash": "^4.17.21"
  },
  "devDependencies": {
    "jest": "^29.0.0",
    "react": "^18.2.0"
  }
}"#;
        let result = parser.parse(content).unwrap();
        assert_eq!(
            result,
            vec![
                decl("react", "^18.2.0"),
                decl("lodash", "^4.17.21"),
                decl("jest", "^29.0.0"),
            ]
        );
    }

    #[test]
    fn parse_ignores_peer_and_optional_dependencies() {
        let parser = PackageJsonParser::new();
        let content = r#"{
  "peerDependencies": { "react": ">=16.8.0" },
  "optionalDependencies": { "fsevents": "^2.3.0" }
}"#;
        let result = parser.parse(content).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn parse_returns_empty_for_manifest_without_dependencies() {
        let parser = PackageJsonParser::new();
        let result = parser.parse(r#"{"name": "empty", "version": "1.0.0"}"#).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn parse_treats_null_groups_as_empty() {
        let parser = PackageJsonParser::new();
        let result = parser
            .parse(r#"{"dependencies": null, "devDependencies": {"jest": "^29.0.0"}}"#)
            .unwrap();
        assert_eq!(result, vec![decl("jest", "^29.0.0")]);
    }

    #[test]
    fn parse_keeps_non_registry_ranges_verbatim() {
        let parser = PackageJsonParser::new();
        let content = r#"{
  "dependencies": {
    "my-lib": "github:user/my-lib",
    "local": "file:../local",
    "my-lodash": "npm:lodash@^4.17.0"
  }
}"#;
        let result = parser.parse(content).unwrap();
        assert_eq!(
            result,
            vec![
                decl("my-lib", "github:user/my-lib"),
                decl("local", "file:../local"),
                decl("my-lodash", "npm:lodash@^4.17.0"),
            ]
        );
    }

    #[test]
    fn parse_fails_for_invalid_json() {
        let parser = PackageJsonParser::new();
        let result = parser.parse(r#"{"dependencies": {"lodash": "#);
        assert!(matches!(result, Err(ManifestError::Parse(_))));
    }

    #[test]
    fn parse_fails_for_non_object_root() {
        let parser = PackageJsonParser::new();
        let result = parser.parse(r#"["lodash"]"#);
        assert!(matches!(result, Err(ManifestError::Parse(_))));
    }

    #[test]
    fn parse_fails_for_non_string_range() {
        let parser = PackageJsonParser::new();
        let result = parser.parse(r#"{"dependencies": {"lodash": 4}}"#);
        assert!(matches!(result, Err(ManifestError::Parse(_))));
    }
}
