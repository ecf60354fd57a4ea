//! Manifest parser trait definition

use crate::parser::types::DependencyDeclaration;

/// Trait for parsing dependency manifests
pub trait ManifestParser: Send + Sync {
    /// Path of the manifest inside a repository (e.g. "package.json")
    fn manifest_name(&self) -> &'static str;

    /// Parse the decoded text and extract the merged dependency declarations
    fn parse(&self, content: &str) -> Result<Vec<DependencyDeclaration>, ManifestError>;
}

/// Error type for manifest decoding and parsing
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// The raw bytes could not be decoded into text
    #[error("Failed to decode manifest: {0}")]
    Decode(String),

    /// The text is not a valid manifest
    #[error("Failed to parse manifest: {0}")]
    Parse(String),
}
