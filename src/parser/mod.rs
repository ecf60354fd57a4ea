//! Manifest decoding layer
//! - traits.rs: ManifestParser trait and ManifestError
//! - types.rs: DependencyDeclaration
//! - decode.rs: content-encoding handling for host-provided file content
//! - package_json.rs: package.json parser

pub mod decode;
pub mod package_json;
pub mod traits;
pub mod types;

pub use decode::{decode_content, decode_manifest};
pub use package_json::PackageJsonParser;
pub use traits::{ManifestError, ManifestParser};
pub use types::DependencyDeclaration;
