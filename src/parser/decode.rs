//! Content-encoding handling for files returned by a source host

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::warn;

use crate::hosting::FileContent;
use crate::parser::traits::{ManifestError, ManifestParser};
use crate::parser::types::DependencyDeclaration;

/// Decode host-provided file content into text.
///
/// Supports `base64` (embedded whitespace is ignored, GitHub wraps lines) and
/// plain text tags (`utf-8`, `utf8`, or no tag).
pub fn decode_content(file: &FileContent) -> Result<String, ManifestError> {
    let bytes = match file.encoding.to_ascii_lowercase().as_str() {
        "base64" => {
            let compact: String = file
                .content
                .chars()
                .filter(|c| !c.is_ascii_whitespace())
                .collect();
            STANDARD.decode(compact).map_err(|e| {
                warn!("Invalid base64 manifest content: {}", e);
                ManifestError::Decode(e.to_string())
            })?
        }
        "" | "utf-8" | "utf8" => file.content.clone().into_bytes(),
        other => {
            return Err(ManifestError::Decode(format!(
                "Unsupported encoding: {}",
                other
            )));
        }
    };

    String::from_utf8(bytes).map_err(|e| ManifestError::Decode(e.to_string()))
}

/// Decode file content and parse it with the given manifest parser
pub fn decode_manifest(
    parser: &dyn ManifestParser,
    file: &FileContent,
) -> Result<Vec<DependencyDeclaration>, ManifestError> {
    let text = decode_content(file)?;
    parser.parse(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::PackageJsonParser;
    use rstest::rstest;

    fn file(content: &str, encoding: &str) -> FileContent {
        FileContent {
            content: content.to_string(),
            encoding: encoding.to_string(),
        }
    }

    #[rstest]
    #[case("eyJhIjogMX0=", "base64")]
    #[case("eyJhIjog\nMX0=\n", "base64")]
    #[case("eyJhIjogMX0=", "BASE64")]
    #[case(r#"{"a": 1}"#, "utf-8")]
    #[case(r#"{"a": 1}"#, "")]
    fn decode_content_returns_text(#[case] content: &str, #[case] encoding: &str) {
        assert_eq!(
            decode_content(&file(content, encoding)).unwrap(),
            r#"{"a": 1}"#
        );
    }

    #[test]
    fn decode_content_rejects_invalid_base64() {
        let result = decode_content(&file("not base64!!", "base64"));

        assert!(matches!(result, Err(ManifestError::Decode(_))));
    }

    #[test]
    fn decode_content_rejects_unknown_encoding() {
        let result = decode_content(&file("{}", "gzip"));

        assert!(matches!(result, Err(ManifestError::Decode(_))));
    }

    #[test]
    fn decode_content_rejects_non_utf8_bytes() {
        // 0xff 0xfe is not valid UTF-8
        let result = decode_content(&file("//4=", "base64"));

        assert!(matches!(result, Err(ManifestError::Decode(_))));
    }

    #[test]
    fn decode_manifest_parses_decoded_text() {
        // {"dependencies": {"left-pad": "^1.0.0"}}
        let encoded = STANDARD.encode(r#"{"dependencies": {"left-pad": "^1.0.0"}}"#);

        let result = decode_manifest(&PackageJsonParser::new(), &file(&encoded, "base64")).unwrap();

        assert_eq!(
            result,
            vec![DependencyDeclaration::new("left-pad", "^1.0.0")]
        );
    }

    #[test]
    fn decode_manifest_reports_parse_error_for_non_json_text() {
        let encoded = STANDARD.encode("not json");

        let result = decode_manifest(&PackageJsonParser::new(), &file(&encoded, "base64"));

        assert!(matches!(result, Err(ManifestError::Parse(_))));
    }
}
