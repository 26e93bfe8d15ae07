//! Error types for the transcoder.
//!
//! Only problems that stop a whole conversion live here. Node-level and
//! attribute-level problems are recovered locally and reported as
//! [`Diagnostic`](crate::diagnostics::Diagnostic)s instead.

use thiserror::Error;

/// Main error type for the transcoder library.
#[derive(Debug, Error)]
pub enum TranscodeError {
    /// XML parsing failed.
    #[error("XML parsing failed: {0}")]
    XmlParse(#[from] quick_xml::Error),

    /// The XML was well-formed token by token but not a single document.
    #[error("Malformed XML document: {0}")]
    MalformedXml(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A value of the wrong abstraction reached an encode entry point
    /// while the converter runs in strict mode.
    #[error("API misuse while encoding <{tag}>: {message}")]
    ApiMisuse { tag: String, message: String },

    /// The root element was dropped or pruned by its codec.
    #[error("Root element <{tag}> was dropped during conversion")]
    RootDropped { tag: String },

    /// A variant matcher pattern failed to compile.
    #[error("Invalid variant pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// `check --strict` found problems in the document.
    #[error("Check failed: {problems} problem(s) found")]
    CheckFailed { problems: usize },

    /// YAML serialization error.
    #[error("YAML serialization failed: {0}")]
    YamlSerialization(#[from] serde_yaml_ng::Error),
}

/// Result type alias for transcoder operations.
pub type Result<T> = std::result::Result<T, TranscodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_misuse_display() {
        let err = TranscodeError::ApiMisuse {
            tag: "node".to_string(),
            message: "generic node in domain tree".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "API misuse while encoding <node>: generic node in domain tree"
        );
    }

    #[test]
    fn test_root_dropped_display() {
        let err = TranscodeError::RootDropped {
            tag: "map".to_string(),
        };
        assert!(err.to_string().contains("<map>"));
    }

    #[test]
    fn test_xml_parse_from() {
        let err = crate::xml::parse_document("<a></b>").unwrap_err();
        assert!(err.to_string().starts_with("XML parsing failed"), "{err}");
    }

    #[test]
    fn test_malformed_xml_display() {
        let err = TranscodeError::MalformedXml("<node> is not closed".to_string());
        assert_eq!(err.to_string(), "Malformed XML document: <node> is not closed");
    }
}
