//! Body format strategies for encoding and decoding resource payloads.
//!
//! A [`Format`] converts between wire bytes and in-memory attribute
//! structures. The connection uses the format's MIME type for content
//! negotiation, and path building appends the format's extension (when it
//! has one) to generated paths.
//!
//! [`JsonFormat`] is the default strategy and covers the common case of
//! JSON-speaking services. Other formats can be plugged in by implementing
//! the trait.

use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;

/// Error produced by a format strategy while encoding or decoding a body.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct FormatError {
    message: String,
}

impl FormatError {
    /// Creates a new format error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for FormatError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(error.to_string())
    }
}

/// A pluggable codec between wire bytes and attribute structures.
///
/// Formats carry three responsibilities: naming their MIME type for
/// request-header negotiation, optionally naming a path extension, and
/// converting payloads in both directions.
///
/// Implementations must be thread-safe; a single format instance is shared
/// by every resource bound to the same service.
pub trait Format: fmt::Debug + Send + Sync {
    /// The MIME type sent in `Accept` and `Content-Type` headers.
    fn mime_type(&self) -> &str;

    /// The path extension appended to generated paths, without the leading
    /// dot. `None` means paths carry no extension.
    fn extension(&self) -> Option<&str> {
        None
    }

    /// Serializes an attribute map into body bytes.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] if the attributes cannot be represented in
    /// this format.
    fn encode(&self, attributes: &Map<String, Value>) -> Result<Vec<u8>, FormatError>;

    /// Parses body bytes into a decoded structure.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] if the bytes do not parse as this format.
    fn decode(&self, bytes: &[u8]) -> Result<Value, FormatError>;
}

/// JSON body format backed by `serde_json`.
///
/// By default the format produces extension-less paths (`/widgets`), which
/// matches services that negotiate purely through headers. Services that
/// expect Rails-style suffixed paths (`/widgets.json`) can opt in with
/// [`JsonFormat::with_extension`].
///
/// # Example
///
/// ```rust
/// use restkit::format::{Format, JsonFormat};
/// use serde_json::json;
///
/// let format = JsonFormat::new();
/// assert_eq!(format.mime_type(), "application/json");
/// assert!(format.extension().is_none());
///
/// let decoded = format.decode(br#"{"name":"x"}"#).unwrap();
/// assert_eq!(decoded, json!({"name": "x"}));
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonFormat {
    extension: Option<&'static str>,
}

impl JsonFormat {
    /// Creates a JSON format with no path extension.
    #[must_use]
    pub const fn new() -> Self {
        Self { extension: None }
    }

    /// Creates a JSON format whose generated paths end in `.json`.
    #[must_use]
    pub const fn with_extension() -> Self {
        Self {
            extension: Some("json"),
        }
    }
}

impl Format for JsonFormat {
    fn mime_type(&self) -> &str {
        "application/json"
    }

    fn extension(&self) -> Option<&str> {
        self.extension
    }

    fn encode(&self, attributes: &Map<String, Value>) -> Result<Vec<u8>, FormatError> {
        Ok(serde_json::to_vec(attributes)?)
    }

    /// Decodes JSON bytes. An empty body decodes to [`Value::Null`] since
    /// responses to create and delete requests routinely arrive without a
    /// body.
    fn decode(&self, bytes: &[u8]) -> Result<Value, FormatError> {
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mime_type_is_json() {
        assert_eq!(JsonFormat::new().mime_type(), "application/json");
    }

    #[test]
    fn test_default_format_has_no_extension() {
        assert!(JsonFormat::new().extension().is_none());
    }

    #[test]
    fn test_with_extension_answers_json() {
        assert_eq!(JsonFormat::with_extension().extension(), Some("json"));
    }

    #[test]
    fn test_encode_produces_json_bytes() {
        let mut attributes = Map::new();
        attributes.insert("name".to_string(), json!("x"));
        attributes.insert("count".to_string(), json!(3));

        let bytes = JsonFormat::new().encode(&attributes).unwrap();
        assert_eq!(bytes, br#"{"name":"x","count":3}"#);
    }

    #[test]
    fn test_decode_parses_object() {
        let decoded = JsonFormat::new().decode(br#"{"id":42}"#).unwrap();
        assert_eq!(decoded, json!({"id": 42}));
    }

    #[test]
    fn test_decode_empty_body_is_null() {
        let decoded = JsonFormat::new().decode(b"").unwrap();
        assert_eq!(decoded, Value::Null);
    }

    #[test]
    fn test_decode_rejects_malformed_input() {
        let result = JsonFormat::new().decode(b"{not json");
        assert!(result.is_err());
    }
}
