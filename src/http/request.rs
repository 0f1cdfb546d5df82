//! HTTP request types.
//!
//! A [`Request`] is the fully-resolved description of one HTTP exchange:
//! verb, absolute URL, headers and optional body. Requests are built fresh
//! per operation by [`Connection`](crate::http::Connection) and are never
//! mutated after they are handed to the transport.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use reqwest::Url;

/// HTTP methods used by the resource operations.
///
/// The string form uses the exact upper-case wire casing; the same casing
/// drives the per-method format-header negotiation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET method for retrieving resources.
    Get,
    /// HTTP POST method for creating resources.
    Post,
    /// HTTP PUT method for updating resources.
    Put,
    /// HTTP DELETE method for removing resources.
    Delete,
    /// HTTP HEAD method for metadata-only retrieval, such as existence
    /// checks.
    Head,
}

impl HttpMethod {
    /// Returns the wire form of the method.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
        }
    }

    /// Returns `true` for methods that carry a request body.
    #[must_use]
    pub const fn sends_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully-resolved HTTP request.
#[derive(Clone, Debug)]
pub struct Request {
    /// The HTTP method for this request.
    pub method: HttpMethod,
    /// The absolute URL, site joined with the resolved path and query.
    pub url: Url,
    /// All headers for this request, fully merged.
    pub headers: HashMap<String, String>,
    /// The encoded request body, if any.
    pub body: Option<Vec<u8>>,
    /// Per-request timeout, enforced by the transport.
    pub timeout: Option<Duration>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_wire_casing_is_upper() {
        assert_eq!(HttpMethod::Get.as_str(), "GET");
        assert_eq!(HttpMethod::Post.as_str(), "POST");
        assert_eq!(HttpMethod::Put.as_str(), "PUT");
        assert_eq!(HttpMethod::Delete.as_str(), "DELETE");
        assert_eq!(HttpMethod::Head.as_str(), "HEAD");
    }

    #[test]
    fn test_display_matches_wire_form() {
        assert_eq!(HttpMethod::Head.to_string(), "HEAD");
    }

    #[test]
    fn test_only_post_and_put_send_bodies() {
        assert!(HttpMethod::Post.sends_body());
        assert!(HttpMethod::Put.sends_body());
        assert!(!HttpMethod::Get.sends_body());
        assert!(!HttpMethod::Delete.sends_body());
        assert!(!HttpMethod::Head.sends_body());
    }
}
