//! Response wrapper pairing a status/header set with its body.
//!
//! Transports deliver status, headers and body as separate pieces;
//! [`Response`] keeps them together so they can travel through error values
//! and completion results as one unit. The body slot starts out as the raw
//! bytes and is typically replaced in place once the format strategy has
//! decoded it.

use std::collections::HashMap;

use serde_json::Value;

use crate::transport::RawResponse;

/// The body slot of a [`Response`].
#[derive(Clone, Debug, PartialEq)]
pub enum Body {
    /// The body verbatim as received from the transport.
    Raw(Vec<u8>),
    /// The body after the format strategy decoded it.
    Decoded(Value),
}

/// An HTTP response with a replaceable body.
///
/// Each response is owned exclusively by the call that produced it; nothing
/// is shared across requests.
#[derive(Clone, Debug)]
pub struct Response {
    status: u16,
    headers: HashMap<String, Vec<String>>,
    body: Body,
}

impl Response {
    /// Creates a response from its parts. Header names are normalized to
    /// lower case for lookup.
    #[must_use]
    pub fn new(status: u16, headers: HashMap<String, Vec<String>>, body: Vec<u8>) -> Self {
        let headers = headers
            .into_iter()
            .map(|(name, values)| (name.to_lowercase(), values))
            .collect();
        Self {
            status,
            headers,
            body: Body::Raw(body),
        }
    }

    /// Wraps a raw transport response.
    #[must_use]
    pub fn from_raw(raw: RawResponse) -> Self {
        Self::new(raw.status, raw.headers, raw.body)
    }

    /// The HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Returns `true` if the status code is in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status <= 299
    }

    /// Looks up a header by name, case-insensitively. Answers the first
    /// value when the header appears more than once.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// The current body slot.
    #[must_use]
    pub const fn body(&self) -> &Body {
        &self.body
    }

    /// Replaces the body, e.g. after decoding.
    pub fn set_body(&mut self, body: Body) {
        self.body = body;
    }

    /// The raw bytes, if the body has not been decoded yet.
    #[must_use]
    pub fn raw_body(&self) -> Option<&[u8]> {
        match &self.body {
            Body::Raw(bytes) => Some(bytes),
            Body::Decoded(_) => None,
        }
    }

    /// The decoded structure, if the body has been decoded.
    #[must_use]
    pub const fn decoded_body(&self) -> Option<&Value> {
        match &self.body {
            Body::Raw(_) => None,
            Body::Decoded(value) => Some(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response_with_header(name: &str, value: &str) -> Response {
        let mut headers = HashMap::new();
        headers.insert(name.to_string(), vec![value.to_string()]);
        Response::new(200, headers, Vec::new())
    }

    #[test]
    fn test_is_success_covers_2xx_only() {
        assert!(!Response::new(199, HashMap::new(), Vec::new()).is_success());
        assert!(Response::new(200, HashMap::new(), Vec::new()).is_success());
        assert!(Response::new(299, HashMap::new(), Vec::new()).is_success());
        assert!(!Response::new(300, HashMap::new(), Vec::new()).is_success());
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let response = response_with_header("Location", "/v1/widgets/7");
        assert_eq!(response.header("location"), Some("/v1/widgets/7"));
        assert_eq!(response.header("LOCATION"), Some("/v1/widgets/7"));
    }

    #[test]
    fn test_missing_header_answers_none() {
        let response = Response::new(200, HashMap::new(), Vec::new());
        assert!(response.header("location").is_none());
    }

    #[test]
    fn test_body_starts_raw() {
        let response = Response::new(200, HashMap::new(), b"{}".to_vec());
        assert_eq!(response.raw_body(), Some(b"{}".as_slice()));
        assert!(response.decoded_body().is_none());
    }

    #[test]
    fn test_set_body_replaces_in_place() {
        let mut response = Response::new(200, HashMap::new(), b"{\"a\":1}".to_vec());
        response.set_body(Body::Decoded(json!({"a": 1})));

        assert!(response.raw_body().is_none());
        assert_eq!(response.decoded_body(), Some(&json!({"a": 1})));
    }
}
