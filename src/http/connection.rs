//! Connection to a remote site.
//!
//! A [`Connection`] builds method-specific HTTP requests, sends them
//! through the configured transport, and classifies response status codes
//! into the error taxonomy. Connections carry no decoding responsibility of
//! their own beyond invoking the format strategy; with respect to
//! formatting they only set up the correct header fields and hand the body
//! to the format for decoding.
//!
//! Connections are cheap value objects. The service constructs a fresh one
//! per operation from its current configuration, so no locking is needed
//! around in-flight requests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;

use crate::error::Error;
use crate::format::Format;
use crate::http::request::{HttpMethod, Request};
use crate::http::response::{Body, Response};
use crate::transport::{Transport, TransportError};

/// Builds, sends and classifies HTTP requests against one site.
#[derive(Clone, Debug)]
pub struct Connection {
    site: Url,
    format: Arc<dyn Format>,
    transport: Arc<dyn Transport>,
    timeout: Option<Duration>,
    headers: HashMap<String, String>,
}

// Verify Connection is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Connection>();
};

impl Connection {
    /// Creates a connection for the given site, format and transport.
    #[must_use]
    pub fn new(site: Url, format: Arc<dyn Format>, transport: Arc<dyn Transport>) -> Self {
        Self {
            site,
            format,
            transport,
            timeout: None,
            headers: HashMap::new(),
        }
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the static headers applied to every request built by this
    /// connection. Caller-supplied headers override these key for key.
    #[must_use]
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    /// The site URL this connection targets.
    #[must_use]
    pub const fn site(&self) -> &Url {
        &self.site
    }

    /// Answers the format header for the given HTTP method.
    ///
    /// Body-less methods negotiate the response representation with
    /// `Accept`; body-carrying methods declare `Content-Type` as well.
    fn format_headers(&self, method: HttpMethod) -> HashMap<String, String> {
        let mime = self.format.mime_type().to_string();
        let mut headers = HashMap::new();
        if method.sends_body() {
            headers.insert("Content-Type".to_string(), mime.clone());
        }
        headers.insert("Accept".to_string(), mime);
        headers
    }

    /// Builds a request for the given method and site-relative path.
    ///
    /// Headers merge in increasing override priority: the format header for
    /// the method, this connection's static headers, then `extra_headers`
    /// for this call. Later sources fully override earlier ones key for
    /// key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Misconfigured`] if the path does not resolve
    /// against the site URL.
    pub fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        extra_headers: &HashMap<String, String>,
    ) -> Result<Request, Error> {
        let url = self
            .site
            .join(path)
            .map_err(|_| Error::Misconfigured("request path does not resolve against the site URL"))?;

        let mut headers = self.format_headers(method);
        for (key, value) in &self.headers {
            headers.insert(key.clone(), value.clone());
        }
        for (key, value) in extra_headers {
            headers.insert(key.clone(), value.clone());
        }

        Ok(Request {
            method,
            url,
            headers,
            body: None,
            timeout: self.timeout,
        })
    }

    /// Sends a request through the transport and wraps the raw response.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] for connectivity failures and
    /// [`Error::NotAnHttpResponse`] when the transport could not produce an
    /// HTTP-shaped response at all. Status codes are not inspected here;
    /// see [`Connection::handle_response`].
    pub async fn send(&self, request: Request) -> Result<Response, Error> {
        tracing::debug!(method = %request.method, url = %request.url, "sending request");
        match self.transport.send(request).await {
            Ok(raw) => Ok(Response::from_raw(raw)),
            Err(TransportError::NotHttp) => Err(Error::NotAnHttpResponse),
            Err(error) => Err(Error::Transport(error)),
        }
    }

    /// Decides how to handle a response based on its status code.
    ///
    /// Successful responses pass through unchanged. Anything else becomes
    /// the matching error value carrying the response; nothing is ever
    /// raised or panicked from here, so callers decide how to react.
    ///
    /// # Errors
    ///
    /// One error variant per status range:
    ///
    /// | status  | error |
    /// |---------|-------|
    /// | 200-299 | none |
    /// | 300-399 | [`Error::Redirection`] |
    /// | 400     | [`Error::BadRequest`] |
    /// | 401     | [`Error::UnauthorizedAccess`] |
    /// | 403     | [`Error::ForbiddenAccess`] |
    /// | 404     | [`Error::ResourceNotFound`] |
    /// | 405     | [`Error::MethodNotAllowed`] |
    /// | 409     | [`Error::ResourceConflict`] |
    /// | 410     | [`Error::ResourceGone`] |
    /// | 422     | [`Error::ResourceInvalid`] |
    /// | other 4xx | [`Error::ClientError`] |
    /// | 5xx and anything else | [`Error::ServerError`] |
    pub fn handle_response(response: Response) -> Result<Response, Error> {
        let status = response.status();
        if response.is_success() {
            return Ok(response);
        }
        tracing::warn!(status, "request failed");
        Err(match status {
            300..=399 => Error::Redirection { response },
            400 => Error::BadRequest { response },
            401 => Error::UnauthorizedAccess { response },
            403 => Error::ForbiddenAccess { response },
            404 => Error::ResourceNotFound { response },
            405 => Error::MethodNotAllowed { response },
            409 => Error::ResourceConflict { response },
            410 => Error::ResourceGone { response },
            422 => Error::ResourceInvalid { response },
            402 | 406..=408 | 411..=421 | 423..=499 => Error::ClientError { response },
            _ => Error::ServerError { response },
        })
    }

    /// Decodes the raw body in place using this connection's format.
    ///
    /// Responses whose body has already been decoded pass through
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DecodeFailure`] when the body does not parse.
    pub fn decode(&self, response: &mut Response) -> Result<(), Error> {
        if let Some(bytes) = response.raw_body() {
            let decoded = self.format.decode(bytes).map_err(|error| {
                tracing::warn!(%error, "response body failed to decode");
                error
            })?;
            response.set_body(Body::Decoded(decoded));
        }
        Ok(())
    }

    /// Extracts a newly-created resource's numeric identifier from a
    /// `Location` header value.
    ///
    /// The identifier is the final path segment, matched as a trailing
    /// `/<digits>` sequence optionally followed by a format extension.
    /// Absence of a match answers `None`; that is not an error by itself.
    ///
    /// # Example
    ///
    /// ```rust
    /// use restkit::http::Connection;
    ///
    /// assert_eq!(Connection::id_from_location("/v1/widgets/42.json"), Some(42));
    /// assert_eq!(Connection::id_from_location("/v1/widgets/7"), Some(7));
    /// assert_eq!(Connection::id_from_location("/v1/widgets/"), None);
    /// ```
    #[must_use]
    pub fn id_from_location(location: &str) -> Option<u64> {
        let path = location
            .split(|c| c == '?' || c == '#')
            .next()
            .unwrap_or(location);
        let segment = path.rsplit('/').next()?;
        let stem = segment.split('.').next().unwrap_or(segment);
        if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        stem.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::JsonFormat;
    use crate::transport::{RawResponse, SendFuture};

    /// Transport stub that never sends anything; header and path tests
    /// stop before dispatch.
    #[derive(Debug)]
    struct InertTransport;

    impl Transport for InertTransport {
        fn send(&self, _request: Request) -> SendFuture<'_> {
            Box::pin(async {
                Ok(RawResponse {
                    status: 200,
                    headers: HashMap::new(),
                    body: Vec::new(),
                })
            })
        }
    }

    fn connection() -> Connection {
        Connection::new(
            Url::parse("https://api.example.com/v1").unwrap(),
            Arc::new(JsonFormat::new()),
            Arc::new(InertTransport),
        )
    }

    fn response(status: u16) -> Response {
        Response::new(status, HashMap::new(), Vec::new())
    }

    #[test]
    fn test_get_head_delete_negotiate_with_accept() {
        let connection = connection();
        for method in [HttpMethod::Get, HttpMethod::Head, HttpMethod::Delete] {
            let request = connection
                .build_request(method, "/v1/widgets", &HashMap::new())
                .unwrap();
            assert_eq!(
                request.headers.get("Accept"),
                Some(&"application/json".to_string())
            );
            assert!(!request.headers.contains_key("Content-Type"));
        }
    }

    #[test]
    fn test_post_put_declare_content_type() {
        let connection = connection();
        for method in [HttpMethod::Post, HttpMethod::Put] {
            let request = connection
                .build_request(method, "/v1/widgets", &HashMap::new())
                .unwrap();
            assert_eq!(
                request.headers.get("Content-Type"),
                Some(&"application/json".to_string())
            );
            assert_eq!(
                request.headers.get("Accept"),
                Some(&"application/json".to_string())
            );
        }
    }

    #[test]
    fn test_header_override_priority() {
        let mut static_headers = HashMap::new();
        static_headers.insert("Accept".to_string(), "application/xml".to_string());
        static_headers.insert("X-Site".to_string(), "static".to_string());

        let mut call_headers = HashMap::new();
        call_headers.insert("X-Site".to_string(), "call".to_string());

        let connection = connection().with_headers(static_headers);
        let request = connection
            .build_request(HttpMethod::Get, "/v1/widgets", &call_headers)
            .unwrap();

        // Static headers override the format header; call headers override
        // static ones.
        assert_eq!(
            request.headers.get("Accept"),
            Some(&"application/xml".to_string())
        );
        assert_eq!(request.headers.get("X-Site"), Some(&"call".to_string()));
    }

    #[test]
    fn test_request_url_resolves_against_site() {
        let request = connection()
            .build_request(HttpMethod::Get, "/v1/widgets?page=2", &HashMap::new())
            .unwrap();
        assert_eq!(
            request.url.as_str(),
            "https://api.example.com/v1/widgets?page=2"
        );
    }

    #[test]
    fn test_handle_response_accepts_2xx_boundaries() {
        assert!(Connection::handle_response(response(200)).is_ok());
        assert!(Connection::handle_response(response(299)).is_ok());
    }

    #[test]
    fn test_handle_response_status_table() {
        let cases: &[(u16, fn(&Error) -> bool)] = &[
            (300, |e| matches!(e, Error::Redirection { .. })),
            (399, |e| matches!(e, Error::Redirection { .. })),
            (400, |e| matches!(e, Error::BadRequest { .. })),
            (401, |e| matches!(e, Error::UnauthorizedAccess { .. })),
            (403, |e| matches!(e, Error::ForbiddenAccess { .. })),
            (404, |e| matches!(e, Error::ResourceNotFound { .. })),
            (405, |e| matches!(e, Error::MethodNotAllowed { .. })),
            (409, |e| matches!(e, Error::ResourceConflict { .. })),
            (410, |e| matches!(e, Error::ResourceGone { .. })),
            (422, |e| matches!(e, Error::ResourceInvalid { .. })),
            (402, |e| matches!(e, Error::ClientError { .. })),
            (418, |e| matches!(e, Error::ClientError { .. })),
            (499, |e| matches!(e, Error::ClientError { .. })),
            (500, |e| matches!(e, Error::ServerError { .. })),
            (599, |e| matches!(e, Error::ServerError { .. })),
        ];

        for (status, matches_kind) in cases {
            let error = Connection::handle_response(response(*status)).unwrap_err();
            assert!(matches_kind(&error), "status {status} mapped to {error:?}");
            assert_eq!(error.status(), Some(*status));
        }
    }

    #[test]
    fn test_decode_replaces_raw_body() {
        let connection = connection();
        let mut response = Response::new(200, HashMap::new(), b"[1,2]".to_vec());
        connection.decode(&mut response).unwrap();
        assert_eq!(
            response.decoded_body(),
            Some(&serde_json::json!([1, 2]))
        );
    }

    #[test]
    fn test_decode_failure_surfaces_as_error() {
        let connection = connection();
        let mut response = Response::new(200, HashMap::new(), b"{broken".to_vec());
        let result = connection.decode(&mut response);
        assert!(matches!(result, Err(Error::DecodeFailure(_))));
    }

    #[test]
    fn test_id_from_location_variants() {
        assert_eq!(
            Connection::id_from_location("https://api.example.com/v1/widgets/42.json"),
            Some(42)
        );
        assert_eq!(Connection::id_from_location("/v1/widgets/7"), Some(7));
        assert_eq!(Connection::id_from_location("/v1/widgets/"), None);
        assert_eq!(Connection::id_from_location("/v1/widgets/new"), None);
        assert_eq!(Connection::id_from_location("/v1/widgets/42?verbose=1"), Some(42));
        assert_eq!(Connection::id_from_location(""), None);
    }
}
