//! The network transport boundary.
//!
//! A [`Transport`] takes a fully-built [`Request`] and produces the raw
//! status/headers/body triple of the response. The core never talks to the
//! network directly; everything funnels through this trait, which keeps the
//! addressing and classification logic testable against canned responses.
//!
//! [`ReqwestTransport`] is the default implementation, backed by a shared
//! `reqwest` client with rustls TLS.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::http::request::{HttpMethod, Request};

/// Error produced by a transport before any usable response arrived.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connectivity failure: DNS, connect, TLS or timeout. No response is
    /// available.
    #[error("transport failure: {0}")]
    Failed(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The underlying response was not HTTP-shaped at all, so there is no
    /// status code to classify.
    #[error("the underlying response is not an HTTP response")]
    NotHttp,
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        Self::Failed(Box::new(error))
    }
}

/// The raw response triple handed back by a transport.
///
/// Header names are expected in lower case; [`crate::http::Response`]
/// normalizes them again when wrapping.
#[derive(Clone, Debug)]
pub struct RawResponse {
    /// The HTTP status code.
    pub status: u16,
    /// Response headers; a header may carry multiple values.
    pub headers: HashMap<String, Vec<String>>,
    /// The response body, verbatim and undecoded.
    pub body: Vec<u8>,
}

/// Future type returned by [`Transport::send`].
pub type SendFuture<'a> = Pin<Box<dyn Future<Output = Result<RawResponse, TransportError>> + Send + 'a>>;

/// Sends HTTP requests and returns raw responses.
///
/// Implementations are responsible for enforcing the per-request timeout
/// carried on the [`Request`]; the core treats an elapsed timeout as an
/// ordinary [`TransportError::Failed`].
pub trait Transport: fmt::Debug + Send + Sync {
    /// Sends the request and resolves with the raw response or a transport
    /// error. Exactly one of the two outcomes is delivered.
    fn send(&self, request: Request) -> SendFuture<'_>;
}

/// Default transport backed by a shared `reqwest` client.
#[derive(Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

// Verify ReqwestTransport is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ReqwestTransport>();
};

impl ReqwestTransport {
    /// Creates a transport with a fresh client.
    ///
    /// # Panics
    ///
    /// Panics if the underlying reqwest client cannot be created. This should
    /// only happen in extremely unusual circumstances (e.g., TLS
    /// initialization failure).
    #[must_use]
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .build()
            .expect("Failed to create HTTP client");
        Self { client }
    }

    /// Parses response headers into a lower-cased multi-value map.
    fn parse_response_headers(headers: &reqwest::header::HeaderMap) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: Request) -> SendFuture<'_> {
        Box::pin(async move {
            let mut builder = match request.method {
                HttpMethod::Get => self.client.get(request.url.clone()),
                HttpMethod::Post => self.client.post(request.url.clone()),
                HttpMethod::Put => self.client.put(request.url.clone()),
                HttpMethod::Delete => self.client.delete(request.url.clone()),
                HttpMethod::Head => self.client.head(request.url.clone()),
            };

            for (key, value) in &request.headers {
                builder = builder.header(key, value);
            }

            if let Some(timeout) = request.timeout {
                builder = builder.timeout(timeout);
            }

            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await?;

            let status = response.status().as_u16();
            let headers = Self::parse_response_headers(response.headers());
            let body = response.bytes().await?.to_vec();

            Ok(RawResponse {
                status,
                headers,
                body,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_wraps_source() {
        let error = TransportError::Failed("connection refused".into());
        assert!(error.to_string().contains("connection refused"));
    }

    #[test]
    fn test_not_http_error_message() {
        let error = TransportError::NotHttp;
        assert!(error.to_string().contains("not an HTTP response"));
    }

    #[test]
    fn test_reqwest_transport_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ReqwestTransport>();
    }
}
