//! The error taxonomy shared by every operation in the crate.
//!
//! There is exactly one failure channel: every operation resolves with
//! either a value or an [`Error`]. The library never panics for expected
//! failure modes; bad status codes, decode failures and missing
//! identifiers all arrive here as values.
//!
//! Status-derived variants carry the wrapped [`Response`] so callers can
//! inspect headers and the (possibly decoded) body of the failed exchange.
//!
//! # Example
//!
//! ```rust,ignore
//! use restkit::Error;
//!
//! match service.find_single(42, &options).await {
//!     Ok(resource) => println!("found {:?}", resource.id()),
//!     Err(Error::ResourceNotFound { .. }) => println!("no such widget"),
//!     Err(Error::Transport(e)) => println!("network trouble: {e}"),
//!     Err(e) => println!("failed: {e}"),
//! }
//! ```

use thiserror::Error;

use crate::format::FormatError;
use crate::http::response::Response;
use crate::transport::TransportError;

/// Unified error type for resource operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A precondition was violated before any request could be made, such
    /// as path building without a site URL. Fatal to the call; never
    /// retried.
    #[error("service misconfigured: {0}")]
    Misconfigured(&'static str),

    /// The transport failed before a response arrived (connectivity,
    /// timeout). No response is available.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with a 3xx status.
    #[error("request redirected ({})", .response.status())]
    Redirection {
        /// The wrapped redirect response.
        response: Response,
    },

    /// The server rejected the request as malformed (400).
    #[error("bad request ({})", .response.status())]
    BadRequest {
        /// The wrapped response.
        response: Response,
    },

    /// The request lacked valid credentials (401).
    #[error("unauthorized access ({})", .response.status())]
    UnauthorizedAccess {
        /// The wrapped response.
        response: Response,
    },

    /// The server refused to authorize the request (403).
    #[error("forbidden access ({})", .response.status())]
    ForbiddenAccess {
        /// The wrapped response.
        response: Response,
    },

    /// The resource does not exist (404), or a convenience lookup found an
    /// empty collection.
    #[error("resource not found ({})", .response.status())]
    ResourceNotFound {
        /// The wrapped response.
        response: Response,
    },

    /// The method is not allowed for this resource (405).
    #[error("method not allowed ({})", .response.status())]
    MethodNotAllowed {
        /// The wrapped response.
        response: Response,
    },

    /// The request conflicted with the current resource state (409).
    #[error("resource conflict ({})", .response.status())]
    ResourceConflict {
        /// The wrapped response.
        response: Response,
    },

    /// The resource existed once but is gone (410).
    #[error("resource gone ({})", .response.status())]
    ResourceGone {
        /// The wrapped response.
        response: Response,
    },

    /// The server found the resource representation invalid (422).
    #[error("resource invalid ({})", .response.status())]
    ResourceInvalid {
        /// The wrapped response.
        response: Response,
    },

    /// Any other 4xx client error.
    #[error("client error ({})", .response.status())]
    ClientError {
        /// The wrapped response.
        response: Response,
    },

    /// A 5xx server error, or a status outside every recognized range.
    #[error("server error ({})", .response.status())]
    ServerError {
        /// The wrapped response.
        response: Response,
    },

    /// The response body did not parse as the expected format, or a payload
    /// could not be encoded for sending.
    #[error("body format failure: {0}")]
    DecodeFailure(#[from] FormatError),

    /// The underlying response is not HTTP-shaped at all, so no status code
    /// exists to classify.
    #[error("the response is not an HTTP response")]
    NotAnHttpResponse,
}

impl Error {
    /// The wrapped response, for status-derived errors.
    #[must_use]
    pub const fn response(&self) -> Option<&Response> {
        match self {
            Self::Redirection { response }
            | Self::BadRequest { response }
            | Self::UnauthorizedAccess { response }
            | Self::ForbiddenAccess { response }
            | Self::ResourceNotFound { response }
            | Self::MethodNotAllowed { response }
            | Self::ResourceConflict { response }
            | Self::ResourceGone { response }
            | Self::ResourceInvalid { response }
            | Self::ClientError { response }
            | Self::ServerError { response } => Some(response),
            _ => None,
        }
    }

    /// The HTTP status code, for status-derived errors.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.response().map(Response::status)
    }
}
