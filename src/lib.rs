//! # RestKit
//!
//! A client for REST services that follow the conventional singular/plural
//! resource naming scheme: an *element* (`widget`) and its *collection*
//! (`widgets`), addressed under an optional nested prefix, negotiated
//! through a pluggable body format.
//!
//! ## Overview
//!
//! The crate is a resource addressing and request/response protocol
//! engine:
//!
//! - [`rest::Service`]: per-resource-type configuration with lazy
//!   defaults, path building and the operation set (`build`, `create`,
//!   `find_all` / `find_first` / `find_last` / `find_single` / `find_one`,
//!   `delete`, `exists`)
//! - [`rest::Resource`]: the attribute container with persisted-state
//!   tracking, `save` and an existence check
//! - [`rest::path`] and [`rest::options`]: prefix templates with
//!   colon-marked placeholders, and the partition of caller options into
//!   prefix and query halves
//! - [`http::Connection`]: per-verb header negotiation, dispatch and the
//!   status-code-to-error classification
//! - [`format::Format`] and [`transport::Transport`]: the pluggable codec
//!   and network boundaries, with JSON and reqwest defaults
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use restkit::rest::Service;
//! use reqwest::Url;
//! use serde_json::{json, Map};
//!
//! # async fn run() -> Result<(), restkit::Error> {
//! // Describe the remote resource type once.
//! let service = Service::with_element_name(
//!     Url::parse("https://api.example.com/v1").unwrap(),
//!     "widget",
//! );
//!
//! // List, with options split automatically into path and query parts.
//! let widgets = service.find_all(&Map::new()).await?;
//!
//! // Create.
//! let mut attributes = Map::new();
//! attributes.insert("name".to_string(), json!("flange"));
//! let widget = service.create(attributes).await?;
//! println!("created widget {:?}", widget.id());
//!
//! // Check and delete.
//! if service.exists(42, &Map::new()).await? {
//!     service.delete(42, &Map::new()).await?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Nested resources
//!
//! A prefix template marks substitutable segments with a colon. Options
//! whose keys name a placeholder fill in the path; the rest become the
//! query string:
//!
//! ```rust,no_run
//! use restkit::rest::Service;
//! use reqwest::Url;
//! use serde_json::{json, Map};
//!
//! # async fn run() -> Result<(), restkit::Error> {
//! let comments = Service::with_element_name(
//!     Url::parse("https://api.example.com").unwrap(),
//!     "comment",
//! );
//! comments.set_prefix_source("/posts/:post_id");
//!
//! let mut options = Map::new();
//! options.insert("post_id".to_string(), json!(5));
//! options.insert("page".to_string(), json!(2));
//!
//! // GET /posts/5/comments?page=2
//! let recent = comments.find_all(&options).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Design Principles
//!
//! - **Shared configuration**: a `Service` is a cheap-clone handle;
//!   mutating it is visible to every resource bound to it, by contract
//! - **One failure channel**: every operation resolves with a value or an
//!   [`Error`]; expected failures never panic
//! - **Fresh values per call**: each operation builds its own request,
//!   response and resources, so no locking guards the protocol path
//! - **Pluggable boundaries**: the body codec and the transport are
//!   traits with JSON and reqwest defaults
//! - **Async-first**: operations are futures delivering exactly one
//!   outcome

pub mod error;
pub mod format;
pub mod http;
pub mod rest;
pub mod transport;

// Re-export the public surface at the crate root for convenience
pub use error::Error;
pub use format::{Format, FormatError, JsonFormat};
pub use http::{Body, Connection, HttpMethod, Request, Response};
pub use rest::{Options, Resource, Service, FROM_KEY, PARAMS_KEY};
pub use transport::{RawResponse, ReqwestTransport, Transport, TransportError};
