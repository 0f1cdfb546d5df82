//! Resource addressing and the CRUD-like operation set.
//!
//! This module contains the resource half of the engine:
//!
//! - [`path`]: prefix templates with colon-marked placeholders
//! - [`options`]: the prefix/query partition and query-string building
//! - [`Service`]: per-resource-type configuration and operations
//! - [`Resource`]: the attribute container bound to a service
//!
//! The protocol half lives in [`crate::http`].

pub mod options;
pub mod path;
pub mod resource;
pub mod service;

pub use options::{query_string, split_options, Options};
pub use resource::Resource;
pub use service::{RecordFactory, Service, FROM_KEY, PARAMS_KEY};
