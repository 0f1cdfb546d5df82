//! The attribute container bound to a service.
//!
//! A [`Resource`] mirrors one remote record. It keeps an ordered attribute
//! map in underscore-style keys, the prefix options captured when it was
//! loaded, and a persisted flag distinguishing records that exist remotely
//! from freshly built ones. Resources reach the network only through their
//! service: [`Resource::save`] creates or updates, [`Resource::exists`]
//! asks the server whether the record is still there.
//!
//! # Example
//!
//! ```rust,no_run
//! use restkit::rest::Service;
//! use reqwest::Url;
//! use serde_json::{json, Map};
//!
//! # async fn run() -> Result<(), restkit::Error> {
//! let service = Service::with_element_name(
//!     Url::parse("https://api.example.com/v1").unwrap(),
//!     "widget",
//! );
//!
//! let mut attributes = Map::new();
//! attributes.insert("name".to_string(), json!("flange"));
//!
//! let mut widget = service.build(attributes);
//! assert!(widget.is_new());
//!
//! widget.save().await?;
//! println!("created widget {:?}", widget.id());
//! # Ok(())
//! # }
//! ```

use serde_json::{Map, Value};

use crate::error::Error;
use crate::http::connection::Connection;
use crate::http::request::HttpMethod;
use crate::http::response::Response;
use crate::rest::options::Options;
use crate::rest::service::Service;

/// One remote record's local representation.
///
/// The service reference is shared, not copied; changing the service's
/// configuration affects every resource bound to it.
#[derive(Clone, Debug)]
pub struct Resource {
    service: Service,
    attributes: Map<String, Value>,
    prefix_options: Options,
    persisted: bool,
}

// Verify Resource is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Resource>();
};

impl Resource {
    /// Creates an empty, unpersisted resource bound to a service.
    #[must_use]
    pub fn new(service: Service) -> Self {
        Self {
            service,
            attributes: Map::new(),
            prefix_options: Options::new(),
            persisted: false,
        }
    }

    /// Creates an unpersisted resource with the given attributes.
    #[must_use]
    pub fn with_attributes(service: Service, attributes: Map<String, Value>) -> Self {
        let mut resource = Self::new(service);
        resource.attributes = attributes;
        resource
    }

    /// The service this resource is bound to.
    #[must_use]
    pub const fn service(&self) -> &Service {
        &self.service
    }

    /// The attribute map, in underscore-style keys.
    #[must_use]
    pub const fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// One attribute's value.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Sets one attribute.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: Value) {
        self.attributes.insert(name.into(), value);
    }

    /// The prefix options captured when this resource was loaded; reused
    /// for its own element-path construction.
    #[must_use]
    pub const fn prefix_options(&self) -> &Options {
        &self.prefix_options
    }

    /// Replaces the captured prefix options.
    pub fn set_prefix_options(&mut self, prefix_options: Options) {
        self.prefix_options = prefix_options;
    }

    /// Whether the record is known to exist remotely.
    #[must_use]
    pub const fn persisted(&self) -> bool {
        self.persisted
    }

    /// Marks the record as persisted or not.
    pub fn set_persisted(&mut self, persisted: bool) {
        self.persisted = persisted;
    }

    /// `true` until the record has been persisted.
    #[must_use]
    pub const fn is_new(&self) -> bool {
        !self.persisted
    }

    /// Merges the given attributes over the current ones. Keys present in
    /// `attributes` overwrite; keys absent from it are untouched.
    pub fn merge_attributes(&mut self, attributes: Map<String, Value>) {
        for (key, value) in attributes {
            self.attributes.insert(key, value);
        }
    }

    /// Loads attributes from a decoded payload, unwrapping a rooted
    /// payload first when appropriate.
    ///
    /// A payload with exactly one key unwraps when that key matches the
    /// service's element name, or when `remove_root` forces it; the nested
    /// map then merges instead of the wrapper. Everything else merges
    /// directly.
    pub fn load_attributes(&mut self, attributes: Map<String, Value>, remove_root: bool) {
        if attributes.len() == 1 {
            let element_name = self.service.element_name().ok();
            // len() == 1 makes the iterator non-empty.
            if let Some((key, value)) = attributes.into_iter().next() {
                let rooted = remove_root || Some(key.as_str()) == element_name.as_deref();
                match value {
                    Value::Object(inner) if rooted => self.merge_attributes(inner),
                    value => {
                        let mut single = Map::new();
                        single.insert(key, value);
                        self.merge_attributes(single);
                    }
                }
            }
            return;
        }
        self.merge_attributes(attributes);
    }

    /// The record's identifier: the attribute named by the service's
    /// primary key. Answers `None` when the attribute is absent or its
    /// stored value is not numeric.
    #[must_use]
    pub fn id(&self) -> Option<u64> {
        self.attributes
            .get(&self.service.primary_key())
            .and_then(Value::as_u64)
    }

    /// Sets the record's identifier under the service's primary key.
    pub fn set_id(&mut self, id: u64) {
        self.attributes
            .insert(self.service.primary_key(), Value::from(id));
    }

    /// The known attribute names: the service's schema keys plus this
    /// instance's attribute keys, without duplicates.
    #[must_use]
    pub fn known_attributes(&self) -> Vec<String> {
        let mut known = self.service.known_attributes();
        for key in self.attributes.keys() {
            if !known.iter().any(|existing| existing == key) {
                known.push(key.clone());
            }
        }
        known
    }

    /// Serializes the current attributes with the service's format
    /// strategy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DecodeFailure`] when the attributes cannot be
    /// encoded.
    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        Ok(self.service.format().encode(&self.attributes)?)
    }

    /// Saves the record: a create for new records, an update for
    /// persisted ones.
    ///
    /// Creating POSTs the encoded attributes to the collection path,
    /// merges any returned attributes and adopts the identifier from the
    /// response's `Location` header; the record becomes persisted once
    /// that identifier arrives (or when it already carries one). A
    /// missing `Location` is not an error by itself, it just leaves the
    /// record unpersisted.
    ///
    /// Updating PUTs the encoded attributes to the element path and
    /// merges any returned attributes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceInvalid`] when the server rejects the
    /// representation (422), any other status-derived error,
    /// [`Error::Misconfigured`] when the service has no site or a
    /// persisted record has no numeric identifier, and transport or
    /// decode failures.
    pub async fn save(&mut self) -> Result<(), Error> {
        if self.is_new() {
            self.save_new().await
        } else {
            self.save_existing().await
        }
    }

    async fn save_new(&mut self) -> Result<(), Error> {
        let body = self.encode()?;
        let path = self
            .service
            .collection_path(&self.prefix_options, &Options::new())?;
        tracing::debug!(path = %path, "creating resource");
        let response = self
            .service
            .request(HttpMethod::Post, &path, Some(body))
            .await?;

        self.load_response_attributes(&response);
        let located_id = response
            .header("location")
            .and_then(Connection::id_from_location);
        if let Some(id) = located_id {
            self.set_id(id);
        }
        if self.id().is_some() {
            self.persisted = true;
        }
        Ok(())
    }

    async fn save_existing(&mut self) -> Result<(), Error> {
        let id = self.id().ok_or(Error::Misconfigured(
            "a persisted resource needs a numeric identifier to save",
        ))?;
        let body = self.encode()?;
        let path = self
            .service
            .element_path(id, &self.prefix_options, &Options::new())?;
        tracing::debug!(path = %path, id, "updating resource");
        let response = self
            .service
            .request(HttpMethod::Put, &path, Some(body))
            .await?;

        self.load_response_attributes(&response);
        self.persisted = true;
        Ok(())
    }

    /// Merges a response's decoded attribute map, if it carries one.
    /// Responses without a body, or with a non-map body, change nothing.
    fn load_response_attributes(&mut self, response: &Response) {
        if let Some(Value::Object(attributes)) = response.decoded_body() {
            self.load_attributes(attributes.clone(), false);
        }
    }

    /// Asks the server whether this record still exists, using the
    /// record's identifier and captured prefix options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Misconfigured`] when the record has no numeric
    /// identifier, plus everything [`Service::exists`] returns.
    pub async fn exists(&self) -> Result<bool, Error> {
        let id = self.id().ok_or(Error::Misconfigured(
            "an existence check needs a numeric identifier",
        ))?;
        self.service.exists(id, &self.prefix_options).await
    }
}

/// A resource serializes as its attribute map, which keeps stored or
/// logged resources interchangeable with the payloads they came from.
impl serde::Serialize for Resource {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.attributes.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Url;
    use serde_json::json;

    fn widget_service() -> Service {
        Service::with_element_name(
            Url::parse("https://api.example.com/v1").unwrap(),
            "widget",
        )
    }

    fn attributes_of(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_new_resource_is_new_and_empty() {
        let resource = Resource::new(widget_service());
        assert!(resource.is_new());
        assert!(!resource.persisted());
        assert!(resource.attributes().is_empty());
    }

    #[test]
    fn test_merge_overwrites_present_keys_only() {
        let mut resource = Resource::with_attributes(
            widget_service(),
            attributes_of(&[("name", json!("a")), ("size", json!(1))]),
        );
        resource.merge_attributes(attributes_of(&[("name", json!("b"))]));

        assert_eq!(resource.attribute("name"), Some(&json!("b")));
        assert_eq!(resource.attribute("size"), Some(&json!(1)));
    }

    #[test]
    fn test_load_unwraps_root_matching_element_name() {
        let mut resource = Resource::new(widget_service());
        resource.load_attributes(
            attributes_of(&[("widget", json!({"name": "x", "id": 3}))]),
            false,
        );

        assert_eq!(resource.attribute("name"), Some(&json!("x")));
        assert!(resource.attribute("widget").is_none());
    }

    #[test]
    fn test_load_keeps_single_key_that_is_not_the_root() {
        let mut resource = Resource::new(widget_service());
        resource.load_attributes(attributes_of(&[("name", json!("x"))]), false);
        assert_eq!(resource.attribute("name"), Some(&json!("x")));
    }

    #[test]
    fn test_load_forced_remove_root_unwraps_any_single_key() {
        let mut resource = Resource::new(widget_service());
        resource.load_attributes(
            attributes_of(&[("payload", json!({"name": "x"}))]),
            true,
        );
        assert_eq!(resource.attribute("name"), Some(&json!("x")));
        assert!(resource.attribute("payload").is_none());
    }

    #[test]
    fn test_load_multi_key_payload_merges_directly() {
        let mut resource = Resource::new(widget_service());
        resource.load_attributes(
            attributes_of(&[("name", json!("x")), ("size", json!(2))]),
            true,
        );
        assert_eq!(resource.attribute("name"), Some(&json!("x")));
        assert_eq!(resource.attribute("size"), Some(&json!(2)));
    }

    #[test]
    fn test_id_reads_the_primary_key_attribute() {
        let mut resource = Resource::new(widget_service());
        assert!(resource.id().is_none());

        resource.set_id(42);
        assert_eq!(resource.id(), Some(42));
        assert_eq!(resource.attribute("id"), Some(&json!(42)));
    }

    #[test]
    fn test_id_is_none_for_non_numeric_values() {
        let resource = Resource::with_attributes(
            widget_service(),
            attributes_of(&[("id", json!("42"))]),
        );
        assert!(resource.id().is_none());
    }

    #[test]
    fn test_id_honors_a_custom_primary_key() {
        let service = widget_service();
        service.set_primary_key("uid");
        let mut resource = Resource::new(service);
        resource.set_id(9);
        assert_eq!(resource.attribute("uid"), Some(&json!(9)));
        assert_eq!(resource.id(), Some(9));
    }

    #[test]
    fn test_known_attributes_union_schema_and_instance() {
        let service = widget_service();
        let mut schema = Map::new();
        schema.insert("name".to_string(), json!("string"));
        schema.insert("size".to_string(), json!("integer"));
        service.set_schema(schema);

        let resource = Resource::with_attributes(
            service,
            attributes_of(&[("name", json!("x")), ("color", json!("red"))]),
        );

        let known = resource.known_attributes();
        assert_eq!(known.len(), 3);
        assert!(known.contains(&"name".to_string()));
        assert!(known.contains(&"size".to_string()));
        assert!(known.contains(&"color".to_string()));
    }

    #[test]
    fn test_encode_round_trips_through_the_format() {
        let resource = Resource::with_attributes(
            widget_service(),
            attributes_of(&[("name", json!("x"))]),
        );
        let bytes = resource.encode().unwrap();
        assert_eq!(bytes, br#"{"name":"x"}"#);
    }

    #[test]
    fn test_resource_serializes_as_its_attributes() {
        let resource = Resource::with_attributes(
            widget_service(),
            attributes_of(&[("id", json!(42)), ("name", json!("x"))]),
        );
        let serialized = serde_json::to_string(&resource).unwrap();
        assert_eq!(serialized, r#"{"id":42,"name":"x"}"#);
    }

    #[test]
    fn test_mutating_the_shared_service_affects_the_resource() {
        let service = widget_service();
        let resource = Resource::new(service.clone());
        service.set_primary_key("uid");

        let mut resource = resource;
        resource.set_id(3);
        assert_eq!(resource.attribute("uid"), Some(&json!(3)));
    }
}
