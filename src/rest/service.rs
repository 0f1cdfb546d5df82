//! Per-resource-type service configuration and operations.
//!
//! A [`Service`] describes one remote resource type: where it lives (site
//! and prefix), what it is called (element and collection names), how its
//! payloads are encoded (format strategy) and how requests reach it
//! (transport, timeout, static headers). On top of that configuration it
//! exposes the operation set: `build`, `create`, the find scopes
//! (`find_all`, `find_first`, `find_last`, `find_single`, `find_one`),
//! `delete` and `exists`.
//!
//! # Shared configuration
//!
//! `Service` is a cheap-to-clone handle over shared state. Every
//! [`Resource`](crate::rest::Resource) produced by a service keeps a clone
//! of the handle, so mutating the configuration through any handle affects
//! all current and future operations of every resource bound to it. That
//! sharing is deliberate and part of the contract, not an accident.
//!
//! # Lazy defaults
//!
//! Several settings derive their default from other settings the first
//! time they are read: the element name from the service's resource-kind
//! name, the collection name by pluralizing the element name, the prefix
//! source from the site URL's path, and the primary key from the
//! conventional `"id"`. A value set explicitly always wins; a derived
//! value is cached on first read. First reads may race, which is harmless
//! because recomputation is idempotent and side-effect free.
//!
//! # Example
//!
//! ```rust,no_run
//! use restkit::rest::Service;
//! use reqwest::Url;
//! use serde_json::Map;
//!
//! # async fn run() -> Result<(), restkit::Error> {
//! let service = Service::with_element_name(
//!     Url::parse("https://api.example.com/v1").unwrap(),
//!     "widget",
//! );
//!
//! let widgets = service.find_all(&Map::new()).await?;
//! for widget in &widgets {
//!     println!("widget {:?}", widget.id());
//! }
//! # Ok(())
//! # }
//! ```

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use reqwest::Url;
use serde_json::{Map, Value};

use crate::error::Error;
use crate::format::{Format, FormatError, JsonFormat};
use crate::http::connection::Connection;
use crate::http::request::HttpMethod;
use crate::http::response::Response;
use crate::rest::options::{self, Options};
use crate::rest::path;
use crate::rest::resource::Resource;
use crate::transport::{ReqwestTransport, Transport};

/// Reserved option key naming a literal, one-off path for
/// [`Service::find_one`].
pub const FROM_KEY: &str = "from";

/// Reserved option key holding the literal query parameters for
/// [`Service::find_one`].
pub const PARAMS_KEY: &str = "params";

/// Constructor installed with [`Service::register_record_factory`] and
/// consulted when the service instantiates records from decoded payloads.
pub type RecordFactory = Box<dyn Fn(Service) -> Resource + Send + Sync>;

/// The settable configuration behind a service handle.
#[derive(Debug, Default)]
struct Config {
    site: Option<Url>,
    kind: Option<String>,
    element_name: Option<String>,
    collection_name: Option<String>,
    primary_key: Option<String>,
    prefix_source: Option<String>,
    format: Option<Arc<dyn Format>>,
    transport: Option<Arc<dyn Transport>>,
    timeout: Option<Duration>,
    headers: HashMap<String, String>,
    schema: Option<Map<String, Value>>,
}

struct Inner {
    config: RwLock<Config>,
    factories: RwLock<HashMap<String, RecordFactory>>,
}

/// Shared-ownership handle to one resource type's configuration and
/// operations.
#[derive(Clone)]
pub struct Service {
    inner: Arc<Inner>,
}

// Verify Service is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Service>();
};

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Service")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl Default for Service {
    fn default() -> Self {
        Self::new()
    }
}

impl Service {
    /// Creates an unconfigured service. A site must be set before any
    /// path-building operation.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                config: RwLock::new(Config::default()),
                factories: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Creates a service for the given site.
    #[must_use]
    pub fn with_site(site: Url) -> Self {
        let service = Self::new();
        service.set_site(site);
        service
    }

    /// Creates a service for the given site and element name.
    #[must_use]
    pub fn with_element_name(site: Url, element_name: impl Into<String>) -> Self {
        let service = Self::with_site(site);
        service.set_element_name(element_name);
        service
    }

    /// Creates a service for the given site whose element and collection
    /// names derive from a resource-kind name such as `"Widget"` or
    /// `"DraftOrder"`.
    #[must_use]
    pub fn for_kind(site: Url, kind: impl Into<String>) -> Self {
        let service = Self::with_site(site);
        service.set_kind(kind);
        service
    }

    fn read_config(&self) -> RwLockReadGuard<'_, Config> {
        self.inner
            .config
            .read()
            .expect("service configuration lock poisoned")
    }

    fn write_config(&self) -> RwLockWriteGuard<'_, Config> {
        self.inner
            .config
            .write()
            .expect("service configuration lock poisoned")
    }

    /// The site URL, if one has been set.
    #[must_use]
    pub fn site(&self) -> Option<Url> {
        self.read_config().site.clone()
    }

    /// Sets the site URL. The site's path becomes the default prefix
    /// source for any service that has not read or overridden it yet.
    pub fn set_site(&self, site: Url) {
        self.write_config().site = Some(site);
    }

    /// The resource-kind name used to derive a default element name.
    #[must_use]
    pub fn kind(&self) -> Option<String> {
        self.read_config().kind.clone()
    }

    /// Sets the resource-kind name, e.g. `"Widget"`.
    pub fn set_kind(&self, kind: impl Into<String>) {
        self.write_config().kind = Some(kind.into());
    }

    /// The element name, deriving and caching the default on first read.
    ///
    /// The default is the underscore-lowered resource-kind name
    /// (`"DraftOrder"` becomes `"draft_order"`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Misconfigured`] when no element name is set and no
    /// kind is available to derive one from.
    pub fn element_name(&self) -> Result<String, Error> {
        if let Some(name) = self.read_config().element_name.clone() {
            return Ok(name);
        }
        let mut config = self.write_config();
        if let Some(name) = &config.element_name {
            return Ok(name.clone());
        }
        let kind = config.kind.clone().ok_or(Error::Misconfigured(
            "no element name is set and no resource kind is available to derive one",
        ))?;
        let name = underscore(&kind);
        config.element_name = Some(name.clone());
        Ok(name)
    }

    /// Sets the element name explicitly, suppressing derivation.
    pub fn set_element_name(&self, element_name: impl Into<String>) {
        self.write_config().element_name = Some(element_name.into());
    }

    /// The collection name, deriving and caching the default on first
    /// read.
    ///
    /// The default pluralizes the element name with a simple suffix rule:
    /// a trailing consonant-plus-`y` becomes `ies`; a trailing sibilant
    /// (`s`, `x`, `z`, `ch`, `sh`) appends `es`; anything else appends
    /// `s`. Irregular plurals are not handled; set the name explicitly for
    /// those.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Misconfigured`] when the element name cannot be
    /// resolved either.
    pub fn collection_name(&self) -> Result<String, Error> {
        if let Some(name) = self.read_config().collection_name.clone() {
            return Ok(name);
        }
        let element_name = self.element_name()?;
        let mut config = self.write_config();
        if let Some(name) = &config.collection_name {
            return Ok(name.clone());
        }
        let name = pluralize(&element_name);
        config.collection_name = Some(name.clone());
        Ok(name)
    }

    /// Sets the collection name explicitly, suppressing pluralization.
    pub fn set_collection_name(&self, collection_name: impl Into<String>) {
        self.write_config().collection_name = Some(collection_name.into());
    }

    /// The primary-key attribute name; `"id"` unless overridden.
    #[must_use]
    pub fn primary_key(&self) -> String {
        if let Some(key) = self.read_config().primary_key.clone() {
            if !key.is_empty() {
                return key;
            }
        }
        let mut config = self.write_config();
        match &config.primary_key {
            Some(key) if !key.is_empty() => key.clone(),
            _ => {
                let key = "id".to_string();
                config.primary_key = Some(key.clone());
                key
            }
        }
    }

    /// Sets the primary-key attribute name. An empty name is ignored at
    /// read time and the conventional `"id"` is used instead.
    pub fn set_primary_key(&self, primary_key: impl Into<String>) {
        self.write_config().primary_key = Some(primary_key.into());
    }

    /// The element's foreign-key name: the element name followed by
    /// `_id`. This is the conventional placeholder name for this element
    /// in the prefix templates of nested resources.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Misconfigured`] when the element name cannot be
    /// resolved.
    pub fn foreign_key(&self) -> Result<String, Error> {
        Ok(format!("{}_id", self.element_name()?))
    }

    /// The prefix template, defaulting to the site URL's path on first
    /// read.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Misconfigured`] when neither a prefix source nor a
    /// site is set.
    pub fn prefix_source(&self) -> Result<String, Error> {
        if let Some(source) = self.read_config().prefix_source.clone() {
            return Ok(source);
        }
        let mut config = self.write_config();
        if let Some(source) = &config.prefix_source {
            return Ok(source.clone());
        }
        let site = config
            .site
            .as_ref()
            .ok_or(Error::Misconfigured("site URL is not set"))?;
        let source = site.path().to_string();
        config.prefix_source = Some(source.clone());
        Ok(source)
    }

    /// Sets the prefix template explicitly, e.g. `"/posts/:post_id"`.
    pub fn set_prefix_source(&self, prefix_source: impl Into<String>) {
        self.write_config().prefix_source = Some(prefix_source.into());
    }

    /// The placeholder names of the current prefix template.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Misconfigured`] when the prefix source cannot be
    /// resolved.
    pub fn prefix_parameters(&self) -> Result<BTreeSet<String>, Error> {
        Ok(path::placeholders(&self.prefix_source()?))
    }

    /// Renders the prefix template against the given prefix options.
    /// Placeholders without a matching option survive verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Misconfigured`] when the prefix source cannot be
    /// resolved.
    pub fn prefix_with_options(&self, prefix_options: &Options) -> Result<String, Error> {
        Ok(path::render(&self.prefix_source()?, prefix_options))
    }

    /// Splits a flat option mapping into prefix options and query options
    /// according to the current prefix template.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Misconfigured`] when the prefix source cannot be
    /// resolved.
    pub fn split_options(&self, all_options: &Options) -> Result<(Options, Options), Error> {
        Ok(options::split_options(
            all_options,
            &self.prefix_parameters()?,
        ))
    }

    /// The body format strategy; JSON unless overridden.
    #[must_use]
    pub fn format(&self) -> Arc<dyn Format> {
        if let Some(format) = self.read_config().format.clone() {
            return format;
        }
        let mut config = self.write_config();
        config
            .format
            .get_or_insert_with(|| Arc::new(JsonFormat::new()))
            .clone()
    }

    /// Sets the body format strategy.
    pub fn set_format(&self, format: Arc<dyn Format>) {
        self.write_config().format = Some(format);
    }

    /// The transport; a shared reqwest-backed transport unless overridden.
    #[must_use]
    pub fn transport(&self) -> Arc<dyn Transport> {
        if let Some(transport) = self.read_config().transport.clone() {
            return transport;
        }
        let mut config = self.write_config();
        config
            .transport
            .get_or_insert_with(|| Arc::new(ReqwestTransport::new()))
            .clone()
    }

    /// Sets the transport used by every subsequent operation.
    pub fn set_transport(&self, transport: Arc<dyn Transport>) {
        self.write_config().transport = Some(transport);
    }

    /// The per-request timeout, if any.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.read_config().timeout
    }

    /// Sets the per-request timeout; the transport enforces it.
    pub fn set_timeout(&self, timeout: Option<Duration>) {
        self.write_config().timeout = timeout;
    }

    /// The static headers applied to every request.
    #[must_use]
    pub fn headers(&self) -> HashMap<String, String> {
        self.read_config().headers.clone()
    }

    /// Replaces the static header mapping.
    pub fn set_headers(&self, headers: HashMap<String, String>) {
        self.write_config().headers = headers;
    }

    /// Inserts one static header.
    pub fn insert_header(&self, name: impl Into<String>, value: impl Into<String>) {
        self.write_config().headers.insert(name.into(), value.into());
    }

    /// The attribute schema published by the server, if one was set.
    #[must_use]
    pub fn schema(&self) -> Option<Map<String, Value>> {
        self.read_config().schema.clone()
    }

    /// Sets the attribute schema, a mapping of attribute names to type
    /// descriptions. [`Service::build`] seeds new resources from it.
    pub fn set_schema(&self, schema: Map<String, Value>) {
        self.write_config().schema = Some(schema);
    }

    /// The known attribute names: the schema's keys.
    #[must_use]
    pub fn known_attributes(&self) -> Vec<String> {
        self.schema()
            .map(|schema| schema.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn extension_suffix(&self) -> String {
        self.format()
            .extension()
            .map_or_else(String::new, |extension| format!(".{extension}"))
    }

    fn rendered_prefix(&self, prefix_options: &Options) -> Result<String, Error> {
        let prefix = self.prefix_with_options(prefix_options)?;
        Ok(prefix.trim_end_matches('/').to_string())
    }

    /// The path of the whole collection, e.g. `/v1/widgets?page=2`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Misconfigured`] when the site or the names cannot
    /// be resolved.
    pub fn collection_path(
        &self,
        prefix_options: &Options,
        query_options: &Options,
    ) -> Result<String, Error> {
        let mut built = format!(
            "{}/{}{}",
            self.rendered_prefix(prefix_options)?,
            self.collection_name()?,
            self.extension_suffix()
        );
        append_query(&mut built, query_options);
        Ok(built)
    }

    /// The path of one element, e.g. `/v1/widgets/42`.
    ///
    /// A pure function of the current configuration and its inputs;
    /// identical inputs yield identical output.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Misconfigured`] when the site or the names cannot
    /// be resolved.
    pub fn element_path(
        &self,
        id: u64,
        prefix_options: &Options,
        query_options: &Options,
    ) -> Result<String, Error> {
        let mut built = format!(
            "{}/{}/{}{}",
            self.rendered_prefix(prefix_options)?,
            self.collection_name()?,
            id,
            self.extension_suffix()
        );
        append_query(&mut built, query_options);
        Ok(built)
    }

    /// The path of the new-element form, e.g. `/v1/widgets/new`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Misconfigured`] when the site or the names cannot
    /// be resolved.
    pub fn new_element_path(&self, prefix_options: &Options) -> Result<String, Error> {
        Ok(format!(
            "{}/{}/new{}",
            self.rendered_prefix(prefix_options)?,
            self.collection_name()?,
            self.extension_suffix()
        ))
    }

    /// Builds a connection from the current configuration.
    ///
    /// Each operation asks for a fresh connection, so configuration
    /// changes are picked up at the next call and in-flight requests are
    /// never mutated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Misconfigured`] when the site URL is not set.
    pub fn connection(&self) -> Result<Connection, Error> {
        let site = self
            .site()
            .ok_or(Error::Misconfigured("site URL is not set"))?;
        Ok(Connection::new(site, self.format(), self.transport())
            .with_timeout(self.timeout())
            .with_headers(self.headers()))
    }

    /// Sends one request and decodes the body of responses that carry
    /// one.
    pub(crate) async fn request(
        &self,
        method: HttpMethod,
        request_path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Response, Error> {
        let connection = self.connection()?;
        let mut request = connection.build_request(method, request_path, &HashMap::new())?;
        request.body = body;
        let response = connection.send(request).await?;
        let mut response = Connection::handle_response(response)?;
        if matches!(method, HttpMethod::Get | HttpMethod::Post | HttpMethod::Put) {
            connection.decode(&mut response)?;
        }
        Ok(response)
    }

    /// Registers a record factory for an element name. The factory is
    /// consulted whenever this service instantiates a record from a
    /// decoded payload; without one the plain [`Resource`] constructor is
    /// used. Registration is optional and absence is not an error.
    pub fn register_record_factory<F>(&self, element_name: impl Into<String>, factory: F)
    where
        F: Fn(Self) -> Resource + Send + Sync + 'static,
    {
        self.inner
            .factories
            .write()
            .expect("record factory lock poisoned")
            .insert(element_name.into(), Box::new(factory));
    }

    fn make_record(&self) -> Resource {
        if let Ok(element_name) = self.element_name() {
            let factories = self
                .inner
                .factories
                .read()
                .expect("record factory lock poisoned");
            if let Some(factory) = factories.get(&element_name) {
                return factory(self.clone());
            }
        }
        Resource::new(self.clone())
    }

    /// Instantiates one persisted record from decoded attributes.
    fn instantiate_record(&self, attributes: Map<String, Value>, prefix_options: Options) -> Resource {
        let mut resource = self.make_record();
        resource.load_attributes(attributes, false);
        resource.set_prefix_options(prefix_options);
        resource.set_persisted(true);
        resource
    }

    /// Instantiates records from a decoded collection, preserving order.
    fn instantiate_collection(
        &self,
        elements: Vec<Value>,
        prefix_options: &Options,
    ) -> Result<Vec<Resource>, Error> {
        elements
            .into_iter()
            .map(|element| match element {
                Value::Object(attributes) => {
                    Ok(self.instantiate_record(attributes, prefix_options.clone()))
                }
                other => Err(Error::DecodeFailure(FormatError::new(format!(
                    "expected an attribute map in the collection, found {other}"
                )))),
            })
            .collect()
    }

    async fn find_every(&self, all_options: &Options) -> Result<(Vec<Resource>, Response), Error> {
        let (prefix_options, query_options) = self.split_options(all_options)?;
        let request_path = self.collection_path(&prefix_options, &query_options)?;
        tracing::debug!(path = %request_path, "finding every resource");
        let response = self.request(HttpMethod::Get, &request_path, None).await?;
        let decoded = response.decoded_body().cloned().unwrap_or(Value::Null);
        let elements = collection_elements(decoded)?;
        let resources = self.instantiate_collection(elements, &prefix_options)?;
        Ok((resources, response))
    }

    /// Finds all resources matching the given options.
    ///
    /// Options whose keys name prefix placeholders fill in the path; the
    /// rest become the query string. The returned resources keep the
    /// prefix options for their own subsequent element paths.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Misconfigured`] before any request when the
    /// service has no site, a status-derived error for non-2xx responses
    /// and [`Error::DecodeFailure`] when the body is not a collection.
    pub async fn find_all(&self, all_options: &Options) -> Result<Vec<Resource>, Error> {
        let (resources, _response) = self.find_every(all_options).await?;
        Ok(resources)
    }

    /// Answers just the first resource in the collection. A convenience
    /// wrapper over [`Service::find_all`], not a distinct server call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceNotFound`] carrying the collection
    /// response when the collection is empty, plus everything
    /// [`Service::find_all`] returns.
    pub async fn find_first(&self, all_options: &Options) -> Result<Resource, Error> {
        let (mut resources, response) = self.find_every(all_options).await?;
        if resources.is_empty() {
            return Err(Error::ResourceNotFound { response });
        }
        Ok(resources.remove(0))
    }

    /// Answers just the last resource in the collection. A convenience
    /// wrapper over [`Service::find_all`], not a distinct server call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceNotFound`] carrying the collection
    /// response when the collection is empty, plus everything
    /// [`Service::find_all`] returns.
    pub async fn find_last(&self, all_options: &Options) -> Result<Resource, Error> {
        let (mut resources, response) = self.find_every(all_options).await?;
        resources
            .pop()
            .ok_or(Error::ResourceNotFound { response })
    }

    /// Finds a single resource by identifier using the conventional
    /// element path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceNotFound`] when the server answers 404,
    /// any other status-derived error, [`Error::Misconfigured`] without a
    /// site, and [`Error::DecodeFailure`] when the body is not an
    /// attribute map.
    pub async fn find_single(&self, id: u64, all_options: &Options) -> Result<Resource, Error> {
        let (prefix_options, query_options) = self.split_options(all_options)?;
        let request_path = self.element_path(id, &prefix_options, &query_options)?;
        tracing::debug!(path = %request_path, id, "finding single resource");
        let response = self.request(HttpMethod::Get, &request_path, None).await?;
        let attributes = single_attributes(&response)?;
        Ok(self.instantiate_record(attributes, prefix_options))
    }

    /// Finds a single resource from a one-off, non-conventional path.
    ///
    /// The literal path travels under the reserved [`FROM_KEY`] option and
    /// literal query parameters under [`PARAMS_KEY`]; normal path building
    /// is bypassed entirely.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Misconfigured`] when the [`FROM_KEY`] option is
    /// missing, plus the errors of [`Service::find_single`].
    pub async fn find_one(&self, all_options: &Options) -> Result<Resource, Error> {
        let from = all_options
            .get(FROM_KEY)
            .and_then(Value::as_str)
            .ok_or(Error::Misconfigured(
                "find_one requires a literal path under the \"from\" option",
            ))?;
        let params = all_options
            .get(PARAMS_KEY)
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        let mut request_path = from.to_string();
        append_query(&mut request_path, &params);
        tracing::debug!(path = %request_path, "finding one resource");

        let response = self.request(HttpMethod::Get, &request_path, None).await?;
        let attributes = single_attributes(&response)?;
        Ok(self.instantiate_record(attributes, Options::new()))
    }

    /// Builds an unpersisted resource from the given attributes without
    /// any network call. When a schema is set, its attribute names seed
    /// the resource with null values before the given attributes merge
    /// over them. Always succeeds.
    #[must_use]
    pub fn build(&self, attributes: Options) -> Resource {
        let mut resource = self.make_record();
        if let Some(schema) = self.schema() {
            let mut seeded = Options::new();
            for key in schema.keys() {
                seeded.insert(key.clone(), Value::Null);
            }
            resource.merge_attributes(seeded);
        }
        resource.merge_attributes(attributes);
        resource
    }

    /// Creates a new resource remotely: encodes the attributes, POSTs
    /// them to the collection path, merges any returned attributes, and
    /// adopts the identifier from the response's `Location` header. The
    /// resource is marked persisted once that identifier arrives; a
    /// missing or unparsable `Location` leaves it unpersisted but is not
    /// an error by itself.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceInvalid`] when the server rejects the
    /// representation (422), any other status-derived error,
    /// [`Error::Misconfigured`] without a site, and
    /// [`Error::DecodeFailure`] for unencodable attributes.
    pub async fn create(&self, attributes: Options) -> Result<Resource, Error> {
        let mut resource = self.build(attributes);
        resource.save().await?;
        Ok(resource)
    }

    /// Deletes the resource with the given identifier. Any 2xx answer is
    /// success.
    ///
    /// # Errors
    ///
    /// Returns a status-derived error for non-2xx responses and
    /// [`Error::Misconfigured`] without a site.
    pub async fn delete(&self, id: u64, all_options: &Options) -> Result<(), Error> {
        let (prefix_options, query_options) = self.split_options(all_options)?;
        let request_path = self.element_path(id, &prefix_options, &query_options)?;
        tracing::debug!(path = %request_path, id, "deleting resource");
        self.request(HttpMethod::Delete, &request_path, None).await?;
        Ok(())
    }

    /// Asserts the existence of the resource with the given identifier by
    /// sending a HEAD request to its element path.
    ///
    /// Answers `Ok(true)` for any 2xx response and `Ok(false)` when the
    /// server reports the resource missing (404) or gone (410). Any other
    /// failure is an error: an unreachable or broken server says nothing
    /// about existence.
    ///
    /// # Errors
    ///
    /// Returns status-derived errors other than not-found and gone,
    /// transport errors, and [`Error::Misconfigured`] without a site.
    pub async fn exists(&self, id: u64, all_options: &Options) -> Result<bool, Error> {
        let (prefix_options, query_options) = self.split_options(all_options)?;
        let request_path = self.element_path(id, &prefix_options, &query_options)?;
        tracing::debug!(path = %request_path, id, "checking resource existence");
        match self.request(HttpMethod::Head, &request_path, None).await {
            Ok(_) => Ok(true),
            Err(Error::ResourceNotFound { .. } | Error::ResourceGone { .. }) => Ok(false),
            Err(error) => Err(error),
        }
    }
}

/// Appends `?query` to a path when the query options are not empty.
fn append_query(built: &mut String, query_options: &Options) {
    let query = options::query_string(query_options);
    if !query.is_empty() {
        built.push('?');
        built.push_str(&query);
    }
}

/// Interprets a decoded body as a collection of elements.
///
/// Accepts a top-level array, or a single-key wrapping object whose value
/// is an array (the collection analogue of a rooted element payload).
fn collection_elements(decoded: Value) -> Result<Vec<Value>, Error> {
    match decoded {
        Value::Array(elements) => Ok(elements),
        Value::Object(map) if map.len() == 1 => {
            match map.into_iter().next() {
                Some((_, Value::Array(elements))) => Ok(elements),
                _ => Err(Error::DecodeFailure(FormatError::new(
                    "expected the response body to decode as a collection",
                ))),
            }
        }
        _ => Err(Error::DecodeFailure(FormatError::new(
            "expected the response body to decode as a collection",
        ))),
    }
}

/// Interprets a decoded body as one element's attribute map.
fn single_attributes(response: &Response) -> Result<Map<String, Value>, Error> {
    match response.decoded_body() {
        Some(Value::Object(attributes)) => Ok(attributes.clone()),
        _ => Err(Error::DecodeFailure(FormatError::new(
            "expected the response body to decode as an attribute map",
        ))),
    }
}

/// Converts a camel-cased type name to underscore-lower form.
fn underscore(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let follows_lower = i > 0 && (chars[i - 1].is_lowercase() || chars[i - 1].is_ascii_digit());
            let precedes_lower = i + 1 < chars.len() && chars[i + 1].is_lowercase();
            if i > 0 && (follows_lower || precedes_lower) {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Pluralizes an element name with the simple suffix rule documented on
/// [`Service::collection_name`].
fn pluralize(name: &str) -> String {
    if let Some(stem) = name.strip_suffix('y') {
        let keeps_y = stem
            .chars()
            .last()
            .map_or(true, |c| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u'));
        if !keeps_y {
            return format!("{stem}ies");
        }
    }
    if name.ends_with('s')
        || name.ends_with('x')
        || name.ends_with('z')
        || name.ends_with("ch")
        || name.ends_with("sh")
    {
        return format!("{name}es");
    }
    format!("{name}s")
}
