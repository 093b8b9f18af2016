//! The resource registry and its collaborators

use crate::authorization::{Authorization, ReadAll};
use crate::document::Document;
use crate::error::{ResourceError, Result};
use crate::persistence::Persistence;
use crate::request::Request;
use crate::resource::Resource;
use crate::settings::ApiSettings;
use crate::uri::{ResolvedUri, RouteUriResolver, UriResolver};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Registry of resources under one API name and version
///
/// Resources hold a weak back-reference to the API they are registered on,
/// so an `Api` must be kept alive in an `Arc` for as long as its resources
/// are used.
pub struct Api {
	settings: ApiSettings,
	uris: Arc<dyn UriResolver>,
	authorization: Arc<dyn Authorization>,
	persistence: Option<Arc<dyn Persistence>>,
	registry: RwLock<IndexMap<String, Arc<Resource>>>,
}

impl fmt::Debug for Api {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Api")
			.field("settings", &self.settings)
			.field("resources", &self.resource_names())
			.finish_non_exhaustive()
	}
}

/// Builder for [`Api`]
#[derive(Default)]
pub struct ApiBuilder {
	settings: ApiSettings,
	uris: Option<Arc<dyn UriResolver>>,
	authorization: Option<Arc<dyn Authorization>>,
	persistence: Option<Arc<dyn Persistence>>,
}

impl ApiBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn settings(mut self, settings: ApiSettings) -> Self {
		self.settings = settings;
		self
	}

	/// Replace the default route-based URI scheme
	pub fn uri_resolver(mut self, uris: Arc<dyn UriResolver>) -> Self {
		self.uris = Some(uris);
		self
	}

	pub fn authorization(mut self, authorization: Arc<dyn Authorization>) -> Self {
		self.authorization = Some(authorization);
		self
	}

	pub fn persistence(mut self, persistence: Arc<dyn Persistence>) -> Self {
		self.persistence = Some(persistence);
		self
	}

	pub fn build(self) -> Result<Arc<Api>> {
		self.settings.validate()?;
		let uris = self
			.uris
			.unwrap_or_else(|| Arc::new(RouteUriResolver::new(&self.settings)));
		Ok(Arc::new(Api {
			uris,
			authorization: self.authorization.unwrap_or_else(|| Arc::new(ReadAll)),
			persistence: self.persistence,
			settings: self.settings,
			registry: RwLock::new(IndexMap::new()),
		}))
	}
}

impl Api {
	pub fn builder() -> ApiBuilder {
		ApiBuilder::new()
	}

	/// An API with default collaborators and no persistence
	pub fn new(settings: ApiSettings) -> Result<Arc<Self>> {
		Self::builder().settings(settings).build()
	}

	pub fn settings(&self) -> &ApiSettings {
		&self.settings
	}

	pub fn authorization(&self) -> &dyn Authorization {
		self.authorization.as_ref()
	}

	pub fn persistence(&self) -> Result<&dyn Persistence> {
		self.persistence.as_deref().ok_or_else(|| {
			ResourceError::Configuration("no persistence configured on the API".to_string())
		})
	}

	/// Register a resource under its name, replacing any previous one
	pub fn register(self: &Arc<Self>, resource: Resource) -> Result<Arc<Resource>> {
		let resource = Arc::new(resource);
		resource.attach(self)?;
		resource.bind_self_references();
		let name = resource.name().to_string();
		if self
			.registry
			.write()
			.insert(name.clone(), resource.clone())
			.is_some()
		{
			tracing::warn!(resource = %name, "replaced a registered resource");
		}
		tracing::debug!(resource = %name, api = %self.settings.route_prefix(), "registered resource");
		Ok(resource)
	}

	pub fn unregister(&self, name: &str) -> Result<Arc<Resource>> {
		self.registry
			.write()
			.shift_remove(name)
			.ok_or_else(|| ResourceError::NotRegistered(name.to_string()))
	}

	pub fn resource(&self, name: &str) -> Result<Arc<Resource>> {
		self.registry
			.read()
			.get(name)
			.cloned()
			.ok_or_else(|| ResourceError::NotRegistered(name.to_string()))
	}

	pub fn resource_names(&self) -> Vec<String> {
		self.registry.read().keys().cloned().collect()
	}

	/// The first registered resource exposing the document's type
	pub fn resource_for_object_type(&self, document: &Document) -> Result<Arc<Resource>> {
		self.resource_for_collection(document.kind())
	}

	/// The first registered resource exposing the named collection
	pub fn resource_for_collection(&self, collection: &str) -> Result<Arc<Resource>> {
		self.registry
			.read()
			.values()
			.find(|resource| resource.object_class() == collection)
			.cloned()
			.ok_or_else(|| ResourceError::NotRegistered(collection.to_string()))
	}

	/// The resource named by the URI's resource segment
	pub fn resource_for_uri(&self, uri: &str) -> Result<Arc<Resource>> {
		let resolved = self.resolve_uri(uri)?;
		self.resource(&resolved.resource_name)
	}

	pub fn build_uri(&self, resource_name: &str, id: Option<&str>, request: Option<&Request>) -> String {
		self.uris.build_uri(resource_name, id, request)
	}

	pub fn resolve_uri(&self, uri: &str) -> Result<ResolvedUri> {
		self.uris.resolve_uri(uri)
	}
}
