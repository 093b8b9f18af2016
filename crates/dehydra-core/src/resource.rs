//! Resource descriptors
//!
//! A [`Resource`] aggregates the fields exposed for one document type and
//! runs them over a [`Bundle`] in both directions. Resources are declared
//! with a [`ResourceBuilder`] and become usable once registered on an
//! [`Api`], which supplies URIs, authorization and persistence.
//!
//! # Examples
//!
//! ```
//! use dehydra_core::fields::Field;
//! use dehydra_core::resource::Resource;
//!
//! let resource = Resource::builder("ActivityResource")
//! 	.field("name", Field::string("name").required())
//! 	.field("finished", Field::boolean("finished").default(false))
//! 	.build()
//! 	.unwrap();
//!
//! assert_eq!(resource.name(), "activity");
//! assert_eq!(resource.object_class(), "Activity");
//! assert_eq!(
//! 	resource.field_names().collect::<Vec<_>>(),
//! 	vec!["name", "finished", "resource_uri"]
//! );
//! ```

mod builder;

pub use builder::ResourceBuilder;

use crate::api::Api;
use crate::bundle::{Bundle, RelatedBundles};
use crate::document::Document;
use crate::error::{ResourceError, Result};
use crate::fields::{ApiField, Field, FieldContext, Hydrated, RelatedTarget};
use crate::request::Request;
use crate::resolver::{RelatedResolver, ResolveHint};
use crate::validation::DocumentValidator;
use crate::value::{Reference, Value};
use bson::oid::ObjectId;
use indexmap::IndexMap;
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

/// Replaces a field's dehydrated value; sees the bundle with that value set
pub type DehydrateHook = Arc<dyn Fn(&Bundle) -> Result<JsonValue> + Send + Sync>;

/// Computes a field's hydrated value instead of the field itself
pub type HydrateHook = Arc<dyn Fn(&Bundle) -> Result<Value> + Send + Sync>;

/// Field registry and (de)hydration entry point for one document type
pub struct Resource {
	name: String,
	type_name: String,
	object_class: String,
	fields: IndexMap<String, Field>,
	validator: Arc<dyn DocumentValidator>,
	dehydrate_hooks: HashMap<String, DehydrateHook>,
	hydrate_hooks: HashMap<String, HydrateHook>,
	api: OnceLock<Weak<Api>>,
}

impl fmt::Debug for Resource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Resource")
			.field("name", &self.name)
			.field("object_class", &self.object_class)
			.field("fields", &self.fields.keys().collect::<Vec<_>>())
			.finish_non_exhaustive()
	}
}

impl Resource {
	pub fn builder(type_name: impl Into<String>) -> ResourceBuilder {
		ResourceBuilder::new(type_name)
	}

	/// Name used in URIs and registry lookups
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Declared type name, e.g. `PersonResource`
	pub fn type_name(&self) -> &str {
		&self.type_name
	}

	/// Document type (collection) the resource exposes
	pub fn object_class(&self) -> &str {
		&self.object_class
	}

	pub fn field(&self, name: &str) -> Option<&Field> {
		self.fields.get(name)
	}

	pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
		self.fields.iter().map(|(name, field)| (name.as_str(), field))
	}

	pub fn field_names(&self) -> impl Iterator<Item = &str> {
		self.fields.keys().map(String::as_str)
	}

	/// The API this resource is registered on
	pub fn api(&self) -> Result<Arc<Api>> {
		self.api.get().and_then(Weak::upgrade).ok_or_else(|| {
			ResourceError::Configuration(format!(
				"resource `{}` is not registered on an API",
				self.name
			))
		})
	}

	pub(crate) fn attach(&self, api: &Arc<Api>) -> Result<()> {
		self.api.set(Arc::downgrade(api)).map_err(|_| {
			ResourceError::Configuration(format!(
				"resource `{}` is already registered",
				self.name
			))
		})
	}

	/// Self-referential fields resolve to this very descriptor
	pub(crate) fn bind_self_references(self: &Arc<Self>) {
		for field in self.fields.values() {
			if let Some(related) = field.related() {
				if *related.target() == RelatedTarget::SelfRef {
					related.memoize(self);
				}
			}
		}
	}

	/// Start a bundle for `obj` or for the given wire data
	///
	/// Without an object, data carrying a `resource_uri` loads the existing
	/// object through persistence; otherwise a fresh document is created.
	pub fn build_bundle(
		&self,
		obj: Option<Document>,
		data: Option<Map<String, JsonValue>>,
		request: Option<Arc<Request>>,
	) -> Result<Bundle> {
		let data = data.unwrap_or_default();
		let uri = data.get("resource_uri").and_then(JsonValue::as_str);
		let uri_only = uri.is_some() && data.len() == 1;
		let obj = match (obj, uri) {
			(Some(obj), _) => obj,
			(None, Some(uri)) => self.load_by_uri(uri)?,
			(None, None) => Document::new(self.object_class.clone()),
		};
		let mut bundle = Bundle::new()
			.with_object(obj)
			.with_data(data)
			.with_request(request);
		bundle.uri_only = uri_only;
		Ok(bundle)
	}

	/// Identity-only bundle addressed by `uri`; nothing is loaded
	pub fn build_bundle_for_uri(&self, uri: &str, request: Option<Arc<Request>>) -> Result<Bundle> {
		let id = self.id_from_uri(uri)?;
		tracing::debug!(resource = %self.name, %id, "built URI-only bundle");
		let mut data = Map::new();
		data.insert("resource_uri".to_string(), JsonValue::String(uri.to_string()));
		let mut bundle = Bundle::new()
			.with_reference(Reference::unloaded(self.object_class.clone(), id))
			.with_data(data)
			.with_request(request);
		bundle.uri_only = true;
		Ok(bundle)
	}

	/// Identity named by a URI of this resource
	pub fn id_from_uri(&self, uri: &str) -> Result<ObjectId> {
		let resolved = self.api()?.resolve_uri(uri)?;
		if resolved.resource_name != self.name {
			return Err(ResourceError::Resolution(format!(
				"`{}` names resource `{}`, expected `{}`",
				uri, resolved.resource_name, self.name
			)));
		}
		let id = resolved.id.ok_or_else(|| {
			ResourceError::Resolution(format!("`{}` does not name a single object", uri))
		})?;
		ObjectId::parse_str(&id)
			.map_err(|e| ResourceError::Resolution(format!("`{}` in `{}`: {}", id, uri, e)))
	}

	fn load_by_uri(&self, uri: &str) -> Result<Document> {
		let id = self.id_from_uri(uri)?;
		self.api()?.persistence()?.load_by_identity(self, &id)
	}

	/// URI of the bundle's object; `None` while it has no identity
	pub fn get_resource_uri(&self, bundle: &Bundle) -> Result<Option<String>> {
		match bundle.reference() {
			Some(reference) => self.uri_for_reference(&reference, bundle.request()),
			None => Ok(None),
		}
	}

	pub fn uri_for_reference(
		&self,
		reference: &Reference,
		request: Option<&Request>,
	) -> Result<Option<String>> {
		let Some(id) = reference.id() else {
			return Ok(None);
		};
		let api = self.api()?;
		Ok(Some(api.build_uri(&self.name, Some(&id.to_hex()), request)))
	}

	/// URI of the resource's list endpoint
	pub fn list_uri(&self, request: Option<&Request>) -> Result<String> {
		Ok(self.api()?.build_uri(&self.name, None, request))
	}

	/// Run every field's dehydrate, replacing the bundle's wire data
	///
	/// Fails as a whole: any field error aborts without partial output.
	pub fn dehydrate_all(&self, mut bundle: Bundle) -> Result<Bundle> {
		let api = self.api()?;
		let ctx = FieldContext::new(self, &api);
		bundle.data = Map::new();
		for (name, field) in &self.fields {
			let value = field.dehydrate(&bundle, &ctx)?;
			bundle.data.insert(name.clone(), value);
			if let Some(hook) = self.dehydrate_hooks.get(name) {
				let value = hook(&bundle)?;
				bundle.data.insert(name.clone(), value);
			}
		}
		Ok(bundle)
	}

	/// Dehydrate one document into its wire mapping
	pub fn full_dehydrate(&self, obj: Document, request: Option<Arc<Request>>) -> Result<JsonValue> {
		let bundle = Bundle::new().with_object(obj).with_request(request);
		Ok(self.dehydrate_all(bundle)?.to_json())
	}

	/// Run every writable field's hydrate and apply the results to the
	/// bundle's object, then validate it
	///
	/// For `PUT` and `PATCH` requests fields absent from the wire data are
	/// left untouched.
	pub fn hydrate_all(&self, mut bundle: Bundle) -> Result<Bundle> {
		let api = self.api()?;
		let ctx = FieldContext::new(self, &api);
		if bundle.obj.is_none() {
			let mut obj = Document::new(self.object_class.clone());
			if let Some(id) = bundle.reference().and_then(|r| r.id()) {
				obj.set_id(id);
			}
			bundle.obj = Some(obj);
		}
		let partial = bundle.request().is_some_and(Request::is_partial_update);

		for (name, field) in &self.fields {
			if partial && !bundle.data.contains_key(name) {
				continue;
			}
			let hydrated = match self.hydrate_hooks.get(name) {
				Some(hook) => Hydrated::Value(hook(&bundle)?),
				None if field.is_readonly() => continue,
				None => field.hydrate(&mut bundle, &ctx)?,
			};
			apply(&mut bundle, name, field, hydrated)?;
		}

		let errors = self.validator.validate(&bundle);
		if !errors.is_empty() {
			bundle.errors.extend(errors.clone());
			return Err(ResourceError::Validation(errors));
		}
		Ok(bundle)
	}

	/// Hydrate wire data into a new or loaded document
	pub fn hydrate_object(
		&self,
		data: Map<String, JsonValue>,
		request: Option<Arc<Request>>,
	) -> Result<Document> {
		let bundle = self.build_bundle(None, Some(data), request)?;
		self.hydrate_all(bundle)?.into_object().ok_or_else(|| {
			ResourceError::Resolution(format!("`{}` hydrated no object", self.name))
		})
	}

	/// Persist a hydrated bundle
	///
	/// Related bundles carrying changes are saved first and the object's
	/// references are re-pointed at the saved documents before the object
	/// itself is saved.
	pub fn save(&self, mut bundle: Bundle) -> Result<Bundle> {
		let api = self.api()?;
		let related = std::mem::take(&mut bundle.related);
		let mut saved = IndexMap::with_capacity(related.len());
		for (name, children) in related {
			let Some(field) = self.fields.get(&name) else {
				saved.insert(name, children);
				continue;
			};
			let children = match children {
				RelatedBundles::One(Some(child)) => RelatedBundles::One(Some(Box::new(
					self.save_related(&api, field, *child)?,
				))),
				RelatedBundles::One(None) => RelatedBundles::One(None),
				RelatedBundles::Many(children) => RelatedBundles::Many(
					children
						.into_iter()
						.map(|child| self.save_related(&api, field, child))
						.collect::<Result<Vec<_>>>()?,
				),
			};
			if let (Some(path), Some(obj)) = (field.attribute_path(), bundle.obj.as_mut()) {
				obj.set(path, links(&children)?);
			}
			saved.insert(name, children);
		}
		bundle.related = saved;

		let obj = bundle.obj.take().ok_or_else(|| {
			ResourceError::Persistence(format!("`{}` bundle has no object to save", self.name))
		})?;
		bundle.obj = Some(api.persistence()?.save(obj)?);
		tracing::debug!(resource = %self.name, "saved bundle");
		Ok(bundle)
	}

	fn save_related(&self, api: &Api, field: &Field, child: Bundle) -> Result<Bundle> {
		if child.uri_only || child.obj.is_none() {
			return Ok(child);
		}
		let Some(related) = field.related() else {
			return Ok(child);
		};
		let ctx = FieldContext::new(self, api);
		let resource = RelatedResolver::new(field, related, &ctx)
			.resolve_target_descriptor(Some(ResolveHint::Bundle(&child)))?;
		resource.save(child)
	}

	pub(crate) fn from_parts(builder: ResourceBuilderParts) -> Self {
		Self {
			name: builder.name,
			type_name: builder.type_name,
			object_class: builder.object_class,
			fields: builder.fields,
			validator: builder.validator,
			dehydrate_hooks: builder.dehydrate_hooks,
			hydrate_hooks: builder.hydrate_hooks,
			api: OnceLock::new(),
		}
	}

	pub(crate) fn hooks(&self) -> (&HashMap<String, DehydrateHook>, &HashMap<String, HydrateHook>) {
		(&self.dehydrate_hooks, &self.hydrate_hooks)
	}

	pub(crate) fn validator(&self) -> &Arc<dyn DocumentValidator> {
		&self.validator
	}
}

/// Everything a finished builder hands to [`Resource`]
pub(crate) struct ResourceBuilderParts {
	pub name: String,
	pub type_name: String,
	pub object_class: String,
	pub fields: IndexMap<String, Field>,
	pub validator: Arc<dyn DocumentValidator>,
	pub dehydrate_hooks: HashMap<String, DehydrateHook>,
	pub hydrate_hooks: HashMap<String, HydrateHook>,
}

fn links(children: &RelatedBundles) -> Result<Value> {
	match children {
		RelatedBundles::One(Some(child)) => Ok(Value::Reference(child.to_link()?)),
		RelatedBundles::One(None) => Ok(Value::Null),
		RelatedBundles::Many(children) => children
			.iter()
			.map(|child| child.to_link().map(Value::Reference))
			.collect::<Result<Vec<_>>>()
			.map(Value::List),
	}
}

/// Write a hydrated value onto the bundle's object
fn apply(bundle: &mut Bundle, name: &str, field: &Field, hydrated: Hydrated) -> Result<()> {
	let value = match hydrated {
		Hydrated::Value(value) => value,
		Hydrated::One(child) => {
			let children = RelatedBundles::One(child.map(Box::new));
			let value = links(&children)?;
			bundle.related.insert(name.to_string(), children);
			value
		}
		Hydrated::Many(children) => {
			let children = RelatedBundles::Many(children);
			let value = links(&children)?;
			bundle.related.insert(name.to_string(), children);
			value
		}
	};
	if let (Some(path), Some(obj)) = (field.attribute_path(), bundle.obj.as_mut()) {
		obj.set(path, value);
	}
	Ok(())
}
