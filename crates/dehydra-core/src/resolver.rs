//! Related-resource resolution
//!
//! [`RelatedResolver`] bridges a related [`Field`] and the resource on the
//! other side of the relationship. Hydration turns URIs and nested payloads
//! into bundles of the related resource; dehydration turns references into
//! URIs, or into the related resource's full representation when the field
//! is declared `full`.
//!
//! Full dehydration stops at the API's `max_depth`; deeper relations are
//! emitted as URIs so that self-referential data cannot recurse forever.

use crate::bundle::Bundle;
use crate::document::Document;
use crate::error::{ResourceError, Result};
use crate::fields::{Accessor, Cardinality, Field, FieldContext, Hydrated, RelatedField};
use crate::request::Request;
use crate::resource::Resource;
use crate::value::{Reference, Value};
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;
use std::sync::Arc;

/// Input inspected when a generic relation has to pick its resource
#[derive(Debug, Clone, Copy)]
pub enum ResolveHint<'a> {
	Document(&'a Document),
	Reference(&'a Reference),
	Bundle(&'a Bundle),
	Wire(&'a JsonValue),
}

/// Resolution strategy for one related field
pub struct RelatedResolver<'a> {
	field: &'a Field,
	related: &'a RelatedField,
	ctx: FieldContext<'a>,
}

impl<'a> RelatedResolver<'a> {
	pub fn new(field: &'a Field, related: &'a RelatedField, ctx: &FieldContext<'a>) -> Self {
		Self {
			field,
			related,
			ctx: *ctx,
		}
	}

	/// Resource on the other side of the relationship
	///
	/// A static target is looked up once and memoized. A generic relation
	/// inspects `hint`: documents and references by their type, bundles by
	/// their object, wire data by its `resource_uri`.
	pub fn resolve_target_descriptor(&self, hint: Option<ResolveHint<'_>>) -> Result<Arc<Resource>> {
		if let Some(name) = self.related.target_name() {
			if let Some(resource) = self.related.memoized() {
				return Ok(resource);
			}
			let resource = self.ctx.api().resource(name).map_err(|_| {
				ResourceError::Resolution(format!(
					"field `{}` targets `{}`, which is not registered",
					self.field.name(),
					name
				))
			})?;
			self.related.memoize(&resource);
			return Ok(resource);
		}

		let api = self.ctx.api();
		let resolved = match hint {
			Some(ResolveHint::Document(doc)) => api.resource_for_object_type(doc),
			Some(ResolveHint::Reference(reference)) => {
				api.resource_for_collection(reference.collection())
			}
			Some(ResolveHint::Bundle(bundle)) => match (&bundle.obj, bundle.reference()) {
				(Some(obj), _) => api.resource_for_object_type(obj),
				(None, Some(reference)) => api.resource_for_collection(reference.collection()),
				(None, None) => self.resource_for_wire_map(&bundle.data),
			},
			Some(ResolveHint::Wire(data)) => match data {
				JsonValue::String(uri) => api.resource_for_uri(uri),
				JsonValue::Object(map) => self.resource_for_wire_map(map),
				_ => Err(self.unresolvable()),
			},
			None => Err(self.unresolvable()),
		};
		resolved.map_err(|err| match err {
			ResourceError::NotRegistered(what) => ResourceError::Resolution(format!(
				"field `{}`: no resource registered for `{}`",
				self.field.name(),
				what
			)),
			other => other,
		})
	}

	fn resource_for_wire_map(&self, map: &Map<String, JsonValue>) -> Result<Arc<Resource>> {
		let uri = map
			.get("resource_uri")
			.or_else(|| map.get(self.field.name()))
			.and_then(JsonValue::as_str)
			.ok_or_else(|| self.unresolvable())?;
		self.ctx.api().resource_for_uri(uri)
	}

	fn unresolvable(&self) -> ResourceError {
		ResourceError::Resolution(format!(
			"field `{}` cannot determine the related resource",
			self.field.name()
		))
	}

	/// Bundle of the related resource for one wire item
	///
	/// A URI yields an identity-only bundle. A mapping on a read-only field
	/// only honors its `resource_uri`; on a writable field it is hydrated in
	/// full by the related resource.
	pub fn resolve_bundle(&self, data: &JsonValue, request: Option<Arc<Request>>) -> Result<Bundle> {
		match data {
			JsonValue::String(uri) => {
				let resource = self.resolve_target_descriptor(Some(ResolveHint::Wire(data)))?;
				resource.build_bundle_for_uri(uri, request)
			}
			JsonValue::Object(map) if self.field.is_readonly() => {
				let uri = map
					.get("resource_uri")
					.and_then(JsonValue::as_str)
					.ok_or_else(|| {
						ResourceError::field(
							self.field.name(),
							"is read-only; related data must carry a resource_uri",
						)
					})?;
				let resource = self.resolve_target_descriptor(Some(ResolveHint::Wire(data)))?;
				resource.build_bundle_for_uri(uri, request)
			}
			JsonValue::Object(map) => {
				let resource = self.resolve_target_descriptor(Some(ResolveHint::Wire(data)))?;
				let bundle = resource.build_bundle(None, Some(map.clone()), request)?;
				resource.hydrate_all(bundle)
			}
			other => Err(ResourceError::field(
				self.field.name(),
				format!("expected a URI or a mapping, got `{}`", other),
			)),
		}
	}

	pub fn hydrate(&self, bundle: &mut Bundle) -> Result<Hydrated> {
		match self.related.cardinality() {
			Cardinality::ToOne => self.hydrate_one(bundle).map(Hydrated::One),
			Cardinality::ToMany => self.hydrate_many(bundle).map(Hydrated::Many),
		}
	}

	pub fn dehydrate(&self, bundle: &Bundle) -> Result<JsonValue> {
		match self.related.cardinality() {
			Cardinality::ToOne => self.dehydrate_one(bundle),
			Cardinality::ToMany => self.dehydrate_many(bundle),
		}
	}

	fn hydrate_one(&self, bundle: &Bundle) -> Result<Option<Bundle>> {
		let data = match bundle.data.get(self.field.name()) {
			Some(data) => data.clone(),
			None => self.field.fallback()?.to_json(),
		};
		if data.is_null() {
			return Ok(None);
		}
		let child = self.resolve_bundle(&data, bundle.request.clone())?;
		Ok(Some(child.at_depth(bundle.depth() + 1)))
	}

	fn hydrate_many(&self, bundle: &mut Bundle) -> Result<Vec<Bundle>> {
		let name = self.field.name().to_string();
		if self.related.ignores_closed() {
			self.keep_closed(bundle)?;
		}
		let items = match bundle.data.get(&name) {
			Some(JsonValue::Array(items)) => items.clone(),
			Some(JsonValue::Null) => Vec::new(),
			Some(other) => {
				return Err(ResourceError::conversion(
					&name,
					other,
					"expected a list of related resources",
				));
			}
			None => match self.field.fallback()? {
				Value::Null => Vec::new(),
				Value::List(items) => items.iter().map(Value::to_json).collect(),
				other => {
					return Err(ResourceError::conversion(
						&name,
						&other,
						"default is not a list",
					));
				}
			},
		};

		let mut out: Vec<Bundle> = Vec::with_capacity(items.len());
		let mut seen: HashMap<String, usize> = HashMap::new();
		for item in &items {
			if item.is_null() || item.as_str() == Some("") {
				continue;
			}
			let key = item.as_str().map(str::to_string);
			if let Some(&index) = key.as_ref().and_then(|k| seen.get(k)) {
				let duplicate = out[index].clone();
				out.push(duplicate);
				continue;
			}
			let child = self
				.resolve_bundle(item, bundle.request.clone())?
				.at_depth(bundle.depth() + 1);
			if let Some(key) = key {
				seen.insert(key.clone(), out.len());
				bundle.lookup_index.entry(name.clone()).or_default().insert(key);
			}
			out.push(child);
		}
		Ok(out)
	}

	/// Append closed relations of the current object that the payload omits
	fn keep_closed(&self, bundle: &mut Bundle) -> Result<()> {
		let (Some(path), Some(obj)) = (self.field.attribute_path(), &bundle.obj) else {
			return Ok(());
		};
		let Value::List(current) = obj.lookup(path) else {
			return Ok(());
		};
		let request = bundle.request.clone();
		let mut closed = Vec::new();
		for item in &current {
			let Value::Reference(reference) = item else {
				continue;
			};
			let resource = self.resolve_target_descriptor(Some(ResolveHint::Reference(reference)))?;
			if self.load(&resource, reference)?.is_closed() {
				if let Some(uri) = resource.uri_for_reference(reference, request.as_deref())? {
					closed.push(uri);
				}
			}
		}
		if closed.is_empty() {
			return Ok(());
		}
		let entry = bundle
			.data
			.entry(self.field.name().to_string())
			.or_insert_with(|| JsonValue::Array(Vec::new()));
		if let JsonValue::Array(items) = entry {
			for uri in closed {
				let present = items.iter().any(|item| {
					item.as_str() == Some(uri.as_str())
						|| item.get("resource_uri").and_then(JsonValue::as_str) == Some(uri.as_str())
				});
				if !present {
					items.push(JsonValue::String(uri));
				}
			}
		}
		Ok(())
	}

	/// Domain value behind the field, before any reference handling
	fn source_value(&self, bundle: &Bundle) -> Result<Option<Value>> {
		match self.field.accessor() {
			Accessor::Provider(_) => Ok(None),
			Accessor::Attribute(_) => self.field.read_attribute(bundle, &self.ctx).map(Some),
			Accessor::None => Ok(Some(self.field.default_value().unwrap_or_default())),
		}
	}

	fn dehydrate_one(&self, bundle: &Bundle) -> Result<JsonValue> {
		let Some(value) = self.source_value(bundle)? else {
			return self.provided();
		};
		if value.is_null() {
			return Ok(JsonValue::Null);
		}
		let reference = self.as_reference(&value)?;
		match self.dehydrate_reference(&reference, bundle)? {
			Some(json) => Ok(json),
			None if self.field.is_required() => Err(ResourceError::field(
				self.field.name(),
				"related object is not readable and the field does not allow null",
			)),
			None => Ok(JsonValue::Null),
		}
	}

	fn dehydrate_many(&self, bundle: &Bundle) -> Result<JsonValue> {
		let Some(value) = self.source_value(bundle)? else {
			return self.provided();
		};
		let items = match value {
			Value::Null => return Ok(JsonValue::Array(Vec::new())),
			Value::List(items) => items,
			other => {
				return Err(ResourceError::field(
					self.field.name(),
					format!("expected a list of related documents, got {}", other.type_name()),
				));
			}
		};
		let mut out = Vec::with_capacity(items.len());
		for item in items.iter().filter(|item| !item.is_null()) {
			let reference = self.as_reference(item)?;
			if let Some(json) = self.dehydrate_reference(&reference, bundle)? {
				out.push(json);
			}
		}
		Ok(JsonValue::Array(out))
	}

	fn provided(&self) -> Result<JsonValue> {
		match self.field.accessor() {
			Accessor::Provider(provider) => Ok(provider()),
			_ => Ok(JsonValue::Null),
		}
	}

	fn as_reference(&self, value: &Value) -> Result<Reference> {
		match value {
			Value::Reference(reference) => Ok(reference.clone()),
			Value::ObjectId(id) if self.related.target_name().is_some() => {
				let resource = self.resolve_target_descriptor(None)?;
				Ok(Reference::unloaded(resource.object_class(), *id))
			}
			other => Err(ResourceError::field(
				self.field.name(),
				format!("expected a related document, got {}", other.type_name()),
			)),
		}
	}

	/// URI or full representation of one related object; `None` when the
	/// object is hidden from the response
	fn dehydrate_reference(&self, reference: &Reference, parent: &Bundle) -> Result<Option<JsonValue>> {
		let resource = self.resolve_target_descriptor(Some(ResolveHint::Reference(reference)))?;
		let request = parent.request.clone();
		let depth = parent.depth() + 1;
		let max_depth = self.ctx.api().settings().max_depth;

		if !self.related.is_full() || depth > max_depth {
			if self.related.is_full() {
				tracing::debug!(
					field = self.field.name(),
					depth,
					"nesting limit reached, emitting related URI"
				);
			}
			let uri = resource.uri_for_reference(reference, request.as_deref())?;
			return Ok(Some(uri.map(JsonValue::String).unwrap_or(JsonValue::Null)));
		}

		let document = self.load(&resource, reference)?;
		if !self
			.ctx
			.api()
			.authorization()
			.may_read(&document, request.as_deref())
		{
			return Ok(None);
		}
		if self.related.ignores_closed() && document.is_closed() {
			return Ok(None);
		}
		let child = Bundle::new()
			.with_object(document)
			.with_request(request)
			.at_depth(depth);
		let child = resource.dehydrate_all(child)?;
		Ok(Some(child.to_json()))
	}

	fn load(&self, resource: &Resource, reference: &Reference) -> Result<Document> {
		match reference {
			Reference::Loaded(doc) => Ok(Document::clone(doc)),
			Reference::Unloaded { id, .. } => {
				self.ctx.api().persistence()?.load_by_identity(resource, id)
			}
		}
	}
}
