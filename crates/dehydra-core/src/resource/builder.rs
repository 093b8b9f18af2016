use super::{DehydrateHook, HydrateHook, Resource, ResourceBuilderParts};
use crate::bundle::Bundle;
use crate::error::{ResourceError, Result};
use crate::fields::Field;
use crate::validation::{DocumentValidator, NoValidation};
use crate::value::Value;
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;

const RESOURCE_URI: &str = "resource_uri";

/// Declares a [`Resource`]
///
/// Fields keep their declaration order. Fields inherited through
/// [`extends`](Self::extends) come first; declaring a field under an
/// inherited name replaces the inherited one in place.
pub struct ResourceBuilder {
	type_name: String,
	resource_name: Option<String>,
	object_class: Option<String>,
	inherited: IndexMap<String, Field>,
	fields: IndexMap<String, Field>,
	excluded: Vec<String>,
	include_resource_uri: bool,
	validator: Option<Arc<dyn DocumentValidator>>,
	dehydrate_hooks: HashMap<String, DehydrateHook>,
	hydrate_hooks: HashMap<String, HydrateHook>,
}

impl ResourceBuilder {
	pub fn new(type_name: impl Into<String>) -> Self {
		Self {
			type_name: type_name.into(),
			resource_name: None,
			object_class: None,
			inherited: IndexMap::new(),
			fields: IndexMap::new(),
			excluded: Vec::new(),
			include_resource_uri: true,
			validator: None,
			dehydrate_hooks: HashMap::new(),
			hydrate_hooks: HashMap::new(),
		}
	}

	/// Inherit the parent's fields, hooks, validator and object class
	pub fn extends(mut self, parent: &Resource) -> Self {
		for (name, field) in parent.fields() {
			self.inherited.insert(name.to_string(), field.clone());
		}
		let (dehydrate_hooks, hydrate_hooks) = parent.hooks();
		for (name, hook) in dehydrate_hooks {
			self.dehydrate_hooks
				.entry(name.clone())
				.or_insert_with(|| hook.clone());
		}
		for (name, hook) in hydrate_hooks {
			self.hydrate_hooks
				.entry(name.clone())
				.or_insert_with(|| hook.clone());
		}
		if self.validator.is_none() {
			self.validator = Some(parent.validator().clone());
		}
		if self.object_class.is_none() {
			self.object_class = Some(parent.object_class().to_string());
		}
		self
	}

	pub fn field(mut self, name: impl Into<String>, field: Field) -> Self {
		self.fields.insert(name.into(), field);
		self
	}

	/// Drop an inherited or declared field
	pub fn exclude(mut self, name: impl Into<String>) -> Self {
		self.excluded.push(name.into());
		self
	}

	pub fn resource_name(mut self, name: impl Into<String>) -> Self {
		self.resource_name = Some(name.into());
		self
	}

	pub fn object_class(mut self, class: impl Into<String>) -> Self {
		self.object_class = Some(class.into());
		self
	}

	/// Whether to add the read-only `resource_uri` field (on by default)
	pub fn include_resource_uri(mut self, include: bool) -> Self {
		self.include_resource_uri = include;
		self
	}

	pub fn validator(mut self, validator: impl DocumentValidator + 'static) -> Self {
		self.validator = Some(Arc::new(validator));
		self
	}

	pub fn dehydrate_with<F>(mut self, field: impl Into<String>, hook: F) -> Self
	where
		F: Fn(&Bundle) -> Result<JsonValue> + Send + Sync + 'static,
	{
		self.dehydrate_hooks.insert(field.into(), Arc::new(hook));
		self
	}

	pub fn hydrate_with<F>(mut self, field: impl Into<String>, hook: F) -> Self
	where
		F: Fn(&Bundle) -> Result<Value> + Send + Sync + 'static,
	{
		self.hydrate_hooks.insert(field.into(), Arc::new(hook));
		self
	}

	pub fn build(self) -> Result<Resource> {
		let base = self
			.type_name
			.split("Resource")
			.next()
			.unwrap_or_default()
			.to_string();
		let name = self.resource_name.unwrap_or_else(|| base.to_lowercase());
		if name.is_empty() {
			return Err(ResourceError::Configuration(format!(
				"cannot derive a resource name from `{}`",
				self.type_name
			)));
		}
		let object_class = self.object_class.unwrap_or(base);
		if object_class.is_empty() {
			return Err(ResourceError::Configuration(format!(
				"resource `{}` has no object class",
				name
			)));
		}

		let mut fields = self.inherited;
		for (field_name, field) in self.fields {
			fields.insert(field_name, field);
		}
		for excluded in &self.excluded {
			fields.shift_remove(excluded);
		}
		if self.include_resource_uri {
			// always last, also when inherited
			let uri_field = fields
				.shift_remove(RESOURCE_URI)
				.unwrap_or_else(Field::resource_uri);
			fields.insert(RESOURCE_URI.to_string(), uri_field);
		} else {
			fields.shift_remove(RESOURCE_URI);
		}
		for hooked in self.dehydrate_hooks.keys().chain(self.hydrate_hooks.keys()) {
			if !fields.contains_key(hooked) {
				return Err(ResourceError::Configuration(format!(
					"resource `{}` has a hook for unknown field `{}`",
					name, hooked
				)));
			}
		}
		for (field_name, field) in fields.iter_mut() {
			field.bind(field_name, &name);
		}

		Ok(Resource::from_parts(ResourceBuilderParts {
			name,
			type_name: self.type_name,
			object_class,
			fields,
			validator: self.validator.unwrap_or_else(|| Arc::new(NoValidation)),
			dehydrate_hooks: self.dehydrate_hooks,
			hydrate_hooks: self.hydrate_hooks,
		}))
	}
}
