//! Typed field descriptors
//!
//! A [`Field`] converts one attribute of a document between its domain
//! value and its wire value. Every field shares the same options (source
//! accessor, default, required, read-only, unique); what differs per kind is
//! held in [`FieldKind`].
//!
//! # Examples
//!
//! ```
//! use dehydra_core::fields::{ApiField, Field};
//! use dehydra_core::value::Value;
//!
//! let finished = Field::boolean("finished").default(false);
//! assert_eq!(finished.convert(&Value::from("yes")).unwrap(), Value::Bool(true));
//! assert!(!finished.is_required());
//! ```

mod convert;
mod embedded;
mod related;

pub use embedded::EmbeddedSchema;
pub use related::{Cardinality, RelatedField, RelatedTarget};

use crate::api::Api;
use crate::bundle::Bundle;
use crate::error::{ResourceError, Result};
use crate::request::Request;
use crate::resolver::RelatedResolver;
use crate::resource::Resource;
use crate::value::{Reference, Value};
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::Arc;

/// Zero-argument callable producing a wire value directly
pub type Provider = Arc<dyn Fn() -> JsonValue + Send + Sync>;

/// Where a field reads its value from when dehydrating
#[derive(Clone)]
pub enum Accessor {
	/// Dotted attribute path on the document
	Attribute(String),
	/// Called on every dehydration; the result is used verbatim
	Provider(Provider),
	/// Nothing to read; the default (if any) is used
	None,
}

impl fmt::Debug for Accessor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Attribute(path) => f.debug_tuple("Attribute").field(path).finish(),
			Self::Provider(_) => f.write_str("Provider(..)"),
			Self::None => f.write_str("None"),
		}
	}
}

/// Value used when neither the document nor the payload supply one
#[derive(Clone)]
pub enum DefaultValue {
	Value(Value),
	Callable(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl DefaultValue {
	pub fn resolve(&self) -> Value {
		match self {
			Self::Value(value) => value.clone(),
			Self::Callable(f) => f(),
		}
	}
}

impl fmt::Debug for DefaultValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
			Self::Callable(_) => f.write_str("Callable(..)"),
		}
	}
}

/// The closed set of field kinds
#[derive(Debug, Clone)]
pub enum FieldKind {
	String,
	Integer,
	Float,
	Decimal,
	Boolean,
	List,
	Dict,
	Date,
	DateTime,
	Time,
	/// The document's persistent identity
	ObjectId,
	Embedded(EmbeddedSchema),
	Related(RelatedField),
	/// URI of the bundle's own object
	ResourceUri,
}

impl FieldKind {
	/// Type name reported to API clients describing the schema
	pub fn dehydrated_type(&self) -> &'static str {
		match self {
			Self::String | Self::ResourceUri => "string",
			Self::Integer => "integer",
			Self::Float => "float",
			Self::Decimal => "decimal",
			Self::Boolean => "boolean",
			Self::List => "list",
			Self::Dict => "dict",
			Self::Date => "date",
			Self::DateTime => "datetime",
			Self::Time => "time",
			Self::ObjectId => "objectid",
			Self::Embedded(_) => "embedded",
			Self::Related(_) => "related",
		}
	}
}

/// Result of hydrating one field
#[derive(Debug, Clone)]
pub enum Hydrated {
	Value(Value),
	One(Option<Bundle>),
	Many(Vec<Bundle>),
}

/// What a field needs from its surroundings while (de)hydrating
#[derive(Clone, Copy)]
pub struct FieldContext<'a> {
	resource: &'a Resource,
	api: &'a Api,
}

impl<'a> FieldContext<'a> {
	pub fn new(resource: &'a Resource, api: &'a Api) -> Self {
		Self { resource, api }
	}

	/// The resource declaring the field
	pub fn resource(&self) -> &'a Resource {
		self.resource
	}

	pub fn api(&self) -> &'a Api {
		self.api
	}

	/// Replace loaded documents the request may not read with null, and drop
	/// them from lists
	fn visible(&self, value: Value, request: Option<&Request>) -> Value {
		let readable = |value: &Value| match value {
			Value::Reference(Reference::Loaded(doc)) => {
				self.api.authorization().may_read(doc, request)
			}
			_ => true,
		};
		match value {
			Value::List(items) => Value::List(items.into_iter().filter(readable).collect()),
			other if readable(&other) => other,
			_ => Value::Null,
		}
	}
}

/// Conversion between domain and wire values for one field
pub trait ApiField {
	/// Coerce a raw value into the field's domain type; null stays null
	fn convert(&self, value: &Value) -> Result<Value>;

	/// Produce the wire value for the bundle's object
	fn dehydrate(&self, bundle: &Bundle, ctx: &FieldContext<'_>) -> Result<JsonValue>;

	/// Compute the domain value from the bundle's wire data
	///
	/// Nothing is written to the object; applying the result is up to the
	/// resource.
	fn hydrate(&self, bundle: &mut Bundle, ctx: &FieldContext<'_>) -> Result<Hydrated>;
}

/// A field declaration
#[derive(Debug, Clone)]
pub struct Field {
	name: String,
	kind: FieldKind,
	attribute: Accessor,
	default: Option<DefaultValue>,
	required: bool,
	readonly: bool,
	unique: bool,
	help_text: Option<String>,
}

impl Field {
	/// A field of the given kind with no source attribute
	pub fn new(kind: FieldKind) -> Self {
		Self {
			name: String::new(),
			kind,
			attribute: Accessor::None,
			default: None,
			required: false,
			readonly: false,
			unique: false,
			help_text: None,
		}
	}

	fn sourced(kind: FieldKind, attribute: &str) -> Self {
		Self::new(kind).attribute(attribute)
	}

	pub fn string(attribute: &str) -> Self {
		Self::sourced(FieldKind::String, attribute)
	}

	pub fn integer(attribute: &str) -> Self {
		Self::sourced(FieldKind::Integer, attribute)
	}

	pub fn float(attribute: &str) -> Self {
		Self::sourced(FieldKind::Float, attribute)
	}

	pub fn decimal(attribute: &str) -> Self {
		Self::sourced(FieldKind::Decimal, attribute)
	}

	pub fn boolean(attribute: &str) -> Self {
		Self::sourced(FieldKind::Boolean, attribute)
	}

	pub fn list(attribute: &str) -> Self {
		Self::sourced(FieldKind::List, attribute)
	}

	pub fn dict(attribute: &str) -> Self {
		Self::sourced(FieldKind::Dict, attribute)
	}

	pub fn date(attribute: &str) -> Self {
		Self::sourced(FieldKind::Date, attribute)
	}

	pub fn datetime(attribute: &str) -> Self {
		Self::sourced(FieldKind::DateTime, attribute)
	}

	pub fn time(attribute: &str) -> Self {
		Self::sourced(FieldKind::Time, attribute)
	}

	/// The document identity; always read-only and unique
	pub fn object_id() -> Self {
		let mut field = Self::sourced(FieldKind::ObjectId, "id");
		field.readonly = true;
		field.unique = true;
		field
	}

	pub fn embedded(attribute: &str, schema: EmbeddedSchema) -> Self {
		Self::sourced(FieldKind::Embedded(schema), attribute)
	}

	pub fn to_one(attribute: &str, target: RelatedTarget) -> Self {
		Self::sourced(
			FieldKind::Related(RelatedField::new(target, Cardinality::ToOne)),
			attribute,
		)
	}

	pub fn to_many(attribute: &str, target: RelatedTarget) -> Self {
		Self::sourced(
			FieldKind::Related(RelatedField::new(target, Cardinality::ToMany)),
			attribute,
		)
	}

	/// Read-only URI of the bundle's object
	pub fn resource_uri() -> Self {
		let mut field = Self::new(FieldKind::ResourceUri);
		field.readonly = true;
		field
	}

	pub fn attribute(mut self, path: &str) -> Self {
		self.attribute = Accessor::Attribute(path.to_string());
		self
	}

	/// Dehydrate by calling `provider` instead of reading the document
	pub fn provider<F>(mut self, provider: F) -> Self
	where
		F: Fn() -> JsonValue + Send + Sync + 'static,
	{
		self.attribute = Accessor::Provider(Arc::new(provider));
		self
	}

	pub fn default(mut self, value: impl Into<Value>) -> Self {
		self.default = Some(DefaultValue::Value(value.into()));
		self
	}

	/// Default computed on every use
	pub fn default_with<F>(mut self, f: F) -> Self
	where
		F: Fn() -> Value + Send + Sync + 'static,
	{
		self.default = Some(DefaultValue::Callable(Arc::new(f)));
		self
	}

	pub fn required(mut self) -> Self {
		self.required = true;
		self
	}

	pub fn readonly(mut self) -> Self {
		self.readonly = true;
		self
	}

	pub fn unique(mut self) -> Self {
		self.unique = true;
		self
	}

	pub fn help_text(mut self, text: impl Into<String>) -> Self {
		self.help_text = Some(text.into());
		self
	}

	/// Dehydrate related documents in full instead of as URIs
	pub fn full(mut self) -> Self {
		if let FieldKind::Related(related) = &mut self.kind {
			related.set_full(true);
		}
		self
	}

	/// Hide closed related documents and keep them through hydration
	pub fn ignore_closed(mut self) -> Self {
		if let FieldKind::Related(related) = &mut self.kind {
			related.set_ignore_closed(true);
		}
		self
	}

	/// Field name within its resource; empty until registered
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn kind(&self) -> &FieldKind {
		&self.kind
	}

	pub fn accessor(&self) -> &Accessor {
		&self.attribute
	}

	pub fn attribute_path(&self) -> Option<&str> {
		match &self.attribute {
			Accessor::Attribute(path) => Some(path),
			_ => None,
		}
	}

	pub fn has_default(&self) -> bool {
		self.default.is_some()
	}

	pub fn default_value(&self) -> Option<Value> {
		self.default.as_ref().map(DefaultValue::resolve)
	}

	pub fn is_required(&self) -> bool {
		self.required
	}

	pub fn is_readonly(&self) -> bool {
		self.readonly
	}

	pub fn is_unique(&self) -> bool {
		self.unique
	}

	pub fn help(&self) -> Option<&str> {
		self.help_text.as_deref()
	}

	pub fn related(&self) -> Option<&RelatedField> {
		match &self.kind {
			FieldKind::Related(related) => Some(related),
			_ => None,
		}
	}

	pub fn dehydrated_type(&self) -> &'static str {
		self.kind.dehydrated_type()
	}

	fn bind_name(&mut self, name: &str) {
		self.name = name.to_string();
	}

	/// Attach the field to a resource under `name`
	pub(crate) fn bind(&mut self, name: &str, owner: &str) {
		self.bind_name(name);
		if let FieldKind::Related(related) = &mut self.kind {
			related.bind(owner);
		}
	}

	/// Default, else null when optional, else a field error
	pub(crate) fn fallback(&self) -> Result<Value> {
		if let Some(default) = &self.default {
			return Ok(default.resolve());
		}
		if !self.required {
			return Ok(Value::Null);
		}
		Err(ResourceError::field(
			&self.name,
			"has no data, no default and does not allow null",
		))
	}

	/// Read the source attribute, hiding documents the request may not read
	pub(crate) fn read_attribute(&self, bundle: &Bundle, ctx: &FieldContext<'_>) -> Result<Value> {
		let value = match (&self.attribute, &bundle.obj) {
			(Accessor::Attribute(path), Some(obj)) => obj.lookup(path),
			_ => Value::Null,
		};
		let value = ctx.visible(value, bundle.request());
		if value.is_null() {
			self.fallback()
		} else {
			Ok(value)
		}
	}

	fn hydrate_value(&self, bundle: &Bundle) -> Result<Value> {
		match bundle.data.get(&self.name) {
			Some(raw) => self.convert(&Value::from_json(raw)),
			None => self.fallback(),
		}
	}

	/// Merge converted keys onto the current embedded value and validate it
	fn hydrate_embedded(&self, schema: &EmbeddedSchema, bundle: &Bundle) -> Result<Value> {
		let incoming = match self.hydrate_value(bundle)? {
			Value::Dict(incoming) => incoming,
			other => return Ok(other),
		};
		let mut merged = match (&self.attribute, &bundle.obj) {
			(Accessor::Attribute(path), Some(obj)) => {
				obj.lookup(path).as_dict().cloned().unwrap_or_default()
			}
			_ => Default::default(),
		};
		merged.extend(incoming);
		let errors = schema.validate(&self.name, &merged);
		if !errors.is_empty() {
			return Err(ResourceError::Validation(errors));
		}
		Ok(Value::Dict(merged))
	}
}

impl ApiField for Field {
	fn convert(&self, value: &Value) -> Result<Value> {
		convert::convert(&self.name, &self.kind, value)
	}

	fn dehydrate(&self, bundle: &Bundle, ctx: &FieldContext<'_>) -> Result<JsonValue> {
		tracing::trace!(field = %self.name, "dehydrate");
		match &self.kind {
			FieldKind::ObjectId => {
				return Ok(bundle
					.reference()
					.and_then(|r| r.id())
					.map(|id| JsonValue::String(id.to_hex()))
					.unwrap_or(JsonValue::Null));
			}
			FieldKind::ResourceUri => {
				return Ok(ctx
					.resource()
					.get_resource_uri(bundle)?
					.map(JsonValue::String)
					.unwrap_or(JsonValue::Null));
			}
			FieldKind::Related(related) => {
				return RelatedResolver::new(self, related, ctx).dehydrate(bundle);
			}
			_ => {}
		}
		match &self.attribute {
			Accessor::Attribute(_) => {
				let value = self.read_attribute(bundle, ctx)?;
				Ok(self.convert(&value)?.to_json())
			}
			Accessor::Provider(provider) => Ok(provider()),
			Accessor::None => match &self.default {
				Some(default) => Ok(self.convert(&default.resolve())?.to_json()),
				None => Ok(JsonValue::Null),
			},
		}
	}

	fn hydrate(&self, bundle: &mut Bundle, ctx: &FieldContext<'_>) -> Result<Hydrated> {
		tracing::trace!(field = %self.name, "hydrate");
		match &self.kind {
			FieldKind::Related(related) => RelatedResolver::new(self, related, ctx).hydrate(bundle),
			FieldKind::Embedded(schema) => self.hydrate_embedded(schema, bundle).map(Hydrated::Value),
			_ => self.hydrate_value(bundle).map(Hydrated::Value),
		}
	}
}
