//! Domain values
//!
//! [`Value`] is what a persisted [`Document`] holds. The wire format is
//! plain JSON (`serde_json::Value`); [`Value::from_json`] and
//! [`Value::to_json`] bridge the two without applying any field-specific
//! coercion. Coercion is the job of each field's `convert`.

use crate::document::Document;
use bson::oid::ObjectId;
use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde_json::{Map, Number, Value as JsonValue};
use std::sync::Arc;

/// A value stored on a document attribute
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
	#[default]
	Null,
	Bool(bool),
	Int(i64),
	Float(f64),
	Decimal(Decimal),
	String(String),
	Date(NaiveDate),
	DateTime(DateTime<Utc>),
	Time(NaiveTime),
	ObjectId(ObjectId),
	List(Vec<Value>),
	Dict(IndexMap<String, Value>),
	Reference(Reference),
}

/// A link from one document to another
///
/// Persisted documents carry `Unloaded` links; loading the target goes
/// through the persistence collaborator. `Loaded` links hold the target
/// in memory, which is what hydration produces.
#[derive(Debug, Clone, PartialEq)]
pub enum Reference {
	Loaded(Arc<Document>),
	Unloaded { collection: String, id: ObjectId },
}

impl Reference {
	pub fn unloaded(collection: impl Into<String>, id: ObjectId) -> Self {
		Self::Unloaded {
			collection: collection.into(),
			id,
		}
	}

	pub fn loaded(document: Document) -> Self {
		Self::Loaded(Arc::new(document))
	}

	/// Collection (document type) the reference points into
	pub fn collection(&self) -> &str {
		match self {
			Self::Loaded(doc) => doc.kind(),
			Self::Unloaded { collection, .. } => collection,
		}
	}

	/// Identity of the target, `None` for a loaded document never saved
	pub fn id(&self) -> Option<ObjectId> {
		match self {
			Self::Loaded(doc) => doc.id(),
			Self::Unloaded { id, .. } => Some(*id),
		}
	}

	pub fn document(&self) -> Option<&Document> {
		match self {
			Self::Loaded(doc) => Some(doc),
			Self::Unloaded { .. } => None,
		}
	}

	/// Drop the in-memory target, keeping only the link
	pub fn to_unloaded(&self) -> Option<Reference> {
		self.id()
			.map(|id| Reference::unloaded(self.collection(), id))
	}
}

impl Value {
	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}

	/// Null or the empty string, the two "nothing given" wire shapes
	pub fn is_blank(&self) -> bool {
		match self {
			Value::Null => true,
			Value::String(s) => s.is_empty(),
			_ => false,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::String(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Value::Bool(b) => Some(*b),
			_ => None,
		}
	}

	pub fn as_reference(&self) -> Option<&Reference> {
		match self {
			Value::Reference(r) => Some(r),
			_ => None,
		}
	}

	pub fn as_list(&self) -> Option<&[Value]> {
		match self {
			Value::List(items) => Some(items),
			_ => None,
		}
	}

	pub fn as_dict(&self) -> Option<&IndexMap<String, Value>> {
		match self {
			Value::Dict(map) => Some(map),
			_ => None,
		}
	}

	/// Short type name used in conversion error messages
	pub fn type_name(&self) -> &'static str {
		match self {
			Value::Null => "null",
			Value::Bool(_) => "boolean",
			Value::Int(_) => "integer",
			Value::Float(_) => "float",
			Value::Decimal(_) => "decimal",
			Value::String(_) => "string",
			Value::Date(_) => "date",
			Value::DateTime(_) => "datetime",
			Value::Time(_) => "time",
			Value::ObjectId(_) => "object id",
			Value::List(_) => "list",
			Value::Dict(_) => "dict",
			Value::Reference(_) => "reference",
		}
	}

	/// Lift a wire value without coercion
	///
	/// Numbers become `Int` when they fit an `i64`, `Float` otherwise.
	/// Strings stay strings; recognizing dates or identifiers is left to
	/// the field that receives them.
	pub fn from_json(json: &JsonValue) -> Value {
		match json {
			JsonValue::Null => Value::Null,
			JsonValue::Bool(b) => Value::Bool(*b),
			JsonValue::Number(n) => match n.as_i64() {
				Some(i) => Value::Int(i),
				None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
			},
			JsonValue::String(s) => Value::String(s.clone()),
			JsonValue::Array(items) => Value::List(items.iter().map(Value::from_json).collect()),
			JsonValue::Object(map) => Value::Dict(
				map.iter()
					.map(|(k, v)| (k.clone(), Value::from_json(v)))
					.collect(),
			),
		}
	}

	/// Render the value in its wire representation
	pub fn to_json(&self) -> JsonValue {
		match self {
			Value::Null => JsonValue::Null,
			Value::Bool(b) => JsonValue::Bool(*b),
			Value::Int(i) => JsonValue::Number((*i).into()),
			Value::Float(f) => Number::from_f64(*f)
				.map(JsonValue::Number)
				.unwrap_or(JsonValue::Null),
			Value::Decimal(d) => JsonValue::String(d.to_string()),
			Value::String(s) => JsonValue::String(s.clone()),
			Value::Date(d) => JsonValue::String(d.format("%Y-%m-%d").to_string()),
			Value::DateTime(dt) => {
				JsonValue::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
			}
			Value::Time(t) => JsonValue::String(t.format("%H:%M:%S").to_string()),
			Value::ObjectId(id) => JsonValue::String(id.to_hex()),
			Value::List(items) => JsonValue::Array(items.iter().map(Value::to_json).collect()),
			Value::Dict(map) => {
				let mut out = Map::new();
				for (k, v) in map {
					out.insert(k.clone(), v.to_json());
				}
				JsonValue::Object(out)
			}
			Value::Reference(r) => r
				.id()
				.map(|id| JsonValue::String(id.to_hex()))
				.unwrap_or(JsonValue::Null),
		}
	}
}

impl From<bool> for Value {
	fn from(b: bool) -> Self {
		Value::Bool(b)
	}
}

impl From<i64> for Value {
	fn from(i: i64) -> Self {
		Value::Int(i)
	}
}

impl From<i32> for Value {
	fn from(i: i32) -> Self {
		Value::Int(i64::from(i))
	}
}

impl From<f64> for Value {
	fn from(f: f64) -> Self {
		Value::Float(f)
	}
}

impl From<Decimal> for Value {
	fn from(d: Decimal) -> Self {
		Value::Decimal(d)
	}
}

impl From<&str> for Value {
	fn from(s: &str) -> Self {
		Value::String(s.to_string())
	}
}

impl From<String> for Value {
	fn from(s: String) -> Self {
		Value::String(s)
	}
}

impl From<NaiveDate> for Value {
	fn from(d: NaiveDate) -> Self {
		Value::Date(d)
	}
}

impl From<DateTime<Utc>> for Value {
	fn from(dt: DateTime<Utc>) -> Self {
		Value::DateTime(dt)
	}
}

impl From<NaiveTime> for Value {
	fn from(t: NaiveTime) -> Self {
		Value::Time(t)
	}
}

impl From<ObjectId> for Value {
	fn from(id: ObjectId) -> Self {
		Value::ObjectId(id)
	}
}

impl From<Reference> for Value {
	fn from(r: Reference) -> Self {
		Value::Reference(r)
	}
}

impl From<Document> for Value {
	fn from(doc: Document) -> Self {
		Value::Reference(Reference::loaded(doc))
	}
}

impl<T: Into<Value>> From<Vec<T>> for Value {
	fn from(items: Vec<T>) -> Self {
		Value::List(items.into_iter().map(Into::into).collect())
	}
}

impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(opt: Option<T>) -> Self {
		opt.map(Into::into).unwrap_or(Value::Null)
	}
}
