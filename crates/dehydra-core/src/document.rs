//! Persisted objects

use crate::value::{Reference, Value};
use bson::oid::ObjectId;
use indexmap::IndexMap;

/// A persisted object: its type name, identity and attribute values
///
/// Attribute paths may be dotted (`"address.city"`). Reading walks through
/// embedded dicts and loaded references; `id` and `pk` name the identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
	kind: String,
	id: Option<ObjectId>,
	values: IndexMap<String, Value>,
}

fn is_identity(name: &str) -> bool {
	name == "id" || name == "pk"
}

impl Document {
	/// Create an empty, unsaved document of the given type
	pub fn new(kind: impl Into<String>) -> Self {
		Self {
			kind: kind.into(),
			id: None,
			values: IndexMap::new(),
		}
	}

	pub fn with_id(mut self, id: ObjectId) -> Self {
		self.id = Some(id);
		self
	}

	/// Builder-style [`Document::set`]
	pub fn with(mut self, path: &str, value: impl Into<Value>) -> Self {
		self.set(path, value.into());
		self
	}

	pub fn kind(&self) -> &str {
		&self.kind
	}

	pub fn id(&self) -> Option<ObjectId> {
		self.id
	}

	pub fn set_id(&mut self, id: ObjectId) {
		self.id = Some(id);
	}

	pub fn values(&self) -> &IndexMap<String, Value> {
		&self.values
	}

	/// Whether the document has a top-level attribute named `name`
	pub fn has_attribute(&self, name: &str) -> bool {
		is_identity(name) || self.values.contains_key(name)
	}

	/// Top-level attribute, without path traversal
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.values.get(name)
	}

	/// Resolve a dotted attribute path; missing segments read as null
	pub fn lookup(&self, path: &str) -> Value {
		let (head, rest) = match path.split_once('.') {
			Some((head, rest)) => (head, Some(rest)),
			None => (path, None),
		};
		let value = if is_identity(head) {
			self.id.map(Value::ObjectId).unwrap_or_default()
		} else {
			self.values.get(head).cloned().unwrap_or_default()
		};
		match rest {
			None => value,
			Some(rest) => descend(&value, rest),
		}
	}

	/// Assign a dotted attribute path, creating intermediate dicts
	///
	/// Assigning an object id to `id`/`pk` sets the identity; any other
	/// value there is ignored.
	pub fn set(&mut self, path: &str, value: Value) {
		let mut segments = path.split('.');
		let Some(head) = segments.next() else {
			return;
		};
		let rest: Vec<&str> = segments.collect();
		if is_identity(head) && rest.is_empty() {
			if let Value::ObjectId(id) = value {
				self.id = Some(id);
			}
			return;
		}
		if rest.is_empty() {
			self.values.insert(head.to_string(), value);
			return;
		}
		let slot = self.values.entry(head.to_string()).or_insert(Value::Null);
		assign(slot, &rest, value);
	}

	/// Remove a top-level attribute
	pub fn remove(&mut self, name: &str) -> Option<Value> {
		self.values.shift_remove(name)
	}

	/// Whether the document is flagged as closed
	pub fn is_closed(&self) -> bool {
		matches!(self.values.get("closed"), Some(Value::Bool(true)))
	}

	/// Link to this document as stored by other documents
	pub fn to_reference(&self) -> Option<Reference> {
		self.id.map(|id| Reference::unloaded(self.kind.clone(), id))
	}
}

fn descend(value: &Value, path: &str) -> Value {
	match value {
		Value::Dict(map) => {
			let (head, rest) = match path.split_once('.') {
				Some((head, rest)) => (head, Some(rest)),
				None => (path, None),
			};
			let inner = map.get(head).cloned().unwrap_or_default();
			match rest {
				None => inner,
				Some(rest) => descend(&inner, rest),
			}
		}
		Value::Reference(Reference::Loaded(doc)) => doc.lookup(path),
		_ => Value::Null,
	}
}

fn assign(slot: &mut Value, path: &[&str], value: Value) {
	if !matches!(slot, Value::Dict(_)) {
		*slot = Value::Dict(IndexMap::new());
	}
	let Value::Dict(map) = slot else {
		return;
	};
	match path {
		[] => {}
		[last] => {
			map.insert((*last).to_string(), value);
		}
		[head, rest @ ..] => {
			let next = map.entry((*head).to_string()).or_insert(Value::Null);
			assign(next, rest, value);
		}
	}
}
