//! In-memory persistence

use bson::oid::ObjectId;
use dehydra_core::document::Document;
use dehydra_core::error::{ResourceError, Result};
use dehydra_core::persistence::Persistence;
use dehydra_core::resource::Resource;
use dehydra_core::value::{Reference, Value};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Documents kept per collection, in insertion order
///
/// Stored documents link to each other the way a database would: loaded
/// references are reduced to unloaded ones on save, so reading a related
/// document back goes through [`Persistence::load_by_identity`].
#[derive(Debug, Default)]
pub struct MemoryStore {
	collections: RwLock<HashMap<String, IndexMap<ObjectId, Document>>>,
	loads: AtomicUsize,
	saves: AtomicUsize,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Store a document, assigning an identity when it has none
	pub fn insert(&self, document: Document) -> Document {
		let id = document.id().unwrap_or_else(ObjectId::new);
		let mut stored = Document::new(document.kind()).with_id(id);
		for (name, value) in document.values() {
			stored.set(name, unlink(value.clone()));
		}
		self.collections
			.write()
			.entry(stored.kind().to_string())
			.or_default()
			.insert(id, stored.clone());
		stored
	}

	pub fn get(&self, collection: &str, id: &ObjectId) -> Option<Document> {
		self.collections
			.read()
			.get(collection)
			.and_then(|docs| docs.get(id))
			.cloned()
	}

	/// All documents of a collection, in insertion order
	pub fn all(&self, collection: &str) -> Vec<Document> {
		self.collections
			.read()
			.get(collection)
			.map(|docs| docs.values().cloned().collect())
			.unwrap_or_default()
	}

	pub fn len(&self, collection: &str) -> usize {
		self.collections
			.read()
			.get(collection)
			.map(IndexMap::len)
			.unwrap_or(0)
	}

	pub fn is_empty(&self) -> bool {
		self.collections.read().values().all(IndexMap::is_empty)
	}

	/// Number of `load_by_identity` calls so far
	pub fn load_count(&self) -> usize {
		self.loads.load(Ordering::SeqCst)
	}

	/// Number of `save` calls so far
	pub fn save_count(&self) -> usize {
		self.saves.load(Ordering::SeqCst)
	}
}

fn unlink(value: Value) -> Value {
	match value {
		Value::Reference(reference @ Reference::Loaded(_)) => reference
			.to_unloaded()
			.map(Value::Reference)
			.unwrap_or(Value::Null),
		Value::List(items) => Value::List(items.into_iter().map(unlink).collect()),
		Value::Dict(map) => Value::Dict(map.into_iter().map(|(k, v)| (k, unlink(v))).collect()),
		other => other,
	}
}

impl Persistence for MemoryStore {
	fn load_by_identity(&self, resource: &Resource, id: &ObjectId) -> Result<Document> {
		self.loads.fetch_add(1, Ordering::SeqCst);
		self.get(resource.object_class(), id)
			.ok_or_else(|| ResourceError::NotFound {
				resource: resource.name().to_string(),
				id: id.to_hex(),
			})
	}

	fn save(&self, document: Document) -> Result<Document> {
		self.saves.fetch_add(1, Ordering::SeqCst);
		Ok(self.insert(document))
	}
}
