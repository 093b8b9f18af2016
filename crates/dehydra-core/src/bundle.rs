//! The per-request carrier between a document and its wire form

use crate::document::Document;
use crate::error::{ResourceError, Result, ValidationErrors};
use crate::request::Request;
use crate::value::Reference;
use indexmap::IndexMap;
use serde_json::{Map, Value as JsonValue};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Bundles hydrated for a related field, kept so that [`save`] can persist
/// them before their parent.
///
/// [`save`]: crate::resource::Resource::save
#[derive(Debug, Clone)]
pub enum RelatedBundles {
	One(Option<Box<Bundle>>),
	Many(Vec<Bundle>),
}

/// Carrier of one object and its wire data through a (de)hydration pass
///
/// A bundle is exclusively owned by one pass. Nested related bundles share
/// the parent's request.
#[derive(Debug, Clone, Default)]
pub struct Bundle {
	/// The domain object, absent for a bundle that only names a URI
	pub obj: Option<Document>,
	/// Wire data, filled by dehydration or supplied for hydration
	pub data: Map<String, JsonValue>,
	pub request: Option<Arc<Request>>,
	pub errors: ValidationErrors,
	/// Related identifiers already seen during hydration, per field
	pub lookup_index: HashMap<String, HashSet<String>>,
	/// The payload carried nothing but an identity
	pub uri_only: bool,
	/// Related bundles produced by hydration, per field name
	pub related: IndexMap<String, RelatedBundles>,
	reference: Option<Reference>,
	depth: usize,
}

impl Bundle {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_object(mut self, obj: Document) -> Self {
		self.obj = Some(obj);
		self
	}

	pub fn with_data(mut self, data: Map<String, JsonValue>) -> Self {
		self.data = data;
		self
	}

	pub fn with_request(mut self, request: Option<Arc<Request>>) -> Self {
		self.request = request;
		self
	}

	pub(crate) fn with_reference(mut self, reference: Reference) -> Self {
		self.reference = Some(reference);
		self
	}

	pub(crate) fn at_depth(mut self, depth: usize) -> Self {
		self.depth = depth;
		self
	}

	/// Nesting level below the bundle the pass started from
	pub fn depth(&self) -> usize {
		self.depth
	}

	pub fn request(&self) -> Option<&Request> {
		self.request.as_deref()
	}

	/// Identity of the addressed object, whether loaded or only named
	pub fn reference(&self) -> Option<Reference> {
		match &self.obj {
			Some(obj) => obj.to_reference(),
			None => self.reference.clone(),
		}
	}

	/// Reference stored on a parent document when this bundle is assigned
	/// to a related field
	///
	/// A loaded object is linked in full so that unsaved objects can still
	/// be dehydrated; a URI-only bundle yields an unloaded link.
	pub fn to_link(&self) -> Result<Reference> {
		match (&self.obj, &self.reference) {
			(Some(obj), _) => Ok(Reference::loaded(obj.clone())),
			(None, Some(reference)) => Ok(reference.clone()),
			(None, None) => Err(ResourceError::Resolution(
				"bundle has neither an object nor an identity".to_string(),
			)),
		}
	}

	pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
		self.errors.add(field, message);
	}

	pub fn has_errors(&self) -> bool {
		!self.errors.is_empty()
	}

	/// Consume the bundle, yielding its object
	pub fn into_object(self) -> Option<Document> {
		self.obj
	}

	/// Dehydrated wire data as a JSON object
	pub fn to_json(&self) -> JsonValue {
		JsonValue::Object(self.data.clone())
	}
}
