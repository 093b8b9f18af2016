use crate::resource::Resource;
use std::sync::{Arc, OnceLock, Weak};

/// What a related field points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelatedTarget {
	/// A resource registered under this name
	Resource(String),
	/// The resource that declares the field
	SelfRef,
	/// Decided per value, from the referenced document's type or the URI
	Generic,
}

impl RelatedTarget {
	pub fn resource(name: impl Into<String>) -> Self {
		Self::Resource(name.into())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
	ToOne,
	ToMany,
}

/// Relationship options of a related field
#[derive(Debug, Clone)]
pub struct RelatedField {
	target: RelatedTarget,
	cardinality: Cardinality,
	full: bool,
	ignore_closed: bool,
	bound_target: Option<String>,
	// Set at most once; a lost race only discards an equal value.
	resolved: OnceLock<Weak<Resource>>,
}

impl RelatedField {
	pub fn new(target: RelatedTarget, cardinality: Cardinality) -> Self {
		let bound_target = match &target {
			RelatedTarget::Resource(name) => Some(name.clone()),
			_ => None,
		};
		Self {
			target,
			cardinality,
			full: false,
			ignore_closed: false,
			bound_target,
			resolved: OnceLock::new(),
		}
	}

	pub fn target(&self) -> &RelatedTarget {
		&self.target
	}

	pub fn cardinality(&self) -> Cardinality {
		self.cardinality
	}

	pub fn is_full(&self) -> bool {
		self.full
	}

	pub fn ignores_closed(&self) -> bool {
		self.ignore_closed
	}

	pub(super) fn set_full(&mut self, full: bool) {
		self.full = full;
	}

	pub(super) fn set_ignore_closed(&mut self, ignore: bool) {
		self.ignore_closed = ignore;
	}

	/// Name of the static target, `None` for generic relations
	pub fn target_name(&self) -> Option<&str> {
		self.bound_target.as_deref()
	}

	/// Attach to the declaring resource: self references take its name and
	/// any memoized target from a parent declaration is dropped
	pub(super) fn bind(&mut self, owner: &str) {
		if self.target == RelatedTarget::SelfRef {
			self.bound_target = Some(owner.to_string());
		}
		self.resolved = OnceLock::new();
	}

	/// Target resource once it has been looked up
	pub fn memoized(&self) -> Option<Arc<Resource>> {
		self.resolved.get().and_then(Weak::upgrade)
	}

	pub(crate) fn memoize(&self, resource: &Arc<Resource>) {
		if self.resolved.set(Arc::downgrade(resource)).is_ok() {
			tracing::debug!(resource = resource.name(), "memoized related resource");
		}
	}
}
