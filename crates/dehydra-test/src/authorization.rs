//! Authorization doubles

use bson::oid::ObjectId;
use dehydra_core::authorization::Authorization;
use dehydra_core::document::Document;
use dehydra_core::request::Request;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Allows every read except of the documents denied so far
#[derive(Debug, Default)]
pub struct DenyList {
	denied: RwLock<HashSet<ObjectId>>,
	checks: AtomicUsize,
}

impl DenyList {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn deny(&self, id: ObjectId) {
		self.denied.write().insert(id);
	}

	pub fn allow(&self, id: &ObjectId) {
		self.denied.write().remove(id);
	}

	/// Number of `may_read` calls so far
	pub fn check_count(&self) -> usize {
		self.checks.load(Ordering::SeqCst)
	}
}

impl Authorization for DenyList {
	fn may_read(&self, document: &Document, _request: Option<&Request>) -> bool {
		self.checks.fetch_add(1, Ordering::SeqCst);
		document
			.id()
			.is_none_or(|id| !self.denied.read().contains(&id))
	}
}
