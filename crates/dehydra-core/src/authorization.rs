use crate::document::Document;
use crate::request::Request;

/// Decides whether a related document may appear in a response
pub trait Authorization: Send + Sync {
	fn may_read(&self, document: &Document, request: Option<&Request>) -> bool;
}

/// Allows every read
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadAll;

impl Authorization for ReadAll {
	fn may_read(&self, _document: &Document, _request: Option<&Request>) -> bool {
		true
	}
}
