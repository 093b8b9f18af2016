use crate::document::Document;
use crate::error::Result;
use crate::resource::Resource;
use bson::oid::ObjectId;

/// Storage the resource layer loads related objects from and saves into
pub trait Persistence: Send + Sync {
	/// Load one object of the resource's object class
	///
	/// Returns [`ResourceError::NotFound`] when no object has that identity.
	///
	/// [`ResourceError::NotFound`]: crate::error::ResourceError::NotFound
	fn load_by_identity(&self, resource: &Resource, id: &ObjectId) -> Result<Document>;

	/// Store the object, assigning an identity when it has none
	fn save(&self, document: Document) -> Result<Document>;
}
