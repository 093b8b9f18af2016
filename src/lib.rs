//! # Dehydra
//!
//! Resource-oriented serialization between persisted documents and API
//! payloads.
//!
//! A [`Resource`] declares the fields exposed for one document type. It
//! *dehydrates* documents into plain JSON mappings for the transport layer
//! and *hydrates* incoming payloads back into documents. Relationships
//! between resources are followed in both directions: references become URIs
//! or nested representations, and URIs or nested payloads become references.
//!
//! ## Feature Flags
//!
//! - `test-utils` - in-memory persistence, authorization doubles and
//!   fixtures (see [`test`])
//!
//! ## Quick Example
//!
//! ```
//! use dehydra::prelude::*;
//! use serde_json::json;
//!
//! let api = Api::new(ApiSettings::default()).unwrap();
//! let activity = api
//! 	.register(
//! 		Resource::builder("ActivityResource")
//! 			.field("name", Field::string("name").required())
//! 			.field("finished", Field::boolean("finished").default(false))
//! 			.build()
//! 			.unwrap(),
//! 	)
//! 	.unwrap();
//!
//! let data = json!({"name": "Act1"}).as_object().cloned().unwrap();
//! let obj = activity.hydrate_object(data, None).unwrap();
//! let wire = activity.full_dehydrate(obj, None).unwrap();
//!
//! assert_eq!(wire["finished"], json!(false));
//! ```

pub mod core;

pub use dehydra_core::{
	Api, ApiBuilder, ApiField, ApiSettings, Bundle, Document, Field, FieldKind, Method,
	Reference, RelatedBundles, RelatedTarget, Request, Resource, ResourceBuilder, ResourceError,
	Result, ValidationErrors, Value,
};

/// Commonly used types
pub mod prelude {
	pub use dehydra_core::prelude::*;
}
