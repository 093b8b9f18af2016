//! # dehydra-core
//!
//! Resource-oriented serialization between persisted documents and API
//! payloads.
//!
//! *Dehydrating* turns a [`Document`] into the plain JSON mapping handed to
//! the transport serializer; *hydrating* turns a payload back into a
//! document ready to be saved. Both directions run per field over a
//! [`Bundle`]:
//!
//! - [`fields`] converts single attributes (strings, numbers, dates,
//!   embedded structures, relationships).
//! - [`resolver`] follows relationships: URIs and nested payloads become
//!   bundles of the related resource, references become URIs or full
//!   nested representations.
//! - [`resource`] aggregates the fields of one document type.
//! - [`api`] registers resources and supplies the collaborators: URI
//!   building, read authorization and persistence.
//!
//! ## Example
//!
//! ```
//! use dehydra_core::prelude::*;
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
//! assert_eq!(obj.lookup("finished"), Value::Bool(false));
//!
//! let wire = activity.full_dehydrate(obj, None).unwrap();
//! assert_eq!(wire, json!({"name": "Act1", "finished": false, "resource_uri": null}));
//! ```

pub mod api;
pub mod authorization;
pub mod bundle;
pub mod document;
pub mod error;
pub mod fields;
pub mod persistence;
pub mod request;
pub mod resolver;
pub mod resource;
pub mod settings;
pub mod uri;
pub mod validation;
pub mod value;

pub use api::{Api, ApiBuilder};
pub use bundle::{Bundle, RelatedBundles};
pub use document::Document;
pub use error::{ResourceError, Result, ValidationErrors};
pub use fields::{ApiField, Field, FieldKind, RelatedTarget};
pub use request::{Method, Request};
pub use resource::{Resource, ResourceBuilder};
pub use settings::ApiSettings;
pub use value::{Reference, Value};

/// Commonly used types
pub mod prelude {
	pub use crate::api::{Api, ApiBuilder};
	pub use crate::authorization::{Authorization, ReadAll};
	pub use crate::bundle::Bundle;
	pub use crate::document::Document;
	pub use crate::error::{ResourceError, Result, ValidationErrors};
	pub use crate::fields::{ApiField, EmbeddedSchema, Field, RelatedTarget};
	pub use crate::persistence::Persistence;
	pub use crate::request::{Method, Request};
	pub use crate::resource::Resource;
	pub use crate::settings::ApiSettings;
	pub use crate::validation::{DocumentValidator, RequiredAttributes};
	pub use crate::value::{Reference, Value};
}
