//! Resources and documents shared by tests
//!
//! Three resources model a small project tracker:
//!
//! | resource      | fields |
//! |---------------|--------|
//! | `person`      | `id`, `name` (required), `email` |
//! | `activity`    | `id`, `name` (required), `person` (to-one, required), `finished` (default `false`), `closed` (default `false`), `tags`, `started` |
//! | `deliverable` | `id`, `name` (required), `owner` (to-one), `activities` (to-many) |

use crate::authorization::DenyList;
use crate::store::MemoryStore;
use dehydra_core::api::Api;
use dehydra_core::document::Document;
use dehydra_core::fields::{Field, RelatedTarget};
use dehydra_core::resource::Resource;
use dehydra_core::settings::ApiSettings;
use rstest::fixture;
use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;

pub fn person_resource() -> Resource {
	Resource::builder("PersonResource")
		.field("id", Field::object_id())
		.field("name", Field::string("name").required())
		.field("email", Field::string("email"))
		.build()
		.expect("person resource declaration is valid")
}

pub fn activity_resource() -> Resource {
	Resource::builder("ActivityResource")
		.field("id", Field::object_id())
		.field("name", Field::string("name").required())
		.field(
			"person",
			Field::to_one("person", RelatedTarget::resource("person")).required(),
		)
		.field("finished", Field::boolean("finished").default(false))
		.field("closed", Field::boolean("closed").default(false))
		.field("tags", Field::list("tags"))
		.field("started", Field::datetime("started"))
		.build()
		.expect("activity resource declaration is valid")
}

pub fn deliverable_resource() -> Resource {
	Resource::builder("DeliverableResource")
		.field("id", Field::object_id())
		.field("name", Field::string("name").required())
		.field("owner", Field::to_one("owner", RelatedTarget::resource("person")))
		.field(
			"activities",
			Field::to_many("activities", RelatedTarget::resource("activity")),
		)
		.build()
		.expect("deliverable resource declaration is valid")
}

/// An API over a [`MemoryStore`] and a [`DenyList`], with the person,
/// activity and deliverable resources registered
pub struct TestApi {
	pub api: Arc<Api>,
	pub store: Arc<MemoryStore>,
	pub authorization: Arc<DenyList>,
}

impl TestApi {
	pub fn new() -> Self {
		Self::with_settings(ApiSettings::default())
	}

	pub fn with_settings(settings: ApiSettings) -> Self {
		let store = Arc::new(MemoryStore::new());
		let authorization = Arc::new(DenyList::new());
		let api = Api::builder()
			.settings(settings)
			.persistence(store.clone())
			.authorization(authorization.clone())
			.build()
			.expect("test settings are valid");
		let test_api = Self {
			api,
			store,
			authorization,
		};
		test_api.register(person_resource());
		test_api.register(activity_resource());
		test_api.register(deliverable_resource());
		test_api
	}

	pub fn register(&self, resource: Resource) -> Arc<Resource> {
		self.api
			.register(resource)
			.expect("resource registers on the test API")
	}

	pub fn resource(&self, name: &str) -> Arc<Resource> {
		self.api
			.resource(name)
			.unwrap_or_else(|_| panic!("resource `{}` is registered", name))
	}

	/// Store a person
	pub fn person(&self, name: &str) -> Document {
		self.store.insert(Document::new("Person").with("name", name))
	}

	/// Store an activity owned by `person`
	pub fn activity(&self, name: &str, person: &Document) -> Document {
		self.store.insert(
			Document::new("Activity")
				.with("name", name)
				.with("person", person.clone()),
		)
	}

	/// URI of a stored document under the named resource
	pub fn uri(&self, resource: &str, document: &Document) -> String {
		let id = document.id().expect("document is stored").to_hex();
		self.api.build_uri(resource, Some(&id), None)
	}
}

impl Default for TestApi {
	fn default() -> Self {
		Self::new()
	}
}

#[fixture]
pub fn test_api() -> TestApi {
	TestApi::new()
}

/// Wire payload from a `json!` object literal
pub fn wire(value: JsonValue) -> Map<String, JsonValue> {
	match value {
		JsonValue::Object(map) => map,
		other => panic!("expected a JSON object, got {}", other),
	}
}
