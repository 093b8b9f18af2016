//! Resource round trips
//!
//! Tests cover:
//! - The create/read cycle of a small resource
//! - Bundles built from wire data, with and without `resource_uri`
//! - Field hooks in both directions
//! - Document validation
//! - Absolute URIs
//! - Resources used before registration

use dehydra_core::prelude::*;
use dehydra_test::{
	TestApi, assert_json_field_eq, assert_json_keys, assert_resource_uri, init_test_logging, test_api,
	wire,
};
use rstest::*;
use serde_json::json;
use std::sync::Arc;

// =============================================================================
// Fixtures
// =============================================================================

fn chore_resource() -> Resource {
	Resource::builder("ChoreResource")
		.field("name", Field::string("name").required())
		.field("finished", Field::boolean("finished").default(false))
		.build()
		.unwrap()
}

// =============================================================================
// Create and read
// =============================================================================

#[rstest]
fn test_create_then_read(test_api: TestApi) {
	// Arrange
	init_test_logging();
	let resource = test_api.register(chore_resource());
	let bundle = resource
		.build_bundle(None, Some(wire(json!({"name": "Act1"}))), None)
		.unwrap();
	let bundle = resource.hydrate_all(bundle).unwrap();
	let saved = resource.save(bundle).unwrap();
	let obj = saved.into_object().unwrap();
	let id = obj.id().unwrap().to_hex();

	// Act
	let json = resource.full_dehydrate(obj, None).unwrap();

	// Assert
	assert_json_keys(&json, &["name", "finished", "resource_uri"]);
	assert_json_field_eq(&json, "name", &json!("Act1"));
	assert_json_field_eq(&json, "finished", &json!(false));
	assert_resource_uri(&json["resource_uri"], "chore", &id);
}

#[rstest]
fn test_dehydrated_output_hydrates_back(test_api: TestApi) {
	// Arrange
	let person = test_api.person("Ada");
	let activity = test_api.store.insert(
		Document::new("Activity")
			.with("name", "Act1")
			.with("person", person.clone())
			.with("finished", true)
			.with("closed", false)
			.with("tags", vec!["a", "b"]),
	);
	let resource = test_api.resource("activity");
	let json = resource.full_dehydrate(activity.clone(), None).unwrap();

	// Act
	let obj = resource
		.hydrate_object(json.as_object().cloned().unwrap(), None)
		.unwrap();

	// Assert
	assert_eq!(obj.id(), activity.id());
	for name in ["name", "person", "finished", "closed", "tags", "started"] {
		assert_eq!(obj.lookup(name), activity.lookup(name), "attribute `{}`", name);
	}
}

// =============================================================================
// Bundles
// =============================================================================

#[rstest]
fn test_bundle_from_uri_only_data_loads_existing(test_api: TestApi) {
	// Arrange
	let person = test_api.person("Ada");
	let data = wire(json!({"resource_uri": test_api.uri("person", &person)}));

	// Act
	let bundle = test_api
		.resource("person")
		.build_bundle(None, Some(data), None)
		.unwrap();

	// Assert
	assert!(bundle.uri_only);
	assert_eq!(bundle.obj.as_ref().and_then(Document::id), person.id());
	assert_eq!(test_api.store.load_count(), 1);
}

#[rstest]
fn test_bundle_for_missing_object_is_not_found(test_api: TestApi) {
	// Arrange
	let uri = "/api/v1/person/4cdaa5a8a9f9bd1c4d000000/";

	// Act
	let result = test_api
		.resource("person")
		.build_bundle(None, Some(wire(json!({"resource_uri": uri}))), None);

	// Assert
	match result {
		Err(err @ ResourceError::NotFound { .. }) => assert!(!err.is_client_error()),
		other => panic!("expected not found, got {:?}", other),
	}
}

#[rstest]
#[case::list_uri("/api/v1/person/")]
#[case::bad_id("/api/v1/person/not-an-id/")]
#[case::foreign_path("/elsewhere/person/4cdaa5a8a9f9bd1c4d000000/")]
fn test_malformed_uri_is_a_resolution_error(test_api: TestApi, #[case] uri: &str) {
	// Act
	let result = test_api.resource("person").id_from_uri(uri);

	// Assert
	assert!(matches!(result, Err(ResourceError::Resolution(_))));
}

#[rstest]
fn test_list_uri(test_api: TestApi) {
	// Act
	let uri = test_api.resource("person").list_uri(None).unwrap();

	// Assert
	assert_eq!(uri, "/api/v1/person/");
}

// =============================================================================
// Hooks
// =============================================================================

#[rstest]
fn test_hooks_replace_field_values(test_api: TestApi) {
	// Arrange
	let resource = test_api.register(
		Resource::builder("ShoutingPersonResource")
			.extends(&test_api.resource("person"))
			.dehydrate_with("name", |bundle| {
				let name = bundle.data["name"].as_str().unwrap_or_default();
				Ok(json!(name.to_uppercase()))
			})
			.hydrate_with("email", |bundle| {
				let email = bundle.data.get("email").and_then(|v| v.as_str()).unwrap_or_default();
				Ok(Value::from(email.to_lowercase()))
			})
			.build()
			.unwrap(),
	);
	let person = test_api.person("Ada");

	// Act
	let json = resource.full_dehydrate(person, None).unwrap();
	let obj = resource
		.hydrate_object(wire(json!({"name": "Ada", "email": "ADA@EXAMPLE.COM"})), None)
		.unwrap();

	// Assert
	assert_json_field_eq(&json, "name", &json!("ADA"));
	assert_eq!(obj.lookup("email"), Value::from("ada@example.com"));
}

// =============================================================================
// Validation
// =============================================================================

#[rstest]
fn test_validator_rejects_hydrated_object(test_api: TestApi) {
	// Arrange
	let resource = test_api.register(
		Resource::builder("ChoreResource")
			.extends(&chore_resource())
			.validator(|bundle: &Bundle| {
				let mut errors = ValidationErrors::new();
				let name = bundle.obj.as_ref().map(|obj| obj.lookup("name"));
				if name.as_ref().and_then(Value::as_str) == Some("forbidden") {
					errors.add("name", "This name is reserved.");
				}
				errors
			})
			.build()
			.unwrap(),
	);

	// Act
	let accepted = resource.hydrate_object(wire(json!({"name": "Act1"})), None);
	let rejected = resource.hydrate_object(wire(json!({"name": "forbidden"})), None);

	// Assert
	assert!(accepted.is_ok());
	match rejected {
		Err(ResourceError::Validation(errors)) => {
			assert_eq!(errors.get("name"), Some(&["This name is reserved.".to_string()][..]));
		}
		other => panic!("expected validation errors, got {:?}", other),
	}
}

#[rstest]
fn test_required_attributes_validator(test_api: TestApi) {
	// Arrange
	let resource = test_api.register(
		Resource::builder("ChoreResource")
			.field("name", Field::string("name"))
			.field("owner", Field::string("owner"))
			.validator(RequiredAttributes::new(["owner"]))
			.build()
			.unwrap(),
	);

	// Act
	let result = resource.hydrate_object(wire(json!({"name": "Act1"})), None);

	// Assert
	assert!(matches!(
		result,
		Err(ResourceError::Validation(ref errors)) if errors.fields().eq(["owner"])
	));
}

// =============================================================================
// Settings and registration
// =============================================================================

#[rstest]
fn test_absolute_uris_round_trip() {
	// Arrange
	let test_api = TestApi::with_settings(
		ApiSettings::default().with_base_url("https://tracker.example.com"),
	);
	let person = test_api.person("Ada");
	let id = person.id().unwrap().to_hex();
	let activity = test_api.activity("Act1", &person);
	let resource = test_api.resource("activity");

	// Act
	let json = resource.full_dehydrate(activity, None).unwrap();
	let obj = resource
		.hydrate_object(json.as_object().cloned().unwrap(), Some(Arc::new(Request::put("/"))))
		.unwrap();

	// Assert
	assert_json_field_eq(
		&json,
		"person",
		&json!(format!("https://tracker.example.com/api/v1/person/{}/", id)),
	);
	assert_eq!(
		obj.lookup("person").as_reference().and_then(Reference::id),
		person.id()
	);
}

#[rstest]
fn test_unregistered_resource_cannot_dehydrate() {
	// Arrange
	let resource = chore_resource();

	// Act
	let result = resource.full_dehydrate(Document::new("Chore").with("name", "Act1"), None);

	// Assert
	assert!(matches!(result, Err(ResourceError::Configuration(_))));
}

#[rstest]
fn test_api_without_persistence_cannot_save() {
	// Arrange
	let api = Api::new(ApiSettings::default()).unwrap();
	let resource = api.register(chore_resource()).unwrap();
	let obj = resource.hydrate_object(wire(json!({"name": "Act1"})), None).unwrap();

	// Act
	let result = resource.save(Bundle::new().with_object(obj));

	// Assert
	assert!(matches!(result, Err(ResourceError::Configuration(_))));
}
