//! Field dehydration through a registered resource
//!
//! Tests cover:
//! - Wire formats of scalar kinds
//! - Default, provider and source-less fields
//! - Required fields with no value
//! - The identity field staying stable whatever else fails
//! - Loaded related documents hidden from unauthorized requests

use bson::oid::ObjectId;
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use dehydra_core::fields::{FieldContext, FieldKind};
use dehydra_core::prelude::*;
use dehydra_test::{TestApi, assert_json_field_eq, assert_json_keys, assert_resource_uri, test_api};
use rstest::*;
use rust_decimal::Decimal;
use serde_json::json;
use std::str::FromStr;

// =============================================================================
// Scalars
// =============================================================================

#[rstest]
fn test_scalar_wire_formats(test_api: TestApi) {
	// Arrange
	let resource = test_api.register(
		Resource::builder("SampleResource")
			.field("day", Field::date("day"))
			.field("at", Field::datetime("at"))
			.field("time", Field::time("time"))
			.field("price", Field::decimal("price"))
			.field("ratio", Field::float("ratio"))
			.field("count", Field::integer("count"))
			.field("tags", Field::list("tags"))
			.include_resource_uri(false)
			.build()
			.unwrap(),
	);
	let obj = Document::new("Sample")
		.with("day", NaiveDate::from_ymd_opt(2010, 11, 10).unwrap())
		.with("at", Utc.with_ymd_and_hms(2010, 11, 10, 3, 7, 43).unwrap())
		.with("time", NaiveTime::from_hms_opt(12, 30, 0).unwrap())
		.with("price", Decimal::from_str("19.90").unwrap())
		.with("ratio", 0.5)
		.with("count", "42")
		.with("tags", vec!["a", "b"]);

	// Act
	let json = resource.full_dehydrate(obj, None).unwrap();

	// Assert
	assert_eq!(
		json,
		json!({
			"day": "2010-11-10",
			"at": "2010-11-10T03:07:43Z",
			"time": "12:30:00",
			"price": "19.90",
			"ratio": 0.5,
			"count": 42,
			"tags": ["a", "b"],
		})
	);
}

#[rstest]
fn test_datetime_through_date_field_is_truncated(test_api: TestApi) {
	// Arrange
	let resource = test_api.register(
		Resource::builder("SampleResource")
			.field("day", Field::date("day"))
			.build()
			.unwrap(),
	);
	let obj = Document::new("Sample").with("day", Utc.with_ymd_and_hms(2010, 11, 10, 23, 59, 0).unwrap());

	// Act
	let json = resource.full_dehydrate(obj, None).unwrap();

	// Assert
	assert_json_field_eq(&json, "day", &json!("2010-11-10"));
}

#[rstest]
fn test_null_values_dehydrate_to_null(test_api: TestApi) {
	// Arrange
	let resource = test_api.register(
		Resource::builder("SampleResource")
			.field("day", Field::date("day"))
			.field("count", Field::integer("count"))
			.field("flag", Field::boolean("flag"))
			.field("owner", Field::to_one("owner", RelatedTarget::resource("person")))
			.build()
			.unwrap(),
	);

	// Act
	let json = resource.full_dehydrate(Document::new("Sample"), None).unwrap();

	// Assert
	assert_eq!(
		json,
		json!({"day": null, "count": null, "flag": null, "owner": null, "resource_uri": null})
	);
}

// =============================================================================
// Defaults and providers
// =============================================================================

#[rstest]
fn test_defaults_and_providers(test_api: TestApi) {
	// Arrange
	let resource = test_api.register(
		Resource::builder("SampleResource")
			.field("state", Field::string("state").default("draft"))
			.field("constant", Field::new(FieldKind::Integer).default("7"))
			.field("nothing", Field::new(FieldKind::String))
			.field("stamp", Field::string("ignored").provider(|| json!({"raw": true})))
			.build()
			.unwrap(),
	);

	// Act
	let json = resource.full_dehydrate(Document::new("Sample"), None).unwrap();

	// Assert
	assert_json_field_eq(&json, "state", &json!("draft"));
	assert_json_field_eq(&json, "constant", &json!(7));
	assert_json_field_eq(&json, "nothing", &json!(null));
	assert_json_field_eq(&json, "stamp", &json!({"raw": true}));
}

#[rstest]
fn test_required_field_without_value_fails_the_whole_pass(test_api: TestApi) {
	// Arrange
	let resource = test_api.resource("person");
	let obj = test_api.store.insert(Document::new("Person").with("email", "ada@example.com"));

	// Act
	let result = resource.full_dehydrate(obj, None);

	// Assert
	assert!(matches!(result, Err(ResourceError::Field { ref field, .. }) if field == "name"));
}

#[rstest]
fn test_stored_document_carries_its_uri(test_api: TestApi) {
	// Arrange
	let person = test_api.person("Ada");
	let id = person.id().unwrap().to_hex();

	// Act
	let json = test_api.resource("person").full_dehydrate(person, None).unwrap();

	// Assert
	assert_json_keys(&json, &["id", "name", "email", "resource_uri"]);
	assert_json_field_eq(&json, "id", &json!(id));
	assert_resource_uri(&json["resource_uri"], "person", &id);
}

// =============================================================================
// Identity stability
// =============================================================================

#[rstest]
#[case::id_first(&["id", "name", "email"])]
#[case::id_middle(&["name", "id", "email"])]
#[case::id_last(&["email", "name", "id"])]
fn test_identity_dehydrates_whatever_the_field_order(test_api: TestApi, #[case] order: &[&str]) {
	// Arrange
	let mut builder = Resource::builder("ContactResource").include_resource_uri(false);
	for name in order {
		let field = match *name {
			"id" => Field::object_id(),
			"name" => Field::string("name").required(),
			_ => Field::string("email"),
		};
		builder = builder.field(*name, field);
	}
	let resource = test_api.register(builder.build().unwrap());
	let id = ObjectId::new();
	let bundle = Bundle::new().with_object(Document::new("Contact").with_id(id));
	let ctx = FieldContext::new(&resource, &test_api.api);

	// Act
	let identity = resource.field("id").unwrap().dehydrate(&bundle, &ctx).unwrap();
	let all = resource.dehydrate_all(bundle.clone());

	// Assert
	assert_eq!(identity, json!(id.to_hex()));
	assert!(matches!(all, Err(ResourceError::Field { ref field, .. }) if field == "name"));
}

// =============================================================================
// Authorization of loaded documents
// =============================================================================

#[rstest]
fn test_unreadable_loaded_document_dehydrates_to_null(test_api: TestApi) {
	// Arrange
	let owner = test_api.person("Ada");
	test_api.authorization.deny(owner.id().unwrap());
	let deliverable = Document::new("Deliverable")
		.with("name", "Report")
		.with("owner", owner);

	// Act
	let json = test_api
		.resource("deliverable")
		.full_dehydrate(deliverable, None)
		.unwrap();

	// Assert
	assert_json_field_eq(&json, "owner", &json!(null));
	assert!(test_api.authorization.check_count() >= 1);
}

#[rstest]
fn test_readable_again_after_access_is_restored(test_api: TestApi) {
	// Arrange
	let owner = test_api.person("Ada");
	let id = owner.id().unwrap();
	test_api.authorization.deny(id);
	test_api.authorization.allow(&id);
	let deliverable = Document::new("Deliverable")
		.with("name", "Report")
		.with("owner", owner.clone());

	// Act
	let json = test_api
		.resource("deliverable")
		.full_dehydrate(deliverable, None)
		.unwrap();

	// Assert
	assert_json_field_eq(&json, "owner", &json!(test_api.uri("person", &owner)));
}

#[rstest]
fn test_unreadable_loaded_document_on_required_field_is_an_error(test_api: TestApi) {
	// Arrange
	let person = test_api.person("Ada");
	test_api.authorization.deny(person.id().unwrap());
	let activity = Document::new("Activity")
		.with("name", "Act1")
		.with("person", person);

	// Act
	let result = test_api.resource("activity").full_dehydrate(activity, None);

	// Assert
	assert!(matches!(result, Err(ResourceError::Field { ref field, .. }) if field == "person"));
}

#[rstest]
fn test_unreadable_loaded_documents_are_dropped_from_lists(test_api: TestApi) {
	// Arrange
	let person = test_api.person("Ada");
	let visible = test_api.activity("Visible", &person);
	let hidden = test_api.activity("Hidden", &person);
	test_api.authorization.deny(hidden.id().unwrap());
	let visible_uri = test_api.uri("activity", &visible);
	let deliverable = Document::new("Deliverable")
		.with("name", "Report")
		.with("activities", vec![visible, hidden]);

	// Act
	let json = test_api
		.resource("deliverable")
		.full_dehydrate(deliverable, None)
		.unwrap();

	// Assert
	assert_json_field_eq(&json, "activities", &json!([visible_uri]));
}
