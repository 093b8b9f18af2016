//! To-one relations
//!
//! Tests cover:
//! - URI vs. full representation, and lazy loading for URIs
//! - Hydration from a URI, from a nested payload and from a nested update
//! - Read-only relations honoring only `resource_uri`
//! - Resolution failures
//! - Target memoization
//! - The nesting limit on self-referential resources

use dehydra_core::fields::FieldContext;
use dehydra_core::prelude::*;
use dehydra_core::resolver::RelatedResolver;
use dehydra_core::RelatedBundles;
use dehydra_test::{TestApi, assert_json_field_eq, assert_resource_uri, test_api, wire};
use rstest::*;
use serde_json::json;
use std::sync::Arc;

// =============================================================================
// Fixtures
// =============================================================================

fn full_activity_resource(test_api: &TestApi) -> Arc<Resource> {
	test_api.register(
		Resource::builder("FullActivityResource")
			.extends(&test_api.resource("activity"))
			.field(
				"person",
				Field::to_one("person", RelatedTarget::resource("person"))
					.required()
					.full(),
			)
			.build()
			.unwrap(),
	)
}

fn node_resource() -> Resource {
	Resource::builder("NodeResource")
		.field("id", Field::object_id())
		.field("name", Field::string("name"))
		.field("parent", Field::to_one("parent", RelatedTarget::SelfRef).full())
		.build()
		.unwrap()
}

// =============================================================================
// Dehydration
// =============================================================================

#[rstest]
fn test_related_object_dehydrates_to_uri_without_loading(test_api: TestApi) {
	// Arrange
	let person = test_api.person("Ada");
	let activity = test_api.activity("Act1", &person);
	let person_id = person.id().unwrap().to_hex();

	// Act
	let json = test_api.resource("activity").full_dehydrate(activity, None).unwrap();

	// Assert
	assert_resource_uri(&json["person"], "person", &person_id);
	assert_eq!(test_api.store.load_count(), 0);
}

#[rstest]
fn test_full_related_object_dehydrates_to_its_representation(test_api: TestApi) {
	// Arrange
	let resource = full_activity_resource(&test_api);
	let person = test_api.person("Ada");
	let activity = test_api.activity("Act1", &person);
	let expected = test_api
		.resource("person")
		.full_dehydrate(person.clone(), None)
		.unwrap();

	// Act
	let json = resource.full_dehydrate(activity, None).unwrap();

	// Assert
	assert_json_field_eq(&json, "person", &expected);
	assert_eq!(test_api.store.load_count(), 1);
}

#[rstest]
fn test_full_related_object_hidden_from_unauthorized_request(test_api: TestApi) {
	// Arrange
	let resource = test_api.register(
		Resource::builder("FullDeliverableResource")
			.extends(&test_api.resource("deliverable"))
			.field("owner", Field::to_one("owner", RelatedTarget::resource("person")).full())
			.build()
			.unwrap(),
	);
	let owner = test_api.person("Ada");
	test_api.authorization.deny(owner.id().unwrap());
	let deliverable = test_api.store.insert(
		Document::new("Deliverable")
			.with("name", "Report")
			.with("owner", owner),
	);

	// Act
	let json = resource.full_dehydrate(deliverable, None).unwrap();

	// Assert
	assert_json_field_eq(&json, "owner", &json!(null));
}

#[rstest]
fn test_nesting_limit_emits_uri(#[values(0, 1, 2)] max_depth: usize) {
	// Arrange
	let test_api = TestApi::with_settings(ApiSettings::default().with_max_depth(max_depth));
	let resource = test_api.register(node_resource());
	let root = test_api.store.insert(Document::new("Node").with("name", "root"));
	let middle = test_api.store.insert(
		Document::new("Node")
			.with("name", "middle")
			.with("parent", root.clone()),
	);
	let leaf = test_api.store.insert(
		Document::new("Node")
			.with("name", "leaf")
			.with("parent", middle.clone()),
	);

	// Act
	let json = resource.full_dehydrate(leaf, None).unwrap();

	// Assert
	let mut current = &json;
	for level in 0..max_depth {
		current = &current["parent"];
		assert!(current.is_object(), "level {} should be nested in full", level + 1);
	}
	let expected = match max_depth {
		0 => json!(test_api.uri("node", &middle)),
		1 => json!(test_api.uri("node", &root)),
		_ => json!(null),
	};
	assert_eq!(current["parent"], expected);
}

// =============================================================================
// Hydration
// =============================================================================

#[rstest]
fn test_uri_hydrates_to_identity_only_bundle(test_api: TestApi) {
	// Arrange
	let person = test_api.person("Ada");
	let resource = test_api.resource("activity");
	let data = wire(json!({"name": "Act1", "person": test_api.uri("person", &person)}));
	let bundle = resource.build_bundle(None, Some(data), None).unwrap();

	// Act
	let bundle = resource.hydrate_all(bundle).unwrap();

	// Assert
	let Some(RelatedBundles::One(Some(child))) = bundle.related.get("person") else {
		panic!("expected a related bundle for `person`");
	};
	assert!(child.uri_only);
	assert!(child.obj.is_none());
	assert_eq!(child.depth(), 1);
	let stored = bundle.obj.as_ref().unwrap().lookup("person");
	assert_eq!(
		stored,
		Value::Reference(Reference::unloaded("Person", person.id().unwrap()))
	);
	assert_eq!(test_api.store.load_count(), 0);
}

#[rstest]
fn test_nested_payload_creates_related_object_on_save(test_api: TestApi) {
	// Arrange
	let resource = test_api.resource("activity");
	let data = wire(json!({"name": "Act1", "person": {"name": "Grace"}}));
	let bundle = resource.build_bundle(None, Some(data), None).unwrap();
	let bundle = resource.hydrate_all(bundle).unwrap();

	// Act
	let saved = resource.save(bundle).unwrap();

	// Assert
	let people = test_api.store.all("Person");
	assert_eq!(people.len(), 1);
	assert_eq!(people[0].lookup("name"), Value::from("Grace"));
	let activity = saved.obj.unwrap();
	assert_eq!(
		activity.lookup("person").as_reference().and_then(Reference::id),
		people[0].id()
	);
	let stored = test_api.store.get("Activity", &activity.id().unwrap()).unwrap();
	assert_eq!(
		stored.lookup("person"),
		Value::Reference(Reference::unloaded("Person", people[0].id().unwrap()))
	);
}

#[rstest]
fn test_nested_payload_with_uri_updates_existing_object(test_api: TestApi) {
	// Arrange
	let person = test_api.person("Ada");
	let resource = test_api.resource("activity");
	let data = wire(json!({
		"name": "Act1",
		"person": {"resource_uri": test_api.uri("person", &person), "name": "Ada Lovelace"},
	}));
	let bundle = resource.build_bundle(None, Some(data), None).unwrap();
	let bundle = resource.hydrate_all(bundle).unwrap();

	// Act
	resource.save(bundle).unwrap();

	// Assert
	assert_eq!(test_api.store.len("Person"), 1);
	let updated = test_api.store.get("Person", &person.id().unwrap()).unwrap();
	assert_eq!(updated.lookup("name"), Value::from("Ada Lovelace"));
}

#[rstest]
fn test_readonly_relation_uses_only_the_uri(test_api: TestApi) {
	// Arrange
	let resource = test_api.register(
		Resource::builder("AuditResource")
			.field("person", Field::to_one("person", RelatedTarget::resource("person")).readonly())
			.build()
			.unwrap(),
	);
	let person = test_api.person("Ada");
	let field = resource.field("person").unwrap();
	let ctx = FieldContext::new(&resource, &test_api.api);
	let resolver = RelatedResolver::new(field, field.related().unwrap(), &ctx);
	let data = json!({"resource_uri": test_api.uri("person", &person), "name": "ignored"});

	// Act
	let bundle = resolver.resolve_bundle(&data, None).unwrap();

	// Assert
	assert!(bundle.uri_only);
	assert!(bundle.obj.is_none());
	assert_eq!(bundle.reference().and_then(|r| r.id()), person.id());
	assert_eq!(test_api.store.load_count(), 0);
}

#[rstest]
#[case::mapping_without_uri(json!({"name": "Ada"}))]
#[case::number(json!(42))]
fn test_readonly_relation_rejects_unaddressed_data(test_api: TestApi, #[case] data: serde_json::Value) {
	// Arrange
	let resource = test_api.register(
		Resource::builder("AuditResource")
			.field("person", Field::to_one("person", RelatedTarget::resource("person")).readonly())
			.build()
			.unwrap(),
	);
	let field = resource.field("person").unwrap();
	let ctx = FieldContext::new(&resource, &test_api.api);
	let resolver = RelatedResolver::new(field, field.related().unwrap(), &ctx);

	// Act
	let result = resolver.resolve_bundle(&data, None);

	// Assert
	assert!(matches!(result, Err(ResourceError::Field { ref field, .. }) if field == "person"));
}

// =============================================================================
// Resolution
// =============================================================================

#[rstest]
fn test_uri_of_another_resource_is_rejected(test_api: TestApi) {
	// Arrange
	let person = test_api.person("Ada");
	let other = test_api.activity("Act0", &person);
	let data = wire(json!({"name": "Act1", "person": test_api.uri("activity", &other)}));

	// Act
	let result = test_api.resource("activity").hydrate_object(data, None);

	// Assert
	assert!(matches!(result, Err(ResourceError::Resolution(_))));
}

#[rstest]
fn test_unregistered_target_is_a_resolution_error(test_api: TestApi) {
	// Arrange
	let resource = test_api.register(
		Resource::builder("OrphanResource")
			.field("ghost", Field::to_one("ghost", RelatedTarget::resource("ghost")))
			.build()
			.unwrap(),
	);
	let person = test_api.person("Ada");
	let obj = Document::new("Orphan").with("ghost", person.to_reference());

	// Act
	let result = resource.full_dehydrate(obj, None);

	// Assert
	match result {
		Err(err @ ResourceError::Resolution(_)) => assert!(err.to_string().contains("ghost")),
		other => panic!("expected a resolution error, got {:?}", other),
	}
}

#[rstest]
fn test_target_descriptor_is_memoized(test_api: TestApi) {
	// Arrange
	let resource = test_api.resource("activity");
	let field = resource.field("person").unwrap();
	let ctx = FieldContext::new(&resource, &test_api.api);
	let resolver = RelatedResolver::new(field, field.related().unwrap(), &ctx);

	// Act
	let first = resolver.resolve_target_descriptor(None).unwrap();
	let second = resolver.resolve_target_descriptor(None).unwrap();

	// Assert
	assert_eq!(first.name(), "person");
	assert!(Arc::ptr_eq(&first, &second));
	assert!(Arc::ptr_eq(&field.related().unwrap().memoized().unwrap(), &first));
}

#[rstest]
fn test_self_reference_hydrates_from_uri(test_api: TestApi) {
	// Arrange
	let resource = test_api.register(node_resource());
	let root = test_api.store.insert(Document::new("Node").with("name", "root"));
	let data = wire(json!({"name": "child", "parent": test_api.uri("node", &root)}));

	// Act
	let obj = resource.hydrate_object(data, None).unwrap();

	// Assert
	assert_eq!(
		obj.lookup("parent"),
		Value::Reference(Reference::unloaded("Node", root.id().unwrap()))
	);
}
