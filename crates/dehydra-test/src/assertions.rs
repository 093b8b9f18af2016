//! Assertion helpers for dehydrated output

use serde_json::Value;

/// Assert that JSON contains a field with a specific value
///
/// # Examples
///
/// ```
/// use dehydra_test::assertions::assert_json_field_eq;
/// use serde_json::json;
///
/// let data = json!({"name": "Act1", "finished": false});
/// assert_json_field_eq(&data, "finished", &json!(false));
/// ```
pub fn assert_json_field_eq(json: &Value, field: &str, expected: &Value) {
	let actual = json.get(field);
	assert_eq!(
		actual,
		Some(expected),
		"Expected field '{}' to equal {:?}, got {:?}",
		field,
		expected,
		actual
	);
}

/// Assert that a JSON object has exactly these keys, in any order
///
/// # Examples
///
/// ```
/// use dehydra_test::assertions::assert_json_keys;
/// use serde_json::json;
///
/// let data = json!({"name": "Act1", "resource_uri": null});
/// assert_json_keys(&data, &["name", "resource_uri"]);
/// ```
pub fn assert_json_keys(json: &Value, expected: &[&str]) {
	let Value::Object(map) = json else {
		panic!("Expected a JSON object, got {:?}", json);
	};
	let keys: Vec<&str> = map.keys().map(String::as_str).collect();
	let mut sorted_keys = keys.clone();
	let mut sorted_expected = expected.to_vec();
	sorted_keys.sort_unstable();
	sorted_expected.sort_unstable();
	assert_eq!(
		sorted_keys, sorted_expected,
		"Expected keys {:?}, got {:?}",
		expected, keys
	);
}

/// Assert that a value is a URI string of the given resource and identity
pub fn assert_resource_uri(json: &Value, resource_name: &str, id: &str) {
	let expected = format!("/api/v1/{}/{}/", resource_name, id);
	assert_eq!(
		json.as_str(),
		Some(expected.as_str()),
		"Expected URI '{}', got {:?}",
		expected,
		json
	);
}
