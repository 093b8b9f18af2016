use super::{ApiField, Field};
use crate::error::{ResourceError, Result, ValidationErrors};
use crate::value::Value;
use indexmap::IndexMap;

/// Sub-schema of an embedded structure field
#[derive(Debug, Clone, Default)]
pub struct EmbeddedSchema {
	fields: IndexMap<String, Field>,
}

impl EmbeddedSchema {
	pub fn new() -> Self {
		Self::default()
	}

	/// Declare a sub-field; the name is also the key inside the structure
	pub fn field(mut self, name: &str, mut field: Field) -> Self {
		field.bind_name(name);
		self.fields.insert(name.to_string(), field);
		self
	}

	pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
		self.fields.iter().map(|(name, field)| (name.as_str(), field))
	}

	/// Coerce the keys present in `value`; absent keys stay absent and
	/// unknown keys are dropped
	pub(super) fn convert(&self, field: &str, value: &Value) -> Result<Value> {
		let Value::Dict(map) = value else {
			return Err(ResourceError::conversion(
				field,
				value,
				format!("expected a mapping, got {}", value.type_name()),
			));
		};
		if map.is_empty() {
			return Ok(Value::Null);
		}
		let mut out = IndexMap::new();
		for (name, sub) in &self.fields {
			if let Some(raw) = map.get(name) {
				let converted = sub.convert(raw).map_err(|err| nested(field, err))?;
				out.insert(name.clone(), converted);
			}
		}
		Ok(Value::Dict(out))
	}

	/// Report required sub-fields that are missing or null
	pub(super) fn validate(&self, field: &str, value: &IndexMap<String, Value>) -> ValidationErrors {
		let mut errors = ValidationErrors::new();
		for (name, sub) in &self.fields {
			if sub.is_required() && value.get(name).is_none_or(Value::is_null) {
				errors.add(format!("{}.{}", field, name), "This field is required.");
			}
		}
		errors
	}
}

fn nested(parent: &str, err: ResourceError) -> ResourceError {
	match err {
		ResourceError::FieldConversion {
			field,
			value,
			message,
		} => ResourceError::FieldConversion {
			field: format!("{}.{}", parent, field),
			value,
			message,
		},
		other => other,
	}
}
