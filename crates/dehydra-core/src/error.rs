use indexmap::IndexMap;
use std::fmt;
use thiserror::Error;

/// Errors raised while dehydrating, hydrating or resolving resources
#[derive(Debug, Error)]
pub enum ResourceError {
	/// A raw value could not be coerced to the field's domain type
	#[error("Field `{field}` could not convert {value}: {message}")]
	FieldConversion {
		field: String,
		value: String,
		message: String,
	},

	/// A required field has no value and no default
	#[error("Field `{field}`: {message}")]
	Field { field: String, message: String },

	/// A related resource could not be determined from the given input
	#[error("Unable to resolve related resource: {0}")]
	Resolution(String),

	/// Domain validation rejected the hydrated object
	#[error("Validation failed: {0}")]
	Validation(ValidationErrors),

	/// Persistence could not find the requested object
	#[error("Object not found: {resource} `{id}`")]
	NotFound { resource: String, id: String },

	/// No resource is registered under the given name or type
	#[error("No resource registered for `{0}`")]
	NotRegistered(String),

	/// Invalid settings or resource declaration
	#[error("Configuration error: {0}")]
	Configuration(String),

	/// The persistence collaborator failed
	#[error("Persistence error: {0}")]
	Persistence(String),
}

impl ResourceError {
	pub(crate) fn conversion(
		field: &str,
		value: impl fmt::Debug,
		message: impl Into<String>,
	) -> Self {
		Self::FieldConversion {
			field: field.to_string(),
			value: format!("{:?}", value),
			message: message.into(),
		}
	}

	pub(crate) fn field(field: &str, message: impl Into<String>) -> Self {
		Self::Field {
			field: field.to_string(),
			message: message.into(),
		}
	}

	/// Whether the error stems from the client's payload rather than from
	/// lookup or server-side failures.
	///
	/// The dispatch layer maps these to a 400 response.
	pub fn is_client_error(&self) -> bool {
		matches!(
			self,
			Self::FieldConversion { .. }
				| Self::Field { .. }
				| Self::Resolution(_)
				| Self::Validation(_)
		)
	}
}

impl From<toml::de::Error> for ResourceError {
	fn from(err: toml::de::Error) -> Self {
		Self::Configuration(err.to_string())
	}
}

/// Validation messages keyed by field name, in the order they were reported
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(IndexMap<String, Vec<String>>);

impl ValidationErrors {
	pub fn new() -> Self {
		Self::default()
	}

	/// Record a message against a field
	pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
		self.0.entry(field.into()).or_default().push(message.into());
	}

	/// Merge every message of `other` into `self`
	pub fn extend(&mut self, other: ValidationErrors) {
		for (field, messages) in other.0 {
			self.0.entry(field).or_default().extend(messages);
		}
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn get(&self, field: &str) -> Option<&[String]> {
		self.0.get(field).map(Vec::as_slice)
	}

	pub fn fields(&self) -> impl Iterator<Item = &str> {
		self.0.keys().map(String::as_str)
	}

	pub fn into_inner(self) -> IndexMap<String, Vec<String>> {
		self.0
	}
}

impl fmt::Display for ValidationErrors {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let parts: Vec<String> = self
			.0
			.iter()
			.map(|(field, messages)| format!("{}: {}", field, messages.join(", ")))
			.collect();
		write!(f, "{}", parts.join("; "))
	}
}

/// Result type for resource operations
pub type Result<T> = std::result::Result<T, ResourceError>;
