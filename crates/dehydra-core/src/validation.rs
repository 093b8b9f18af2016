//! Domain validation run at the end of hydration

use crate::bundle::Bundle;
use crate::error::ValidationErrors;

/// Checks a hydrated bundle; an empty result means the object is valid
pub trait DocumentValidator: Send + Sync {
	fn validate(&self, bundle: &Bundle) -> ValidationErrors;
}

impl<F> DocumentValidator for F
where
	F: Fn(&Bundle) -> ValidationErrors + Send + Sync,
{
	fn validate(&self, bundle: &Bundle) -> ValidationErrors {
		self(bundle)
	}
}

/// Accepts everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoValidation;

impl DocumentValidator for NoValidation {
	fn validate(&self, _bundle: &Bundle) -> ValidationErrors {
		ValidationErrors::new()
	}
}

/// Rejects objects where any of the listed attributes is null
#[derive(Debug, Clone, Default)]
pub struct RequiredAttributes {
	attributes: Vec<String>,
}

impl RequiredAttributes {
	pub fn new<I, S>(attributes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			attributes: attributes.into_iter().map(Into::into).collect(),
		}
	}
}

impl DocumentValidator for RequiredAttributes {
	fn validate(&self, bundle: &Bundle) -> ValidationErrors {
		let mut errors = ValidationErrors::new();
		for attribute in &self.attributes {
			let missing = bundle
				.obj
				.as_ref()
				.map(|obj| obj.lookup(attribute).is_null())
				.unwrap_or(true);
			if missing {
				errors.add(attribute.clone(), "This field is required.");
			}
		}
		errors
	}
}
