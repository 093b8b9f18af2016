//! API-wide settings
//!
//! Settings can be built in code with the `with_*` methods or read from a
//! TOML document:
//!
//! ```toml
//! api_name = "api"
//! api_version = "v2"
//! max_depth = 4
//! ```

use crate::error::{ResourceError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings shared by every resource registered on an API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
	/// First segment of every resource URI
	pub api_name: String,

	/// Second segment of every resource URI
	pub api_version: String,

	/// Scheme and host prepended to URIs when absolute URIs are enabled
	pub base_url: Option<String>,

	/// Build absolute URIs instead of root-relative ones
	pub use_absolute_uris: bool,

	/// Nesting limit for full related dehydration
	pub max_depth: usize,
}

impl Default for ApiSettings {
	fn default() -> Self {
		Self {
			api_name: "api".to_string(),
			api_version: "v1".to_string(),
			base_url: None,
			use_absolute_uris: false,
			max_depth: 8,
		}
	}
}

impl ApiSettings {
	pub fn new() -> Self {
		Self::default()
	}

	/// Parse settings from a TOML document; absent keys keep their defaults
	pub fn from_toml_str(source: &str) -> Result<Self> {
		let settings: Self = toml::from_str(source)?;
		settings.validate()?;
		Ok(settings)
	}

	pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let source = std::fs::read_to_string(path).map_err(|e| {
			ResourceError::Configuration(format!("cannot read {}: {}", path.display(), e))
		})?;
		Self::from_toml_str(&source)
	}

	pub fn with_api_name(mut self, name: impl Into<String>) -> Self {
		self.api_name = name.into();
		self
	}

	pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
		self.api_version = version.into();
		self
	}

	/// Set the base URL and switch to absolute URIs
	pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
		self.base_url = Some(base_url.into());
		self.use_absolute_uris = true;
		self
	}

	pub fn with_max_depth(mut self, depth: usize) -> Self {
		self.max_depth = depth;
		self
	}

	/// `/<api_name>/<api_version>`
	pub fn route_prefix(&self) -> String {
		format!(
			"/{}/{}",
			self.api_name.trim_matches('/'),
			self.api_version.trim_matches('/')
		)
	}

	pub fn validate(&self) -> Result<()> {
		if self.api_name.trim_matches('/').is_empty() {
			return Err(ResourceError::Configuration(
				"api_name must not be empty".to_string(),
			));
		}
		if self.api_version.trim_matches('/').is_empty() {
			return Err(ResourceError::Configuration(
				"api_version must not be empty".to_string(),
			));
		}
		if self.use_absolute_uris && self.base_url.is_none() {
			return Err(ResourceError::Configuration(
				"use_absolute_uris requires base_url".to_string(),
			));
		}
		Ok(())
	}
}
