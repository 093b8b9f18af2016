//! Resource URI building and parsing

use crate::error::{ResourceError, Result};
use crate::request::Request;
use crate::settings::ApiSettings;

/// A URI taken apart into the resource it names and the optional identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUri {
	pub resource_name: String,
	pub id: Option<String>,
}

/// Builds and parses resource URIs
///
/// Implementations must be inverse to each other: resolving a URI produced
/// by `build_uri` yields the same resource name and identity.
pub trait UriResolver: Send + Sync {
	/// URI of one object, or of the resource's list endpoint when `id` is `None`
	fn build_uri(&self, resource_name: &str, id: Option<&str>, request: Option<&Request>)
	-> String;

	fn resolve_uri(&self, uri: &str) -> Result<ResolvedUri>;
}

/// Route-based URIs of the form `/<api_name>/<api_version>/<resource>/<id>/`
#[derive(Debug, Clone)]
pub struct RouteUriResolver {
	prefix: String,
	base_url: Option<String>,
}

impl RouteUriResolver {
	pub fn new(settings: &ApiSettings) -> Self {
		let base_url = if settings.use_absolute_uris {
			settings
				.base_url
				.as_ref()
				.map(|base| base.trim_end_matches('/').to_string())
		} else {
			None
		};
		Self {
			prefix: settings.route_prefix(),
			base_url,
		}
	}

	pub fn prefix(&self) -> &str {
		&self.prefix
	}
}

/// Drop `scheme://host`, the query and the fragment
fn path_of(uri: &str) -> &str {
	let path = match uri.split_once("://") {
		Some((_, rest)) => rest.find('/').map(|i| &rest[i..]).unwrap_or("/"),
		None => uri,
	};
	let end = path.find(['?', '#']).unwrap_or(path.len());
	&path[..end]
}

impl UriResolver for RouteUriResolver {
	fn build_uri(
		&self,
		resource_name: &str,
		id: Option<&str>,
		_request: Option<&Request>,
	) -> String {
		let mut uri = String::new();
		if let Some(base) = &self.base_url {
			uri.push_str(base);
		}
		uri.push_str(&self.prefix);
		uri.push('/');
		uri.push_str(resource_name);
		uri.push('/');
		if let Some(id) = id {
			uri.push_str(id);
			uri.push('/');
		}
		uri
	}

	fn resolve_uri(&self, uri: &str) -> Result<ResolvedUri> {
		let path = path_of(uri);
		let rest = path
			.strip_prefix(self.prefix.as_str())
			.filter(|rest| rest.starts_with('/'))
			.ok_or_else(|| {
				ResourceError::Resolution(format!(
					"`{}` is not under the API prefix `{}`",
					uri, self.prefix
				))
			})?;
		let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
		match segments.as_slice() {
			[name] => Ok(ResolvedUri {
				resource_name: (*name).to_string(),
				id: None,
			}),
			[name, id] => Ok(ResolvedUri {
				resource_name: (*name).to_string(),
				id: Some((*id).to_string()),
			}),
			_ => Err(ResourceError::Resolution(format!(
				"`{}` does not name a resource",
				uri
			))),
		}
	}
}
