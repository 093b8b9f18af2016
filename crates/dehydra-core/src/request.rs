use serde::{Deserialize, Serialize};

/// HTTP method of the request being served
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
	Get,
	Post,
	Put,
	Patch,
	Delete,
}

/// Per-request context threaded through a bundle tree
///
/// Authorization decisions and absolute URI building read from it;
/// `PUT` and `PATCH` switch hydration to partial updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
	method: Method,
	path: String,
	user: Option<String>,
}

impl Request {
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self {
			method,
			path: path.into(),
			user: None,
		}
	}

	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::Get, path)
	}

	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::Post, path)
	}

	pub fn put(path: impl Into<String>) -> Self {
		Self::new(Method::Put, path)
	}

	pub fn patch(path: impl Into<String>) -> Self {
		Self::new(Method::Patch, path)
	}

	pub fn with_user(mut self, user: impl Into<String>) -> Self {
		self.user = Some(user.into());
		self
	}

	pub fn method(&self) -> Method {
		self.method
	}

	pub fn path(&self) -> &str {
		&self.path
	}

	pub fn user(&self) -> Option<&str> {
		self.user.as_deref()
	}

	/// Fields missing from the payload are left untouched
	pub fn is_partial_update(&self) -> bool {
		matches!(self.method, Method::Put | Method::Patch)
	}
}
