//! Loosely-specified request options accepted by the pipeline.

// self
use crate::{
	_prelude::*,
	request::{Headers, Method, Params},
};

/// Caller-supplied request options; every field is optional until normalization.
///
/// Merging happens field-by-field with explicit precedence rules rather than a
/// generic deep merge: see [`normalize`](crate::request::normalize) for the URL
/// assembly and the auth-merge step in the orchestrator for header precedence.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RequestOptions {
	/// Explicit method; loses to a verb-helper override, wins over the GET default.
	pub method: Option<Method>,
	/// Base URL used to resolve relative endpoints.
	pub base_url: Option<Url>,
	/// Query/path parameters.
	pub params: Params,
	/// Fragment appended to the assembled URL.
	pub hash: Option<String>,
	/// Header map merged into the descriptor.
	pub headers: Headers,
	/// Optional payload.
	pub body: Option<String>,
	/// Skips the authorization merge entirely.
	pub disable_auth: bool,
	/// Fails the pipeline when credentials cannot be acquired.
	pub must_auth: bool,
}
impl RequestOptions {
	/// Creates empty options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the explicit method.
	pub fn with_method(mut self, method: Method) -> Self {
		self.method = Some(method);

		self
	}

	/// Sets the base URL used for relative endpoints.
	pub fn with_base_url(mut self, base_url: Url) -> Self {
		self.base_url = Some(base_url);

		self
	}

	/// Sets the query/path parameters.
	pub fn with_params(mut self, params: impl Into<Params>) -> Self {
		self.params = params.into();

		self
	}

	/// Sets the fragment appended to the assembled URL.
	pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
		self.hash = Some(hash.into());

		self
	}

	/// Adds a header.
	pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Sets the payload.
	pub fn with_body(mut self, body: impl Into<String>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// Marks the request as needing no authorization merge.
	pub fn disable_auth(mut self) -> Self {
		self.disable_auth = true;

		self
	}

	/// Marks the request as failing outright when credentials cannot be acquired.
	pub fn must_auth(mut self) -> Self {
		self.must_auth = true;

		self
	}
}
