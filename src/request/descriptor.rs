//! Resolved request descriptors and their supporting value types.

// self
use crate::{_prelude::*, auth::AuthorizationOptions, request::params};

/// HTTP methods the pipeline can issue.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Method {
	/// GET.
	#[default]
	Get,
	/// HEAD.
	Head,
	/// POST.
	Post,
	/// PUT.
	Put,
	/// PATCH.
	Patch,
	/// DELETE.
	Delete,
}
impl Method {
	/// Returns the canonical uppercase method token.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Head => "HEAD",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Patch => "PATCH",
			Method::Delete => "DELETE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for Method {
	type Err = UnknownMethodError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_uppercase().as_str() {
			"GET" => Ok(Method::Get),
			"HEAD" => Ok(Method::Head),
			"POST" => Ok(Method::Post),
			"PUT" => Ok(Method::Put),
			"PATCH" => Ok(Method::Patch),
			"DELETE" => Ok(Method::Delete),
			_ => Err(UnknownMethodError(s.to_owned())),
		}
	}
}

/// Error returned when parsing an unrecognized HTTP method token.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Unrecognized HTTP method `{0}`.")]
pub struct UnknownMethodError(String);

/// Case-insensitive header map; names are stored lowercased and the last write wins.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headers(BTreeMap<String, String>);
impl Headers {
	/// Creates an empty header map.
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts a header, overwriting any previous value for the same name.
	pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
		self.0.insert(name.as_ref().to_ascii_lowercase(), value.into());
	}

	/// Looks up a header value by case-insensitive name.
	pub fn get(&self, name: impl AsRef<str>) -> Option<&str> {
		self.0.get(&name.as_ref().to_ascii_lowercase()).map(String::as_str)
	}

	/// Returns true when a header with the given name is present.
	pub fn contains(&self, name: impl AsRef<str>) -> bool {
		self.0.contains_key(&name.as_ref().to_ascii_lowercase())
	}

	/// Merges `other` into `self`; on name collision the value from `other` wins.
	pub fn union(&mut self, other: &Headers) {
		for (name, value) in &other.0 {
			self.0.insert(name.clone(), value.clone());
		}
	}

	/// Iterates over name/value pairs in canonical (lowercased, sorted) order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
	}

	/// Returns the number of headers.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true when no headers are present.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl<N, V> FromIterator<(N, V)> for Headers
where
	N: AsRef<str>,
	V: Into<String>,
{
	fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
		let mut headers = Self::new();

		for (name, value) in iter {
			headers.insert(name, value);
		}

		headers
	}
}

/// Fully resolved request, ready to hand to a transport.
///
/// Owned exclusively by the call in flight; the pipeline never shares one descriptor
/// across concurrent requests. Immutable once handed to the transport except for
/// [`method`](Self::method), which verb helpers fix before sending.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestDescriptor {
	/// Absolute request URL.
	pub url: Url,
	/// HTTP method.
	pub method: Method,
	/// Header map applied to the outgoing request.
	pub headers: Headers,
	/// Optional payload.
	pub body: Option<String>,
	/// Skips the authorization merge entirely when set.
	pub disable_auth: bool,
	/// Fails the pipeline with an unauthorized error when credentials cannot be acquired.
	pub must_auth: bool,
}
impl RequestDescriptor {
	/// Creates a GET descriptor for the given absolute URL.
	pub fn new(url: Url) -> Self {
		Self {
			url,
			method: Method::Get,
			headers: Headers::new(),
			body: None,
			disable_auth: false,
			must_auth: false,
		}
	}

	/// Fixes the method, returning the updated descriptor.
	pub fn with_method(mut self, method: Method) -> Self {
		self.method = method;

		self
	}

	/// Merges authorization data into the resolved request.
	///
	/// Union with authorization precedence: provider-supplied header and query values
	/// overwrite existing values on collision.
	pub(crate) fn merge_authorization(&mut self, auth: &AuthorizationOptions) {
		self.headers.union(&auth.headers);

		if auth.params.is_empty() {
			return;
		}

		let existing = self.url.query_pairs().into_owned().collect();
		let merged = params::merge_pairs(existing, auth.params.clone());

		self.url.query_pairs_mut().clear().extend_pairs(&merged);
	}
}
