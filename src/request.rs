//! Request normalization: loose options in, resolved descriptors out.
//!
//! `normalize` is the pipeline's only entry into URL assembly. It resolves the
//! method (override > options > GET), substitutes `{name}` / `{name:kind}` path
//! placeholders using the coercion rules in [`params`], folds the remaining
//! parameters into the query string (last write wins per key), and attaches the
//! fragment. The function is pure: the same inputs always produce the same
//! descriptor, and malformed base URLs fail with a validation error instead of
//! silently producing an invalid URL.

pub mod descriptor;
pub mod options;
pub mod params;

pub use descriptor::*;
pub use options::*;
pub use params::*;

// self
use crate::{_prelude::*, error::ValidationError};

/// Resolves loose options into a ready-to-send [`RequestDescriptor`].
pub fn normalize(
	endpoint: &str,
	options: &RequestOptions,
	method_override: Option<Method>,
) -> Result<RequestDescriptor> {
	let method = method_override.or(options.method).unwrap_or_default();
	let mut params = options.params.clone();
	let path = fill_path_params(endpoint, &mut params);
	let mut url = resolve_url(&path, options.base_url.as_ref())?;
	let pairs = params.into_pairs();

	if !pairs.is_empty() {
		let existing = url.query_pairs().into_owned().collect();
		let merged = params::merge_pairs(existing, pairs);

		url.query_pairs_mut().clear().extend_pairs(&merged);
	}
	if let Some(hash) = options.hash.as_deref() {
		url.set_fragment(Some(hash.trim_start_matches('#')));
	}

	Ok(RequestDescriptor {
		url,
		method,
		headers: options.headers.clone(),
		body: options.body.clone(),
		disable_auth: options.disable_auth,
		must_auth: options.must_auth,
	})
}

fn resolve_url(endpoint: &str, base: Option<&Url>) -> Result<Url, ValidationError> {
	match Url::parse(endpoint) {
		Ok(url) => Ok(url),
		Err(url::ParseError::RelativeUrlWithoutBase) => match base {
			Some(base) => base.join(endpoint).map_err(|source| ValidationError::UrlPath { source }),
			None => Err(ValidationError::RelativeEndpoint { endpoint: endpoint.to_owned() }),
		},
		Err(source) => Err(ValidationError::UrlPath { source }),
	}
}

/// Substitutes `{name}` / `{name:kind}` placeholders, consuming the matched parameters.
///
/// Missing parameters substitute as the empty string, matching the coercion rule for
/// absent values. An unterminated `{` is kept verbatim.
fn fill_path_params(endpoint: &str, params: &mut Params) -> String {
	let mut out = String::with_capacity(endpoint.len());
	let mut rest = endpoint;

	while let Some(start) = rest.find('{') {
		out.push_str(&rest[..start]);

		let after = &rest[start + 1..];
		let Some(end) = after.find('}') else {
			out.push('{');
			rest = after;

			continue;
		};
		let token = &after[..end];
		let (name, kind) = match token.split_once(':') {
			Some((name, tag)) => (name, Some(ParamKind::from_tag(tag))),
			None => (token, None),
		};
		let value = params.take(name).unwrap_or(Json::Null);

		out.push_str(&params::coerce(&value, kind));

		rest = &after[end + 1..];
	}

	out.push_str(rest);

	out
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	fn base() -> Url {
		Url::parse("https://api.example.test/v1/").expect("Failed to parse test base URL.")
	}

	#[test]
	fn normalizing_twice_is_byte_identical() {
		let options = RequestOptions::new()
			.with_base_url(base())
			.with_params("a=1&b=2")
			.with_hash("#frag")
			.with_header("X-Trace", "t");
		let first = normalize("search", &options, None).expect("Failed to normalize options.");
		let second = normalize("search", &options, None).expect("Failed to normalize options.");

		assert_eq!(first, second);
		assert_eq!(first.url.as_str(), second.url.as_str());
	}

	#[test]
	fn method_resolution_order_is_override_then_options_then_get() {
		let explicit = RequestOptions::new().with_base_url(base()).with_method(Method::Put);

		assert_eq!(
			normalize("x", &explicit, Some(Method::Delete))
				.expect("Failed to normalize options.")
				.method,
			Method::Delete,
		);
		assert_eq!(
			normalize("x", &explicit, None).expect("Failed to normalize options.").method,
			Method::Put,
		);
		assert_eq!(
			normalize("x", &RequestOptions::new().with_base_url(base()), None)
				.expect("Failed to normalize options.")
				.method,
			Method::Get,
		);
	}

	#[test]
	fn typed_placeholders_are_coerced_and_consumed() {
		let mut params = BTreeMap::new();

		params.insert("id".to_owned(), json!(300));
		params.insert("page".to_owned(), json!(2));

		let options = RequestOptions::new().with_base_url(base()).with_params(params);
		let descriptor = normalize("users/{id:int8}/posts", &options, None)
			.expect("Failed to normalize options.");

		assert_eq!(descriptor.url.path(), "/v1/users/127/posts");
		assert_eq!(descriptor.url.query(), Some("page=2"));
	}

	#[test]
	fn missing_placeholders_substitute_empty() {
		let options = RequestOptions::new().with_base_url(base());
		let descriptor =
			normalize("users/{id}/posts", &options, None).expect("Failed to normalize options.");

		assert_eq!(descriptor.url.path(), "/v1/users//posts");
	}

	#[test]
	fn absolute_endpoints_ignore_the_base() {
		let options = RequestOptions::new().with_base_url(base());
		let descriptor = normalize("https://other.example.test/ping", &options, None)
			.expect("Failed to normalize options.");

		assert_eq!(descriptor.url.host_str(), Some("other.example.test"));
	}

	#[test]
	fn relative_endpoint_without_base_fails() {
		let err = normalize("users", &RequestOptions::new(), None)
			.expect_err("Relative endpoints must fail without a base URL.");

		assert!(matches!(
			err,
			Error::Validation(ValidationError::RelativeEndpoint { endpoint }) if endpoint == "users",
		));
	}

	#[test]
	fn malformed_endpoint_fails_with_url_path_error() {
		let err = normalize("https://[bad", &RequestOptions::new(), None)
			.expect_err("Malformed URLs must fail validation.");

		assert!(matches!(err, Error::Validation(ValidationError::UrlPath { .. })));
	}

	#[test]
	fn query_parameters_overwrite_endpoint_duplicates() {
		let options = RequestOptions::new()
			.with_base_url(base())
			.with_params(vec![("q".to_owned(), "new".to_owned()), ("page".to_owned(), "3".to_owned())]);
		let descriptor =
			normalize("search?q=old", &options, None).expect("Failed to normalize options.");

		assert_eq!(descriptor.url.query(), Some("q=new&page=3"));
	}

	#[test]
	fn hash_fragment_is_attached_without_the_marker() {
		let options = RequestOptions::new().with_base_url(base()).with_hash("#section-2");
		let descriptor = normalize("doc", &options, None).expect("Failed to normalize options.");

		assert_eq!(descriptor.url.fragment(), Some("section-2"));
	}

	#[test]
	fn policy_flags_carry_into_the_descriptor() {
		let options = RequestOptions::new().with_base_url(base()).disable_auth().must_auth();
		let descriptor = normalize("x", &options, None).expect("Failed to normalize options.");

		assert!(descriptor.disable_auth);
		assert!(descriptor.must_auth);
	}
}
