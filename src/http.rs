//! Transport primitives for the request pipeline.
//!
//! The module exposes [`Transport`], the pipeline's only dependency on an HTTP
//! stack, alongside the default [`ReqwestTransport`] adapter. Implementations must
//! classify every failure into exactly one [`TransportError`] variant so the
//! orchestrator can pick a recovery path without inspecting raw responses.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
#[cfg(feature = "reqwest")]
use reqwest::{
	Method as HttpMethod, StatusCode,
	header::{HeaderMap, HeaderName, HeaderValue, LOCATION},
	redirect::Policy,
};
// self
use crate::{
	_prelude::*,
	error::TransportError,
	request::{Headers, Method, RequestDescriptor},
};

/// Boxed future returned by [`Transport::send`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<String, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing pipeline requests.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared
/// behind `Arc<T>` across every in-flight request, and the returned futures must be
/// `Send` so orchestrator futures can hop executors.
pub trait Transport
where
	Self: 'static + Send + Sync,
{
	/// Sends the resolved request and returns the raw response body.
	fn send<'a>(&'a self, request: &'a RequestDescriptor) -> TransportFuture<'a>;
}

#[cfg(feature = "reqwest")]
/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
/// Redirect following stays disabled so see-other responses reach the pipeline's
/// recovery path instead of being consumed inside the client. Configure any custom
/// [`ReqwestClient`] the same way before wrapping it.
#[derive(Clone)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl Default for ReqwestTransport {
	fn default() -> Self {
		// `ReqwestClient::new` panics on the same builder failures, so this keeps
		// reqwest's own construction contract.
		Self(
			ReqwestClient::builder()
				.redirect(Policy::none())
				.build()
				.expect("Failed to build the default Reqwest client."),
		)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Transport for ReqwestTransport {
	fn send<'a>(&'a self, request: &'a RequestDescriptor) -> TransportFuture<'a> {
		Box::pin(async move {
			let headers = to_header_map(&request.headers)?;
			let mut builder =
				self.0.request(to_http_method(request.method), request.url.clone()).headers(headers);

			if let Some(body) = &request.body {
				builder = builder.body(body.clone());
			}

			let response = builder.send().await.map_err(TransportError::from)?;
			let status = response.status();
			let location = response
				.headers()
				.get(LOCATION)
				.and_then(|value| value.to_str().ok())
				.map(str::to_owned);
			let body = response.text().await.map_err(TransportError::from)?;

			classify(status, location, body)
		})
	}
}

#[cfg(feature = "reqwest")]
fn to_http_method(method: Method) -> HttpMethod {
	match method {
		Method::Get => HttpMethod::GET,
		Method::Head => HttpMethod::HEAD,
		Method::Post => HttpMethod::POST,
		Method::Put => HttpMethod::PUT,
		Method::Patch => HttpMethod::PATCH,
		Method::Delete => HttpMethod::DELETE,
	}
}

#[cfg(feature = "reqwest")]
fn to_header_map(headers: &Headers) -> Result<HeaderMap, TransportError> {
	let mut map = HeaderMap::new();

	for (name, value) in headers.iter() {
		let name = HeaderName::from_bytes(name.as_bytes()).map_err(TransportError::network)?;
		let value = HeaderValue::from_str(value).map_err(TransportError::network)?;

		map.insert(name, value);
	}

	Ok(map)
}

#[cfg(feature = "reqwest")]
fn classify(
	status: StatusCode,
	location: Option<String>,
	body: String,
) -> Result<String, TransportError> {
	if status.is_success() {
		return Ok(body);
	}

	match status {
		StatusCode::UNAUTHORIZED =>
			Err(TransportError::Unauthorized { message: reason(status, body) }),
		StatusCode::SEE_OTHER => Err(TransportError::SeeOther {
			location: location.unwrap_or_else(|| body.trim().to_owned()),
		}),
		_ => Err(TransportError::Status { status: status.as_u16(), message: reason(status, body) }),
	}
}

#[cfg(feature = "reqwest")]
fn reason(status: StatusCode, body: String) -> String {
	if body.is_empty() {
		status.canonical_reason().unwrap_or("unknown").to_owned()
	} else {
		body
	}
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;

	#[test]
	fn classification_maps_each_status_to_one_kind() {
		assert_eq!(
			classify(StatusCode::OK, None, "body".into()).expect("2xx should pass the body through."),
			"body",
		);

		let err = classify(StatusCode::UNAUTHORIZED, None, String::new())
			.expect_err("401 should classify as unauthorized.");

		assert!(err.is_unauthorized());

		let err = classify(StatusCode::SEE_OTHER, Some("/login".into()), String::new())
			.expect_err("303 should classify as see-other.");

		assert_eq!(err.location(), Some("/login"));

		let err = classify(StatusCode::INTERNAL_SERVER_ERROR, None, "boom".into())
			.expect_err("5xx should classify as a status failure.");

		assert!(matches!(err, TransportError::Status { status: 500, ref message } if message == "boom"));
	}

	#[test]
	fn see_other_without_location_falls_back_to_the_body() {
		let err = classify(StatusCode::SEE_OTHER, None, "/next\n".into())
			.expect_err("303 should classify as see-other.");

		assert_eq!(err.location(), Some("/next"));
	}

	#[test]
	fn header_map_conversion_preserves_values() {
		let headers = Headers::from_iter([("X-Trace", "abc"), ("authorization", "Bearer t")]);
		let map = to_header_map(&headers).expect("Header conversion should succeed.");

		assert_eq!(map.get("x-trace").and_then(|v| v.to_str().ok()), Some("abc"));
		assert_eq!(map.get("authorization").and_then(|v| v.to_str().ok()), Some("Bearer t"));
	}
}
