#![cfg(feature = "reqwest")]

// std
use std::sync::Arc;
// crates.io
use httpmock::{Method::HEAD, prelude::*};
use parking_lot::Mutex;
use serde::Deserialize;
// self
use fetch_pipeline::{
	auth::credentials::{Anonymous, StaticBearer},
	error::{AdmissionError, Error, TransportError},
	fetch::{Fetch, Navigator, Outcome, Recovery, ReqwestFetch},
	middleware::DebounceGate,
	request::RequestOptions,
	url::Url,
};

#[derive(Debug, Deserialize, PartialEq)]
struct Profile {
	id: u64,
	name: String,
}

#[derive(Debug, Default)]
struct RecordingNavigator {
	locations: Mutex<Vec<String>>,
}
impl RecordingNavigator {
	fn locations(&self) -> Vec<String> {
		self.locations.lock().clone()
	}
}
impl Navigator for RecordingNavigator {
	fn navigate(&self, location: &str) {
		self.locations.lock().push(location.to_owned());
	}
}

fn build_fetch(server: &MockServer, token: Option<&str>) -> ReqwestFetch {
	let auth: Arc<dyn fetch_pipeline::auth::AuthorizationProvider> = match token {
		Some(token) => Arc::new(StaticBearer::new(token)),
		None => Arc::new(Anonymous),
	};

	Fetch::new(auth).with_base_url(
		Url::parse(&server.base_url()).expect("Mock server URL should parse successfully."),
	)
}

#[tokio::test]
async fn get_assembles_query_headers_and_decodes_the_body() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/users/7")
				.query_param("expand", "posts")
				.header("authorization", "Bearer token-it")
				.header("x-trace", "trace-1");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"id\":7,\"name\":\"Ada\"}");
		})
		.await;
	let fetch = build_fetch(&server, Some("token-it"));
	let options = RequestOptions::new()
		.with_params(vec![("expand".to_owned(), "posts".to_owned())])
		.with_header("X-Trace", "trace-1");
	let outcome: Outcome<Profile> =
		fetch.get("users/7", options, None).await.expect("GET pipeline should succeed.");

	mock.assert_async().await;

	assert_eq!(outcome.completed(), Some(Profile { id: 7, name: "Ada".into() }));
}

#[tokio::test]
async fn typed_path_placeholders_reach_the_server_coerced() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/users/127/posts");
			then.status(200).header("content-type", "application/json").body("[]");
		})
		.await;
	let fetch = build_fetch(&server, None);
	let mut params = std::collections::BTreeMap::new();

	params.insert("id".to_owned(), serde_json::json!(300));

	let outcome: Outcome<Vec<Profile>> = fetch
		.get("users/{id:int8}/posts", RequestOptions::new().with_params(params), None)
		.await
		.expect("Placeholder GET should succeed.");

	mock.assert_async().await;

	assert_eq!(outcome.completed(), Some(Vec::new()));
}

#[tokio::test]
async fn post_sends_the_body_unchanged() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/items").body("{\"name\":\"widget\"}");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"id\":1,\"name\":\"widget\"}");
		})
		.await;
	let fetch = build_fetch(&server, None);
	let outcome: Outcome<Profile> = fetch
		.post("items", RequestOptions::new().with_body("{\"name\":\"widget\"}"), None)
		.await
		.expect("POST pipeline should succeed.");

	mock.assert_async().await;

	assert_eq!(outcome.completed(), Some(Profile { id: 1, name: "widget".into() }));
}

#[tokio::test]
async fn see_other_responses_recover_through_the_navigator() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/dashboard");
			then.status(303).header("location", "/login");
		})
		.await;
	let navigator = Arc::new(RecordingNavigator::default());
	let fetch = build_fetch(&server, None).with_navigator(navigator.clone());
	let outcome: Outcome<Profile> = fetch
		.get("dashboard", RequestOptions::new(), None)
		.await
		.expect("See-other recovery must resolve, not reject.");

	assert_eq!(outcome, Outcome::Recovered(Recovery::Redirected { location: "/login".into() }));
	assert_eq!(navigator.locations(), ["/login"]);
}

#[tokio::test]
async fn unhandled_unauthorized_responses_reject() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/me");
			then.status(401).body("session expired");
		})
		.await;
	let fetch = build_fetch(&server, None);
	let err = fetch
		.get::<Profile>("me", RequestOptions::new(), None)
		.await
		.expect_err("Unauthorized without a recovery handler must reject.");

	assert!(matches!(err, Error::Transport(TransportError::Unauthorized { .. })));
}

#[tokio::test]
async fn server_errors_carry_status_and_message() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/flaky");
			then.status(500).body("boom");
		})
		.await;
	let fetch = build_fetch(&server, None);
	let err = fetch
		.get::<Profile>("flaky", RequestOptions::new(), None)
		.await
		.expect_err("Server errors must reject.");

	assert!(matches!(
		err,
		Error::Transport(TransportError::Status { status: 500, ref message }) if message == "boom",
	));
}

#[tokio::test]
async fn debounce_gate_denies_the_second_immediate_call() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/ping");
			then.status(200).header("content-type", "application/json").body("null");
		})
		.await;
	let fetch =
		build_fetch(&server, None).with_admission(Arc::new(DebounceGate::default()));
	let first: Outcome<serde_json::Value> = fetch
		.get("ping", RequestOptions::new(), None)
		.await
		.expect("First request should be admitted.");

	assert!(!first.is_recovered());

	let err = fetch
		.get::<serde_json::Value>("ping", RequestOptions::new(), None)
		.await
		.expect_err("Second request inside the window should be denied.");

	assert!(matches!(err, Error::Admission(AdmissionError::Debounced { .. })));

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn head_confirms_reachability_without_a_body() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(HEAD).path("/status");
			then.status(200);
		})
		.await;
	let fetch = build_fetch(&server, None);
	let outcome = fetch
		.head("status", RequestOptions::new(), None)
		.await
		.expect("HEAD pipeline should succeed.");

	mock.assert_async().await;

	assert_eq!(outcome, Outcome::Completed(()));
}
