//! Rust’s turnkey HTTP request pipeline—authorization injection, unauthorized/redirect recovery,
//! and admission gating over any async transport.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod error;
pub mod fetch;
pub mod http;
pub mod middleware;
pub mod obs;
pub mod request;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and scripted collaborator stubs for integration tests; enabled via
	//! `cfg(test)` or the `test` crate feature.

	pub use crate::_prelude::*;

	// std
	use std::{
		collections::VecDeque,
		sync::atomic::{AtomicUsize, Ordering},
	};
	// self
	use crate::{
		auth::{
			AuthorizationError, AuthorizationFuture, AuthorizationOptions, AuthorizationProvider,
			RecoveryFuture,
		},
		error::TransportError,
		fetch::{Fetch, Navigator},
		http::{Transport, TransportFuture},
		request::RequestDescriptor,
	};
	#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

	#[cfg(feature = "reqwest")]
	/// Fetch type alias used by reqwest-backed integration tests.
	pub type ReqwestTestFetch = Fetch<ReqwestTransport>;

	#[cfg(feature = "reqwest")]
	/// Builds a reqwest transport with redirect following disabled, suitable for
	/// exercising the pipeline against an `httpmock` server.
	pub fn test_reqwest_transport() -> ReqwestTransport {
		ReqwestTransport::default()
	}

	#[cfg(feature = "reqwest")]
	/// Constructs a [`Fetch`] backed by the test reqwest transport and the provided
	/// authorization provider.
	pub fn build_reqwest_test_fetch(auth: Arc<dyn AuthorizationProvider>) -> ReqwestTestFetch {
		Fetch::with_transport(test_reqwest_transport(), auth)
	}

	/// Transport stub that replays a scripted sequence of outcomes and records every
	/// descriptor it receives.
	#[derive(Debug, Default)]
	pub struct ScriptedTransport {
		script: Mutex<VecDeque<Result<String, TransportError>>>,
		requests: Mutex<Vec<RequestDescriptor>>,
	}
	impl ScriptedTransport {
		/// Creates an empty script; unscripted sends resolve with a `null` JSON body.
		pub fn new() -> Self {
			Self::default()
		}

		/// Queues a successful response body.
		pub fn push_body(&self, body: impl Into<String>) {
			self.script.lock().push_back(Ok(body.into()));
		}

		/// Queues a transport failure.
		pub fn push_failure(&self, error: TransportError) {
			self.script.lock().push_back(Err(error));
		}

		/// Returns how many times the transport was invoked.
		pub fn calls(&self) -> usize {
			self.requests.lock().len()
		}

		/// Returns a snapshot of every descriptor the transport received.
		pub fn requests(&self) -> Vec<RequestDescriptor> {
			self.requests.lock().clone()
		}

		/// Returns the most recent descriptor, if any request was sent.
		pub fn last_request(&self) -> Option<RequestDescriptor> {
			self.requests.lock().last().cloned()
		}
	}
	impl Transport for ScriptedTransport {
		fn send<'a>(&'a self, request: &'a RequestDescriptor) -> TransportFuture<'a> {
			self.requests.lock().push(request.clone());

			let next = self.script.lock().pop_front().unwrap_or_else(|| Ok("null".into()));

			Box::pin(async move { next })
		}
	}

	/// Navigator stub recording every redirect target the pipeline follows.
	#[derive(Debug, Default)]
	pub struct RecordingNavigator {
		locations: Mutex<Vec<String>>,
	}
	impl RecordingNavigator {
		/// Creates a navigator with no recorded locations.
		pub fn new() -> Self {
			Self::default()
		}

		/// Returns every location navigated to, in order.
		pub fn locations(&self) -> Vec<String> {
			self.locations.lock().clone()
		}
	}
	impl Navigator for RecordingNavigator {
		fn navigate(&self, location: &str) {
			self.locations.lock().push(location.to_owned());
		}
	}

	/// Authorization provider stub with scripted acquisition and recovery outcomes.
	#[derive(Debug)]
	pub struct StubAuthorization {
		options: Option<AuthorizationOptions>,
		handled: bool,
		option_calls: AtomicUsize,
		handle_calls: AtomicUsize,
	}
	impl StubAuthorization {
		/// Provider that always yields the given authorization options.
		pub fn succeeding(options: AuthorizationOptions) -> Self {
			Self {
				options: Some(options),
				handled: false,
				option_calls: AtomicUsize::new(0),
				handle_calls: AtomicUsize::new(0),
			}
		}

		/// Provider whose acquisition always fails with no active session.
		pub fn failing() -> Self {
			Self {
				options: None,
				handled: false,
				option_calls: AtomicUsize::new(0),
				handle_calls: AtomicUsize::new(0),
			}
		}

		/// Scripts the outcome [`AuthorizationProvider::handle_unauthorized`] reports.
		pub fn with_handled(mut self, handled: bool) -> Self {
			self.handled = handled;

			self
		}

		/// Returns how many times authorization options were requested.
		pub fn option_calls(&self) -> usize {
			self.option_calls.load(Ordering::Relaxed)
		}

		/// Returns how many times unauthorized recovery was consulted.
		pub fn handle_calls(&self) -> usize {
			self.handle_calls.load(Ordering::Relaxed)
		}
	}
	impl AuthorizationProvider for StubAuthorization {
		fn authorization_options(&self) -> AuthorizationFuture<'_> {
			self.option_calls.fetch_add(1, Ordering::Relaxed);

			let outcome = match &self.options {
				Some(options) => Ok(options.clone()),
				None => Err(AuthorizationError::NoSession),
			};

			Box::pin(async move { outcome })
		}

		fn handle_unauthorized(&self, _: &TransportError) -> RecoveryFuture<'_> {
			self.handle_calls.fetch_add(1, Ordering::Relaxed);

			let handled = self.handled;

			Box::pin(async move { handled })
		}
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value as Json;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
