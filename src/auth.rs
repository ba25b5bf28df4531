//! Authorization provider contract consumed by the pipeline, plus stock
//! fixed-credential providers.
//!
//! The pipeline never owns session state; it only consumes the two operations
//! below. Acquisition failures are not fatal by themselves: the orchestrator
//! degrades to an unauthenticated send unless the request is marked must-auth.

pub mod credentials;

pub use credentials::*;

// self
use crate::{_prelude::*, error::TransportError, request::Headers};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Boxed future returned by [`AuthorizationProvider::authorization_options`].
pub type AuthorizationFuture<'a> =
	Pin<Box<dyn Future<Output = Result<AuthorizationOptions, AuthorizationError>> + 'a + Send>>;
/// Boxed future returned by [`AuthorizationProvider::handle_unauthorized`].
pub type RecoveryFuture<'a> = Pin<Box<dyn Future<Output = bool> + 'a + Send>>;

/// Supplies authorization data for outgoing requests and reacts to unauthorized
/// responses after a request was sent with that data applied.
pub trait AuthorizationProvider
where
	Self: Send + Sync,
{
	/// Produces the extra fields to merge into the outgoing request.
	fn authorization_options(&self) -> AuthorizationFuture<'_>;

	/// Invoked when the transport reports an unauthorized failure.
	///
	/// Returns true when recovery was fully handled (a sign-in redirect was triggered,
	/// a refresh is in progress, etc.); the pipeline then resolves as a silent no-op
	/// instead of rejecting. Returns false when recovery is not possible, in which case
	/// the original error propagates to the caller.
	fn handle_unauthorized(&self, error: &TransportError) -> RecoveryFuture<'_>;
}

/// Extra request fields supplied by an [`AuthorizationProvider`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationOptions {
	/// Headers to merge; they win over base values on collision.
	pub headers: Headers,
	/// Query parameters to merge; they win over base values on collision.
	pub params: Vec<(String, String)>,
}
impl AuthorizationOptions {
	/// Creates empty authorization options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a header.
	pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Adds a query parameter.
	pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.params.push((name.into(), value.into()));

		self
	}

	/// Returns true when no fields would be merged.
	pub fn is_empty(&self) -> bool {
		self.headers.is_empty() && self.params.is_empty()
	}
}

/// Acquisition failures reported by an [`AuthorizationProvider`].
#[derive(Debug, ThisError)]
pub enum AuthorizationError {
	/// No active session is available.
	#[error("No active session is available.")]
	NoSession,
	/// Stored credentials have expired.
	#[error("Stored credentials have expired.")]
	Expired,
	/// Provider-specific backend failure.
	#[error("Authorization backend failed.")]
	Backend {
		/// Underlying provider failure.
		#[source]
		source: BoxError,
	},
}
impl AuthorizationError {
	/// Wraps a provider-specific backend failure.
	pub fn backend(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Backend { source: Box::new(src) }
	}
}
