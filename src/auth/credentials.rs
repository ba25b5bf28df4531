//! Stock authorization providers for fixed-credential setups.
//!
//! None of these can re-authenticate, so their unauthorized handler always reports
//! the failure as unhandled and the original error reaches the caller.

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
// self
use crate::{
	auth::{
		AuthorizationError, AuthorizationFuture, AuthorizationOptions, AuthorizationProvider,
		RecoveryFuture,
	},
	error::TransportError,
};

/// Provider that never supplies credentials.
///
/// Requests marked must-auth fail immediately through this provider; everything else
/// proceeds unauthenticated.
#[derive(Clone, Debug, Default)]
pub struct Anonymous;
impl AuthorizationProvider for Anonymous {
	fn authorization_options(&self) -> AuthorizationFuture<'_> {
		Box::pin(async { Err(AuthorizationError::NoSession) })
	}

	fn handle_unauthorized(&self, _: &TransportError) -> RecoveryFuture<'_> {
		Box::pin(async { false })
	}
}

/// Provider that attaches a fixed bearer token.
#[derive(Clone, Debug)]
pub struct StaticBearer {
	token: String,
}
impl StaticBearer {
	/// Creates a provider for the given token.
	pub fn new(token: impl Into<String>) -> Self {
		Self { token: token.into() }
	}
}
impl AuthorizationProvider for StaticBearer {
	fn authorization_options(&self) -> AuthorizationFuture<'_> {
		let options =
			AuthorizationOptions::new().with_header("authorization", format!("Bearer {}", self.token));

		Box::pin(async move { Ok(options) })
	}

	fn handle_unauthorized(&self, _: &TransportError) -> RecoveryFuture<'_> {
		Box::pin(async { false })
	}
}

/// Provider that attaches HTTP basic credentials.
#[derive(Clone, Debug)]
pub struct BasicCredentials {
	username: String,
	password: String,
}
impl BasicCredentials {
	/// Creates a provider for the given username/password pair.
	pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
		Self { username: username.into(), password: password.into() }
	}
}
impl AuthorizationProvider for BasicCredentials {
	fn authorization_options(&self) -> AuthorizationFuture<'_> {
		let encoded = STANDARD.encode(format!("{}:{}", self.username, self.password));
		let options =
			AuthorizationOptions::new().with_header("authorization", format!("Basic {encoded}"));

		Box::pin(async move { Ok(options) })
	}

	fn handle_unauthorized(&self, _: &TransportError) -> RecoveryFuture<'_> {
		Box::pin(async { false })
	}
}
