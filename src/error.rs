//! Pipeline-level error types shared across normalization, admission, and transport layers.

// self
use crate::_prelude::*;

/// Pipeline-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical pipeline error exposed by public APIs.
///
/// Recoverable transport classes (see-other redirects and handled unauthorized
/// responses) never surface here; the orchestrator absorbs them and resolves with
/// [`Outcome::Recovered`](crate::fetch::Outcome) instead. Every other failure
/// propagates through one of these variants.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Request options failed validation before anything was sent.
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// Admission gate denied the request; the transport was never invoked.
	#[error(transparent)]
	Admission(#[from] AdmissionError),
	/// Transport failure surfaced without local recovery.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Authorization was required but could not be acquired.
	#[error("Authorization is required but could not be acquired.")]
	Unauthorized {
		/// Acquisition failure reported by the authorization provider.
		#[source]
		source: crate::auth::AuthorizationError,
	},
	/// Response body could not be decoded into the requested type.
	#[error("Response body could not be decoded into the requested type.")]
	Decode {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}

/// Normalization failures raised while resolving request options.
#[derive(Debug, ThisError)]
pub enum ValidationError {
	/// Base URL or assembled path failed to parse.
	#[error("URL path is malformed.")]
	UrlPath {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Endpoint is relative and no base URL is configured.
	#[error("Endpoint `{endpoint}` is relative and no base URL is configured.")]
	RelativeEndpoint {
		/// Endpoint string as supplied by the caller.
		endpoint: String,
	},
}

/// Denial reasons emitted by the admission gate.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum AdmissionError {
	/// Request arrived inside the debounce window.
	#[error("Request was debounced; retry in {retry_in}.")]
	Debounced {
		/// Duration until the gate reopens.
		retry_in: Duration,
	},
}

/// Transport-level failures, classified so the orchestrator can pick a recovery path.
///
/// A given raw transport failure maps to exactly one variant.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Endpoint rejected the request as unauthorized.
	#[error("Endpoint rejected the request as unauthorized: {message}.")]
	Unauthorized {
		/// Provider- or endpoint-supplied reason string.
		message: String,
	},
	/// Endpoint answered with a see-other redirect.
	#[error("Endpoint redirected the caller to `{location}`.")]
	SeeOther {
		/// Redirect target the caller should navigate to.
		location: String,
	},
	/// Endpoint returned a non-success status outside the recoverable classes.
	#[error("Endpoint returned status {status}: {message}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Response body or status text.
		message: String,
	},
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Returns true when the endpoint rejected the request as unauthorized.
	pub fn is_unauthorized(&self) -> bool {
		matches!(self, Self::Unauthorized { .. })
	}

	/// Returns true when the endpoint answered with a see-other redirect.
	pub fn is_see_other(&self) -> bool {
		matches!(self, Self::SeeOther { .. })
	}

	/// Returns the redirect target carried by a see-other failure.
	pub fn location(&self) -> Option<&str> {
		match self {
			Self::SeeOther { location } => Some(location),
			_ => None,
		}
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
