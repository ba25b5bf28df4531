//! Request-admission middleware: gates outgoing calls behind a minimum-interval policy.
//!
//! One policy instance is shared across every request issued through a client, so the
//! gate's mutable state is the only resource concurrent pipelines contend on. The
//! contract keeps evaluation synchronous: the decision and any state update happen in
//! one critical section, never across a suspension point, so two requests racing
//! inside the same window can never both be admitted.

// self
use crate::{_prelude::*, error::AdmissionError, request::Method};

/// Strategy consulted before a request is allowed to reach the transport.
pub trait AdmissionPolicy
where
	Self: Send + Sync,
{
	/// Evaluates whether the described request may proceed.
	fn evaluate(&self, context: &AdmissionContext) -> AdmissionDecision;
}

/// Context shared with an [`AdmissionPolicy`] before an outbound call is made.
#[derive(Clone, Debug)]
pub struct AdmissionContext {
	/// Method about to be sent.
	pub method: Method,
	/// Endpoint (or full URL) about to be called.
	pub endpoint: String,
	/// Timestamp the pipeline observed before invoking the policy.
	pub observed_at: OffsetDateTime,
}
impl AdmissionContext {
	/// Creates a new context for the given method/endpoint pair, observed now.
	pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
		Self { method, endpoint: endpoint.into(), observed_at: OffsetDateTime::now_utc() }
	}

	/// Overrides the timestamp associated with the observation.
	pub fn with_observed_at(mut self, instant: OffsetDateTime) -> Self {
		self.observed_at = instant;

		self
	}
}

/// Result emitted by an [`AdmissionPolicy`] for one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdmissionDecision {
	/// The request may proceed immediately.
	Allowed,
	/// The request was denied; the transport must not be invoked.
	Denied(AdmissionError),
}
impl AdmissionDecision {
	/// Returns true when the request may proceed.
	pub fn is_allowed(&self) -> bool {
		matches!(self, Self::Allowed)
	}
}

/// Debounce gate admitting at most one request per minimum interval.
///
/// Admitting updates the last-admitted instant; a denial leaves it untouched, so the
/// window is measured from the last admitted request rather than the last attempt.
#[derive(Debug)]
pub struct DebounceGate {
	minimum_interval: Duration,
	last_admitted_at: Mutex<Option<OffsetDateTime>>,
}
impl DebounceGate {
	/// Default minimum interval between admitted requests.
	pub const DEFAULT_INTERVAL: Duration = Duration::milliseconds(400);

	/// Creates a gate with the given minimum interval; negative intervals clamp to zero.
	pub fn new(minimum_interval: Duration) -> Self {
		let minimum_interval =
			if minimum_interval.is_negative() { Duration::ZERO } else { minimum_interval };

		Self { minimum_interval, last_admitted_at: Mutex::new(None) }
	}

	/// Returns the configured minimum interval.
	pub fn minimum_interval(&self) -> Duration {
		self.minimum_interval
	}
}
impl Default for DebounceGate {
	fn default() -> Self {
		Self::new(Self::DEFAULT_INTERVAL)
	}
}
impl AdmissionPolicy for DebounceGate {
	fn evaluate(&self, context: &AdmissionContext) -> AdmissionDecision {
		let mut last = self.last_admitted_at.lock();

		match *last {
			Some(admitted_at) if context.observed_at - admitted_at < self.minimum_interval => {
				let retry_in = self.minimum_interval - (context.observed_at - admitted_at);

				AdmissionDecision::Denied(AdmissionError::Debounced { retry_in })
			},
			_ => {
				*last = Some(context.observed_at);

				AdmissionDecision::Allowed
			},
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn context_at(instant: OffsetDateTime) -> AdmissionContext {
		AdmissionContext::new(Method::Get, "/ping").with_observed_at(instant)
	}

	#[test]
	fn first_request_is_always_admitted() {
		let gate = DebounceGate::default();

		assert!(gate.evaluate(&context_at(OffsetDateTime::now_utc())).is_allowed());
	}

	#[test]
	fn requests_inside_the_window_are_denied() {
		let start = OffsetDateTime::now_utc();
		let gate = DebounceGate::new(Duration::milliseconds(400));

		assert!(gate.evaluate(&context_at(start)).is_allowed());

		let decision = gate.evaluate(&context_at(start + Duration::milliseconds(300)));

		assert!(matches!(
			decision,
			AdmissionDecision::Denied(AdmissionError::Debounced { retry_in })
				if retry_in == Duration::milliseconds(100),
		));
	}

	#[test]
	fn requests_past_the_window_are_admitted() {
		let start = OffsetDateTime::now_utc();
		let gate = DebounceGate::new(Duration::milliseconds(400));

		assert!(gate.evaluate(&context_at(start)).is_allowed());
		assert!(gate.evaluate(&context_at(start + Duration::milliseconds(500))).is_allowed());
	}

	#[test]
	fn denials_leave_the_window_anchored_at_the_last_admission() {
		let start = OffsetDateTime::now_utc();
		let gate = DebounceGate::new(Duration::milliseconds(400));

		assert!(gate.evaluate(&context_at(start)).is_allowed());
		assert!(!gate.evaluate(&context_at(start + Duration::milliseconds(300))).is_allowed());
		// Still measured from `start`, not from the denied attempt.
		assert!(gate.evaluate(&context_at(start + Duration::milliseconds(400))).is_allowed());
	}

	#[test]
	fn zero_interval_never_denies() {
		let start = OffsetDateTime::now_utc();
		let gate = DebounceGate::new(Duration::ZERO);

		assert!(gate.evaluate(&context_at(start)).is_allowed());
		assert!(gate.evaluate(&context_at(start)).is_allowed());
	}
}
