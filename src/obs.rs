//! Optional observability helpers for the request pipeline.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `fetch_pipeline.request` with the `method`
//!   (HTTP verb) and `stage` (call site) fields, plus debug-level stage events when a client
//!   opts into debug mode. Diagnostics never alter control flow, only visibility.
//! - Enable `metrics` to increment the `fetch_pipeline_request_total` counter for every
//!   attempt/success/recovery/failure, labeled by `method` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Pipeline stages observed while a request is in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PipelineStage {
	/// Resolving loose options into a descriptor.
	Normalize,
	/// Merging authorization data into the options.
	AuthMerge,
	/// Invoking the transport.
	Send,
	/// Absorbing a recoverable transport failure.
	Recover,
}
impl PipelineStage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			PipelineStage::Normalize => "normalize",
			PipelineStage::AuthMerge => "auth_merge",
			PipelineStage::Send => "send",
			PipelineStage::Recover => "recover",
		}
	}
}
impl Display for PipelineStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestOutcome {
	/// Entry into the pipeline.
	Attempt,
	/// Successful completion with a response value.
	Success,
	/// Recoverable failure absorbed inside the pipeline.
	Recovered,
	/// Failure propagated back to the caller.
	Failure,
}
impl RequestOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RequestOutcome::Attempt => "attempt",
			RequestOutcome::Success => "success",
			RequestOutcome::Recovered => "recovered",
			RequestOutcome::Failure => "failure",
		}
	}
}
impl Display for RequestOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
