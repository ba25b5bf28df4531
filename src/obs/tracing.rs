// self
use crate::{_prelude::*, obs::PipelineStage, request::Method};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedRequest<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedRequest<F> = F;

/// A span builder used by the request pipeline.
#[derive(Clone, Debug)]
pub struct PipelineSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl PipelineSpan {
	/// Creates a new span tagged with the request method + call site stage.
	pub fn new(method: Method, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("fetch_pipeline.request", method = method.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (method, stage);

			Self {}
		}
	}

	/// Enters the span for synchronous sections.
	pub fn entered(self) -> PipelineSpanGuard {
		#[cfg(feature = "tracing")]
		{
			PipelineSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			PipelineSpanGuard {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedRequest<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// RAII guard returned by [`PipelineSpan::entered`].
pub struct PipelineSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for PipelineSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("PipelineSpanGuard(..)")
	}
}

/// Emits a debug-level event for a pipeline stage (when tracing is enabled).
///
/// Callers gate this behind their own debug flag; the event itself carries the stage
/// label and a `Debug` rendering of the payload.
pub fn debug_event(stage: PipelineStage, detail: &dyn Debug) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(stage = stage.as_str(), detail = ?detail, "Pipeline stage.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (stage, detail);
	}
}
