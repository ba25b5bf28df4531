//! The fetch orchestrator: normalize → admission-check → authorize → send → recover.
//!
//! [`Fetch`] owns the transport, authorization provider, navigator, and optional
//! admission gate so verb helpers stay thin specializations that fix a method and enter
//! the same pipeline. Recoverable failure classes (see-other redirects and
//! provider-handled unauthorized responses) are absorbed here and resolve as
//! [`Outcome::Recovered`], so the caller's future completes successfully instead of
//! rejecting while recovery (navigation, re-authentication) is already in progress.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::AuthorizationProvider,
	error::TransportError,
	http::Transport,
	middleware::{AdmissionContext, AdmissionDecision, AdmissionPolicy},
	obs::{self, PipelineSpan, PipelineStage, RequestOutcome},
	request::{self, Headers, Method, RequestDescriptor, RequestOptions},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Fetch client specialized for the crate's default reqwest transport.
pub type ReqwestFetch = Fetch<ReqwestTransport>;

/// Client-side navigation hook used to recover from see-other redirects.
pub trait Navigator
where
	Self: Send + Sync,
{
	/// Navigates the hosting application to the given location.
	fn navigate(&self, location: &str);
}

/// Navigator that ignores every redirect target.
#[derive(Clone, Debug, Default)]
pub struct NoopNavigator;
impl Navigator for NoopNavigator {
	fn navigate(&self, _: &str) {}
}

/// Recovery paths the pipeline can take instead of rejecting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Recovery {
	/// A see-other redirect was handed to the navigator; the original call is abandoned
	/// in favor of the navigation.
	Redirected {
		/// Redirect target handed to the navigator.
		location: String,
	},
	/// The authorization provider reported unauthorized recovery as fully handled.
	Reauthorizing,
}

/// Terminal pipeline result: either a response value or an absorbed recovery.
///
/// Recovered paths construct this directly instead of threading a sentinel error
/// through the call chain, so "nothing more to do here" is an explicit value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome<T> {
	/// The transport answered and the value was produced as requested.
	Completed(T),
	/// A recoverable failure was absorbed; there is no value and nothing left to do.
	Recovered(Recovery),
}
impl<T> Outcome<T> {
	/// Returns the completed value, if any.
	pub fn completed(self) -> Option<T> {
		match self {
			Self::Completed(value) => Some(value),
			Self::Recovered(_) => None,
		}
	}

	/// Returns true when the pipeline absorbed a recoverable failure.
	pub fn is_recovered(&self) -> bool {
		matches!(self, Self::Recovered(_))
	}

	fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
		match self {
			Self::Completed(value) => Outcome::Completed(f(value)),
			Self::Recovered(recovery) => Outcome::Recovered(recovery),
		}
	}
}

/// Per-call observers invoked around the transport send; they never alter control flow.
#[derive(Default)]
pub struct RequestHooks {
	/// Invoked with the final descriptor right before the transport is called.
	pub before_send: Option<Box<dyn Fn(&RequestDescriptor) + Send + Sync>>,
	/// Invoked with the raw body after a successful send.
	pub after_receive: Option<Box<dyn Fn(&str) + Send + Sync>>,
}
impl RequestHooks {
	fn fire_before(&self, request: &RequestDescriptor) {
		if let Some(hook) = &self.before_send {
			hook(request);
		}
	}

	fn fire_after(&self, body: &str) {
		if let Some(hook) = &self.after_receive {
			hook(body);
		}
	}
}
impl Debug for RequestHooks {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RequestHooks")
			.field("before_send", &self.before_send.is_some())
			.field("after_receive", &self.after_receive.is_some())
			.finish()
	}
}

/// Coordinates the request pipeline against a single transport.
///
/// The client owns the collaborator handles so individual calls can focus on their
/// payloads: descriptors are normalized through [`request::normalize`], authorization
/// is merged with provider precedence, the optional admission gate is consulted before
/// anything is sent, and transport failures are classified into recover-or-propagate.
pub struct Fetch<T>
where
	T: ?Sized + Transport,
{
	/// Transport used for every outbound request.
	pub transport: Arc<T>,
	/// Authorization provider consulted during the auth-merge stage.
	pub auth: Arc<dyn AuthorizationProvider>,
	/// Navigation hook used for see-other recovery.
	pub navigator: Arc<dyn Navigator>,
	/// Optional admission gate evaluated before anything is sent.
	pub admission: Option<Arc<dyn AdmissionPolicy>>,
	/// Base URL used to resolve relative endpoints.
	pub base_url: Option<Url>,
	/// Headers applied to every request; per-request values win on collision.
	pub default_headers: Headers,
	/// Emits stage-by-stage diagnostics through the observability layer when set.
	pub enable_debug: bool,
}
impl<T> Fetch<T>
where
	T: ?Sized + Transport,
{
	/// Creates a client around the caller-provided transport + authorization pair.
	pub fn with_transport(
		transport: impl Into<Arc<T>>,
		auth: Arc<dyn AuthorizationProvider>,
	) -> Self {
		Self {
			transport: transport.into(),
			auth,
			navigator: Arc::new(NoopNavigator),
			admission: None,
			base_url: None,
			default_headers: Headers::new(),
			enable_debug: false,
		}
	}

	/// Sets the navigation hook used for redirect recovery.
	pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
		self.navigator = navigator;

		self
	}

	/// Gates every request behind the given admission policy.
	pub fn with_admission(mut self, admission: Arc<dyn AdmissionPolicy>) -> Self {
		self.admission = Some(admission);

		self
	}

	/// Sets the base URL used to resolve relative endpoints.
	pub fn with_base_url(mut self, base_url: Url) -> Self {
		self.base_url = Some(base_url);

		self
	}

	/// Adds a header applied to every request.
	pub fn with_default_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
		self.default_headers.insert(name, value);

		self
	}

	/// Toggles stage-by-stage debug diagnostics.
	pub fn with_debug(mut self, enable: bool) -> Self {
		self.enable_debug = enable;

		self
	}

	/// Resolves an endpoint + loose options into a descriptor.
	///
	/// Pure normalization: the client's base URL fills in when the options carry none,
	/// default headers are unioned in with per-request values winning, and the result
	/// is resolved through [`request::normalize`]. Authorization is not consulted
	/// here; the verb helpers merge it only after the admission gate has admitted the
	/// request.
	pub fn normalize_options(
		&self,
		endpoint: &str,
		options: RequestOptions,
		method: Option<Method>,
	) -> Result<RequestDescriptor> {
		self.debug(PipelineStage::Normalize, &(endpoint, &options));

		let mut options = options;

		if options.base_url.is_none() {
			options.base_url = self.base_url.clone();
		}
		if !self.default_headers.is_empty() {
			let mut headers = self.default_headers.clone();

			headers.union(&options.headers);

			options.headers = headers;
		}

		request::normalize(endpoint, &options, method)
	}

	/// Runs the endpoint-level front of the pipeline: normalize, admit, authorize.
	///
	/// Admission is evaluated on the purely-normalized descriptor, so a denied request
	/// never triggers the authorization round trip.
	async fn prepare(
		&self,
		endpoint: &str,
		options: RequestOptions,
		method: Option<Method>,
	) -> Result<RequestDescriptor> {
		let mut request = self.normalize_options(endpoint, options, method)?;

		self.admit(&request)?;
		self.authorize(&mut request).await?;
		self.debug(PipelineStage::Normalize, &request);

		Ok(request)
	}

	/// Merges authorization data into the resolved request, honoring its policy flags.
	///
	/// Provider-supplied values win on collision. Acquisition failures fail the call
	/// only when must-auth is set; the request otherwise proceeds without
	/// authorization data.
	async fn authorize(&self, request: &mut RequestDescriptor) -> Result<()> {
		if request.disable_auth {
			return Ok(());
		}

		match self.auth.authorization_options().await {
			Ok(auth) => {
				self.debug(PipelineStage::AuthMerge, &auth);

				request.merge_authorization(&auth);

				Ok(())
			},
			Err(source) if request.must_auth => Err(Error::Unauthorized { source }),
			Err(_) => Ok(()),
		}
	}

	/// Sends a resolved descriptor through the pipeline and returns the raw body.
	pub async fn fetch(
		&self,
		request: &RequestDescriptor,
		hooks: Option<&RequestHooks>,
	) -> Result<Outcome<String>> {
		self.admit(request)?;

		self.perform(request, hooks).await
	}

	async fn perform(
		&self,
		request: &RequestDescriptor,
		hooks: Option<&RequestHooks>,
	) -> Result<Outcome<String>> {
		let span = PipelineSpan::new(request.method, "fetch");

		obs::record_request_outcome(request.method, RequestOutcome::Attempt);

		let result = span.instrument(self.dispatch(request, hooks)).await;

		match &result {
			Ok(outcome) if outcome.is_recovered() =>
				obs::record_request_outcome(request.method, RequestOutcome::Recovered),
			Ok(_) => obs::record_request_outcome(request.method, RequestOutcome::Success),
			Err(_) => obs::record_request_outcome(request.method, RequestOutcome::Failure),
		}

		result
	}

	async fn perform_typed<B>(
		&self,
		request: &RequestDescriptor,
		hooks: Option<&RequestHooks>,
	) -> Result<Outcome<B>>
	where
		B: DeserializeOwned,
	{
		match self.perform(request, hooks).await? {
			Outcome::Completed(body) => Ok(Outcome::Completed(decode(&body)?)),
			Outcome::Recovered(recovery) => Ok(Outcome::Recovered(recovery)),
		}
	}

	/// Sends a resolved descriptor and decodes the body into the requested type.
	pub async fn request<B>(
		&self,
		request: &RequestDescriptor,
		hooks: Option<&RequestHooks>,
	) -> Result<Outcome<B>>
	where
		B: DeserializeOwned,
	{
		match self.fetch(request, hooks).await? {
			Outcome::Completed(body) => Ok(Outcome::Completed(decode(&body)?)),
			Outcome::Recovered(recovery) => Ok(Outcome::Recovered(recovery)),
		}
	}

	/// Normalizes an endpoint + options, then sends with the options-resolved method.
	pub async fn call<B>(
		&self,
		endpoint: impl AsRef<str>,
		options: RequestOptions,
		hooks: Option<&RequestHooks>,
	) -> Result<Outcome<B>>
	where
		B: DeserializeOwned,
	{
		let request = self.prepare(endpoint.as_ref(), options, None).await?;

		self.perform_typed(&request, hooks).await
	}

	/// Issues a GET against the endpoint after normalizing the options.
	pub async fn get<B>(
		&self,
		endpoint: impl AsRef<str>,
		options: RequestOptions,
		hooks: Option<&RequestHooks>,
	) -> Result<Outcome<B>>
	where
		B: DeserializeOwned,
	{
		let request = self.prepare(endpoint.as_ref(), options, Some(Method::Get)).await?;

		self.perform_typed(&request, hooks).await
	}

	/// Issues a POST against the endpoint after normalizing the options.
	pub async fn post<B>(
		&self,
		endpoint: impl AsRef<str>,
		options: RequestOptions,
		hooks: Option<&RequestHooks>,
	) -> Result<Outcome<B>>
	where
		B: DeserializeOwned,
	{
		let request = self.prepare(endpoint.as_ref(), options, Some(Method::Post)).await?;

		self.perform_typed(&request, hooks).await
	}

	/// Issues a PUT against the endpoint after normalizing the options.
	pub async fn put<B>(
		&self,
		endpoint: impl AsRef<str>,
		options: RequestOptions,
		hooks: Option<&RequestHooks>,
	) -> Result<Outcome<B>>
	where
		B: DeserializeOwned,
	{
		let request = self.prepare(endpoint.as_ref(), options, Some(Method::Put)).await?;

		self.perform_typed(&request, hooks).await
	}

	/// Issues a PATCH against the endpoint after normalizing the options.
	pub async fn patch<B>(
		&self,
		endpoint: impl AsRef<str>,
		options: RequestOptions,
		hooks: Option<&RequestHooks>,
	) -> Result<Outcome<B>>
	where
		B: DeserializeOwned,
	{
		let request = self.prepare(endpoint.as_ref(), options, Some(Method::Patch)).await?;

		self.perform_typed(&request, hooks).await
	}

	/// Issues a DELETE against the endpoint after normalizing the options.
	pub async fn delete<B>(
		&self,
		endpoint: impl AsRef<str>,
		options: RequestOptions,
		hooks: Option<&RequestHooks>,
	) -> Result<Outcome<B>>
	where
		B: DeserializeOwned,
	{
		let request = self.prepare(endpoint.as_ref(), options, Some(Method::Delete)).await?;

		self.perform_typed(&request, hooks).await
	}

	/// Issues a HEAD against the endpoint; resolves with no value, only confirming
	/// reachability.
	pub async fn head(
		&self,
		endpoint: impl AsRef<str>,
		options: RequestOptions,
		hooks: Option<&RequestHooks>,
	) -> Result<Outcome<()>> {
		let request = self.prepare(endpoint.as_ref(), options, Some(Method::Head)).await?;

		Ok(self.perform(&request, hooks).await?.map(|_| ()))
	}

	/// Fixes the method to GET and sends the descriptor.
	pub async fn dispatch_get<B>(
		&self,
		request: RequestDescriptor,
		hooks: Option<&RequestHooks>,
	) -> Result<Outcome<B>>
	where
		B: DeserializeOwned,
	{
		self.request(&request.with_method(Method::Get), hooks).await
	}

	/// Fixes the method to POST and sends the descriptor.
	pub async fn dispatch_post<B>(
		&self,
		request: RequestDescriptor,
		hooks: Option<&RequestHooks>,
	) -> Result<Outcome<B>>
	where
		B: DeserializeOwned,
	{
		self.request(&request.with_method(Method::Post), hooks).await
	}

	/// Fixes the method to PUT and sends the descriptor.
	pub async fn dispatch_put<B>(
		&self,
		request: RequestDescriptor,
		hooks: Option<&RequestHooks>,
	) -> Result<Outcome<B>>
	where
		B: DeserializeOwned,
	{
		self.request(&request.with_method(Method::Put), hooks).await
	}

	/// Fixes the method to PATCH and sends the descriptor.
	pub async fn dispatch_patch<B>(
		&self,
		request: RequestDescriptor,
		hooks: Option<&RequestHooks>,
	) -> Result<Outcome<B>>
	where
		B: DeserializeOwned,
	{
		self.request(&request.with_method(Method::Patch), hooks).await
	}

	/// Fixes the method to DELETE and sends the descriptor.
	pub async fn dispatch_delete<B>(
		&self,
		request: RequestDescriptor,
		hooks: Option<&RequestHooks>,
	) -> Result<Outcome<B>>
	where
		B: DeserializeOwned,
	{
		self.request(&request.with_method(Method::Delete), hooks).await
	}

	/// Fixes the method to HEAD and sends the descriptor, discarding any body.
	pub async fn dispatch_head(
		&self,
		request: RequestDescriptor,
		hooks: Option<&RequestHooks>,
	) -> Result<Outcome<()>> {
		Ok(self.fetch(&request.with_method(Method::Head), hooks).await?.map(|_| ()))
	}

	async fn dispatch(
		&self,
		request: &RequestDescriptor,
		hooks: Option<&RequestHooks>,
	) -> Result<Outcome<String>> {
		if let Some(hooks) = hooks {
			hooks.fire_before(request);
		}

		self.debug(PipelineStage::Send, request);

		match self.transport.send(request).await {
			Ok(body) => {
				if let Some(hooks) = hooks {
					hooks.fire_after(&body);
				}

				Ok(Outcome::Completed(body))
			},
			Err(error) => self.recover(error).await,
		}
	}

	/// Classifies a transport failure and either absorbs it or propagates it.
	async fn recover(&self, error: TransportError) -> Result<Outcome<String>> {
		self.debug(PipelineStage::Recover, &error);

		if let Some(location) = error.location() {
			self.navigator.navigate(location);

			return Ok(Outcome::Recovered(Recovery::Redirected { location: location.to_owned() }));
		}
		if error.is_unauthorized() && self.auth.handle_unauthorized(&error).await {
			return Ok(Outcome::Recovered(Recovery::Reauthorizing));
		}

		Err(error.into())
	}

	fn admit(&self, request: &RequestDescriptor) -> Result<()> {
		let Some(admission) = &self.admission else { return Ok(()) };
		let context = AdmissionContext::new(request.method, request.url.as_str());

		match admission.evaluate(&context) {
			AdmissionDecision::Allowed => Ok(()),
			AdmissionDecision::Denied(error) => Err(error.into()),
		}
	}

	fn debug(&self, stage: PipelineStage, detail: &dyn Debug) {
		if !self.enable_debug {
			return;
		}

		obs::debug_event(stage, detail);
	}
}
impl<T> Clone for Fetch<T>
where
	T: ?Sized + Transport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			auth: self.auth.clone(),
			navigator: self.navigator.clone(),
			admission: self.admission.clone(),
			base_url: self.base_url.clone(),
			default_headers: self.default_headers.clone(),
			enable_debug: self.enable_debug,
		}
	}
}
impl<T> Debug for Fetch<T>
where
	T: ?Sized + Transport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Fetch")
			.field("base_url", &self.base_url)
			.field("admission_set", &self.admission.is_some())
			.field("enable_debug", &self.enable_debug)
			.finish()
	}
}
#[cfg(feature = "reqwest")]
impl Fetch<ReqwestTransport> {
	/// Creates a client with the crate's default reqwest transport.
	///
	/// The transport keeps redirect following disabled so see-other responses flow into
	/// the pipeline's recovery path. Use the `with_*` builders to attach a navigator,
	/// admission gate, or base URL.
	pub fn new(auth: Arc<dyn AuthorizationProvider>) -> Self {
		Self::with_transport(ReqwestTransport::default(), auth)
	}
}

fn decode<B>(body: &str) -> Result<B>
where
	B: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_str(body);

	serde_path_to_error::deserialize(&mut deserializer).map_err(|source| Error::Decode { source })
}
