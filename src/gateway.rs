//! Token-aware request execution with exactly-once coordinated refresh.
//!
//! Every outbound call passes through [`SessionGateway::send`], which attaches the stored
//! access token and dispatches on the transport. An authorization failure moves the
//! gateway's phase from `Idle` to `Refreshing`: the call that wins the transition issues
//! the single refresh request, and every call that fails while that refresh is in flight
//! parks in the pending queue instead of issuing its own. When the refresh settles, the
//! queue is taken in the same lock transition that returns the phase to `Idle`, then
//! replayed in enqueue order (success) or rejected wholesale (failure). A replayed call
//! never re-enters recovery, so each original call is granted at most one refresh cycle.

mod metrics;

pub use metrics::RefreshMetrics;

// crates.io
use tokio::sync::oneshot;
// self
use crate::{
	_prelude::*,
	auth::{Credentials, SessionEvents, SessionState, TokenSecret, UnauthenticatedReason},
	backend::{
		BackendDescriptor,
		wire::{RefreshGrant, RefreshRequest},
	},
	http::{ApiRequest, ApiResponse, Method, SessionHttpClient},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

/// A call suspended behind the in-flight refresh.
struct PendingCall {
	request: ApiRequest,
	settle: oneshot::Sender<Result<ApiResponse>>,
}

/// Refresh coordination state owned by one gateway instance.
enum RefreshPhase {
	/// No refresh in flight.
	Idle,
	/// One refresh call outstanding; authorization failures queue here meanwhile.
	Refreshing(Vec<PendingCall>),
}

/// How an authorization failure is admitted into the refresh protocol.
enum Admission {
	/// This call won the `Idle -> Refreshing` transition and drives the refresh.
	Lead(ApiRequest),
	/// A refresh is already in flight; wait for it to settle this call.
	Wait(oneshot::Receiver<Result<ApiResponse>>),
}

/// Executes backend calls with bearer attachment and single-flight token refresh.
pub struct SessionGateway<C>
where
	C: ?Sized + SessionHttpClient,
{
	/// Transport used for every outbound call.
	pub http_client: Arc<C>,
	/// Credential handle shared with the session facade.
	pub credentials: Credentials,
	/// Backend descriptor resolved at construction.
	pub descriptor: BackendDescriptor,
	/// Lifecycle publisher notified on terminal refresh failure.
	pub events: SessionEvents,
	/// Shared counters describing this instance's refresh behavior.
	pub refresh_metrics: Arc<RefreshMetrics>,
	phase: Arc<Mutex<RefreshPhase>>,
}
impl<C> SessionGateway<C>
where
	C: ?Sized + SessionHttpClient,
{
	/// Creates a gateway over the provided transport, credential handle, and descriptor.
	pub fn new(
		http_client: impl Into<Arc<C>>,
		credentials: Credentials,
		descriptor: BackendDescriptor,
		events: SessionEvents,
	) -> Self {
		Self {
			http_client: http_client.into(),
			credentials,
			descriptor,
			events,
			refresh_metrics: Default::default(),
			phase: Arc::new(Mutex::new(RefreshPhase::Idle)),
		}
	}

	/// Executes a call with the stored access token, refreshing once on authorization
	/// failure.
	///
	/// Non-authorization statuses come back untouched inside [`ApiResponse`]; transport
	/// and storage failures propagate typed. The only authorization outcome a caller can
	/// observe is [`Error::Unauthenticated`], after the refresh protocol has run its
	/// course.
	pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
		let bearer = self.credentials.access_token().await?;
		let response = self.http_client.execute(request.clone().with_bearer(bearer)).await?;

		if !response.is_authorization_failure() {
			return Ok(response);
		}

		self.recover(request).await
	}

	/// Admits a first authorization failure into the refresh protocol.
	async fn recover(&self, request: ApiRequest) -> Result<ApiResponse> {
		let admission = {
			let mut phase = self.phase.lock();

			match &mut *phase {
				RefreshPhase::Refreshing(queue) => {
					let (settle, waiter) = oneshot::channel();

					queue.push(PendingCall { request, settle });
					self.refresh_metrics.record_queued();

					Admission::Wait(waiter)
				},
				RefreshPhase::Idle => {
					*phase = RefreshPhase::Refreshing(Vec::new());

					Admission::Lead(request)
				},
			}
		};

		match admission {
			// A dropped sender means the driving task died; treat it as a failed refresh.
			Admission::Wait(waiter) => match waiter.await {
				Ok(outcome) => outcome,
				Err(_) => Err(Error::Unauthenticated),
			},
			Admission::Lead(request) => self.drive_refresh(request).await,
		}
	}

	/// Runs the single refresh cycle; entered only by the call that won the
	/// `Idle -> Refreshing` transition.
	async fn drive_refresh(&self, initiator: ApiRequest) -> Result<ApiResponse> {
		const KIND: FlowKind = FlowKind::Refresh;

		let span = FlowSpan::new(KIND, "drive_refresh");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);
		self.refresh_metrics.record_attempt();

		match span.instrument(self.rotate_credentials()).await {
			Ok(access) => {
				obs::record_flow_outcome(KIND, FlowOutcome::Success);
				self.refresh_metrics.record_success();

				let queue = self.finish_refresh();

				self.replay_queue(queue, &access).await;

				self.replay(initiator, &access).await
			},
			Err(_) => {
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);
				self.refresh_metrics.record_failure();

				// Fail closed: stale secrets must not outlive a failed rotation.
				let _ = self.credentials.clear().await;

				let queue = self.finish_refresh();

				for call in queue {
					let _ = call.settle.send(Err(Error::Unauthenticated));
				}

				self.events
					.emit(SessionState::Unauthenticated(UnauthenticatedReason::RefreshFailed));

				Err(Error::Unauthenticated)
			},
		}
	}

	/// Returns the phase to `Idle`, taking the queue in the same atomic transition.
	fn finish_refresh(&self) -> Vec<PendingCall> {
		match std::mem::replace(&mut *self.phase.lock(), RefreshPhase::Idle) {
			RefreshPhase::Refreshing(queue) => queue,
			RefreshPhase::Idle => Vec::new(),
		}
	}

	/// Exchanges the stored refresh token and persists the rotated pair.
	///
	/// Dispatches on the raw transport: routing the refresh call through [`Self::send`]
	/// would recurse into the protocol it implements. Storage failures in the window are
	/// treated as refresh failures by the caller.
	async fn rotate_credentials(&self) -> Result<TokenSecret> {
		let refresh =
			self.credentials.refresh_token().await?.ok_or(Error::Unauthenticated)?;
		let payload = RefreshRequest { refresh_token: refresh.expose().to_owned() };
		let request = ApiRequest::new(Method::Post, self.descriptor.refresh.clone())
			.with_json(&payload)?;
		let response = self.http_client.execute(request).await?;

		if response.is_authorization_failure() {
			return Err(Error::Unauthenticated);
		}
		if !response.is_success() {
			return Err(response.status_error().into());
		}

		let grant: RefreshGrant = response.json()?;
		let access = TokenSecret::new(grant.access_token);

		self.credentials
			.rotate(access.clone(), grant.refresh_token.map(TokenSecret::new))
			.await?;

		Ok(access)
	}

	/// Replays queued calls in enqueue order with the rotated access token, delivering
	/// each outcome through its completion handle.
	async fn replay_queue(&self, queue: Vec<PendingCall>, access: &TokenSecret) {
		for call in queue {
			let outcome = self.replay(call.request, access).await;

			// A waiter that gave up (e.g. task cancellation) just drops its receiver.
			let _ = call.settle.send(outcome);
		}
	}

	/// One replay attempt; a second authorization failure settles terminally.
	async fn replay(&self, request: ApiRequest, access: &TokenSecret) -> Result<ApiResponse> {
		let response =
			self.http_client.execute(request.with_bearer(Some(access.clone()))).await?;

		if response.is_authorization_failure() {
			return Err(Error::Unauthenticated);
		}

		Ok(response)
	}

	#[cfg(test)]
	fn pending_len(&self) -> usize {
		match &*self.phase.lock() {
			RefreshPhase::Refreshing(queue) => queue.len(),
			RefreshPhase::Idle => 0,
		}
	}
}
impl<C> Clone for SessionGateway<C>
where
	C: ?Sized + SessionHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			credentials: self.credentials.clone(),
			descriptor: self.descriptor.clone(),
			events: self.events.clone(),
			refresh_metrics: self.refresh_metrics.clone(),
			phase: self.phase.clone(),
		}
	}
}
impl<C> Debug for SessionGateway<C>
where
	C: ?Sized + SessionHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionGateway")
			.field("descriptor", &self.descriptor)
			.finish_non_exhaustive()
	}
}
