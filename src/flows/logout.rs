//! Sign-out flow: best-effort backend notification, unconditional local clear.

// self
use crate::{
	_prelude::*,
	auth::{SessionState, UnauthenticatedReason},
	flows::Session,
	http::{ApiRequest, Method, SessionHttpClient},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

impl<C> Session<C>
where
	C: ?Sized + SessionHttpClient,
{
	/// Signs out.
	///
	/// When the descriptor carries a logout route the backend is notified best effort on
	/// the raw transport (a dead backend must not block sign-out, and a stale token must
	/// not trigger a refresh cycle on the way out). Local credential clearing is the
	/// operation's success criterion; the unauthenticated state is published even if the
	/// clear itself fails, and only that storage failure surfaces to the caller.
	pub async fn logout(&self) -> Result<()> {
		const KIND: FlowKind = FlowKind::Logout;

		let span = FlowSpan::new(KIND, "logout");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.logout_inner()).await;

		match &result {
			Ok(()) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	async fn logout_inner(&self) -> Result<()> {
		if let Some(endpoint) = self.descriptor().logout.clone() {
			let bearer = self.credentials().access_token().await.ok().flatten();
			let request = ApiRequest::new(Method::Post, endpoint).with_bearer(bearer);

			let _ = self.gateway.http_client.execute(request).await;
		}

		let cleared = self.credentials().clear().await;

		self.events().emit(SessionState::Unauthenticated(UnauthenticatedReason::LoggedOut));

		cleared.map_err(Into::into)
	}
}
