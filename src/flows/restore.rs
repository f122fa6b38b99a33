//! Startup session restore with a wall-clock watchdog.

// crates.io
use tokio::sync::oneshot;
// self
use crate::{
	_prelude::*,
	auth::{SessionState, UnauthenticatedReason, UserProfile},
	flows::Session,
	http::{ApiRequest, Method, SessionHttpClient},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

impl<C> Session<C>
where
	C: ?Sized + SessionHttpClient,
{
	/// Restores the persisted session at application start.
	///
	/// Without a stored access token this resolves before any network I/O and publishes
	/// [`UnauthenticatedReason::CredentialsMissing`]. With one, the profile fetch runs
	/// through the gateway (the refresh path may fire transparently) under the
	/// descriptor's restore watchdog. The watchdog abandons the wait, not the request:
	/// the fetch keeps running on a detached task and applies its credential side
	/// effects, but its late outcome is dropped so it can never publish a lifecycle
	/// state conflicting with the one this call already returned.
	///
	/// Only a storage failure on the initial token read surfaces as an error; every
	/// fetch failure collapses into [`SessionState::Unauthenticated`].
	pub async fn restore_session(&self) -> Result<SessionState> {
		const KIND: FlowKind = FlowKind::Restore;

		let span = FlowSpan::new(KIND, "restore_session");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.restore_inner()).await;

		match &result {
			Ok(state) if state.is_authenticated() =>
				obs::record_flow_outcome(KIND, FlowOutcome::Success),
			_ => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	async fn restore_inner(&self) -> Result<SessionState> {
		if self.credentials().access_token().await?.is_none() {
			let state =
				SessionState::Unauthenticated(UnauthenticatedReason::CredentialsMissing);

			self.events().emit(state.clone());

			return Ok(state);
		}

		// Side effects live on the detached task; emission stays with this caller. A
		// completion that arrives after the watchdog finds its receiver gone and is
		// dropped without publishing anything.
		let (settle, outcome) = oneshot::channel();
		let gateway = self.gateway.clone();

		tokio::spawn(async move {
			let fetched: Result<UserProfile> = async {
				let request =
					ApiRequest::new(Method::Get, gateway.descriptor.current_user.clone());
				let response = gateway.send(request).await?;

				if !response.is_success() {
					return Err(response.status_error().into());
				}

				response.json().map_err(Into::into)
			}
			.await;

			if fetched.is_err() {
				let _ = gateway.credentials.clear().await;
			}

			let _ = settle.send(fetched);
		});

		let watchdog = self.descriptor().restore_watchdog.unsigned_abs();
		let state = match tokio::time::timeout(watchdog, outcome).await {
			Ok(Ok(Ok(user))) => SessionState::Authenticated(user),
			Ok(_) => SessionState::Unauthenticated(UnauthenticatedReason::RestoreFailed),
			Err(_elapsed) =>
				SessionState::Unauthenticated(UnauthenticatedReason::RestoreFailed),
		};

		self.events().emit(state.clone());

		Ok(state)
	}
}
