//! Current-user and profile-update flows.

// self
use crate::{
	_prelude::*,
	auth::{ProfileUpdate, UserProfile},
	flows::Session,
	http::{ApiRequest, Method, SessionHttpClient},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

impl<C> Session<C>
where
	C: ?Sized + SessionHttpClient,
{
	/// Fetches the authenticated user's profile through the gateway.
	pub async fn current_user(&self) -> Result<UserProfile> {
		const KIND: FlowKind = FlowKind::Profile;

		let span = FlowSpan::new(KIND, "current_user");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.fetch_current_user()).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Applies a partial profile update and returns the updated record.
	pub async fn update_profile(&self, update: ProfileUpdate) -> Result<UserProfile> {
		const KIND: FlowKind = FlowKind::Profile;

		let span = FlowSpan::new(KIND, "update_profile");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async {
				let request =
					ApiRequest::new(Method::Patch, self.descriptor().current_user.clone())
						.with_json(&update)?;
				let response = self.gateway.send(request).await?;

				if !response.is_success() {
					return Err(response.status_error().into());
				}

				response.json().map_err(Into::into)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	pub(crate) async fn fetch_current_user(&self) -> Result<UserProfile> {
		let request = ApiRequest::new(Method::Get, self.descriptor().current_user.clone());
		let response = self.gateway.send(request).await?;

		if !response.is_success() {
			return Err(response.status_error().into());
		}

		response.json().map_err(Into::into)
	}
}
