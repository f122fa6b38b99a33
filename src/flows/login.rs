//! Login and registration flows.

// self
use crate::{
	_prelude::*,
	auth::{SessionState, TokenSecret, UserProfile},
	backend::{
		classify_login_failure, classify_registration_failure,
		wire::{LoginRequest, RegisterRequest, RegisteredUser, TokenGrant},
	},
	flows::Session,
	http::{ApiRequest, Method, SessionHttpClient},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

impl<C> Session<C>
where
	C: ?Sized + SessionHttpClient,
{
	/// Signs in, persists the issued token pair, and publishes the authenticated state.
	///
	/// On success the backend's exact pair lands in the credential store before the
	/// profile fetch runs, so a `login` followed immediately by a store read returns the
	/// issued tokens verbatim. A rejection ([`Error::InvalidCredentials`]) writes
	/// nothing.
	pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile> {
		const KIND: FlowKind = FlowKind::Login;

		let span = FlowSpan::new(KIND, "login");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.login_inner(email, password)).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	async fn login_inner(&self, email: &str, password: &str) -> Result<UserProfile> {
		let payload = LoginRequest { email: email.to_owned(), password: password.to_owned() };
		let request = ApiRequest::new(Method::Post, self.descriptor().login.clone())
			.with_json(&payload)?;
		let response = self.gateway.http_client.execute(request).await?;

		if !response.is_success() {
			return Err(classify_login_failure(&response));
		}

		let grant: TokenGrant = response.json()?;

		self.credentials()
			.install(TokenSecret::new(grant.access_token), TokenSecret::new(grant.refresh_token))
			.await?;

		let user = self.fetch_current_user().await?;

		self.events().emit(SessionState::Authenticated(user.clone()));

		Ok(user)
	}

	/// Registers a new account, then signs in with the same credentials.
	///
	/// Registration rejections surface as [`Error::RegistrationRejected`], distinct from
	/// the [`Error::InvalidCredentials`] a failed login produces.
	pub async fn register(
		&self,
		name: &str,
		email: &str,
		password: &str,
	) -> Result<UserProfile> {
		const KIND: FlowKind = FlowKind::Register;

		let span = FlowSpan::new(KIND, "register");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.register_inner(name, email, password)).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	async fn register_inner(
		&self,
		name: &str,
		email: &str,
		password: &str,
	) -> Result<UserProfile> {
		let payload = RegisterRequest {
			name: name.to_owned(),
			email: email.to_owned(),
			password: password.to_owned(),
		};
		let request = ApiRequest::new(Method::Post, self.descriptor().register.clone())
			.with_json(&payload)?;
		let response = self.gateway.http_client.execute(request).await?;

		if !response.is_success() {
			return Err(classify_registration_failure(&response));
		}

		// The acknowledgement is decoded for shape validation; the authoritative record
		// comes from the profile fetch inside the login chain.
		let _: RegisteredUser = response.json()?;

		self.login(email, password).await
	}
}
