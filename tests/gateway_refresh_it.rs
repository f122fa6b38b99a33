#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use session_gateway::{
	_preludet::*,
	auth::{SessionState, TokenSecret, UnauthenticatedReason, UserProfile},
	store::MemoryStore,
};

const USER_BODY: &str = r#"{"id":1,"email":"a@b.com","name":"Ada","is_active":true}"#;

async fn seed_pair(store: &MemoryStore, access: &str, refresh: &str) {
	use session_gateway::store::CredentialStore;

	store
		.set_access_token(TokenSecret::new(access))
		.await
		.expect("Seeding the access token should succeed.");
	store
		.set_refresh_token(TokenSecret::new(refresh))
		.await
		.expect("Seeding the refresh token should succeed.");
}

#[tokio::test]
async fn racing_calls_share_a_single_refresh() {
	let server = MockServer::start_async().await;
	let (session, store) = build_reqwest_test_session(test_descriptor(&server.base_url()));

	seed_pair(&store, "access-stale", "refresh-seed").await;

	let stale_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/users/me").header("authorization", "Bearer access-stale");
			then.status(401).header("content-type", "application/json").body(r#"{}"#);
		})
		.await;
	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/auth/refresh")
				.json_body(serde_json::json!({ "refresh_token": "refresh-seed" }));
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"access_token":"access-fresh"}"#)
				.delay(std::time::Duration::from_millis(300));
		})
		.await;
	let fresh_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/users/me").header("authorization", "Bearer access-fresh");
			then.status(200).header("content-type", "application/json").body(USER_BODY);
		})
		.await;
	let (first, second, third): (
		Result<UserProfile>,
		Result<UserProfile>,
		Result<UserProfile>,
	) = tokio::join!(session.current_user(), session.current_user(), session.current_user());

	for outcome in [first, second, third] {
		let user = outcome.expect("Every racing call should settle after the single refresh.");

		assert_eq!(user.email, "a@b.com");
	}

	refresh_mock.assert_calls_async(1).await;
	stale_mock.assert_calls_async(3).await;
	fresh_mock.assert_calls_async(3).await;

	assert_eq!(session.gateway.refresh_metrics.attempts(), 1);
	assert_eq!(session.gateway.refresh_metrics.queued(), 2);

	// The backend rotated only the access token, so the stored refresh secret survives.
	let snapshot = store.snapshot();

	assert_eq!(
		snapshot.access_token.expect("Access token should be rotated.").expose(),
		"access-fresh",
	);
	assert_eq!(
		snapshot.refresh_token.expect("Refresh token should be preserved.").expose(),
		"refresh-seed",
	);
}

#[tokio::test]
async fn rejected_refresh_clears_the_store_and_rejects_every_waiter() {
	let server = MockServer::start_async().await;
	let (session, store) = build_reqwest_test_session(test_descriptor(&server.base_url()));

	seed_pair(&store, "access-stale", "refresh-expired").await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/users/me");
			then.status(401).header("content-type", "application/json").body(r#"{}"#);
		})
		.await;

	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh");
			then.status(401)
				.header("content-type", "application/json")
				.body(r#"{"detail":"Invalid refresh token"}"#)
				.delay(std::time::Duration::from_millis(300));
		})
		.await;
	let (first, second): (Result<UserProfile>, Result<UserProfile>) =
		tokio::join!(session.current_user(), session.current_user());

	assert!(matches!(first, Err(Error::Unauthenticated)));
	assert!(matches!(second, Err(Error::Unauthenticated)));

	refresh_mock.assert_calls_async(1).await;

	assert!(store.snapshot().is_empty());
	assert_eq!(
		session.events().current(),
		SessionState::Unauthenticated(UnauthenticatedReason::RefreshFailed),
	);
}

#[tokio::test]
async fn refresh_rotation_replaces_both_secrets_when_issued() {
	let server = MockServer::start_async().await;
	let (session, store) = build_reqwest_test_session(test_descriptor(&server.base_url()));

	seed_pair(&store, "access-stale", "refresh-old").await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/users/me").header("authorization", "Bearer access-stale");
			then.status(401).header("content-type", "application/json").body(r#"{}"#);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/users/me").header("authorization", "Bearer access-new");
			then.status(200).header("content-type", "application/json").body(USER_BODY);
		})
		.await;

	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"access_token":"access-new","refresh_token":"refresh-new","token_type":"bearer"}"#);
		})
		.await;

	session
		.current_user()
		.await
		.expect("The call should settle successfully after the rotation.");

	refresh_mock.assert_calls_async(1).await;

	let snapshot = store.snapshot();

	assert_eq!(
		snapshot.access_token.expect("Access token should be rotated.").expose(),
		"access-new",
	);
	assert_eq!(
		snapshot.refresh_token.expect("Refresh token should be rotated.").expose(),
		"refresh-new",
	);
}
