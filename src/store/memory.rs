//! Thread-safe in-memory [`CredentialStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::{CredentialPair, TokenSecret},
	store::{CredentialStore, StoreError, StoreFuture},
};

type Slots = Arc<RwLock<CredentialPair>>;

/// Thread-safe storage backend that keeps both slots in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Slots);
impl MemoryStore {
	/// Returns a snapshot of both slots.
	pub fn snapshot(&self) -> CredentialPair {
		self.0.read().clone()
	}
}
impl CredentialStore for MemoryStore {
	fn set_access_token(&self, token: TokenSecret) -> StoreFuture<'_, ()> {
		let slots = self.0.clone();

		Box::pin(async move {
			slots.write().access_token = Some(token);

			Ok(())
		})
	}

	fn set_refresh_token(&self, token: TokenSecret) -> StoreFuture<'_, ()> {
		let slots = self.0.clone();

		Box::pin(async move {
			slots.write().refresh_token = Some(token);

			Ok(())
		})
	}

	fn access_token(&self) -> StoreFuture<'_, Option<TokenSecret>> {
		let slots = self.0.clone();

		Box::pin(async move { Ok(slots.read().access_token.clone()) })
	}

	fn refresh_token(&self) -> StoreFuture<'_, Option<TokenSecret>> {
		let slots = self.0.clone();

		Box::pin(async move { Ok(slots.read().refresh_token.clone()) })
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		let slots = self.0.clone();

		Box::pin(async move {
			*slots.write() = CredentialPair::default();

			Ok(())
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn reads_observe_the_latest_write() {
		let store = MemoryStore::default();

		store
			.set_access_token(TokenSecret::new("access-1"))
			.await
			.expect("Writing the access token should succeed.");

		let read = store
			.access_token()
			.await
			.expect("Reading the access token should succeed.")
			.expect("Access token should be present after a write.");

		assert_eq!(read.expose(), "access-1");

		store
			.set_access_token(TokenSecret::new("access-2"))
			.await
			.expect("Overwriting the access token should succeed.");

		let read = store
			.access_token()
			.await
			.expect("Reading the access token should succeed.")
			.expect("Access token should be present after an overwrite.");

		assert_eq!(read.expose(), "access-2");
	}

	#[tokio::test]
	async fn absent_slots_are_not_errors() {
		let store = MemoryStore::default();

		assert!(
			store
				.access_token()
				.await
				.expect("Reading an empty access slot should succeed.")
				.is_none()
		);
		assert!(
			store
				.refresh_token()
				.await
				.expect("Reading an empty refresh slot should succeed.")
				.is_none()
		);
	}

	#[tokio::test]
	async fn clear_removes_both_slots() {
		let store = MemoryStore::default();

		store
			.set_access_token(TokenSecret::new("access"))
			.await
			.expect("Writing the access token should succeed.");
		store
			.set_refresh_token(TokenSecret::new("refresh"))
			.await
			.expect("Writing the refresh token should succeed.");
		store.clear().await.expect("Clearing the store should succeed.");

		assert!(store.snapshot().is_empty());

		store.clear().await.expect("Clearing an already-empty store should succeed.");
	}
}
