//! Credential-pair handling: redacted secrets and serialized two-slot mutations.

// self
use crate::{
	_prelude::*,
	store::{CredentialStore, StoreError},
};

/// Redacted token secret wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Snapshot of both credential slots.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
	/// Short-lived secret attached to authenticated requests.
	pub access_token: Option<TokenSecret>,
	/// Longer-lived secret exchanged for a new access token.
	pub refresh_token: Option<TokenSecret>,
}
impl CredentialPair {
	/// Returns `true` when neither slot holds a secret.
	pub fn is_empty(&self) -> bool {
		self.access_token.is_none() && self.refresh_token.is_none()
	}
}

/// Handle combining the store with a writer guard so compound mutations never interleave.
///
/// Reads go straight to the store; only the multi-slot writers (install, rotate, clear)
/// serialize behind the guard. Login, refresh rotation, and sign-out all mutate through
/// this handle, which keeps the pair invariant intact on preemptively-threaded runtimes.
#[derive(Clone)]
pub struct Credentials {
	store: Arc<dyn CredentialStore>,
	write_guard: Arc<AsyncMutex<()>>,
}
impl Credentials {
	/// Wraps a store behind a fresh writer guard.
	pub fn new(store: Arc<dyn CredentialStore>) -> Self {
		Self { store, write_guard: Arc::new(AsyncMutex::new(())) }
	}

	/// Returns the stored access token, if any.
	pub async fn access_token(&self) -> Result<Option<TokenSecret>, StoreError> {
		self.store.access_token().await
	}

	/// Returns the stored refresh token, if any.
	pub async fn refresh_token(&self) -> Result<Option<TokenSecret>, StoreError> {
		self.store.refresh_token().await
	}

	/// Persists a freshly issued pair; used by login and registration.
	pub async fn install(
		&self,
		access: TokenSecret,
		refresh: TokenSecret,
	) -> Result<(), StoreError> {
		let _write = self.write_guard.lock().await;

		self.store.set_access_token(access).await?;
		self.store.set_refresh_token(refresh).await
	}

	/// Persists a rotated pair after a refresh: the access token is always replaced, the
	/// refresh token only when the backend issued a new one.
	pub async fn rotate(
		&self,
		access: TokenSecret,
		refresh: Option<TokenSecret>,
	) -> Result<(), StoreError> {
		let _write = self.write_guard.lock().await;

		self.store.set_access_token(access).await?;

		match refresh {
			Some(refresh) => self.store.set_refresh_token(refresh).await,
			None => Ok(()),
		}
	}

	/// Removes both secrets; idempotent.
	pub async fn clear(&self) -> Result<(), StoreError> {
		let _write = self.write_guard.lock().await;

		self.store.clear().await
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials").finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::store::MemoryStore;

	#[test]
	fn secret_formatters_redact() {
		let secret = TokenSecret::new("super-secret");

		assert_eq!(format!("{secret:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
	}

	#[tokio::test]
	async fn rotate_preserves_refresh_token_when_absent() {
		let credentials = Credentials::new(Arc::new(MemoryStore::default()));

		credentials
			.install(TokenSecret::new("access-1"), TokenSecret::new("refresh-1"))
			.await
			.expect("Installing the issued pair should succeed.");
		credentials
			.rotate(TokenSecret::new("access-2"), None)
			.await
			.expect("Rotating without a new refresh token should succeed.");

		let access = credentials
			.access_token()
			.await
			.expect("Reading the access token should succeed.")
			.expect("Access token should be present after rotation.");
		let refresh = credentials
			.refresh_token()
			.await
			.expect("Reading the refresh token should succeed.")
			.expect("Refresh token should survive a rotation without replacement.");

		assert_eq!(access.expose(), "access-2");
		assert_eq!(refresh.expose(), "refresh-1");
	}

	#[tokio::test]
	async fn clear_is_idempotent() {
		let credentials = Credentials::new(Arc::new(MemoryStore::default()));

		credentials.clear().await.expect("Clearing an empty store should succeed.");
		credentials
			.install(TokenSecret::new("access"), TokenSecret::new("refresh"))
			.await
			.expect("Installing the issued pair should succeed.");
		credentials.clear().await.expect("Clearing a populated store should succeed.");
		credentials.clear().await.expect("Clearing twice should succeed.");

		assert!(
			credentials
				.access_token()
				.await
				.expect("Reading the access token should succeed.")
				.is_none()
		);
	}
}
