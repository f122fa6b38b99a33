//! Storage contracts and built-in credential-store implementations.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Boxed future returned by [`CredentialStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Two-slot secure-storage contract for the session's opaque secrets.
///
/// An absent value is a normal outcome, never an error; only backing-storage failures
/// surface as [`StoreError`]. Implementations must not cache above the backing storage:
/// the gateway, the login flow, and the startup check all read through this trait and
/// each of them must observe a freshly-written value immediately after a write completes.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Persists the access-token slot.
	fn set_access_token(&self, token: TokenSecret) -> StoreFuture<'_, ()>;

	/// Persists the refresh-token slot.
	fn set_refresh_token(&self, token: TokenSecret) -> StoreFuture<'_, ()>;

	/// Returns the stored access token, if any.
	fn access_token(&self) -> StoreFuture<'_, Option<TokenSecret>>;

	/// Returns the stored refresh token, if any.
	fn refresh_token(&self) -> StoreFuture<'_, Option<TokenSecret>>;

	/// Removes both secrets; succeeds when nothing is stored.
	fn clear(&self) -> StoreFuture<'_, ()>;
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn store_error_can_be_serialized() {
		let payload = serde_json::to_string(&StoreError::Backend { message: "locked".into() })
			.expect("StoreError should serialize to JSON.");
		let round_trip: StoreError =
			serde_json::from_str(&payload).expect("Serialized StoreError should deserialize.");

		assert_eq!(round_trip, StoreError::Backend { message: "locked".into() });
	}
}
