//! Simple file-backed [`CredentialStore`] for desktop shells and lightweight deployments.
//!
//! Every read loads the snapshot file and every write replaces it atomically (temp file,
//! `sync_all`, rename), so separate handles on the same path always observe the latest
//! committed pair. There is deliberately no in-memory cache layer: the gateway, the login
//! flow, and the startup check may each hold their own handle.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	store::{CredentialStore, StoreError, StoreFuture},
};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
	access_token: Option<TokenSecret>,
	refresh_token: Option<TokenSecret>,
	#[serde(default, with = "time::serde::rfc3339::option")]
	updated_at: Option<OffsetDateTime>,
}

/// Persists both credential slots to a JSON file, replacing it atomically on each write.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
}
impl FileStore {
	/// Opens a store at the provided path, creating parent directories on demand.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		Ok(Self { path })
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn load(&self) -> Result<Snapshot, StoreError> {
		if !self.path.exists() {
			return Ok(Snapshot::default());
		}

		let metadata = self.path.metadata().map_err(|e| StoreError::Backend {
			message: format!("Failed to inspect {}: {e}", self.path.display()),
		})?;

		if metadata.len() == 0 {
			return Ok(Snapshot::default());
		}

		let bytes = fs::read(&self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", self.path.display()),
		})?;

		serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse {}: {e}", self.path.display()),
		})
	}

	fn persist(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let serialized =
			serde_json::to_vec_pretty(snapshot).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize credential snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}

	fn mutate(&self, apply: impl FnOnce(&mut Snapshot)) -> Result<(), StoreError> {
		let mut snapshot = self.load()?;

		apply(&mut snapshot);

		snapshot.updated_at = Some(OffsetDateTime::now_utc());

		self.persist(&snapshot)
	}
}
impl CredentialStore for FileStore {
	fn set_access_token(&self, token: TokenSecret) -> StoreFuture<'_, ()> {
		Box::pin(async move { self.mutate(|snapshot| snapshot.access_token = Some(token)) })
	}

	fn set_refresh_token(&self, token: TokenSecret) -> StoreFuture<'_, ()> {
		Box::pin(async move { self.mutate(|snapshot| snapshot.refresh_token = Some(token)) })
	}

	fn access_token(&self) -> StoreFuture<'_, Option<TokenSecret>> {
		Box::pin(async move { Ok(self.load()?.access_token) })
	}

	fn refresh_token(&self) -> StoreFuture<'_, Option<TokenSecret>> {
		Box::pin(async move { Ok(self.load()?.refresh_token) })
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			if !self.path.exists() {
				return Ok(());
			}

			self.mutate(|snapshot| {
				snapshot.access_token = None;
				snapshot.refresh_token = None;
			})
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn store_in(dir: &tempfile::TempDir) -> FileStore {
		FileStore::open(dir.path().join("credentials.json"))
			.expect("Opening a file store in a temp directory should succeed.")
	}

	#[tokio::test]
	async fn writes_survive_reopening_the_path() {
		let dir = tempfile::tempdir().expect("Creating a temp directory should succeed.");
		let store = store_in(&dir);

		store
			.set_access_token(TokenSecret::new("access-1"))
			.await
			.expect("Writing the access token should succeed.");
		store
			.set_refresh_token(TokenSecret::new("refresh-1"))
			.await
			.expect("Writing the refresh token should succeed.");

		let reopened = store_in(&dir);
		let access = reopened
			.access_token()
			.await
			.expect("Reading the access token should succeed.")
			.expect("Access token should survive reopening.");
		let refresh = reopened
			.refresh_token()
			.await
			.expect("Reading the refresh token should succeed.")
			.expect("Refresh token should survive reopening.");

		assert_eq!(access.expose(), "access-1");
		assert_eq!(refresh.expose(), "refresh-1");
	}

	#[tokio::test]
	async fn separate_handles_observe_each_others_writes() {
		let dir = tempfile::tempdir().expect("Creating a temp directory should succeed.");
		let writer = store_in(&dir);
		let reader = store_in(&dir);

		writer
			.set_access_token(TokenSecret::new("fresh"))
			.await
			.expect("Writing the access token should succeed.");

		let read = reader
			.access_token()
			.await
			.expect("Reading through the second handle should succeed.")
			.expect("Second handle should observe the committed write.");

		assert_eq!(read.expose(), "fresh");
	}

	#[tokio::test]
	async fn clear_on_a_missing_file_is_a_no_op() {
		let dir = tempfile::tempdir().expect("Creating a temp directory should succeed.");
		let store = store_in(&dir);

		store.clear().await.expect("Clearing before any write should succeed.");

		assert!(!dir.path().join("credentials.json").exists());
	}

	#[tokio::test]
	async fn snapshot_records_the_update_instant() {
		let dir = tempfile::tempdir().expect("Creating a temp directory should succeed.");
		let store = store_in(&dir);

		store
			.set_access_token(TokenSecret::new("access"))
			.await
			.expect("Writing the access token should succeed.");

		let snapshot = store.load().expect("Loading the snapshot should succeed.");

		assert!(snapshot.updated_at.is_some());
	}

	#[tokio::test]
	async fn corrupt_snapshots_surface_serialization_errors() {
		let dir = tempfile::tempdir().expect("Creating a temp directory should succeed.");
		let path = dir.path().join("credentials.json");

		fs::write(&path, b"not json").expect("Seeding a corrupt snapshot should succeed.");

		let store =
			FileStore::open(&path).expect("Opening over a corrupt snapshot should succeed.");
		let err = store
			.access_token()
			.await
			.expect_err("Reading a corrupt snapshot should fail.");

		assert!(matches!(err, StoreError::Serialization { .. }));
	}
}
