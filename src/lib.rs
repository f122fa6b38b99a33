//! Rust's turnkey bearer-session gateway: transparent single-flight token refresh, FIFO replay of
//! queued calls, and storage-backed credential lifecycles in one crate built for JSON API clients.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod backend;
pub mod error;
pub mod flows;
pub mod gateway;
pub mod http;
pub mod obs;
pub mod store;
#[cfg(feature = "reqwest")]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests and downstream test harnesses.

	pub use crate::_prelude::*;

	// self
	use crate::{
		backend::BackendDescriptor,
		flows::Session,
		http::ReqwestHttpClient,
		store::{CredentialStore, MemoryStore},
	};

	/// Session type alias used by reqwest-backed integration tests.
	pub type ReqwestTestSession = Session<ReqwestHttpClient>;

	/// Builds a descriptor pointing at a local mock server.
	///
	/// Loopback hosts are exempt from the HTTPS requirement, so `httpmock` servers work
	/// without extra configuration.
	pub fn test_descriptor(base_url: &str) -> BackendDescriptor {
		BackendDescriptor::builder(
			Url::parse(base_url).expect("Mock server base URL should parse successfully."),
		)
		.build()
		.expect("Backend descriptor should build successfully for tests.")
	}

	/// Constructs a [`Session`] backed by an in-memory store and the crate's default reqwest
	/// transport.
	pub fn build_reqwest_test_session(
		descriptor: BackendDescriptor,
	) -> (ReqwestTestSession, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn CredentialStore> = store_backend.clone();
		let session = Session::new(store, descriptor)
			.expect("Failed to build reqwest-backed session for tests.");

		(session, store_backend)
	}
}

mod _prelude {
	pub use std::{
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use httpmock as _;
#[cfg(test)] use tempfile as _;
