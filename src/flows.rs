//! High-level session operations built on the gateway.

mod login;
mod logout;
mod profile;
mod restore;

// self
use crate::{
	_prelude::*,
	auth::{Credentials, SessionEvents, SessionWatch},
	backend::BackendDescriptor,
	gateway::SessionGateway,
	http::SessionHttpClient,
};
#[cfg(feature = "reqwest")]
use crate::{error::ConfigError, http::ReqwestHttpClient, store::CredentialStore};

#[cfg(feature = "reqwest")]
/// Session specialized for the crate's default reqwest transport.
pub type ReqwestSession = Session<ReqwestHttpClient>;

/// Coordinates the session lifecycle against a single backend descriptor.
///
/// The session owns the gateway (and through it the transport, credential handle,
/// descriptor, and event publisher) so individual operations can focus on endpoint
/// semantics. Everything an operation touches is reachable through [`Self::gateway`];
/// cloning a session is cheap and every clone shares the same refresh state and
/// lifecycle channel.
pub struct Session<C>
where
	C: ?Sized + SessionHttpClient,
{
	/// Gateway executing every authenticated call.
	pub gateway: SessionGateway<C>,
}
impl<C> Session<C>
where
	C: ?Sized + SessionHttpClient,
{
	/// Creates a session that reuses the caller-provided transport.
	pub fn with_http_client(
		store: Arc<dyn crate::store::CredentialStore>,
		descriptor: BackendDescriptor,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		let credentials = Credentials::new(store);
		let events = SessionEvents::new();

		Self { gateway: SessionGateway::new(http_client, credentials, descriptor, events) }
	}

	/// Returns the credential handle shared with the gateway.
	pub fn credentials(&self) -> &Credentials {
		&self.gateway.credentials
	}

	/// Returns the lifecycle publisher shared with the gateway.
	pub fn events(&self) -> &SessionEvents {
		&self.gateway.events
	}

	/// Returns the backend descriptor.
	pub fn descriptor(&self) -> &BackendDescriptor {
		&self.gateway.descriptor
	}

	/// Attaches a new lifecycle subscriber.
	pub fn subscribe(&self) -> SessionWatch {
		self.gateway.events.subscribe()
	}
}
#[cfg(feature = "reqwest")]
impl Session<ReqwestHttpClient> {
	/// Creates a session over the crate's default reqwest transport.
	///
	/// The transport is provisioned with the descriptor's request timeout so callers do
	/// not need to pass HTTP handles explicitly; use [`Session::with_http_client`] to
	/// supply a customized client instead.
	pub fn new(
		store: Arc<dyn CredentialStore>,
		descriptor: BackendDescriptor,
	) -> Result<Self, ConfigError> {
		let http_client = ReqwestHttpClient::with_timeout(descriptor.request_timeout)?;

		Ok(Self::with_http_client(store, descriptor, http_client))
	}
}
impl<C> Clone for Session<C>
where
	C: ?Sized + SessionHttpClient,
{
	fn clone(&self) -> Self {
		Self { gateway: self.gateway.clone() }
	}
}
impl<C> Debug for Session<C>
where
	C: ?Sized + SessionHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Session").field("descriptor", &self.gateway.descriptor).finish()
	}
}
