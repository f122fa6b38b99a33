//! Session lifecycle signalling consumed by the presentation layer.
//!
//! The gateway and the flow operations publish every lifecycle transition through
//! [`SessionEvents`]; the presentation layer holds a [`SessionWatch`] and routes to its
//! sign-in surface whenever the state becomes [`SessionState::Unauthenticated`]. The
//! channel keeps only the latest state, so a subscriber that attaches late still observes
//! the current truth.

// crates.io
use tokio::sync::watch;
// self
use crate::{_prelude::*, auth::UserProfile};

/// Reason attached to an unauthenticated transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnauthenticatedReason {
	/// No stored credentials were found at startup.
	CredentialsMissing,
	/// A refresh cycle failed terminally and the stored credentials were cleared.
	RefreshFailed,
	/// The user signed out.
	LoggedOut,
	/// Session restore failed or exceeded its watchdog.
	RestoreFailed,
}
impl UnauthenticatedReason {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			UnauthenticatedReason::CredentialsMissing => "credentials_missing",
			UnauthenticatedReason::RefreshFailed => "refresh_failed",
			UnauthenticatedReason::LoggedOut => "logged_out",
			UnauthenticatedReason::RestoreFailed => "restore_failed",
		}
	}
}
impl Display for UnauthenticatedReason {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Session lifecycle state published to observers.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionState {
	/// Startup state before the first lifecycle operation resolves.
	Unknown,
	/// A user is signed in.
	Authenticated(UserProfile),
	/// No valid session; the presentation layer must route to sign-in.
	Unauthenticated(UnauthenticatedReason),
}
impl SessionState {
	/// Returns `true` when a user is signed in.
	pub fn is_authenticated(&self) -> bool {
		matches!(self, SessionState::Authenticated(_))
	}

	/// Returns the signed-in user, if any.
	pub fn user(&self) -> Option<&UserProfile> {
		match self {
			SessionState::Authenticated(user) => Some(user),
			_ => None,
		}
	}
}

/// Publisher half of the lifecycle channel, shared by the gateway and the flows.
#[derive(Clone, Debug)]
pub struct SessionEvents(Arc<watch::Sender<SessionState>>);
impl SessionEvents {
	/// Creates a channel starting in [`SessionState::Unknown`].
	pub fn new() -> Self {
		let (tx, _rx) = watch::channel(SessionState::Unknown);

		Self(Arc::new(tx))
	}

	/// Returns the most recently published state.
	pub fn current(&self) -> SessionState {
		self.0.borrow().clone()
	}

	/// Attaches a new subscriber observing the current state and every later transition.
	pub fn subscribe(&self) -> SessionWatch {
		SessionWatch(self.0.subscribe())
	}

	pub(crate) fn emit(&self, state: SessionState) {
		self.0.send_replace(state);
	}
}
impl Default for SessionEvents {
	fn default() -> Self {
		Self::new()
	}
}

/// Subscriber half of the lifecycle channel.
#[derive(Clone, Debug)]
pub struct SessionWatch(watch::Receiver<SessionState>);
impl SessionWatch {
	/// Returns the most recently published state.
	pub fn current(&self) -> SessionState {
		self.0.borrow().clone()
	}

	/// Waits for the next transition and returns the new state, or `None` once every
	/// publisher has been dropped.
	pub async fn next(&mut self) -> Option<SessionState> {
		self.0.changed().await.ok()?;

		Some(self.0.borrow_and_update().clone())
	}
}
