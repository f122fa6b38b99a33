//! Session-level error types shared across flows, the gateway, and credential stores.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical session error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Credential-storage failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS); transient, the caller may retry.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Backend returned an unexpected status or a malformed payload.
	#[error(transparent)]
	Backend(#[from] BackendError),

	/// Login was rejected; no credentials were written.
	#[error("Backend rejected the supplied credentials: {reason}.")]
	InvalidCredentials {
		/// Backend-supplied reason string.
		reason: String,
	},
	/// Registration was rejected (e.g., duplicate identifier); distinct from a login rejection.
	#[error("Backend rejected the registration: {reason}.")]
	RegistrationRejected {
		/// Backend-supplied reason string.
		reason: String,
	},
	/// The session is no longer valid; stored credentials have been cleared and the caller
	/// must sign in again.
	#[error("Session is unauthenticated.")]
	Unauthenticated,
}
impl Error {
	/// Returns `true` when the failure is transient and the same call may be retried.
	pub fn is_transient(&self) -> bool {
		matches!(self, Self::Transport(_))
	}
}

/// Configuration and validation failures raised while assembling a session.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// A request body could not be encoded as JSON.
	#[error("Request body could not be encoded.")]
	EncodeBody {
		/// Underlying serialization failure.
		#[source]
		source: serde_json::Error,
	},
	/// An endpoint route does not resolve against the base URL.
	#[error("Route `{route}` does not resolve against the base URL.")]
	InvalidRoute {
		/// The offending relative route.
		route: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The base URL uses plain HTTP on a non-loopback host without the explicit opt-in.
	#[error("Base URL `{url}` must use HTTPS outside loopback hosts.")]
	InsecureBaseUrl {
		/// The rejected base URL.
		url: String,
	},
	/// A configured duration is zero or negative.
	#[error("The {what} duration must be positive.")]
	NonPositiveDuration {
		/// Label of the offending setting.
		what: &'static str,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Unexpected backend responses: surprising statuses and malformed payloads.
#[derive(Debug, ThisError)]
pub enum BackendError {
	/// Backend answered with a status the flow does not handle.
	#[error("Backend returned status {status}: {message}.")]
	Status {
		/// HTTP status code of the response.
		status: u16,
		/// Backend-supplied detail, or a body preview when none was given.
		message: String,
	},
	/// Backend responded with JSON that could not be decoded into the expected shape.
	#[error("Backend returned a malformed payload.")]
	Payload {
		/// Structured parsing failure naming the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: u16,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the backend.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the backend.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
