//! Transport primitives for authenticated backend calls.
//!
//! [`SessionHttpClient`] is the gateway's only dependency on an HTTP stack. Implementations
//! classify transport-level failures into [`TransportError`] at this boundary, so the
//! gateway and the flows dispatch on typed errors instead of probing response structure;
//! every HTTP status, including failures, comes back as an [`ApiResponse`] envelope for
//! the caller to interpret.

// std
use std::ops::Deref;
// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::{BackendError, ConfigError, TransportError},
};

/// Boxed future returned by [`SessionHttpClient::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + 'a + Send>>;

/// HTTP methods used by the backend surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
	/// DELETE.
	Delete,
	/// GET.
	Get,
	/// PATCH.
	Patch,
	/// POST.
	Post,
}
impl Method {
	/// Returns the canonical method name.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Delete => "DELETE",
			Method::Get => "GET",
			Method::Patch => "PATCH",
			Method::Post => "POST",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outbound request descriptor carried through the gateway.
///
/// The descriptor is cloneable so a call that failed authorization can be queued and
/// replayed verbatim once the governing refresh settles.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: Method,
	/// Fully-resolved endpoint URL.
	pub url: Url,
	/// Bearer secret attached as `Authorization` when present.
	pub bearer: Option<TokenSecret>,
	/// JSON body, when the endpoint takes one.
	pub body: Option<serde_json::Value>,
}
impl ApiRequest {
	/// Creates a bare request for the method + URL pair.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, bearer: None, body: None }
	}

	/// Attaches (or removes) the bearer secret.
	pub fn with_bearer(mut self, bearer: Option<TokenSecret>) -> Self {
		self.bearer = bearer;

		self
	}

	/// Encodes `body` as the JSON payload.
	pub fn with_json<T>(mut self, body: &T) -> Result<Self>
	where
		T: Serialize,
	{
		self.body = Some(
			serde_json::to_value(body)
				.map_err(|source| ConfigError::EncodeBody { source })?,
		);

		Ok(self)
	}
}

/// Response envelope returned by the transport.
#[derive(Clone, Debug)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: u16,
	/// Raw response body bytes.
	pub body: Vec<u8>,
}
impl ApiResponse {
	const BODY_PREVIEW_LEN: usize = 160;

	/// Returns `true` when the status signals the presented access token is missing,
	/// expired, or invalid.
	pub fn is_authorization_failure(&self) -> bool {
		self.status == 401
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Decodes the JSON body, reporting the failing path on mismatch.
	pub fn json<T>(&self) -> Result<T, BackendError>
	where
		T: DeserializeOwned,
	{
		let deserializer = &mut serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(deserializer)
			.map_err(|source| BackendError::Payload { source, status: self.status })
	}

	/// Extracts the backend's `detail` message when the body carries one.
	pub fn detail(&self) -> Option<String> {
		#[derive(Deserialize)]
		struct Detail {
			detail: String,
		}

		serde_json::from_slice::<Detail>(&self.body).ok().map(|d| d.detail)
	}

	/// Builds the [`BackendError`] describing this response's status.
	pub fn status_error(&self) -> BackendError {
		let message = self.detail().unwrap_or_else(|| {
			let preview = String::from_utf8_lossy(&self.body);
			let preview = preview.trim();

			if preview.is_empty() {
				"no response body".into()
			} else {
				preview.chars().take(Self::BODY_PREVIEW_LEN).collect()
			}
		});

		BackendError::Status { status: self.status, message }
	}
}

/// Abstraction over HTTP transports executing backend calls.
///
/// The trait is the seam tests script against: the gateway owns an `Arc<C>` and never
/// assumes anything beyond this contract. Implementations must be `Send + Sync + 'static`
/// so a session can be shared across tasks, and the futures they return must be `Send`
/// for the lifetime of the in-flight call.
pub trait SessionHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Dispatches the request and returns the raw response envelope.
	fn execute(&self, request: ApiRequest) -> TransportFuture<'_>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client enforcing the provided per-request timeout.
	pub fn with_timeout(timeout: Duration) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder()
			.timeout(timeout.unsigned_abs())
			.build()
			.map_err(ConfigError::http_client_build)?;

		Ok(Self(client))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl SessionHttpClient for ReqwestHttpClient {
	fn execute(&self, request: ApiRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let method = match request.method {
				Method::Delete => reqwest::Method::DELETE,
				Method::Get => reqwest::Method::GET,
				Method::Patch => reqwest::Method::PATCH,
				Method::Post => reqwest::Method::POST,
			};
			let mut builder = client.request(method, request.url);

			if let Some(bearer) = &request.bearer {
				builder = builder.bearer_auth(bearer.expose());
			}
			if let Some(body) = &request.body {
				builder = builder.json(body);
			}

			let response = builder.send().await.map_err(TransportError::from)?;
			let status = response.status().as_u16();
			let body = response.bytes().await.map_err(TransportError::from)?.to_vec();

			Ok(ApiResponse { status, body })
		})
	}
}
