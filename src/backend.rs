//! Backend descriptor, endpoint resolution, and rejection classification.

pub mod wire;

// self
use crate::{_prelude::*, error::ConfigError, http::ApiResponse};

/// Describes one backend deployment: resolved endpoint URLs and timing budgets.
///
/// Endpoints are resolved against the base URL once, at build time, so individual calls
/// never re-parse routes. The descriptor carries no secrets and is freely cloneable.
#[derive(Clone, Debug)]
pub struct BackendDescriptor {
	/// Base URL the routes were resolved against.
	pub base_url: Url,
	/// POST endpoint performing registration.
	pub register: Url,
	/// POST endpoint issuing the token pair.
	pub login: Url,
	/// POST endpoint exchanging a refresh token for a fresh pair.
	pub refresh: Url,
	/// GET/PATCH endpoint for the current user.
	pub current_user: Url,
	/// Optional POST endpoint notified on logout, best effort.
	pub logout: Option<Url>,
	/// Per-request timeout applied by the default transport.
	pub request_timeout: Duration,
	/// Wall-clock budget for session restore before the watchdog fires.
	pub restore_watchdog: Duration,
}
impl BackendDescriptor {
	/// Returns a builder seeded with the default route table and timing budgets.
	pub fn builder(base_url: Url) -> BackendDescriptorBuilder {
		BackendDescriptorBuilder::new(base_url)
	}
}

/// Builder validating and resolving a [`BackendDescriptor`].
#[derive(Clone, Debug)]
pub struct BackendDescriptorBuilder {
	base_url: Url,
	register_route: String,
	login_route: String,
	refresh_route: String,
	current_user_route: String,
	logout_route: Option<String>,
	request_timeout: Duration,
	restore_watchdog: Duration,
	allow_insecure_http: bool,
}
impl BackendDescriptorBuilder {
	const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::seconds(15);
	const DEFAULT_RESTORE_WATCHDOG: Duration = Duration::seconds(5);

	fn new(base_url: Url) -> Self {
		Self {
			base_url,
			register_route: "/auth/register".into(),
			login_route: "/auth/login".into(),
			refresh_route: "/auth/refresh".into(),
			current_user_route: "/users/me".into(),
			logout_route: None,
			request_timeout: Self::DEFAULT_REQUEST_TIMEOUT,
			restore_watchdog: Self::DEFAULT_RESTORE_WATCHDOG,
			allow_insecure_http: false,
		}
	}

	/// Overrides the registration route.
	pub fn register_route(mut self, route: impl Into<String>) -> Self {
		self.register_route = route.into();

		self
	}

	/// Overrides the login route.
	pub fn login_route(mut self, route: impl Into<String>) -> Self {
		self.login_route = route.into();

		self
	}

	/// Overrides the refresh route.
	pub fn refresh_route(mut self, route: impl Into<String>) -> Self {
		self.refresh_route = route.into();

		self
	}

	/// Overrides the current-user route.
	pub fn current_user_route(mut self, route: impl Into<String>) -> Self {
		self.current_user_route = route.into();

		self
	}

	/// Enables the best-effort logout notification against the provided route.
	pub fn logout_route(mut self, route: impl Into<String>) -> Self {
		self.logout_route = Some(route.into());

		self
	}

	/// Overrides the per-request timeout (defaults to 15 seconds).
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;

		self
	}

	/// Overrides the restore watchdog (defaults to 5 seconds).
	pub fn restore_watchdog(mut self, watchdog: Duration) -> Self {
		self.restore_watchdog = watchdog;

		self
	}

	/// Permits plain HTTP on non-loopback hosts.
	///
	/// Development backends frequently live on LAN or emulator-bridge addresses
	/// (e.g. `http://10.0.2.2:8000`); production deployments must stay on HTTPS.
	pub fn allow_insecure_http(mut self) -> Self {
		self.allow_insecure_http = true;

		self
	}

	/// Consumes the builder and produces a validated [`BackendDescriptor`].
	pub fn build(self) -> Result<BackendDescriptor, ConfigError> {
		if self.base_url.scheme() != "https"
			&& !(self.allow_insecure_http || is_loopback(&self.base_url))
		{
			return Err(ConfigError::InsecureBaseUrl { url: self.base_url.to_string() });
		}
		if !self.request_timeout.is_positive() {
			return Err(ConfigError::NonPositiveDuration { what: "request timeout" });
		}
		if !self.restore_watchdog.is_positive() {
			return Err(ConfigError::NonPositiveDuration { what: "restore watchdog" });
		}

		let resolve = |route: &str| {
			self.base_url.join(route).map_err(|source| ConfigError::InvalidRoute {
				route: route.to_owned(),
				source,
			})
		};
		let register = resolve(&self.register_route)?;
		let login = resolve(&self.login_route)?;
		let refresh = resolve(&self.refresh_route)?;
		let current_user = resolve(&self.current_user_route)?;
		let logout = self.logout_route.as_deref().map(resolve).transpose()?;

		Ok(BackendDescriptor {
			register,
			login,
			refresh,
			current_user,
			logout,
			base_url: self.base_url,
			request_timeout: self.request_timeout,
			restore_watchdog: self.restore_watchdog,
		})
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
		Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
		None => false,
	}
}

/// Classifies a failed login response.
///
/// An authorization rejection becomes [`Error::InvalidCredentials`] carrying the
/// backend's detail string; every other status (validation failures, server errors)
/// propagates as a backend status error untouched.
pub fn classify_login_failure(response: &ApiResponse) -> Error {
	if response.is_authorization_failure() {
		Error::InvalidCredentials {
			reason: response.detail().unwrap_or_else(|| "Invalid credentials".into()),
		}
	} else {
		response.status_error().into()
	}
}

/// Classifies a failed registration response.
///
/// The backend rejects duplicates (and other business rules) with 400/409, which maps to
/// [`Error::RegistrationRejected`]; everything else propagates untouched.
pub fn classify_registration_failure(response: &ApiResponse) -> Error {
	match response.status {
		400 | 409 => Error::RegistrationRejected {
			reason: response.detail().unwrap_or_else(|| "Registration rejected".into()),
		},
		_ => response.status_error().into(),
	}
}
