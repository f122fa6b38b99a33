//! Wire payloads for the backend's auth + profile surface.
//!
//! Request types that carry secrets implement [`Debug`] by hand so passwords and refresh
//! tokens never reach logs.

// self
use crate::_prelude::*;

/// POST body for the registration endpoint.
#[derive(Clone, Serialize)]
pub struct RegisterRequest {
	/// Display name.
	pub name: String,
	/// Account email.
	pub email: String,
	/// Plaintext password, sent once over the transport.
	pub password: String,
}
impl Debug for RegisterRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RegisterRequest")
			.field("name", &self.name)
			.field("email", &self.email)
			.field("password", &"<redacted>")
			.finish()
	}
}

/// Registration acknowledgement.
#[derive(Clone, Debug, Deserialize)]
pub struct RegisteredUser {
	/// Backend-assigned numeric identifier.
	pub id: i64,
	/// Account email.
	pub email: String,
	/// Display name.
	pub name: String,
	/// Whether the account is active.
	pub is_active: bool,
}

/// POST body for the login endpoint.
#[derive(Clone, Serialize)]
pub struct LoginRequest {
	/// Account email.
	pub email: String,
	/// Plaintext password, sent once over the transport.
	pub password: String,
}
impl Debug for LoginRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LoginRequest")
			.field("email", &self.email)
			.field("password", &"<redacted>")
			.finish()
	}
}

/// Token pair issued by a successful login.
#[derive(Clone, Deserialize)]
pub struct TokenGrant {
	/// Fresh access token.
	pub access_token: String,
	/// Fresh refresh token.
	pub refresh_token: String,
	/// Token scheme label, `bearer` in practice.
	#[serde(default)]
	pub token_type: String,
}
impl Debug for TokenGrant {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenGrant")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &"<redacted>")
			.field("token_type", &self.token_type)
			.finish()
	}
}

/// POST body for the refresh endpoint.
#[derive(Clone, Serialize)]
pub struct RefreshRequest {
	/// The stored refresh token being exchanged.
	pub refresh_token: String,
}
impl Debug for RefreshRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RefreshRequest").field("refresh_token", &"<redacted>").finish()
	}
}

/// Rotated tokens returned by the refresh endpoint.
///
/// The refresh token is optional on the wire: a backend that does not rotate refresh
/// secrets returns only the access token and the stored refresh secret stays valid.
#[derive(Clone, Deserialize)]
pub struct RefreshGrant {
	/// Fresh access token, always present.
	pub access_token: String,
	/// Rotated refresh token, when the backend issued one.
	#[serde(default)]
	pub refresh_token: Option<String>,
	/// Token scheme label, `bearer` in practice.
	#[serde(default)]
	pub token_type: String,
}
impl Debug for RefreshGrant {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RefreshGrant")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("token_type", &self.token_type)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn refresh_grant_tolerates_a_missing_rotation() {
		let grant: RefreshGrant = serde_json::from_str(r#"{"access_token":"A2"}"#)
			.expect("Refresh grant without rotation should decode.");

		assert_eq!(grant.access_token, "A2");
		assert_eq!(grant.refresh_token, None);

		let grant: RefreshGrant = serde_json::from_str(
			r#"{"access_token":"A2","refresh_token":"R2","token_type":"bearer"}"#,
		)
		.expect("Refresh grant with rotation should decode.");

		assert_eq!(grant.refresh_token.as_deref(), Some("R2"));
	}

	#[test]
	fn secret_payloads_redact_their_debug_output() {
		let login = LoginRequest { email: "a@b.com".into(), password: "hunter2".into() };
		let rendered = format!("{login:?}");

		assert!(rendered.contains("a@b.com"));
		assert!(!rendered.contains("hunter2"));

		let refresh = RefreshRequest { refresh_token: "R1".into() };
		let rendered = format!("{refresh:?}");

		assert!(!rendered.contains("R1"));
	}
}
