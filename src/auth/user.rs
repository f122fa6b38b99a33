//! User profile records mirrored from the backend schema.

// self
use crate::_prelude::*;

/// Employment category reported during onboarding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Occupation {
	/// Salaried employment.
	Employed,
	/// Independent contracting.
	Freelancer,
	/// Full-time studies.
	Student,
	/// Anything else.
	Other,
}

/// Authenticated user record returned by the backend.
///
/// Field names follow the backend wire shape verbatim, including its mixed
/// snake/camel casing (`is_active` vs. `monthlyIncome`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
	/// Backend-assigned numeric identifier.
	pub id: i64,
	/// Account email.
	pub email: String,
	/// Display name.
	pub name: String,
	/// Whether the account is active.
	pub is_active: bool,
	/// Occupation, when the user has completed onboarding.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub occupation: Option<Occupation>,
	/// Monthly income in whole currency units, when supplied.
	#[serde(default, rename = "monthlyIncome", skip_serializing_if = "Option::is_none")]
	pub monthly_income: Option<i64>,
}

/// Partial update payload for the profile endpoint; unset fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ProfileUpdate {
	/// Replacement display name.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	/// Replacement occupation.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub occupation: Option<Occupation>,
	/// Replacement monthly income.
	#[serde(rename = "monthlyIncome", skip_serializing_if = "Option::is_none")]
	pub monthly_income: Option<i64>,
}
impl ProfileUpdate {
	/// Creates an empty update.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the display name.
	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());

		self
	}

	/// Sets the occupation.
	pub fn with_occupation(mut self, occupation: Occupation) -> Self {
		self.occupation = Some(occupation);

		self
	}

	/// Sets the monthly income.
	pub fn with_monthly_income(mut self, income: i64) -> Self {
		self.monthly_income = Some(income);

		self
	}

	/// Returns `true` when no field is set.
	pub fn is_empty(&self) -> bool {
		self.name.is_none() && self.occupation.is_none() && self.monthly_income.is_none()
	}
}
