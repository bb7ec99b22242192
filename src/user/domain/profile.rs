//! Editable pilot and creator profiles.

use super::{ParseUserRoleError, PasswordHash, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role a user plays on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Creates projects and approves mapping requests.
    ProjectCreator,
    /// Flies and maps tasks.
    DronePilot,
}

impl UserRole {
    /// Returns the storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProjectCreator => "PROJECT_CREATOR",
            Self::DronePilot => "DRONE_PILOT",
        }
    }
}

impl TryFrom<&str> for UserRole {
    type Error = ParseUserRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "PROJECT_CREATOR" => Ok(Self::ProjectCreator),
            "DRONE_PILOT" => Ok(Self::DronePilot),
            _ => Err(ParseUserRoleError(value.to_owned())),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Profile details attached to a user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Owning account.
    pub user_id: UserId,
    /// Contact phone number.
    pub phone_number: Option<String>,
    /// Country of residence.
    pub country: Option<String>,
    /// City of residence.
    pub city: Option<String>,
    /// Employer or organisation.
    pub organization_name: Option<String>,
    /// Postal address of the organisation.
    pub organization_address: Option<String>,
    /// Job title.
    pub job_title: Option<String>,
    /// Radius for new-project notifications.
    pub notify_for_projects_within_km: Option<u16>,
    /// Drone model owned by the pilot.
    pub drone_you_own: Option<String>,
    /// Years of flying experience.
    pub experience_years: Option<u16>,
    /// Whether the pilot holds an operator certificate.
    pub certified_drone_operator: Option<bool>,
    /// Platform role.
    pub role: Option<UserRole>,
}

impl UserProfile {
    /// Creates a profile with no details recorded.
    #[must_use]
    pub const fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            phone_number: None,
            country: None,
            city: None,
            organization_name: None,
            organization_address: None,
            job_title: None,
            notify_for_projects_within_km: None,
            drone_you_own: None,
            experience_years: None,
            certified_drone_operator: None,
            role: None,
        }
    }
}

/// Partial profile update. Absent fields keep their stored values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// New phone number.
    pub phone_number: Option<String>,
    /// New country.
    pub country: Option<String>,
    /// New city.
    pub city: Option<String>,
    /// New organisation name.
    pub organization_name: Option<String>,
    /// New organisation address.
    pub organization_address: Option<String>,
    /// New job title.
    pub job_title: Option<String>,
    /// New notification radius.
    pub notify_for_projects_within_km: Option<u16>,
    /// New drone model.
    pub drone_you_own: Option<String>,
    /// New experience in years.
    pub experience_years: Option<u16>,
    /// New certification flag.
    pub certified_drone_operator: Option<bool>,
    /// New role.
    pub role: Option<UserRole>,
    /// Replacement account credential, hashed by the caller.
    pub password: Option<PasswordHash>,
}

impl ProfileUpdate {
    /// Sets the role.
    #[must_use]
    pub const fn with_role(mut self, role: UserRole) -> Self {
        self.role = Some(role);
        self
    }

    /// Sets the replacement credential.
    #[must_use]
    pub fn with_password(mut self, password: PasswordHash) -> Self {
        self.password = Some(password);
        self
    }

    /// Overwrites the fields of `profile` supplied by this update.
    pub fn apply_to(&self, profile: &mut UserProfile) {
        fn merge<T: Clone>(target: &mut Option<T>, value: Option<&T>) {
            if let Some(supplied) = value {
                *target = Some(supplied.clone());
            }
        }

        merge(&mut profile.phone_number, self.phone_number.as_ref());
        merge(&mut profile.country, self.country.as_ref());
        merge(&mut profile.city, self.city.as_ref());
        merge(&mut profile.organization_name, self.organization_name.as_ref());
        merge(
            &mut profile.organization_address,
            self.organization_address.as_ref(),
        );
        merge(&mut profile.job_title, self.job_title.as_ref());
        merge(
            &mut profile.notify_for_projects_within_km,
            self.notify_for_projects_within_km.as_ref(),
        );
        merge(&mut profile.drone_you_own, self.drone_you_own.as_ref());
        merge(&mut profile.experience_years, self.experience_years.as_ref());
        merge(
            &mut profile.certified_drone_operator,
            self.certified_drone_operator.as_ref(),
        );
        merge(&mut profile.role, self.role.as_ref());
    }
}
