//! Diesel row models for accounts and profiles.

use super::schema::{user_profile, users};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for accounts. The credential column is never selected.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email_address: String,
    pub profile_img: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
    pub date_registered: DateTime<Utc>,
}

/// Insert model for accounts.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow {
    pub id: String,
    pub name: String,
    pub email_address: String,
    pub profile_img: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
    pub date_registered: DateTime<Utc>,
}

/// Full profile row, used for reads and for the merged upsert.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = user_profile)]
#[diesel(primary_key(user_id))]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProfileRow {
    pub user_id: String,
    pub phone_number: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub organization_name: Option<String>,
    pub organization_address: Option<String>,
    pub job_title: Option<String>,
    pub notify_for_projects_within_km: Option<i32>,
    pub drone_you_own: Option<String>,
    pub experience_years: Option<i32>,
    pub certified_drone_operator: Option<bool>,
    pub role: Option<String>,
}
