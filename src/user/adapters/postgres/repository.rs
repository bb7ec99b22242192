//! `PostgreSQL` repository implementation for accounts and profiles.

use super::{
    models::{NewUserRow, ProfileRow, UserRow},
    schema::{user_profile, users},
};
use crate::user::{
    domain::{
        EmailAddress, PasswordHash, ProfileUpdate, UserAccount, UserId, UserProfile, UserRole,
    },
    ports::{UserRepository, UserRepositoryError, UserRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::warn;

/// `PostgreSQL` connection pool type used by user adapters.
pub type UserPgPool = Pool<ConnectionManager<PgConnection>>;

const EMAIL_UNIQUE_CONSTRAINT: &str = "users_email_address_key";

/// `PostgreSQL`-backed user repository.
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: UserPgPool,
}

impl PostgresUserRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: UserPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> UserRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> UserRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        let result = tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(UserRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(UserRepositoryError::persistence)?;
        if let Err(UserRepositoryError::Persistence(ref cause)) = result {
            warn!(error = %cause, "user store operation failed");
        }
        result
    }
}

impl From<DieselError> for UserRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn insert_user(&self, account: &UserAccount) -> UserRepositoryResult<()> {
        let user_id = account.id.clone();
        let email = account.email_address.clone();
        let new_row = NewUserRow {
            id: account.id.as_str().to_owned(),
            name: account.name.clone(),
            email_address: account.email_address.as_str().to_owned(),
            profile_img: account.profile_img.clone(),
            is_active: account.is_active,
            is_superuser: account.is_superuser,
            date_registered: account.date_registered,
        };

        self.run_blocking(move |connection| {
            diesel::insert_into(users::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if info.constraint_name() == Some(EMAIL_UNIQUE_CONSTRAINT) =>
                    {
                        UserRepositoryError::DuplicateEmail(email)
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        UserRepositoryError::DuplicateUser(user_id)
                    }
                    _ => UserRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_user(&self, id: &UserId) -> UserRepositoryResult<Option<UserAccount>> {
        let key = id.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = users::table
                .filter(users::id.eq(key))
                .select(UserRow::as_select())
                .first::<UserRow>(connection)
                .optional()?;
            row.map(row_to_account).transpose()
        })
        .await
    }

    async fn find_user_by_email(
        &self,
        email: &EmailAddress,
    ) -> UserRepositoryResult<Option<UserAccount>> {
        let key = email.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = users::table
                .filter(users::email_address.eq(key))
                .select(UserRow::as_select())
                .first::<UserRow>(connection)
                .optional()?;
            row.map(row_to_account).transpose()
        })
        .await
    }

    async fn password_hash(&self, id: &UserId) -> UserRepositoryResult<Option<PasswordHash>> {
        let key = id.as_str().to_owned();
        self.run_blocking(move |connection| {
            let stored = users::table
                .filter(users::id.eq(key))
                .select(users::password)
                .first::<Option<String>>(connection)
                .optional()?
                .flatten();
            stored
                .map(|hash| PasswordHash::new(hash).map_err(UserRepositoryError::persistence))
                .transpose()
        })
        .await
    }

    async fn upsert_profile(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
    ) -> UserRepositoryResult<UserProfile> {
        let user_id = id.clone();
        let owned = update.clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, UserRepositoryError, _>(|tx| {
                let locked = users::table
                    .filter(users::id.eq(user_id.as_str()))
                    .select(users::id)
                    .for_update()
                    .first::<String>(tx)
                    .optional()?;
                if locked.is_none() {
                    return Err(UserRepositoryError::UserNotFound(user_id.clone()));
                }

                let existing = user_profile::table
                    .filter(user_profile::user_id.eq(user_id.as_str()))
                    .select(ProfileRow::as_select())
                    .first::<ProfileRow>(tx)
                    .optional()?;
                let mut profile = existing
                    .map(row_to_profile)
                    .transpose()?
                    .unwrap_or_else(|| UserProfile::empty(user_id.clone()));
                owned.apply_to(&mut profile);

                let row = profile_to_row(&profile);
                diesel::insert_into(user_profile::table)
                    .values(&row)
                    .on_conflict(user_profile::user_id)
                    .do_update()
                    .set(&row)
                    .execute(tx)?;

                if let Some(password) = &owned.password {
                    diesel::update(users::table.filter(users::id.eq(user_id.as_str())))
                        .set(users::password.eq(password.as_str()))
                        .execute(tx)?;
                }
                Ok(profile)
            })
        })
        .await
    }

    async fn find_profile(&self, id: &UserId) -> UserRepositoryResult<Option<UserProfile>> {
        let key = id.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = user_profile::table
                .filter(user_profile::user_id.eq(key))
                .select(ProfileRow::as_select())
                .first::<ProfileRow>(connection)
                .optional()?;
            row.map(row_to_profile).transpose()
        })
        .await
    }
}

fn row_to_account(row: UserRow) -> UserRepositoryResult<UserAccount> {
    Ok(UserAccount {
        id: UserId::new(row.id).map_err(UserRepositoryError::persistence)?,
        name: row.name,
        email_address: EmailAddress::new(row.email_address)
            .map_err(UserRepositoryError::persistence)?,
        profile_img: row.profile_img,
        is_active: row.is_active,
        is_superuser: row.is_superuser,
        date_registered: row.date_registered,
    })
}

fn row_to_small_count(value: Option<i32>) -> UserRepositoryResult<Option<u16>> {
    value
        .map(|stored| u16::try_from(stored).map_err(UserRepositoryError::persistence))
        .transpose()
}

fn row_to_profile(row: ProfileRow) -> UserRepositoryResult<UserProfile> {
    let role = row
        .role
        .map(|stored| UserRole::try_from(stored.as_str()).map_err(UserRepositoryError::persistence))
        .transpose()?;
    Ok(UserProfile {
        user_id: UserId::new(row.user_id).map_err(UserRepositoryError::persistence)?,
        phone_number: row.phone_number,
        country: row.country,
        city: row.city,
        organization_name: row.organization_name,
        organization_address: row.organization_address,
        job_title: row.job_title,
        notify_for_projects_within_km: row_to_small_count(row.notify_for_projects_within_km)?,
        drone_you_own: row.drone_you_own,
        experience_years: row_to_small_count(row.experience_years)?,
        certified_drone_operator: row.certified_drone_operator,
        role,
    })
}

fn profile_to_row(profile: &UserProfile) -> ProfileRow {
    ProfileRow {
        user_id: profile.user_id.as_str().to_owned(),
        phone_number: profile.phone_number.clone(),
        country: profile.country.clone(),
        city: profile.city.clone(),
        organization_name: profile.organization_name.clone(),
        organization_address: profile.organization_address.clone(),
        job_title: profile.job_title.clone(),
        notify_for_projects_within_km: profile.notify_for_projects_within_km.map(i32::from),
        drone_you_own: profile.drone_you_own.clone(),
        experience_years: profile.experience_years.map(i32::from),
        certified_drone_operator: profile.certified_drone_operator,
        role: profile.role.map(|role| role.as_str().to_owned()),
    }
}
