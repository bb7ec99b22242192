//! `PostgreSQL` integration tests for accounts and profiles.

use crate::postgres::helpers::{
    BoxError, PostgresCluster, PreparedStore, postgres_cluster, prepare_store,
};
use fieldtask::user::{
    domain::{AuthUser, PasswordHash, ProfileUpdate, UserId, UserRole},
    ports::UserRepositoryError,
    services::UserServiceError,
};
use rstest::{fixture, rstest};

#[fixture]
async fn store(
    postgres_cluster: Option<PostgresCluster>,
) -> Result<Option<PreparedStore>, BoxError> {
    let Some(cluster) = postgres_cluster else {
        return Ok(None);
    };
    Ok(Some(prepare_store(cluster).await?))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sign_in_provisions_account_once(
    #[future] store: Result<Option<PreparedStore>, BoxError>,
) -> Result<(), BoxError> {
    let Some(store) = store.await? else {
        return Ok(());
    };
    let identity = AuthUser::new("google-oauth2|42", "Pilot@Example.com", "Ada Pilot")?;

    let created = store.users.get_or_create_user(identity.clone()).await?;
    let again = store.users.get_or_create_user(identity).await?;

    assert_eq!(created.id, again.id);
    assert_eq!(created.email_address.as_str(), "pilot@example.com");
    let by_email = store
        .users
        .find_user_by_email("pilot@example.com")
        .await?
        .ok_or("account should be found by e-mail")?;
    assert_eq!(by_email.id, created.id);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_email_is_rejected(
    #[future] store: Result<Option<PreparedStore>, BoxError>,
) -> Result<(), BoxError> {
    let Some(store) = store.await? else {
        return Ok(());
    };
    store
        .users
        .get_or_create_user(AuthUser::new("first", "shared@example.com", "First")?)
        .await?;

    let result = store
        .users
        .get_or_create_user(AuthUser::new("second", "shared@example.com", "Second")?)
        .await;

    assert!(matches!(
        result,
        Err(UserServiceError::Repository(
            UserRepositoryError::DuplicateEmail(_)
        ))
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn profile_upsert_merges_and_replaces_credential(
    #[future] store: Result<Option<PreparedStore>, BoxError>,
) -> Result<(), BoxError> {
    let Some(store) = store.await? else {
        return Ok(());
    };
    let account = store
        .users
        .get_or_create_user(AuthUser::new("pilot", "pilot@example.com", "Pilot")?)
        .await?;
    let hash = PasswordHash::new("$argon2id$v=19$stored")?;
    store
        .users
        .upsert_profile(
            &account.id,
            ProfileUpdate {
                country: Some("Rwanda".to_owned()),
                experience_years: Some(6),
                ..ProfileUpdate::default()
            }
            .with_password(hash.clone()),
        )
        .await?;

    let updated = store
        .users
        .upsert_profile(
            &account.id,
            ProfileUpdate::default().with_role(UserRole::DronePilot),
        )
        .await?;

    assert_eq!(updated.country.as_deref(), Some("Rwanda"));
    assert_eq!(updated.experience_years, Some(6));
    assert_eq!(updated.role, Some(UserRole::DronePilot));
    assert_eq!(store.users.find_profile(&account.id).await?, Some(updated));
    assert_eq!(store.users.password_hash(&account.id).await?, Some(hash));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn profile_upsert_requires_account(
    #[future] store: Result<Option<PreparedStore>, BoxError>,
) -> Result<(), BoxError> {
    let Some(store) = store.await? else {
        return Ok(());
    };

    let result = store
        .users
        .upsert_profile(&UserId::new("ghost")?, ProfileUpdate::default())
        .await;

    assert!(matches!(
        result,
        Err(UserServiceError::Repository(
            UserRepositoryError::UserNotFound(_)
        ))
    ));
    Ok(())
}
