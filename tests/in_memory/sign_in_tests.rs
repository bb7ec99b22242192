//! Accounts created on sign-in acting on tasks.

use super::helpers::{MemoryTaskService, MemoryUserService, project, task_at, tasks, users};
use eyre::{Result, ensure};
use fieldtask::{
    task::domain::{ActorId, MappingRequest},
    user::domain::{AuthUser, ProfileUpdate, UserRole},
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn signed_in_pilot_is_recorded_as_requester(
    tasks: MemoryTaskService,
    users: MemoryUserService,
) -> Result<()> {
    let account = users
        .get_or_create_user(AuthUser::new("oauth|pilot", "pilot@example.org", "Pilot")?)
        .await?;
    users
        .upsert_profile(
            &account.id,
            ProfileUpdate::default().with_role(UserRole::DronePilot),
        )
        .await?;
    let created = project(&tasks, "oauth|author", 1).await?;
    let task = task_at(&created, 0)?;
    let pilot = ActorId::new(account.id.as_str())?;

    tasks
        .request_mapping(MappingRequest::new(task.project_id, task.id, pilot.clone()))
        .await?;

    ensure!(tasks.requested_user_for_task(task.project_id, task.id).await? == pilot);
    let profile = users.find_profile(&account.id).await?;
    ensure!(profile.and_then(|stored| stored.role) == Some(UserRole::DronePilot));
    Ok(())
}
