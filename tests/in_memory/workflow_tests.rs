//! End-to-end task lifecycles over the in-memory store.

use super::helpers::{MemoryTaskService, actor, project, request, task_at, tasks, transition};
use eyre::{Result, ensure};
use fieldtask::task::domain::{MappingRequestOutcome, TaskState};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn task_moves_from_request_to_done(tasks: MemoryTaskService) -> Result<()> {
    let created = project(&tasks, "author", 1).await?;
    let task = task_at(&created, 0)?;

    request(&tasks, task, "pilot").await?;
    transition(
        &tasks,
        task,
        "author",
        TaskState::RequestForMapping,
        TaskState::LockedForMapping,
    )
    .await?;
    transition(
        &tasks,
        task,
        "pilot",
        TaskState::LockedForMapping,
        TaskState::UnlockedToValidate,
    )
    .await?;
    transition(
        &tasks,
        task,
        "validator",
        TaskState::UnlockedToValidate,
        TaskState::LockedForValidation,
    )
    .await?;
    transition(
        &tasks,
        task,
        "validator",
        TaskState::LockedForValidation,
        TaskState::UnlockedDone,
    )
    .await?;

    let states: Vec<TaskState> = tasks
        .task_history(task.project_id, task.id)
        .await?
        .into_iter()
        .map(|event| event.state)
        .collect();
    ensure!(
        states
            == vec![
                TaskState::RequestForMapping,
                TaskState::LockedForMapping,
                TaskState::UnlockedToValidate,
                TaskState::UnlockedDone,
            ],
        "unexpected history {states:?}"
    );
    let views = tasks.all_task_states(created.project.id()).await?;
    ensure!(views.first().map(|view| view.state) == Some(TaskState::UnlockedDone));
    ensure!(tasks.requested_user_for_task(task.project_id, task.id).await? == actor("pilot")?);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rejected_request_leaves_pending_list_unchanged(tasks: MemoryTaskService) -> Result<()> {
    let created = project(&tasks, "author", 2).await?;
    let task = task_at(&created, 1)?;
    request(&tasks, task, "pilot-a").await?;

    let rejected = request(&tasks, task, "pilot-b").await?;
    let pending = tasks.list_pending_tasks_for_author(&actor("author")?).await?;

    ensure!(matches!(rejected, MappingRequestOutcome::HeldByOther { .. }));
    ensure!(pending.len() == 1);
    let entry = pending.first().map(|pending_task| {
        (
            pending_task.project_task_index.value(),
            pending_task.event.user_id.as_str().to_owned(),
        )
    });
    ensure!(entry == Some((2, "pilot-a".to_owned())));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unflyable_task_blocks_further_requests(tasks: MemoryTaskService) -> Result<()> {
    let created = project(&tasks, "author", 1).await?;
    let task = task_at(&created, 0)?;
    request(&tasks, task, "pilot").await?;
    transition(
        &tasks,
        task,
        "author",
        TaskState::RequestForMapping,
        TaskState::UnflyableTask,
    )
    .await?;

    let outcome = request(&tasks, task, "pilot-2").await?;

    ensure!(
        outcome
            == MappingRequestOutcome::HeldByOther {
                user_id: actor("author")?,
                state: TaskState::UnflyableTask,
            }
    );
    ensure!(tasks.current_state(task.project_id, task.id).await? == TaskState::UnflyableTask);
    Ok(())
}
