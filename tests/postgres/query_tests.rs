//! `PostgreSQL` integration tests for the state queries.

use crate::postgres::helpers::{
    BoxError, PostgresCluster, PreparedStore, actor, create_project, postgres_cluster,
    prepare_store, task_at,
};
use fieldtask::task::{
    domain::{MappingRequest, Project, ProjectTask, StateTransition, TaskIndex, TaskState},
    ports::{ProjectRepository, TaskRepositoryError},
    services::TaskLifecycleError,
};
use mockable::DefaultClock;
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

async fn request(store: &PreparedStore, task: ProjectTask, user: &str) -> Result<(), BoxError> {
    store
        .tasks
        .request_mapping(MappingRequest::new(task.project_id, task.id, actor(user)?))
        .await?;
    Ok(())
}

async fn transition(
    store: &PreparedStore,
    task: ProjectTask,
    user: &str,
    from: TaskState,
    to: TaskState,
) -> Result<(), BoxError> {
    store
        .tasks
        .update_transition(StateTransition::new(
            task.project_id,
            task.id,
            actor(user)?,
            from,
            to,
        ))
        .await?;
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn all_task_states_resolves_latest_event_per_task(
    #[future] store: Result<Option<PreparedStore>, BoxError>,
) -> Result<(), BoxError> {
    let Some(store) = store.await? else {
        return Ok(());
    };
    let created = create_project(&store.tasks, "author", 3).await?;
    let first = task_at(&created, 0)?;
    let second = task_at(&created, 1)?;
    request(&store, first, "pilot-a").await?;
    transition(
        &store,
        first,
        "pilot-a",
        TaskState::RequestForMapping,
        TaskState::LockedForMapping,
    )
    .await?;
    request(&store, second, "pilot-b").await?;

    let states = store.tasks.all_task_states(created.project.id()).await?;

    let summary: Vec<(u32, TaskState)> = states
        .iter()
        .map(|view| (view.project_task_index.value(), view.state))
        .collect();
    assert_eq!(
        summary,
        vec![
            (1, TaskState::LockedForMapping),
            (2, TaskState::RequestForMapping),
            (3, TaskState::SENTINEL),
        ]
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn requested_user_survives_later_transitions(
    #[future] store: Result<Option<PreparedStore>, BoxError>,
) -> Result<(), BoxError> {
    let Some(store) = store.await? else {
        return Ok(());
    };
    let created = create_project(&store.tasks, "author", 2).await?;
    let task = task_at(&created, 0)?;
    let untouched = task_at(&created, 1)?;
    request(&store, task, "pilot-a").await?;
    transition(
        &store,
        task,
        "author",
        TaskState::RequestForMapping,
        TaskState::LockedForMapping,
    )
    .await?;

    let requester = store
        .tasks
        .requested_user_for_task(task.project_id, task.id)
        .await?;
    let missing = store
        .tasks
        .requested_user_for_task(untouched.project_id, untouched.id)
        .await;

    assert_eq!(requester, actor("pilot-a")?);
    assert!(matches!(
        missing,
        Err(TaskLifecycleError::RequesterNotFound { .. })
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn pending_tasks_follow_latest_state_and_author(
    #[future] store: Result<Option<PreparedStore>, BoxError>,
) -> Result<(), BoxError> {
    let Some(store) = store.await? else {
        return Ok(());
    };
    let mine = create_project(&store.tasks, "author", 3).await?;
    let theirs = create_project(&store.tasks, "other-author", 1).await?;
    request(&store, task_at(&mine, 2)?, "pilot-a").await?;
    request(&store, task_at(&mine, 0)?, "pilot-b").await?;
    request(&store, task_at(&mine, 1)?, "pilot-c").await?;
    transition(
        &store,
        task_at(&mine, 1)?,
        "author",
        TaskState::RequestForMapping,
        TaskState::UnlockedToMap,
    )
    .await?;
    request(&store, task_at(&theirs, 0)?, "pilot-d").await?;

    let pending = store
        .tasks
        .list_pending_tasks_for_author(&actor("author")?)
        .await?;

    let summary: Vec<(u32, String)> = pending
        .iter()
        .map(|task| {
            (
                task.project_task_index.value(),
                task.event.user_id.to_string(),
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![(1, "pilot-b".to_owned()), (3, "pilot-a".to_owned())]
    );
    assert!(
        pending
            .iter()
            .all(|task| task.event.state == TaskState::RequestForMapping)
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn history_is_ordered_oldest_first(
    #[future] store: Result<Option<PreparedStore>, BoxError>,
) -> Result<(), BoxError> {
    let Some(store) = store.await? else {
        return Ok(());
    };
    let created = create_project(&store.tasks, "author", 1).await?;
    let task = task_at(&created, 0)?;
    request(&store, task, "pilot").await?;
    transition(
        &store,
        task,
        "author",
        TaskState::RequestForMapping,
        TaskState::UnlockedToMap,
    )
    .await?;
    request(&store, task, "pilot-2").await?;

    let history = store.tasks.task_history(task.project_id, task.id).await?;

    let sequences: Vec<u64> = history.iter().map(|event| event.sequence).collect();
    let mut sorted = sequences.clone();
    sorted.sort_unstable();
    assert_eq!(sequences, sorted);
    let users: Vec<&str> = history.iter().map(|event| event.user_id.as_str()).collect();
    assert_eq!(users, vec!["pilot", "author", "pilot-2"]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn project_batch_rolls_back_when_a_task_index_clashes(
    #[future] store: Result<Option<PreparedStore>, BoxError>,
) -> Result<(), BoxError> {
    let Some(store) = store.await? else {
        return Ok(());
    };
    let project = Project::new("Survey", actor("author")?, &DefaultClock)?;
    let index = TaskIndex::new(1)?;
    let tasks = [
        ProjectTask::new(project.id(), index),
        ProjectTask::new(project.id(), index),
    ];

    let result = store
        .task_store
        .store_project_with_tasks(&project, &tasks)
        .await;

    assert!(matches!(result, Err(TaskRepositoryError::DuplicateTask(_))));
    assert!(store.tasks.find_project(project.id()).await?.is_none());
    assert!(store.tasks.all_task_states(project.id()).await?.is_empty());
    Ok(())
}
