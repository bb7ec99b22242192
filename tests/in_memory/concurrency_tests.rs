//! Racing transitions against one task over the in-memory store.

use super::helpers::{MemoryTaskService, actor, project, request, task_at, tasks};
use eyre::{Result, ensure};
use fieldtask::task::domain::{MappingRequest, StateTransition, TaskState, TransitionOutcome};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn racing_requests_apply_exactly_once(tasks: MemoryTaskService) -> Result<()> {
    let created = project(&tasks, "author", 1).await?;
    let task = task_at(&created, 0)?;

    let mut handles = Vec::new();
    for pilot in 0..16 {
        let service = tasks.clone();
        let mapping_request =
            MappingRequest::new(task.project_id, task.id, actor(&format!("pilot-{pilot}"))?);
        handles.push(tokio::spawn(async move {
            service.request_mapping(mapping_request).await
        }));
    }
    let mut applied = 0_usize;
    for handle in handles {
        if handle.await??.is_applied() {
            applied += 1;
        }
    }

    ensure!(applied == 1, "expected one winner, got {applied}");
    ensure!(tasks.task_history(task.project_id, task.id).await?.len() == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn repeated_continuations_never_grow_the_log(tasks: MemoryTaskService) -> Result<()> {
    let created = project(&tasks, "author", 1).await?;
    let task = task_at(&created, 0)?;
    request(&tasks, task, "pilot").await?;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = tasks.clone();
        let continuation = StateTransition::new(
            task.project_id,
            task.id,
            actor("pilot")?,
            TaskState::RequestForMapping,
            TaskState::RequestForMapping,
        );
        handles.push(tokio::spawn(async move {
            service.update_transition(continuation).await
        }));
    }
    for handle in handles {
        let receipt = handle.await??;
        ensure!(receipt.outcome == TransitionOutcome::Updated);
    }

    ensure!(tasks.task_history(task.project_id, task.id).await?.len() == 1);
    Ok(())
}
