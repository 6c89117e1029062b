use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use futures_util::future::join_all;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::TaskTransport;
use crate::error::ErrorKind;
use crate::loading::busy_set;
use crate::model::{NewTask, StatusFilter, Task, TaskChange, TaskId, UserId};
use crate::state::TodoState;

/// Per-task results of a clear-completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearOutcome {
    pub removed: Vec<TaskId>,
    pub failed: Vec<TaskId>,
}

/// Owns the task list state and runs every mutation against the remote store.
///
/// State changes happen in short critical sections that never span a network
/// call, so operations may interleave freely; the last completion wins.
pub struct TaskListController {
    transport: Arc<dyn TaskTransport>,
    state: Mutex<TodoState>,
    user_id: UserId,
    cancel: CancellationToken,
}

impl TaskListController {
    pub fn new(transport: Arc<dyn TaskTransport>, user_id: UserId) -> Self {
        Self {
            transport,
            state: Mutex::new(TodoState::default()),
            user_id,
            cancel: CancellationToken::new(),
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn snapshot(&self) -> TodoState {
        self.state.lock().clone()
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&TodoState) -> R) -> R {
        f(&self.state.lock())
    }

    pub fn set_filter(&self, filter: StatusFilter) {
        self.state.lock().filter = filter;
    }

    pub fn report(&self, kind: ErrorKind) {
        debug!(error = %kind, "reporting local error");
        self.state.lock().raise(kind);
    }

    pub fn dismiss_error(&self) {
        self.state.lock().dismiss_error();
    }

    /// Drop the current error once it has been visible long enough.
    pub fn expire_error(&self) -> bool {
        self.state.lock().expire_error(Instant::now())
    }

    /// Stop applying results of in-flight requests.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Fetch the list from the store and replace the local collection.
    pub async fn load(&self) -> bool {
        let Some(result) = self.guarded(self.transport.list()).await else {
            return false;
        };
        match result {
            Ok(tasks) => {
                info!(count = tasks.len(), "loaded tasks");
                self.state.lock().replace_all(tasks);
                true
            }
            Err(err) => {
                warn!(error = %err, "failed to load tasks");
                self.state.lock().raise(ErrorKind::LoadFailed);
                false
            }
        }
    }

    /// Create `draft`, showing it as the pending row until the store answers.
    /// Returns `true` once the created task has been appended.
    pub async fn add(&self, draft: NewTask) -> bool {
        {
            let mut state = self.state.lock();
            if state.pending.is_some() {
                debug!("create already in flight, ignoring add");
                return false;
            }
            state.pending = Some(draft.clone());
        }

        let outcome = self.guarded(self.transport.create(&draft)).await;

        let mut state = self.state.lock();
        state.pending = None;
        match outcome {
            Some(Ok(task)) => {
                debug!(task_id = task.id, "created task");
                state.upsert(task);
                true
            }
            Some(Err(err)) => {
                warn!(error = %err, "failed to create task");
                state.raise(ErrorKind::AddFailed);
                false
            }
            None => false,
        }
    }

    /// Delete the task with `id`. Returns `true` when the store confirmed it.
    pub async fn delete(&self, id: TaskId) -> bool {
        let Some(result) = self.guarded(self.transport.delete(id)).await else {
            return false;
        };
        let mut state = self.state.lock();
        match result {
            Ok(()) => {
                debug!(task_id = id, "deleted task");
                state.remove(id);
                true
            }
            Err(err) => {
                warn!(task_id = id, error = %err, "failed to delete task");
                state.raise(ErrorKind::DeleteFailed);
                false
            }
        }
    }

    /// Send `task` with `change` overlaid and store the server's version.
    /// Returns `true` when the update FAILED so an editing row can stay open.
    pub async fn update(&self, task: &Task, change: TaskChange) -> bool {
        let field = change.as_str();
        let payload = task.with_change(&change);
        let Some(result) = self.guarded(self.transport.update(&payload)).await else {
            return true;
        };
        let mut state = self.state.lock();
        match result {
            Ok(updated) => {
                debug!(task_id = task.id, field, "updated task");
                state.replace(updated);
                false
            }
            Err(err) => {
                warn!(task_id = task.id, field, error = %err, "failed to update task");
                state.raise(ErrorKind::UpdateFailed);
                true
            }
        }
    }

    /// Delete every completed task. Each delete settles on its own: successes
    /// are removed even when others fail.
    pub async fn clear_completed(&self) -> ClearOutcome {
        let (targets, ids) = {
            let mut state = self.state.lock();
            if state.clearing {
                return ClearOutcome::default();
            }
            let targets: Vec<Task> = state
                .tasks
                .iter()
                .filter(|task| task.completed)
                .cloned()
                .collect();
            if targets.is_empty() {
                return ClearOutcome::default();
            }
            let ids = busy_set(&targets);
            state.busy.absorb(&ids);
            state.clearing = true;
            (targets, ids)
        };

        let deletes = targets.iter().map(|task| async move {
            let result = self.transport.delete(task.id).await;
            (task.id, result)
        });
        let settled = self.guarded(join_all(deletes)).await;

        let mut state = self.state.lock();
        state.busy.release(&ids);
        state.clearing = false;

        let mut outcome = ClearOutcome::default();
        for (id, result) in settled.unwrap_or_default() {
            match result {
                Ok(()) => {
                    state.remove(id);
                    outcome.removed.push(id);
                }
                Err(err) => {
                    warn!(task_id = id, error = %err, "failed to clear completed task");
                    state.raise(ErrorKind::DeleteFailed);
                    outcome.failed.push(id);
                }
            }
        }
        info!(
            removed = outcome.removed.len(),
            failed = outcome.failed.len(),
            "cleared completed tasks"
        );
        outcome
    }

    /// Complete every active task, or reopen all tasks when none is active.
    /// The updates succeed or fail together. Returns `true` on success.
    pub async fn toggle_all(&self) -> bool {
        let (ids, targets, completed) = {
            let mut state = self.state.lock();
            let active: Vec<Task> = state
                .tasks
                .iter()
                .filter(|task| task.is_active())
                .cloned()
                .collect();
            let (targets, completed) = if active.is_empty() {
                (state.tasks.clone(), false)
            } else {
                (active, true)
            };
            if targets.is_empty() {
                return false;
            }
            let ids = busy_set(&targets);
            state.busy.absorb(&ids);
            (ids, targets, completed)
        };

        let change = TaskChange::Completed(completed);
        let payloads: Vec<Task> = targets
            .iter()
            .map(|task| task.with_change(&change))
            .collect();
        // Every issued update runs to completion; failures are folded afterwards.
        let updates = payloads.iter().map(|task| self.transport.update(task));
        let result = self
            .guarded(join_all(updates))
            .await
            .map(|settled| settled.into_iter().collect::<Result<Vec<Task>, _>>());

        let mut state = self.state.lock();
        state.busy.release(&ids);
        match result {
            Some(Ok(_)) => {
                state.set_completed(&ids, completed);
                info!(count = ids.len(), completed, "toggled all tasks");
                true
            }
            Some(Err(err)) => {
                warn!(error = %err, completed, "failed to toggle all tasks");
                state.raise(ErrorKind::UpdateFailed);
                false
            }
            None => false,
        }
    }

    async fn guarded<F>(&self, fut: F) -> Option<F::Output>
    where
        F: Future,
    {
        tokio::select! {
            _ = self.cancel.cancelled() => {
                debug!("request abandoned after shutdown");
                None
            }
            output = fut => Some(output),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::testing::{task, FakeTransport};
    use pretty_assertions::assert_eq;

    fn controller_with(fake: &Arc<FakeTransport>) -> TaskListController {
        TaskListController::new(fake.clone(), 1)
    }

    async fn wait_until(mut condition: impl FnMut() -> bool) {
        for _ in 0..200 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition never held");
    }

    fn draft(title: &str) -> NewTask {
        NewTask {
            user_id: 1,
            title: title.into(),
            completed: false,
        }
    }

    #[tokio::test]
    async fn initial_load_populates_summary_and_filters() {
        let fake = FakeTransport::with_tasks(vec![
            task(1, "A", false),
            task(2, "B", true),
            task(3, "C", false),
        ]);
        let controller = controller_with(&fake);

        assert!(controller.load().await);
        controller.set_filter(StatusFilter::Completed);

        let state = controller.snapshot();
        assert_eq!(state.remaining(), 2);
        assert_eq!(state.visible_tasks(), vec![&task(2, "B", true)]);
        assert_eq!(state.error(), None);
    }

    #[tokio::test]
    async fn failed_load_sets_load_error() {
        let fake = FakeTransport::with_tasks(Vec::new());
        fake.fail_list(true);
        let controller = controller_with(&fake);

        assert!(!controller.load().await);
        assert_eq!(controller.snapshot().error(), Some(ErrorKind::LoadFailed));
    }

    #[tokio::test]
    async fn successive_adds_get_distinct_ids() {
        let fake = FakeTransport::with_tasks(Vec::new());
        let controller = controller_with(&fake);

        for title in ["one", "two", "three", "four"] {
            assert!(controller.add(draft(title)).await);
        }

        let state = controller.snapshot();
        let mut ids: Vec<TaskId> = state.tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids.len(), 4);
        assert!(ids.iter().all(|id| *id != 0));
        ids.dedup();
        assert_eq!(ids.len(), 4);
        assert!(state.pending().is_none());
    }

    #[tokio::test]
    async fn failed_add_clears_pending_and_reports() {
        let fake = FakeTransport::with_tasks(Vec::new());
        fake.fail_create(true);
        let controller = controller_with(&fake);

        assert!(!controller.add(draft("nope")).await);
        let state = controller.snapshot();
        assert!(state.tasks().is_empty());
        assert!(state.pending().is_none());
        assert_eq!(state.error(), Some(ErrorKind::AddFailed));
    }

    #[tokio::test]
    async fn pending_create_is_visible_while_in_flight() {
        let fake = FakeTransport::with_tasks(Vec::new());
        let gate = fake.hold_creates();
        let controller = Arc::new(controller_with(&fake));

        let runner = controller.clone();
        let handle = tokio::spawn(async move { runner.add(draft("slow")).await });

        for _ in 0..100 {
            if controller.snapshot().pending().is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        let state = controller.snapshot();
        assert_eq!(state.pending().map(|d| d.title.as_str()), Some("slow"));
        assert!(state.rows().last().is_some_and(|row| row.is_pending()));
        assert!(!controller.add(draft("second")).await);

        gate.open();
        assert!(handle.await.unwrap());
        let state = controller.snapshot();
        assert!(state.pending().is_none());
        assert_eq!(state.tasks().len(), 1);
        assert_eq!(fake.create_calls(), 1);
    }

    #[tokio::test]
    async fn failed_update_keeps_prior_fields() {
        let fake = FakeTransport::with_tasks(vec![task(1, "A", false)]);
        fake.fail_update_for(1);
        let controller = controller_with(&fake);
        controller.load().await;

        let original = task(1, "A", false);
        let failed = controller
            .update(&original, TaskChange::Title("Renamed".into()))
            .await;

        assert!(failed);
        let state = controller.snapshot();
        assert_eq!(state.task(1), Some(&original));
        assert_eq!(state.error(), Some(ErrorKind::UpdateFailed));
    }

    #[tokio::test]
    async fn successful_update_replaces_only_that_task() {
        let fake = FakeTransport::with_tasks(vec![task(1, "A", false), task(2, "B", false)]);
        let controller = controller_with(&fake);
        controller.load().await;

        let failed = controller
            .update(&task(2, "B", false), TaskChange::Completed(true))
            .await;

        assert!(!failed);
        let state = controller.snapshot();
        assert_eq!(state.task(1), Some(&task(1, "A", false)));
        assert_eq!(state.task(2), Some(&task(2, "B", true)));
    }

    #[tokio::test]
    async fn delete_failure_keeps_task_and_reports() {
        let fake = FakeTransport::with_tasks(vec![task(1, "A", false)]);
        fake.fail_delete_for(1);
        let controller = controller_with(&fake);
        controller.load().await;

        assert!(!controller.delete(1).await);
        let state = controller.snapshot();
        assert_eq!(state.tasks().len(), 1);
        assert_eq!(state.error(), Some(ErrorKind::DeleteFailed));
    }

    #[tokio::test]
    async fn clear_completed_makes_partial_progress() {
        let fake = FakeTransport::with_tasks(vec![
            task(1, "A", true),
            task(2, "B", true),
            task(3, "C", false),
        ]);
        fake.fail_delete_for(2);
        let controller = controller_with(&fake);
        controller.load().await;

        let outcome = controller.clear_completed().await;

        assert_eq!(outcome.removed, vec![1]);
        assert_eq!(outcome.failed, vec![2]);
        let state = controller.snapshot();
        let ids: Vec<TaskId> = state.tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(state.error(), Some(ErrorKind::DeleteFailed));
        assert!(state.busy().is_empty());
        assert!(!state.is_clearing());
    }

    #[tokio::test]
    async fn clear_completed_without_failures_leaves_no_error() {
        let fake = FakeTransport::with_tasks(vec![task(1, "A", true), task(2, "B", false)]);
        let controller = controller_with(&fake);
        controller.load().await;

        let outcome = controller.clear_completed().await;
        assert_eq!(outcome.removed, vec![1]);
        assert_eq!(controller.snapshot().error(), None);
    }

    #[tokio::test]
    async fn second_clear_is_ignored_while_one_is_in_flight() {
        let fake = FakeTransport::with_tasks(vec![
            task(1, "A", true),
            task(2, "B", true),
            task(3, "C", false),
        ]);
        let gate = fake.hold_deletes();
        let controller = Arc::new(controller_with(&fake));
        controller.load().await;

        let runner = controller.clone();
        let handle = tokio::spawn(async move { runner.clear_completed().await });
        wait_until(|| fake.delete_calls() == 2).await;

        assert!(controller.snapshot().is_clearing());
        assert_eq!(controller.clear_completed().await, ClearOutcome::default());

        gate.open();
        let outcome = handle.await.unwrap();
        assert_eq!(outcome.removed, vec![1, 2]);
        assert_eq!(fake.delete_calls(), 2);
        assert!(!controller.snapshot().is_clearing());
    }

    #[tokio::test]
    async fn toggle_all_keeps_its_targets_when_a_clear_overlaps() {
        let fake = FakeTransport::with_tasks(vec![task(1, "A", false), task(2, "B", true)]);
        let gate = fake.hold_updates();
        let controller = Arc::new(controller_with(&fake));
        controller.load().await;

        let runner = controller.clone();
        let handle = tokio::spawn(async move { runner.toggle_all().await });
        wait_until(|| fake.update_calls() == 1).await;
        assert!(controller.snapshot().is_busy(1));

        let outcome = controller.clear_completed().await;
        assert_eq!(outcome.removed, vec![2]);
        assert!(controller.snapshot().is_busy(1));

        gate.open();
        assert!(handle.await.unwrap());
        let state = controller.snapshot();
        assert_eq!(state.task(1), Some(&task(1, "A", true)));
        assert_eq!(fake.stored(), vec![task(1, "A", true)]);
        assert!(state.busy().is_empty());
    }

    #[tokio::test]
    async fn toggle_all_lets_sibling_updates_finish_after_a_failure() {
        let fake = FakeTransport::with_tasks(vec![task(1, "A", false), task(2, "B", false)]);
        fake.fail_update_for(1);
        let gate = fake.hold_updates();
        let controller = Arc::new(controller_with(&fake));
        controller.load().await;

        let runner = controller.clone();
        let handle = tokio::spawn(async move { runner.toggle_all().await });
        wait_until(|| fake.update_calls() == 2).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!handle.is_finished());

        gate.open();
        assert!(!handle.await.unwrap());
        assert_eq!(fake.stored()[1], task(2, "B", true));
        let state = controller.snapshot();
        assert_eq!(state.remaining(), 2);
        assert_eq!(state.error(), Some(ErrorKind::UpdateFailed));
    }

    #[tokio::test]
    async fn toggle_all_completes_every_active_task() {
        let fake = FakeTransport::with_tasks(vec![task(1, "A", false), task(2, "B", true)]);
        let controller = controller_with(&fake);
        controller.load().await;

        assert!(controller.toggle_all().await);
        let state = controller.snapshot();
        assert!(state.all_completed());
        assert!(state.busy().is_empty());
        assert_eq!(fake.update_calls(), 1);
    }

    #[tokio::test]
    async fn toggle_all_reopens_when_everything_is_done() {
        let fake = FakeTransport::with_tasks(vec![task(1, "A", true), task(2, "B", true)]);
        let controller = controller_with(&fake);
        controller.load().await;

        assert!(controller.toggle_all().await);
        assert_eq!(controller.snapshot().remaining(), 2);
    }

    #[tokio::test]
    async fn toggle_all_fails_together() {
        let fake = FakeTransport::with_tasks(vec![
            task(1, "A", false),
            task(2, "B", false),
            task(3, "C", false),
        ]);
        fake.fail_update_for(2);
        let controller = controller_with(&fake);
        controller.load().await;

        assert!(!controller.toggle_all().await);
        let state = controller.snapshot();
        assert_eq!(state.remaining(), 3);
        assert_eq!(state.error(), Some(ErrorKind::UpdateFailed));
        assert!(state.busy().is_empty());
    }

    #[tokio::test]
    async fn shutdown_abandons_in_flight_requests() {
        let fake = FakeTransport::with_tasks(Vec::new());
        let _gate = fake.hold_creates();
        let controller = Arc::new(controller_with(&fake));

        let runner = controller.clone();
        let handle = tokio::spawn(async move { runner.add(draft("never")).await });
        tokio::time::sleep(Duration::from_millis(20)).await;
        controller.shutdown();

        assert!(!handle.await.unwrap());
        let state = controller.snapshot();
        assert!(state.tasks().is_empty());
        assert!(state.pending().is_none());
        assert_eq!(state.error(), None);
    }

    #[tokio::test]
    async fn reported_errors_can_be_dismissed() {
        let controller = controller_with(&FakeTransport::with_tasks(Vec::new()));
        controller.report(ErrorKind::EmptyTitle);
        assert_eq!(controller.snapshot().error(), Some(ErrorKind::EmptyTitle));
        assert!(!controller.expire_error());
        controller.dismiss_error();
        assert_eq!(controller.snapshot().error(), None);
    }
}
