//! Usage: Today's task list with optimistic completion toggles and rollback.
//!
//! The local list is replaced wholesale on every change (read-modify-replace), never
//! mutated in place. A toggle runs as a [`ToggleCommand`]:
//! - `Pending`: the local `done` flag is flipped and the `PUT` is in flight.
//! - `Committed`: the server accepted it; the list is reloaded from the server.
//! - `RolledBack`: the request failed; the task is restored to its pre-toggle value.
//!
//! A toggle dropped before the request resolves is undone like a failed one.
//!
//! Toggles on distinct ids run concurrently; toggles on the same id are serialized so a late
//! rollback can never overwrite a newer optimistic state for that id.

use crate::api_client::CompanionApi;
use crate::auth::Credential;
use crate::session::{Session, SessionState};
use crate::shared::error::{AppError, AppResult};
use crate::shared::keyed_lock::KeyedLocks;
use crate::shared::mutex_ext::MutexExt;
use crate::shared::serde_ext::string_or_number;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

pub(crate) const RELOGIN_FOR_TASKS_MESSAGE: &str =
    "Faça login novamente para carregar suas tarefas.";
pub const EMPTY_LIST_MESSAGE: &str = "Sem tarefas para hoje.";

/// Task record as served by `GET /elderly/tasks/today`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiTask {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub id: String,
    pub description: String,
    pub date: String,
    /// Client-local and speculative; the server does not report completion.
    pub done: bool,
}

impl From<ApiTask> for Task {
    fn from(value: ApiTask) -> Self {
        Self {
            id: value.id,
            description: value.description,
            date: value.date,
            done: false,
        }
    }
}

impl Task {
    /// Text read aloud for this task.
    pub fn speech_text(&self) -> String {
        format!("{}. {}", self.description, self.date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleState {
    Pending,
    Committed,
    RolledBack,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleCommand {
    pub task_id: String,
    pub previous_done: bool,
    pub state: ToggleState,
}

impl ToggleCommand {
    fn new(task_id: &str, previous_done: bool) -> Self {
        Self {
            task_id: task_id.to_string(),
            previous_done,
            state: ToggleState::Pending,
        }
    }

    pub fn optimistic_done(&self) -> bool {
        !self.previous_done
    }

    fn commit(&mut self) {
        debug_assert_eq!(self.state, ToggleState::Pending);
        self.state = ToggleState::Committed;
    }

    fn roll_back(&mut self) {
        debug_assert_eq!(self.state, ToggleState::Pending);
        self.state = ToggleState::RolledBack;
    }
}

/// Outcome of a committed toggle. The reload runs after the commit and may fail on its own.
#[derive(Debug)]
pub struct ToggleReport {
    pub command: ToggleCommand,
    pub reload: AppResult<usize>,
}

#[derive(Default)]
pub(crate) struct TaskList {
    tasks: Mutex<Arc<Vec<Task>>>,
}

impl TaskList {
    pub(crate) fn snapshot(&self) -> Arc<Vec<Task>> {
        Arc::clone(&self.tasks.lock_or_recover())
    }

    pub(crate) fn replace(&self, next: Vec<Task>) {
        *self.tasks.lock_or_recover() = Arc::new(next);
    }

    /// Builds the next collection from the current one and swaps it in atomically.
    fn update<R>(&self, f: impl FnOnce(&[Task]) -> (Vec<Task>, R)) -> R {
        let mut guard = self.tasks.lock_or_recover();
        let (next, out) = f(guard.as_slice());
        *guard = Arc::new(next);
        out
    }

    /// Flips `done` for `task_id`, returning the previous value.
    fn flip(&self, task_id: &str) -> Option<bool> {
        self.update(|prev| {
            let mut previous = None;
            let next: Vec<Task> = prev
                .iter()
                .map(|t| {
                    if t.id == task_id {
                        previous = Some(t.done);
                        Task {
                            done: !t.done,
                            ..t.clone()
                        }
                    } else {
                        t.clone()
                    }
                })
                .collect();
            (next, previous)
        })
    }

    /// Sets `done` for `task_id` only; other tasks are carried over untouched.
    fn restore(&self, task_id: &str, done: bool) -> bool {
        self.update(|prev| {
            let mut found = false;
            let next: Vec<Task> = prev
                .iter()
                .map(|t| {
                    if t.id == task_id {
                        found = true;
                        Task { done, ..t.clone() }
                    } else {
                        t.clone()
                    }
                })
                .collect();
            (next, found)
        })
    }
}

/// Undoes an optimistic flip when the toggle future is dropped before the `PUT` resolves.
struct PendingFlip<'a> {
    list: &'a TaskList,
    task_id: &'a str,
    previous_done: bool,
    armed: bool,
}

impl Drop for PendingFlip<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.list.restore(self.task_id, self.previous_done);
        tracing::debug!(task_id = self.task_id, "abandoned toggle rolled back");
    }
}

pub struct TaskSync {
    session: Arc<Session>,
    api: Arc<dyn CompanionApi>,
    list: TaskList,
    in_flight: KeyedLocks,
}

impl TaskSync {
    pub fn new(session: Arc<Session>, api: Arc<dyn CompanionApi>) -> Self {
        Self {
            session,
            api,
            list: TaskList::default(),
            in_flight: KeyedLocks::default(),
        }
    }

    /// Current rendered list.
    pub fn tasks(&self) -> Arc<Vec<Task>> {
        self.list.snapshot()
    }

    pub fn task(&self, task_id: &str) -> Option<Task> {
        self.list.snapshot().iter().find(|t| t.id == task_id).cloned()
    }

    pub fn is_toggle_in_flight(&self, task_id: &str) -> bool {
        self.in_flight.is_busy(task_id)
    }

    /// Screen mount: re-read the stored credential and, when present, load the list.
    pub async fn mount(&self) -> AppResult<usize> {
        if self.session.reload() == SessionState::NoCredential {
            return Err(AppError::Session(RELOGIN_FOR_TASKS_MESSAGE.to_string()));
        }
        self.refresh().await
    }

    /// Pull-to-refresh with the session credential.
    pub async fn refresh(&self) -> AppResult<usize> {
        let credential = self.session.require_credential()?;
        self.load_tasks(&credential).await
    }

    /// Replaces the local list with today's tasks (all pending). Leaves it untouched on failure.
    pub async fn load_tasks(&self, credential: &Credential) -> AppResult<usize> {
        let fetched = self.api.list_today_tasks(credential).await.map_err(|err| {
            tracing::warn!(error_code = err.code(), "task load failed: {}", err);
            err
        })?;

        let next: Vec<Task> = fetched.into_iter().map(Task::from).collect();
        let count = next.len();
        self.list.replace(next);
        tracing::debug!(count, "task list replaced");
        Ok(count)
    }

    pub async fn toggle_complete(&self, task_id: &str) -> AppResult<ToggleReport> {
        let credential = self.session.require_credential()?;

        if self.task(task_id).is_none() {
            return Err(AppError::Validation(format!("unknown task id: {task_id}")));
        }

        let _slot = self.in_flight.acquire(task_id).await;

        let Some(previous_done) = self.list.flip(task_id) else {
            // Removed by a reload while waiting on an earlier toggle of the same id.
            return Err(AppError::Validation(format!("unknown task id: {task_id}")));
        };
        let mut command = ToggleCommand::new(task_id, previous_done);
        let mut pending = PendingFlip {
            list: &self.list,
            task_id,
            previous_done,
            armed: true,
        };
        tracing::debug!(
            task_id,
            done = command.optimistic_done(),
            "optimistic toggle applied"
        );

        if let Err(err) = self.api.complete_task(&credential, task_id).await {
            pending.armed = false;
            if !self.list.restore(task_id, command.previous_done) {
                tracing::debug!(task_id, "rollback target no longer listed");
            }
            command.roll_back();
            tracing::warn!(
                task_id,
                error_code = err.code(),
                "toggle rolled back: {}",
                err
            );
            return Err(err);
        }

        pending.armed = false;
        command.commit();
        tracing::info!(task_id, "toggle committed; reloading list");

        let reload = self.load_tasks(&credential).await;
        Ok(ToggleReport { command, reload })
    }
}

#[cfg(test)]
mod tests;
