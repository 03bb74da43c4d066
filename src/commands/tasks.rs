//! Usage: Today screen (task list mount, pull-to-refresh, completion toggle).

use super::{report, status_notice};
use crate::app_state::AppState;
use crate::shared::error::AppResult;
use crate::tasks::{Task, ToggleCommand};
use std::sync::Arc;

const LOAD_FAILED_PREFIX: &str = "Falha ao carregar";
const LOAD_FAILED_FALLBACK: &str = "Não foi possível carregar as tarefas";
const TOGGLE_FAILED_PREFIX: &str = "Falha ao completar";
const TOGGLE_FAILED_FALLBACK: &str = "Não foi possível completar a tarefa.";

pub async fn tasks_mount(state: &AppState) -> AppResult<Arc<Vec<Task>>> {
    match state.tasks.mount().await {
        Ok(_) => Ok(state.tasks.tasks()),
        Err(err) => {
            report(state, status_notice(&err, LOAD_FAILED_PREFIX, LOAD_FAILED_FALLBACK));
            Err(err)
        }
    }
}

pub async fn tasks_refresh(state: &AppState) -> AppResult<Arc<Vec<Task>>> {
    match state.tasks.refresh().await {
        Ok(_) => Ok(state.tasks.tasks()),
        Err(err) => {
            report(state, status_notice(&err, LOAD_FAILED_PREFIX, LOAD_FAILED_FALLBACK));
            Err(err)
        }
    }
}

/// Only a failed `PUT` fails the command; a failed reload afterwards is reported but the
/// committed toggle is still returned.
pub async fn tasks_toggle(state: &AppState, task_id: &str) -> AppResult<ToggleCommand> {
    let toggle = match state.tasks.toggle_complete(task_id).await {
        Ok(toggle) => toggle,
        Err(err) => {
            report(
                state,
                status_notice(&err, TOGGLE_FAILED_PREFIX, TOGGLE_FAILED_FALLBACK),
            );
            return Err(err);
        }
    };

    if let Err(err) = &toggle.reload {
        report(state, status_notice(err, LOAD_FAILED_PREFIX, LOAD_FAILED_FALLBACK));
    }
    Ok(toggle.command)
}
