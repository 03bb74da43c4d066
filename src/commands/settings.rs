//! Usage: Settings read/write (`settings.json`); new values apply on the next launch.

use super::report;
use crate::app_state::AppState;
use crate::notice;
use crate::settings::{self, AppSettings};
use crate::shared::error::{AppError, AppResult};

pub fn settings_get(state: &AppState) -> AppSettings {
    state.settings.clone()
}

pub fn settings_set(state: &AppState, next: &AppSettings) -> AppResult<AppSettings> {
    match settings::write(&state.data_dir, next) {
        Ok(saved) => {
            tracing::info!(base_url = %saved.base_url, "settings saved");
            Ok(saved)
        }
        Err(err) => {
            let err = AppError::Validation(err);
            report(state, notice::from_error(&err, "Não foi possível salvar."));
            Err(err)
        }
    }
}
