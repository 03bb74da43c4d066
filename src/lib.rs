mod app;
pub mod commands;
mod domain;
mod infra;
mod shared;
#[cfg(test)]
mod test_support;

pub use app::{app_state, logging, notice};
pub use domain::{auth, checkin, emergency, session, shortcuts, tasks};
pub use infra::{api_client, app_paths, credential_store, settings, weather};
pub use shared::error::{AppError, AppResult};

pub use app_state::{AppState, ShellHooks};

/// Resolves the data dir, installs logging and builds the shared state for a shell.
pub fn start(hooks: ShellHooks) -> Result<AppState, String> {
    let data_dir = app_paths::app_data_dir()?;
    let retention_days = settings::read_or_default(&data_dir).log_retention_days;
    logging::init(&app_paths::logs_dir(&data_dir), retention_days);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        data_dir = %data_dir.display(),
        "starting"
    );
    AppState::load(data_dir, hooks).map_err(|err| err.to_string())
}
