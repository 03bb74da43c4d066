//! Usage: Login / logout and session bootstrap for the shell's first screen.

use super::report;
use crate::app_state::AppState;
use crate::auth::{self, LoginMode};
use crate::notice;
use crate::session::SessionState;
use crate::shared::error::AppResult;

const LOGIN_FAILED_FALLBACK: &str = "Erro ao entrar";

/// Decides which screen the shell opens on launch.
pub fn session_bootstrap(state: &AppState) -> SessionState {
    state.session.bootstrap()
}

pub async fn auth_login(state: &AppState, email: &str, password: &str) -> AppResult<()> {
    let mode = LoginMode::from_use_endpoint(state.settings.use_endpoint);
    let result = auth::login(&state.session, state.api.as_ref(), mode, email, password).await;
    if let Err(err) = &result {
        tracing::warn!(error_code = err.code(), "login failed: {}", err);
        report(state, notice::from_error(err, LOGIN_FAILED_FALLBACK));
    }
    result
}

pub fn auth_logout(state: &AppState) -> SessionState {
    auth::logout(&state.session);
    state.session.state()
}
