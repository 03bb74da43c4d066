//! Usage: Shell-facing command handlers.
//!
//! Every handler runs one screen operation against [`crate::AppState`] and reports failures to
//! the shell's notice sink before returning them; nothing here retries or exits.

mod auth;
mod checkin;
mod emergency;
mod settings;
mod shortcuts;
mod tasks;

pub use auth::*;
pub use checkin::*;
pub use emergency::*;
pub use settings::*;
pub use shortcuts::*;
pub use tasks::*;

use crate::app_state::AppState;
use crate::notice::{self, NoticeEventPayload, NoticeLevel};
use crate::shared::error::AppError;

fn report(state: &AppState, payload: NoticeEventPayload) {
    notice::emit(state.notices.as_ref(), payload);
}

/// `"{prefix} ({status})"` when the server answered, `fallback` otherwise.
/// Session and validation errors keep their own text.
fn status_notice(err: &AppError, prefix: &str, fallback: &str) -> NoticeEventPayload {
    match err {
        AppError::Session(_) | AppError::Validation(_) => notice::from_error(err, fallback),
        _ => match err.status() {
            Some(status) => notice::build(NoticeLevel::Error, None, format!("{prefix} ({status})")),
            None => notice::build(NoticeLevel::Error, None, fallback.to_string()),
        },
    }
}
