//! Usage: Apps screen (shortcut grid).

use super::report;
use crate::app_state::AppState;
use crate::notice::{self, NoticeLevel};
use crate::shared::error::{AppError, AppResult};
use crate::shortcuts::{
    self, Shortcut, ShortcutAction, OPEN_FAILED_MESSAGE, OPEN_FAILED_TITLE, SHORTCUTS,
    SHORTCUT_INFO_TITLE,
};

pub fn shortcuts_list() -> &'static [Shortcut] {
    &SHORTCUTS
}

/// Returns the URL that was opened, or `None` for info-only shortcuts.
pub async fn shortcut_open(state: &AppState, label: &str) -> AppResult<Option<String>> {
    let Some(shortcut) = shortcuts::find(label) else {
        let err = AppError::Validation(format!("unknown shortcut: {label}"));
        report(state, notice::from_error(&err, OPEN_FAILED_MESSAGE));
        return Err(err);
    };

    match shortcut.action {
        ShortcutAction::Info { message } => {
            report(
                state,
                notice::build(
                    NoticeLevel::Info,
                    Some(SHORTCUT_INFO_TITLE.to_string()),
                    message.to_string(),
                ),
            );
            Ok(None)
        }
        ShortcutAction::Open { urls } => match shortcuts::try_open(state.opener.as_ref(), urls).await {
            Ok(url) => Ok(Some(url)),
            Err(err) => {
                report(
                    state,
                    notice::build(
                        NoticeLevel::Error,
                        Some(OPEN_FAILED_TITLE.to_string()),
                        OPEN_FAILED_MESSAGE.to_string(),
                    ),
                );
                Err(err)
            }
        },
    }
}
