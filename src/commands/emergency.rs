//! Usage: Emergency screen (responsible contact, one-tap calls, public emergency numbers).

use super::report;
use crate::app_state::AppState;
use crate::emergency::{self, EmergencyService, EmergencyState, CALL_FAILED_MESSAGE, EMERGENCY_SERVICES};
use crate::notice::{self, NoticeLevel};
use crate::shared::error::AppResult;

pub async fn emergency_mount(state: &AppState) -> EmergencyState {
    let next = state.emergency.mount().await;
    if let EmergencyState::Failed(message) = &next {
        report(state, notice::build(NoticeLevel::Error, None, message.clone()));
    }
    next
}

pub fn emergency_services() -> &'static [EmergencyService] {
    &EMERGENCY_SERVICES
}

pub async fn emergency_call_responsible(state: &AppState) -> AppResult<()> {
    let result = state.emergency.dial_responsible(state.opener.as_ref()).await;
    report_call_failure(state, result)
}

/// Dials an arbitrary number (SOS, 190, 192, 193, ...).
pub async fn emergency_call(state: &AppState, number: &str) -> AppResult<()> {
    let result = emergency::dial(state.opener.as_ref(), number).await;
    report_call_failure(state, result)
}

fn report_call_failure(state: &AppState, result: AppResult<()>) -> AppResult<()> {
    if result.is_err() {
        report(
            state,
            notice::build(NoticeLevel::Error, None, CALL_FAILED_MESSAGE.to_string()),
        );
    }
    result
}
