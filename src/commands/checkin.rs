//! Usage: Launch check-in gate (greeting card, weather card, "Estou bem!").

use crate::app_state::AppState;
use crate::checkin::{self, GateState};
use crate::weather::Coordinates;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckInView {
    pub greeting: &'static str,
    pub state: GateState,
    pub summary: String,
}

/// `location` is `None` when the shell was denied the location permission.
pub async fn checkin_open(state: &AppState, location: Option<Coordinates>) -> CheckInView {
    let gate = state.checkin.open(state.weather.as_ref(), location).await;
    CheckInView {
        greeting: checkin::greeting_now(),
        summary: gate.summary(),
        state: gate,
    }
}

pub fn checkin_dismiss(state: &AppState) -> bool {
    state.checkin.dismiss();
    state.checkin.is_visible()
}
