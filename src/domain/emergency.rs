//! Usage: Emergency screen (responsible contact fetch + one-tap dialing).

use crate::api_client::CompanionApi;
use crate::session::Session;
use crate::shared::error::{AppError, AppResult};
use crate::shared::mutex_ext::MutexExt;
use crate::shared::serde_ext::string_or_number;
use crate::shortcuts::UrlOpener;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

pub(crate) const CALL_FAILED_MESSAGE: &str = "Não foi possível iniciar a chamada.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Responsible {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub elderly: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EmergencyService {
    pub label: &'static str,
    pub number: &'static str,
}

/// SOS dials the first entry.
pub const EMERGENCY_SERVICES: [EmergencyService; 3] = [
    EmergencyService {
        label: "Polícia",
        number: "190",
    },
    EmergencyService {
        label: "SAMU",
        number: "192",
    },
    EmergencyService {
        label: "Bombeiros",
        number: "193",
    },
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum EmergencyState {
    Loading,
    Loaded(Responsible),
    Failed(String),
}

/// Builds a `tel:` URI, keeping only characters a dialer understands.
pub fn tel_uri(number: &str) -> Option<String> {
    let digits: String = number
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '+' | '*' | '#'))
        .collect();
    if digits.is_empty() {
        return None;
    }
    Some(format!("tel:{digits}"))
}

pub async fn dial(opener: &dyn UrlOpener, number: &str) -> AppResult<()> {
    let uri = tel_uri(number)
        .ok_or_else(|| AppError::Validation(format!("invalid phone number: {number:?}")))?;
    opener.open(&uri).await.map_err(|err| {
        tracing::warn!(uri = %uri, "dial failed: {}", err);
        AppError::Validation(CALL_FAILED_MESSAGE.to_string())
    })
}

pub struct EmergencyScreen {
    session: Arc<Session>,
    api: Arc<dyn CompanionApi>,
    state: Mutex<EmergencyState>,
}

impl EmergencyScreen {
    pub fn new(session: Arc<Session>, api: Arc<dyn CompanionApi>) -> Self {
        Self {
            session,
            api,
            state: Mutex::new(EmergencyState::Loading),
        }
    }

    pub fn state(&self) -> EmergencyState {
        self.state.lock_or_recover().clone()
    }

    /// Fetches the responsible record on every mount; nothing is cached across visits.
    pub async fn mount(&self) -> EmergencyState {
        *self.state.lock_or_recover() = EmergencyState::Loading;

        self.session.reload();
        let next = match self.session.require_credential() {
            Err(err) => EmergencyState::Failed(err.message()),
            Ok(credential) => match self.api.get_responsible(&credential).await {
                Ok(responsible) => EmergencyState::Loaded(responsible),
                Err(err) => {
                    tracing::warn!(error_code = err.code(), "responsible fetch failed: {}", err);
                    EmergencyState::Failed(failure_message(&err))
                }
            },
        };

        *self.state.lock_or_recover() = next.clone();
        next
    }

    pub async fn dial_responsible(&self, opener: &dyn UrlOpener) -> AppResult<()> {
        let phone = match self.state() {
            EmergencyState::Loaded(responsible) => responsible.phone,
            _ => {
                return Err(AppError::Validation(
                    "responsible contact is not loaded".to_string(),
                ))
            }
        };
        dial(opener, &phone).await
    }
}

fn failure_message(err: &AppError) -> String {
    match err {
        AppError::Server { status, .. } => format!("Falha ao carregar contato ({status})"),
        AppError::Auth { .. } => crate::shared::error::SESSION_EXPIRED_MESSAGE.to_string(),
        _ => "Não foi possível carregar o contato.".to_string(),
    }
}
