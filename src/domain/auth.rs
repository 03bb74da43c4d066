//! Usage: Basic credential construction and the login/logout flow.

use crate::api_client::CompanionApi;
use crate::session::Session;
use crate::shared::error::{AppError, AppResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

pub(crate) const MISSING_FIELDS_MESSAGE: &str = "Preencha e-mail e senha";
pub(crate) const INVALID_CREDENTIALS_MESSAGE: &str = "Usuário ou senha inválidos";

/// Opaque Basic-auth payload (`base64("email:password")`).
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn from_login(email: &str, password: &str) -> Self {
        Self(STANDARD.encode(format!("{email}:{password}")))
    }

    /// Wraps an already-encoded token; blank input yields `None`.
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        Some(Self(token.to_string()))
    }

    pub fn token(&self) -> &str {
        &self.0
    }

    pub fn header_value(&self) -> String {
        format!("Basic {}", self.0)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginMode {
    /// Probe `GET /users` before accepting the credential.
    Verified,
    /// Accept any non-empty credential without a request.
    LocalOnly,
}

impl LoginMode {
    pub fn from_use_endpoint(use_endpoint: bool) -> Self {
        if use_endpoint {
            Self::Verified
        } else {
            Self::LocalOnly
        }
    }
}

pub async fn login(
    session: &Session,
    api: &dyn CompanionApi,
    mode: LoginMode,
    email: &str,
    password: &str,
) -> AppResult<()> {
    if email.is_empty() || password.is_empty() {
        return Err(AppError::Validation(MISSING_FIELDS_MESSAGE.to_string()));
    }

    let credential = Credential::from_login(email, password);

    if mode == LoginMode::Verified {
        api.probe_login(&credential).await.map_err(|err| match err {
            AppError::Server { status, .. } => AppError::Auth {
                status: Some(status),
                message: INVALID_CREDENTIALS_MESSAGE.to_string(),
            },
            other => other,
        })?;
    }

    session.save(credential)?;
    tracing::info!(mode = ?mode, "login succeeded");
    Ok(())
}

pub fn logout(session: &Session) {
    session.clear();
    tracing::info!("logged out");
}
