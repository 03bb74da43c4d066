//! Usage: Error taxonomy shared by every screen-facing operation.

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppError {
    /// A required input is missing or refers to nothing.
    #[error("VALIDATION_ERROR: {0}")]
    Validation(String),
    /// No credential is stored locally.
    #[error("SESSION_ERROR: {0}")]
    Session(String),
    /// The server rejected the credential.
    #[error("AUTH_ERROR: {message}")]
    Auth { status: Option<u16>, message: String },
    #[error("NETWORK_ERROR: {0}")]
    Network(String),
    #[error("SERVER_ERROR: status={status} {message}")]
    Server { status: u16, message: String },
    #[error("STORAGE_ERROR: {0}")]
    Storage(String),
}

pub(crate) const SESSION_EXPIRED_MESSAGE: &str = "Faça login novamente.";

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Session(_) => "SESSION_ERROR",
            Self::Auth { .. } => "AUTH_ERROR",
            Self::Network(_) => "NETWORK_ERROR",
            Self::Server { .. } => "SERVER_ERROR",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    pub(crate) fn session() -> Self {
        Self::Session(SESSION_EXPIRED_MESSAGE.to_string())
    }

    /// Status code reported by the server, when the failure came from one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Auth { status, .. } => *status,
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short human-readable text without the error code prefix.
    pub fn message(&self) -> String {
        match self {
            Self::Validation(msg)
            | Self::Session(msg)
            | Self::Network(msg)
            | Self::Storage(msg) => msg.clone(),
            Self::Auth { message, .. } => message.clone(),
            Self::Server { status, message } => {
                if message.is_empty() {
                    format!("status {status}")
                } else {
                    message.clone()
                }
            }
        }
    }

    pub(crate) fn from_status(status: reqwest::StatusCode, message: impl Into<String>) -> Self {
        match status.as_u16() {
            401 | 403 => Self::Auth {
                status: Some(status.as_u16()),
                message: message.into(),
            },
            code => Self::Server {
                status: code,
                message: message.into(),
            },
        }
    }

    pub(crate) fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Network(format!("request timed out: {err}"));
        }
        if err.is_connect() {
            return Self::Network(format!("connection failed: {err}"));
        }
        Self::Network(err.to_string())
    }
}
