//! Notice (user-facing alert) module.
//!
//! Usage:
//! - Screens report failures through `commands::*`, which turn them into notices
//! - The UI shell implements [`NoticeSink`] to show a blocking alert; the CLI prints to stderr

use crate::shared::error::AppError;
use crate::shared::mutex_ext::MutexExt;
use std::sync::Mutex;

const NOTICE_PREFIX: &str = "ZELO";

pub(crate) const SESSION_TITLE: &str = "Sessão";

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct NoticeEventPayload {
    pub level: NoticeLevel,
    pub title: String,
    pub body: String,
}

pub trait NoticeSink: Send + Sync {
    fn notify(&self, payload: NoticeEventPayload);
}

fn default_title(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Info => "Aviso",
        NoticeLevel::Success => "Sucesso",
        NoticeLevel::Warning => "Atenção",
        NoticeLevel::Error => "Erro",
    }
}

fn normalize_optional_title(title: Option<String>) -> Option<String> {
    let title = title?;
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}

fn format_title(level: NoticeLevel, title: Option<String>) -> String {
    let title = normalize_optional_title(title).unwrap_or_else(|| default_title(level).to_string());
    format!("{NOTICE_PREFIX} · {title}")
}

pub fn build(level: NoticeLevel, title: Option<String>, body: String) -> NoticeEventPayload {
    NoticeEventPayload {
        level,
        title: format_title(level, title),
        body,
    }
}

/// Alert for a failed operation; `fallback` is used when the error carries no useful text.
pub fn from_error(err: &AppError, fallback: &str) -> NoticeEventPayload {
    match err {
        AppError::Session(msg) => build(
            NoticeLevel::Warning,
            Some(SESSION_TITLE.to_string()),
            msg.clone(),
        ),
        AppError::Validation(msg) | AppError::Auth { message: msg, .. } => {
            build(NoticeLevel::Error, None, msg.clone())
        }
        _ => build(NoticeLevel::Error, None, fallback.to_string()),
    }
}

pub fn emit(sink: &dyn NoticeSink, payload: NoticeEventPayload) {
    tracing::debug!(level = ?payload.level, title = %payload.title, "notice");
    sink.notify(payload);
}

/// Prints notices to stderr (CLI shell).
#[derive(Debug, Default)]
pub struct StderrNoticeSink;

impl NoticeSink for StderrNoticeSink {
    fn notify(&self, payload: NoticeEventPayload) {
        eprintln!("[{}] {}", payload.title, payload.body);
    }
}

/// Keeps every notice in memory, in order.
#[derive(Debug, Default)]
pub struct RecordingNoticeSink {
    notices: Mutex<Vec<NoticeEventPayload>>,
}

impl RecordingNoticeSink {
    pub fn notices(&self) -> Vec<NoticeEventPayload> {
        self.notices.lock_or_recover().clone()
    }
}

impl NoticeSink for RecordingNoticeSink {
    fn notify(&self, payload: NoticeEventPayload) {
        self.notices.lock_or_recover().push(payload);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_title_falls_back_to_level_default() {
        let payload = build(NoticeLevel::Error, Some("  ".to_string()), "x".to_string());
        assert_eq!(payload.title, "ZELO · Erro");
        let payload = build(NoticeLevel::Info, Some(" Atalho ".to_string()), "y".to_string());
        assert_eq!(payload.title, "ZELO · Atalho");
    }

    #[test]
    fn session_errors_use_session_title() {
        let payload = from_error(&AppError::session(), "unused");
        assert_eq!(payload.level, NoticeLevel::Warning);
        assert_eq!(payload.title, "ZELO · Sessão");
        assert_eq!(payload.body, "Faça login novamente.");
    }

    #[test]
    fn transport_errors_use_fallback_text() {
        let payload = from_error(
            &AppError::Network("connection refused".to_string()),
            "Não foi possível carregar as tarefas",
        );
        assert_eq!(payload.body, "Não foi possível carregar as tarefas");
    }

    #[test]
    fn recording_sink_keeps_order() {
        let sink = RecordingNoticeSink::default();
        emit(&sink, build(NoticeLevel::Info, None, "a".to_string()));
        emit(&sink, build(NoticeLevel::Error, None, "b".to_string()));
        let bodies: Vec<String> = sink.notices().into_iter().map(|n| n.body).collect();
        assert_eq!(bodies, vec!["a", "b"]);
    }
}
