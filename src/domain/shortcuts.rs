//! Usage: Shortcuts to other apps (ordered URL candidates, first openable wins).

use crate::shared::error::{AppError, AppResult};
use serde::Serialize;

pub(crate) const OPEN_FAILED_TITLE: &str = "Não foi possível abrir";
pub(crate) const OPEN_FAILED_MESSAGE: &str = "Verifique se o aplicativo está instalado.";
pub(crate) const SHORTCUT_INFO_TITLE: &str = "Atalho";

/// Platform hook for launching URLs (deep links, `tel:`, web pages).
#[async_trait::async_trait]
pub trait UrlOpener: Send + Sync {
    async fn can_open(&self, url: &str) -> bool;
    async fn open(&self, url: &str) -> Result<(), String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShortcutAction {
    /// Try each URL in order.
    Open { urls: &'static [&'static str] },
    /// No integration yet; only an informational message.
    Info { message: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Shortcut {
    pub label: &'static str,
    pub action: ShortcutAction,
}

pub const SHORTCUTS: [Shortcut; 6] = [
    Shortcut {
        label: "WhatsApp",
        action: ShortcutAction::Open {
            urls: &["whatsapp://send", "https://wa.me/"],
        },
    },
    Shortcut {
        label: "Telefone",
        action: ShortcutAction::Open { urls: &["tel:"] },
    },
    Shortcut {
        label: "Mapas",
        action: ShortcutAction::Open {
            urls: &["geo:0,0?q=", "http://maps.google.com/maps"],
        },
    },
    Shortcut {
        label: "YouTube",
        action: ShortcutAction::Open {
            urls: &["vnd.youtube://", "https://youtube.com"],
        },
    },
    Shortcut {
        label: "Calendário",
        action: ShortcutAction::Info {
            message: "Podemos ligar no calendário do sistema.",
        },
    },
    Shortcut {
        label: "Contatos",
        action: ShortcutAction::Info {
            message: "Podemos abrir contatos do sistema.",
        },
    },
];

pub fn find(label: &str) -> Option<&'static Shortcut> {
    let label = label.trim();
    SHORTCUTS
        .iter()
        .find(|s| s.label.eq_ignore_ascii_case(label))
}

/// Opens the first candidate the platform accepts and returns it.
pub async fn try_open(opener: &dyn UrlOpener, urls: &[&str]) -> AppResult<String> {
    for url in urls {
        if !opener.can_open(url).await {
            tracing::debug!(url, "url not openable; trying next candidate");
            continue;
        }
        opener.open(url).await.map_err(|err| {
            tracing::warn!(url, "open failed: {}", err);
            AppError::Validation(OPEN_FAILED_MESSAGE.to_string())
        })?;
        return Ok((*url).to_string());
    }
    Err(AppError::Validation(OPEN_FAILED_MESSAGE.to_string()))
}

/// Shell-side opener that accepts common schemes and only records the launch in the log.
#[derive(Debug, Default)]
pub struct LoggingOpener;

const LOGGING_OPENER_SCHEMES: [&str; 3] = ["http:", "https:", "tel:"];

#[async_trait::async_trait]
impl UrlOpener for LoggingOpener {
    async fn can_open(&self, url: &str) -> bool {
        LOGGING_OPENER_SCHEMES
            .iter()
            .any(|scheme| url.starts_with(scheme))
    }

    async fn open(&self, url: &str) -> Result<(), String> {
        tracing::info!(url, "open url");
        Ok(())
    }
}

#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingOpener {
    refused: Vec<String>,
    refuse_all: bool,
    opened: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl RecordingOpener {
    pub(crate) fn refusing(prefixes: &[&str]) -> Self {
        Self {
            refused: prefixes.iter().map(|p| p.to_string()).collect(),
            ..Self::default()
        }
    }

    pub(crate) fn refusing_all() -> Self {
        Self {
            refuse_all: true,
            ..Self::default()
        }
    }

    pub(crate) fn opened(&self) -> Vec<String> {
        use crate::shared::mutex_ext::MutexExt;
        self.opened.lock_or_recover().clone()
    }
}

#[cfg(test)]
#[async_trait::async_trait]
impl UrlOpener for RecordingOpener {
    async fn can_open(&self, url: &str) -> bool {
        !self.refuse_all && !self.refused.iter().any(|p| url.starts_with(p.as_str()))
    }

    async fn open(&self, url: &str) -> Result<(), String> {
        use crate::shared::mutex_ext::MutexExt;
        if self.refuse_all {
            return Err("no handler".to_string());
        }
        self.opened.lock_or_recover().push(url.to_string());
        Ok(())
    }
}
