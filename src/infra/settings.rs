//! Usage: Persisted application settings (schema + read/write helpers).

use crate::shared::fs::{read_optional_string, write_file_atomic};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const SCHEMA_VERSION: u32 = 2;
const SCHEMA_VERSION_ADD_WEATHER_BASE_URL: u32 = 2;
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_WEATHER_BASE_URL: &str = "https://api.open-meteo.com";
const DEFAULT_USE_ENDPOINT: bool = true;
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u32 = 15;
const MAX_REQUEST_TIMEOUT_SECONDS: u32 = 5 * 60;
pub const DEFAULT_LOG_RETENTION_DAYS: u32 = 7;
const MAX_LOG_RETENTION_DAYS: u32 = 365;
const SETTINGS_FILE_NAME: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub schema_version: u32,
    pub base_url: String,
    // false = local-only login (always succeeds without probing `/users`).
    pub use_endpoint: bool,
    // 0 = no per-request timeout.
    pub request_timeout_seconds: u32,
    pub weather_base_url: String,
    pub log_retention_days: u32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            base_url: DEFAULT_BASE_URL.to_string(),
            use_endpoint: DEFAULT_USE_ENDPOINT,
            request_timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECONDS,
            weather_base_url: DEFAULT_WEATHER_BASE_URL.to_string(),
            log_retention_days: DEFAULT_LOG_RETENTION_DAYS,
        }
    }
}

impl AppSettings {
    pub fn request_timeout(&self) -> Option<Duration> {
        match self.request_timeout_seconds {
            0 => None,
            secs => Some(Duration::from_secs(u64::from(secs))),
        }
    }
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

fn validate_http_url(field: &str, raw: &str) -> Result<(), String> {
    let url = reqwest::Url::parse(raw).map_err(|e| format!("{field} is not a valid url: {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("{field} must use http or https, got {other}")),
    }
}

fn sanitize_urls(settings: &mut AppSettings) -> bool {
    let mut changed = false;

    let base_url = normalize_base_url(&settings.base_url);
    let base_url = if validate_http_url("base_url", &base_url).is_ok() {
        base_url
    } else {
        DEFAULT_BASE_URL.to_string()
    };
    if base_url != settings.base_url {
        settings.base_url = base_url;
        changed = true;
    }

    let weather_base_url = normalize_base_url(&settings.weather_base_url);
    let weather_base_url = if validate_http_url("weather_base_url", &weather_base_url).is_ok() {
        weather_base_url
    } else {
        DEFAULT_WEATHER_BASE_URL.to_string()
    };
    if weather_base_url != settings.weather_base_url {
        settings.weather_base_url = weather_base_url;
        changed = true;
    }

    changed
}

fn sanitize_request_timeout(settings: &mut AppSettings) -> bool {
    if settings.request_timeout_seconds > MAX_REQUEST_TIMEOUT_SECONDS {
        settings.request_timeout_seconds = MAX_REQUEST_TIMEOUT_SECONDS;
        return true;
    }
    false
}

fn sanitize_log_retention_days(settings: &mut AppSettings) -> bool {
    if settings.log_retention_days == 0 {
        settings.log_retention_days = DEFAULT_LOG_RETENTION_DAYS;
        return true;
    }
    if settings.log_retention_days > MAX_LOG_RETENTION_DAYS {
        settings.log_retention_days = MAX_LOG_RETENTION_DAYS;
        return true;
    }
    false
}

fn migrate_add_weather_base_url(settings: &mut AppSettings, schema_version_present: bool) -> bool {
    // v2: Add the check-in weather endpoint (defaulted by serde when absent).
    if schema_version_present && settings.schema_version >= SCHEMA_VERSION_ADD_WEATHER_BASE_URL {
        return false;
    }

    // A missing schema_version forces one write so the migration does not rerun on every launch.
    let mut changed = !schema_version_present;

    if settings.schema_version != SCHEMA_VERSION_ADD_WEATHER_BASE_URL {
        settings.schema_version = SCHEMA_VERSION_ADD_WEATHER_BASE_URL;
        changed = true;
    }

    changed
}

pub fn settings_path(data_dir: &Path) -> PathBuf {
    data_dir.join(SETTINGS_FILE_NAME)
}

fn parse_settings_json(content: &str) -> Result<(AppSettings, bool), String> {
    let raw: serde_json::Value = serde_json::from_str(content)
        .map_err(|e| format!("failed to parse {SETTINGS_FILE_NAME}: {e}"))?;
    let schema_version_present = raw.get("schema_version").is_some();
    let settings: AppSettings = serde_json::from_value(raw)
        .map_err(|e| format!("failed to parse {SETTINGS_FILE_NAME}: {e}"))?;
    Ok((settings, schema_version_present))
}

pub fn read(data_dir: &Path) -> Result<AppSettings, String> {
    let path = settings_path(data_dir);

    let Some(content) = read_optional_string(&path)? else {
        let settings = AppSettings::default();
        // Best-effort: create the default file so the config is discoverable/editable.
        if let Err(err) = write(data_dir, &settings) {
            tracing::warn!("failed to create default settings: {}", err);
        }
        return Ok(settings);
    };

    let (mut settings, schema_version_present) = parse_settings_json(&content)?;

    let mut repaired = false;
    repaired |= migrate_add_weather_base_url(&mut settings, schema_version_present);
    repaired |= sanitize_urls(&mut settings);
    repaired |= sanitize_request_timeout(&mut settings);
    repaired |= sanitize_log_retention_days(&mut settings);
    if repaired {
        tracing::info!(path = %path.display(), "settings repaired; persisting sanitized values");
        // Best-effort: persist repaired values while keeping read semantics.
        let _ = write(data_dir, &settings);
    }

    Ok(settings)
}

/// Falls back to defaults when the file is unreadable, logging the reason once.
pub fn read_or_default(data_dir: &Path) -> AppSettings {
    match read(data_dir) {
        Ok(settings) => settings,
        Err(err) => {
            tracing::warn!("settings read failed, using defaults: {}", err);
            AppSettings::default()
        }
    }
}

pub fn write(data_dir: &Path, settings: &AppSettings) -> Result<AppSettings, String> {
    let mut next = settings.clone();
    next.base_url = normalize_base_url(&next.base_url);
    next.weather_base_url = normalize_base_url(&next.weather_base_url);

    validate_http_url("base_url", &next.base_url)?;
    validate_http_url("weather_base_url", &next.weather_base_url)?;
    if next.request_timeout_seconds > MAX_REQUEST_TIMEOUT_SECONDS {
        return Err(format!(
            "request_timeout_seconds must be <= {MAX_REQUEST_TIMEOUT_SECONDS}"
        ));
    }
    if next.log_retention_days == 0 {
        return Err("log_retention_days must be >= 1".to_string());
    }
    if next.log_retention_days > MAX_LOG_RETENTION_DAYS {
        return Err(format!(
            "log_retention_days must be <= {MAX_LOG_RETENTION_DAYS}"
        ));
    }
    next.schema_version = SCHEMA_VERSION;

    let content = serde_json::to_vec_pretty(&next)
        .map_err(|e| format!("failed to serialize settings: {e}"))?;
    write_file_atomic(&settings_path(data_dir), &content)?;

    Ok(next)
}
