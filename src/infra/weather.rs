//! Usage: Current weather lookup for the launch check-in (open-meteo forecast API, no auth).

use crate::settings::AppSettings;
use crate::shared::error::{AppError, AppResult};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const NEXT_HOURS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Weather {
    pub temp: Option<f64>,
    pub wind: Option<f64>,
    pub code: Option<i64>,
    /// Hourly temperatures starting at the current hour.
    pub next_hours: Vec<f64>,
}

#[async_trait::async_trait]
pub trait WeatherSource: Send + Sync {
    async fn current(&self, at: Coordinates) -> AppResult<Weather>;
}

pub struct OpenMeteoClient {
    client: reqwest::Client,
    base_url: Url,
    timeout: Option<Duration>,
}

impl OpenMeteoClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> AppResult<Self> {
        let base_url = base_url.trim();
        let base_url = Url::parse(base_url)
            .map_err(|e| AppError::Validation(format!("invalid weather_base_url={base_url}: {e}")))?;
        Ok(Self {
            client: crate::api_client::build_http_client()?,
            base_url,
            timeout,
        })
    }

    pub fn from_settings(settings: &AppSettings) -> AppResult<Self> {
        Self::new(&settings.weather_base_url, settings.request_timeout())
    }

    fn forecast_url(&self, at: Coordinates) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                AppError::Validation(format!("invalid weather_base_url={}", self.base_url))
            })?
            .pop_if_empty()
            .extend(["v1", "forecast"]);
        url.query_pairs_mut()
            .append_pair("latitude", &at.latitude.to_string())
            .append_pair("longitude", &at.longitude.to_string())
            .append_pair("current_weather", "true")
            .append_pair("hourly", "temperature_2m")
            .append_pair("forecast_days", "1")
            .append_pair("timezone", "auto");
        Ok(url)
    }
}

/// Lenient view of the forecast payload; anything missing or non-numeric becomes `None`.
pub(crate) fn parse_forecast(root: &serde_json::Value) -> Weather {
    let current = root.get("current_weather");
    let number = |key: &str| current.and_then(|c| c.get(key)).and_then(|v| v.as_f64());

    let next_hours = root
        .get("hourly")
        .and_then(|h| h.get("temperature_2m"))
        .and_then(|v| v.as_array())
        .map(|temps| {
            temps
                .iter()
                .take(NEXT_HOURS)
                .filter_map(|v| v.as_f64())
                .collect()
        })
        .unwrap_or_default();

    Weather {
        temp: number("temperature"),
        wind: number("windspeed"),
        code: current
            .and_then(|c| c.get("weathercode"))
            .and_then(|v| v.as_f64())
            .map(|v| v as i64),
        next_hours,
    }
}

#[async_trait::async_trait]
impl WeatherSource for OpenMeteoClient {
    async fn current(&self, at: Coordinates) -> AppResult<Weather> {
        let url = self.forecast_url(at)?;
        let mut request = self.client.get(url);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::from_transport(&e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::from_status(
                status,
                status.canonical_reason().unwrap_or_default(),
            ));
        }

        let root: serde_json::Value = response.json().await.map_err(|e| AppError::Server {
            status: status.as_u16(),
            message: format!("invalid forecast body: {e}"),
        })?;
        Ok(parse_forecast(&root))
    }
}
