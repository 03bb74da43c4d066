//! Usage: Launch check-in gate (greeting + local weather, dismissed with "Estou bem!").

use crate::shared::mutex_ext::MutexExt;
use crate::weather::{Coordinates, Weather, WeatherSource};
use chrono::Timelike;
use serde::Serialize;
use std::sync::Mutex;

pub fn greeting(hour: u32) -> &'static str {
    if hour < 12 {
        "Bom dia"
    } else if hour < 18 {
        "Boa tarde"
    } else {
        "Boa noite"
    }
}

pub fn greeting_now() -> &'static str {
    greeting(chrono::Local::now().hour())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "weather", rename_all = "snake_case")]
pub enum GateState {
    Loading,
    PermissionDenied,
    Ready(Weather),
    Unavailable,
}

impl GateState {
    /// Line shown in the weather card.
    pub fn summary(&self) -> String {
        match self {
            Self::Loading => "Carregando...".to_string(),
            Self::PermissionDenied => {
                "Permita localização para mostrar o clima da sua região.".to_string()
            }
            Self::Unavailable => "Não foi possível carregar o clima.".to_string(),
            Self::Ready(weather) => {
                let Some(temp) = weather.temp else {
                    return "Não foi possível carregar o clima.".to_string();
                };
                let mut lines = vec![format!("{}°C", temp.round())];
                if !weather.next_hours.is_empty() {
                    let hours: Vec<String> = weather
                        .next_hours
                        .iter()
                        .map(|t| format!("{}°", t.round()))
                        .collect();
                    lines.push(format!("Próximas horas: {}", hours.join(" · ")));
                }
                if let Some(wind) = weather.wind {
                    lines.push(format!("Vento: {} km/h", wind.round()));
                }
                lines.join("\n")
            }
        }
    }
}

pub struct CheckInGate {
    visible: Mutex<bool>,
    state: Mutex<GateState>,
}

impl Default for CheckInGate {
    fn default() -> Self {
        Self {
            visible: Mutex::new(true),
            state: Mutex::new(GateState::Loading),
        }
    }
}

impl CheckInGate {
    pub fn is_visible(&self) -> bool {
        *self.visible.lock_or_recover()
    }

    pub fn state(&self) -> GateState {
        self.state.lock_or_recover().clone()
    }

    /// `location` is `None` when the user denied the location permission.
    /// Weather failures are swallowed; the gate simply shows no data.
    pub async fn open(&self, weather: &dyn WeatherSource, location: Option<Coordinates>) -> GateState {
        *self.state.lock_or_recover() = GateState::Loading;

        let next = match location {
            None => GateState::PermissionDenied,
            Some(at) => match weather.current(at).await {
                Ok(current) => GateState::Ready(current),
                Err(err) => {
                    tracing::debug!(error_code = err.code(), "check-in weather unavailable: {}", err);
                    GateState::Unavailable
                }
            },
        };

        *self.state.lock_or_recover() = next.clone();
        next
    }

    /// "Estou bem!"
    pub fn dismiss(&self) {
        *self.visible.lock_or_recover() = false;
        tracing::info!("check-in confirmed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::error::AppError;
    use crate::test_support::FixedWeather;

    const HERE: Coordinates = Coordinates {
        latitude: -23.55,
        longitude: -46.63,
    };

    #[test]
    fn greeting_boundaries() {
        assert_eq!(greeting(0), "Bom dia");
        assert_eq!(greeting(11), "Bom dia");
        assert_eq!(greeting(12), "Boa tarde");
        assert_eq!(greeting(17), "Boa tarde");
        assert_eq!(greeting(18), "Boa noite");
        assert_eq!(greeting(23), "Boa noite");
    }

    #[tokio::test]
    async fn denied_permission_skips_weather() {
        let gate = CheckInGate::default();
        let source = FixedWeather(Err(AppError::Network("unreachable".to_string())));
        assert_eq!(gate.open(&source, None).await, GateState::PermissionDenied);
    }

    #[tokio::test]
    async fn weather_failure_is_silent() {
        let gate = CheckInGate::default();
        let source = FixedWeather(Err(AppError::Network("offline".to_string())));
        assert_eq!(gate.open(&source, Some(HERE)).await, GateState::Unavailable);
        assert!(gate.is_visible());
    }

    #[tokio::test]
    async fn ready_summary_rounds_values() {
        let gate = CheckInGate::default();
        let source = FixedWeather(Ok(Weather {
            temp: Some(24.6),
            wind: Some(9.4),
            code: Some(1),
            next_hours: vec![20.2, 21.5],
        }));
        let state = gate.open(&source, Some(HERE)).await;
        assert_eq!(
            state.summary(),
            "25°C\nPróximas horas: 20° · 22°\nVento: 9 km/h"
        );

        gate.dismiss();
        assert!(!gate.is_visible());
    }
}
