use std::env;

use async_trait::async_trait;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::error::{DispatchError, DispatchResult};

const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";

/// Weather-data retrieval capability. `Ok(None)` means the place was not
/// recognised, which is a normal outcome rather than a fault.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn forecast(
        &self,
        place: &str,
        days: u8,
        cancel: &CancellationToken,
    ) -> DispatchResult<Option<WeatherReport>>;
}

/// Current conditions plus a dated forecast for one location.
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherReport {
    pub location: String,
    pub current: CurrentConditions,
    pub days: Vec<ForecastDay>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentConditions {
    /// Local timestamp of the observation, `YYYY-MM-DD HH:MM`.
    pub last_updated: String,
    pub temp_f: f64,
    pub wind_mph: f64,
    pub wind_dir: String,
    pub condition: String,
    pub icon: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastDay {
    /// `YYYY-MM-DD`.
    pub date: String,
    pub min_temp_f: f64,
    pub max_temp_f: f64,
    pub icon: String,
}

/// Connection settings for the weather backend, injected at startup.
#[derive(Debug, Clone)]
pub struct WeatherSettings {
    pub base_url: String,
    pub api_key: String,
}

impl WeatherSettings {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn from_env() -> DispatchResult<Self> {
        let base_url = env::var("PALAVER_WEATHER_BASE_URL")
            .ok()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let api_key = env::var("PALAVER_WEATHER_KEY")
            .map_err(|_| DispatchError::Binding("missing PALAVER_WEATHER_KEY".to_string()))?;
        Ok(Self { base_url, api_key })
    }
}

/// [`WeatherProvider`] speaking the APIXU-style `forecast.json` protocol.
pub struct HttpWeatherClient {
    settings: WeatherSettings,
    http: reqwest::Client,
}

impl HttpWeatherClient {
    pub fn new(settings: WeatherSettings) -> Self {
        Self {
            settings,
            http: reqwest::Client::new(),
        }
    }

    fn forecast_url(&self, place: &str, days: u8) -> String {
        format!(
            "{}/forecast.json?key={}&days={}&q={}",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.api_key,
            days,
            urlencoding::encode(place),
        )
    }
}

#[async_trait]
impl WeatherProvider for HttpWeatherClient {
    async fn forecast(
        &self,
        place: &str,
        days: u8,
        cancel: &CancellationToken,
    ) -> DispatchResult<Option<WeatherReport>> {
        let request = self.http.get(self.forecast_url(place, days)).send();
        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(DispatchError::Cancelled),
            response = request => response
                .map_err(|error| DispatchError::Fulfillment(error.to_string()))?,
        };
        // The backend answers 400 for places it cannot match.
        if response.status() == reqwest::StatusCode::BAD_REQUEST {
            return Ok(None);
        }
        let response = response
            .error_for_status()
            .map_err(|error| DispatchError::Fulfillment(error.to_string()))?;
        let body = tokio::select! {
            _ = cancel.cancelled() => return Err(DispatchError::Cancelled),
            body = response.json::<ForecastResponse>() => body
                .map_err(|error| DispatchError::Fulfillment(error.to_string()))?,
        };
        Ok(Some(body.into_report()))
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    location: Location,
    current: Current,
    forecast: Forecast,
}

#[derive(Debug, Deserialize)]
struct Location {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Current {
    last_updated: String,
    temp_f: f64,
    wind_mph: f64,
    wind_dir: String,
    condition: Condition,
}

#[derive(Debug, Deserialize)]
struct Condition {
    text: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Deserialize)]
struct Forecast {
    #[serde(default)]
    forecastday: Vec<ApiForecastDay>,
}

#[derive(Debug, Deserialize)]
struct ApiForecastDay {
    date: String,
    day: Day,
}

#[derive(Debug, Deserialize)]
struct Day {
    mintemp_f: f64,
    maxtemp_f: f64,
    condition: Condition,
}

impl ForecastResponse {
    fn into_report(self) -> WeatherReport {
        WeatherReport {
            location: self.location.name,
            current: CurrentConditions {
                last_updated: self.current.last_updated,
                temp_f: self.current.temp_f,
                wind_mph: self.current.wind_mph,
                wind_dir: self.current.wind_dir,
                condition: self.current.condition.text,
                icon: self.current.condition.icon,
            },
            days: self
                .forecast
                .forecastday
                .into_iter()
                .map(|day| ForecastDay {
                    date: day.date,
                    min_temp_f: day.day.mintemp_f,
                    max_temp_f: day.day.maxtemp_f,
                    icon: day.day.condition.icon,
                })
                .collect(),
        }
    }
}
