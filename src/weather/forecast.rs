use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use crate::action::{bind_slots, Action, ActionBinding};
use crate::error::DispatchResult;
use crate::weather::client::{WeatherProvider, WeatherReport};

/// Intent name this action is bound to.
pub const GET_FORECAST_INTENT: &str = "Weather.GetForecast";

const FORECAST_DAYS: u8 = 5;

/// Slot values the classifier extracts for a forecast request.
#[derive(Debug, Default, Deserialize)]
struct ForecastSlots {
    #[serde(rename = "Place", default)]
    place: String,
}

/// Fetches a five-day forecast for the requested place and renders it as an
/// adaptive-card-shaped payload. An unrecognised place fulfills to
/// `Value::Null`, which the handler turns into a "not a real city" reply.
pub struct GetForecastAction {
    provider: Arc<dyn WeatherProvider>,
    place: String,
}

impl GetForecastAction {
    pub fn new(provider: Arc<dyn WeatherProvider>, place: impl Into<String>) -> Self {
        Self {
            provider,
            place: place.into(),
        }
    }
}

#[async_trait]
impl Action for GetForecastAction {
    async fn fulfill(&mut self, cancel: &CancellationToken) -> DispatchResult<Value> {
        let report = self
            .provider
            .forecast(&self.place, FORECAST_DAYS, cancel)
            .await?;
        Ok(match report {
            Some(report) if !report.days.is_empty() => build_card(&self.place, &report),
            _ => Value::Null,
        })
    }
}

/// Static binding for [`GET_FORECAST_INTENT`], with the provider injected at
/// startup rather than looked up inside the action.
pub fn forecast_binding(provider: Arc<dyn WeatherProvider>) -> ActionBinding {
    ActionBinding::new(
        GET_FORECAST_INTENT,
        "Get the weather in a location",
        move |slots| {
            let args: ForecastSlots = bind_slots(slots);
            Box::new(GetForecastAction::new(provider.clone(), args.place))
        },
    )
}

fn build_card(place: &str, report: &WeatherReport) -> Value {
    let current = &report.current;
    let today = NaiveDateTime::parse_from_str(&current.last_updated, "%Y-%m-%d %H:%M")
        .ok()
        .map(|dt| dt.weekday());
    let day_name = today.map(weekday_name).unwrap_or_default();

    let current_columns = json!({
        "type": "ColumnSet",
        "columns": [
            {
                "type": "Column",
                "size": "35",
                "items": [
                    { "type": "Image", "url": icon_url(&current.icon) }
                ]
            },
            {
                "type": "Column",
                "size": "65",
                "items": [
                    text_block(&format!("{} ({})", report.location, day_name), "large", false),
                    text_block(&format!("{}\u{00b0} F", truncate(current.temp_f)), "large", true),
                    text_block(&current.condition, "medium", true),
                    text_block(
                        &format!("Winds {} mph {}", current.wind_mph, current.wind_dir),
                        "medium",
                        true,
                    ),
                ]
            }
        ]
    });

    let forecast_columns: Vec<Value> = report
        .days
        .iter()
        .filter(|day| {
            // The backend's first forecast day repeats the current day.
            let weekday = NaiveDate::parse_from_str(&day.date, "%Y-%m-%d")
                .ok()
                .map(|date| date.weekday());
            weekday.is_some() && weekday != today
        })
        .map(|day| {
            let abbrev = NaiveDate::parse_from_str(&day.date, "%Y-%m-%d")
                .map(|date| weekday_name(date.weekday())[..3].to_string())
                .unwrap_or_default();
            json!({
                "type": "Column",
                "size": "20",
                "selectAction": {
                    "type": "Action.OpenUrl",
                    "url": format!("https://www.bing.com/search?q=forecast in {place}")
                },
                "items": [
                    text_block(&abbrev, "medium", true),
                    { "type": "Image", "size": "auto", "url": icon_url(&day.icon) },
                    text_block(
                        &format!("{}/{}", truncate(day.min_temp_f), truncate(day.max_temp_f)),
                        "medium",
                        true,
                    ),
                ]
            })
        })
        .collect();

    json!({
        "type": "AdaptiveCard",
        "speak": format!(
            "<s>Today the temperature is {}</s><s>Winds are {} miles per hour from the {}</s>",
            current.temp_f, current.wind_mph, current.wind_dir
        ),
        "body": [
            current_columns,
            { "type": "ColumnSet", "columns": forecast_columns }
        ]
    })
}

fn text_block(text: &str, size: &str, subtle: bool) -> Value {
    json!({
        "type": "TextBlock",
        "text": text,
        "size": size,
        "horizontalAlignment": "center",
        "isSubtle": subtle,
        "separation": "none"
    })
}

fn weekday_name(weekday: Weekday) -> String {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
    .to_string()
}

fn truncate(temp: f64) -> i64 {
    temp.trunc() as i64
}

/// Some clients reject scheme-relative icon urls.
fn icon_url(url: &str) -> String {
    if url.is_empty() || url.starts_with("http") {
        url.to_string()
    } else {
        format!("https:{url}")
    }
}
