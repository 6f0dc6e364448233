//! Weather-forecast fulfillment: the data-provider capability, its HTTP
//! client, and the action bound to the `Weather.GetForecast` intent.

pub mod client;
pub mod forecast;

pub use client::{
    CurrentConditions, ForecastDay, HttpWeatherClient, WeatherProvider, WeatherReport,
    WeatherSettings,
};
pub use forecast::{forecast_binding, GetForecastAction, GET_FORECAST_INTENT};
