//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather client and its failure classification
//! - Aggregation of 3-hourly forecast samples into daily summaries
//! - A refresh pipeline reporting current weather and forecast independently
//!
//! It is used by `forecast-cli`, but can also be reused by other binaries or services.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod refresh;

pub use aggregate::{DEFAULT_HORIZON_DAYS, DEFAULT_ICON, aggregate};
pub use config::Config;
pub use error::FetchError;
pub use model::{
    CurrentConditions, DailySummary, ForecastSample, UnitSystem, WeatherCondition, WeatherRequest,
};
pub use provider::{WeatherProvider, openweather::OpenWeatherClient, provider_from_config};
pub use refresh::{Refresh, RefreshReport, refresh};
