use crate::{
    Config, FetchError,
    model::{CurrentConditions, ForecastSample, WeatherRequest},
    provider::openweather::OpenWeatherClient,
};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use std::fmt::Debug;

pub mod openweather;

/// Source of current conditions and 3-hourly forecast samples.
///
/// Implementations hold no per-request state; each call is one attempt and
/// the two calls are independent of each other.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_current(
        &self,
        request: &WeatherRequest,
    ) -> Result<CurrentConditions, FetchError>;

    async fn fetch_forecast(
        &self,
        request: &WeatherRequest,
    ) -> Result<Vec<ForecastSample>, FetchError>;
}

/// Construct the provider described by `config`: HTTP timeout and an
/// optional base URL override.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let mut builder = Client::builder();
    if let Some(timeout) = config.request_timeout() {
        builder = builder.timeout(timeout);
    }
    let http = builder.build().context("Failed to build HTTP client")?;

    let mut client = OpenWeatherClient::with_http_client(http);
    if let Some(base_url) = config.base_url.as_deref() {
        client = client.with_base_url(base_url);
    }

    Ok(Box::new(client))
}
