use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, instrument, warn};

use crate::{
    error::FetchError,
    model::{CurrentConditions, ForecastSample, WeatherCondition, WeatherRequest},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

const DT_TXT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Client for the OpenWeather 2.5 `weather` and `forecast` endpoints.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    base_url: String,
    http: Client,
}

impl Default for OpenWeatherClient {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenWeatherClient {
    pub fn new() -> Self {
        Self::with_http_client(Client::new())
    }

    /// Use a preconfigured client, e.g. one carrying a request timeout.
    pub fn with_http_client(http: Client) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            http,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: &WeatherRequest,
    ) -> Result<T, FetchError> {
        let url = format!("{}/{endpoint}", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", request.location()),
                ("appid", request.api_key()),
                ("units", request.units().as_str()),
                ("lang", request.language()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            debug!(
                endpoint,
                status = status.as_u16(),
                body = %truncate_body(&body),
                "OpenWeather returned an error status"
            );
            return Err(FetchError::from_status(status));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    #[instrument(
        skip(self, request),
        fields(location = %request.location(), units = %request.units())
    )]
    async fn fetch_current(
        &self,
        request: &WeatherRequest,
    ) -> Result<CurrentConditions, FetchError> {
        let current = self
            .get_json::<OwCurrentResponse>("weather", request)
            .await
            .and_then(OwCurrentResponse::into_domain)
            .inspect_err(|e| warn!(error = %e, "current weather unavailable"))?;

        debug!(name = %current.location_name, temp = current.temperature, "fetched current weather");

        Ok(current)
    }

    #[instrument(
        skip(self, request),
        fields(location = %request.location(), units = %request.units())
    )]
    async fn fetch_forecast(
        &self,
        request: &WeatherRequest,
    ) -> Result<Vec<ForecastSample>, FetchError> {
        let samples = self
            .get_json::<OwForecastResponse>("forecast", request)
            .await
            .and_then(OwForecastResponse::into_domain)
            .inspect_err(|e| warn!(error = %e, "forecast unavailable"))?;

        debug!(samples = samples.len(), "fetched forecast");

        Ok(samples)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    pressure: u32,
    humidity: i64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    id: u32,
    main: String,
    description: String,
    icon: String,
}

impl From<OwWeather> for WeatherCondition {
    fn from(w: OwWeather) -> Self {
        WeatherCondition {
            id: w.id,
            main: w.main,
            description: w.description,
            icon: w.icon,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    #[serde(default)]
    deg: u16,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: String,
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
    sys: OwSys,
}

impl OwCurrentResponse {
    fn into_domain(self) -> Result<CurrentConditions, FetchError> {
        Ok(CurrentConditions {
            location_name: self.name,
            country: self.sys.country,
            temperature: self.main.temp,
            feels_like: self.main.feels_like,
            temp_min: self.main.temp_min,
            temp_max: self.main.temp_max,
            pressure: self.main.pressure,
            humidity_pct: humidity(self.main.humidity)?,
            wind_speed: self.wind.speed,
            wind_direction: self.wind.deg,
            condition: self.weather.into_iter().next().map(WeatherCondition::from),
            sunrise: unix_to_utc(self.sys.sunrise)?,
            sunset: unix_to_utc(self.sys.sunset)?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp_min: f64,
    temp_max: f64,
    humidity: i64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwForecastMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
    dt_txt: String,
    #[serde(default)]
    pop: f64,
}

impl OwForecastEntry {
    fn into_domain(self) -> Result<ForecastSample, FetchError> {
        let local_time = NaiveDateTime::parse_from_str(&self.dt_txt, DT_TXT_FORMAT).map_err(|e| {
            FetchError::InvalidResponse(format!("bad dt_txt '{}': {e}", self.dt_txt))
        })?;

        if !(0.0..=1.0).contains(&self.pop) {
            return Err(FetchError::InvalidResponse(format!(
                "precipitation probability {} outside 0..=1",
                self.pop
            )));
        }

        Ok(ForecastSample {
            timestamp: unix_to_utc(self.dt)?,
            local_time,
            temp_min: self.main.temp_min,
            temp_max: self.main.temp_max,
            humidity_pct: humidity(self.main.humidity)?,
            wind_speed: self.wind.speed,
            conditions: self.weather.into_iter().map(WeatherCondition::from).collect(),
            precipitation_probability: self.pop,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

impl OwForecastResponse {
    fn into_domain(self) -> Result<Vec<ForecastSample>, FetchError> {
        debug!(city = %self.city.name, country = %self.city.country, "forecast location");

        self.list.into_iter().map(OwForecastEntry::into_domain).collect()
    }
}

fn humidity(raw: i64) -> Result<u8, FetchError> {
    u8::try_from(raw)
        .ok()
        .filter(|h| *h <= 100)
        .ok_or_else(|| FetchError::InvalidResponse(format!("humidity {raw} outside 0..=100")))
}

fn unix_to_utc(ts: i64) -> Result<DateTime<Utc>, FetchError> {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .ok_or_else(|| FetchError::InvalidResponse(format!("timestamp {ts} out of range")))
}

fn truncate_body(body: &str) -> &str {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
