use serde::Serialize;
use tracing::{info, instrument};

use crate::{
    aggregate::aggregate,
    error::FetchError,
    model::{CurrentConditions, DailySummary, WeatherRequest},
    provider::WeatherProvider,
};

/// Outcome of one refresh. Each half succeeds or fails on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct Refresh {
    pub current: Result<CurrentConditions, FetchError>,
    pub forecast: Result<Vec<DailySummary>, FetchError>,
}

impl Refresh {
    pub fn is_total_failure(&self) -> bool {
        self.current.is_err() && self.forecast.is_err()
    }
}

/// JSON view of a [`Refresh`], with errors flattened to their user messages.
#[derive(Debug, Serialize)]
pub struct RefreshReport<'a> {
    pub current: Option<&'a CurrentConditions>,
    pub current_error: Option<String>,
    pub forecast: Option<&'a [DailySummary]>,
    pub forecast_error: Option<String>,
}

impl<'a> From<&'a Refresh> for RefreshReport<'a> {
    fn from(r: &'a Refresh) -> Self {
        Self {
            current: r.current.as_ref().ok(),
            current_error: r.current.as_ref().err().map(FetchError::user_message),
            forecast: r.forecast.as_deref().ok(),
            forecast_error: r.forecast.as_ref().err().map(FetchError::user_message),
        }
    }
}

/// Fetch current conditions and the forecast concurrently, then fold the
/// forecast into at most `horizon_days` daily summaries.
#[instrument(skip(provider, request), fields(location = %request.location()))]
pub async fn refresh(
    provider: &dyn WeatherProvider,
    request: &WeatherRequest,
    horizon_days: usize,
) -> Refresh {
    let (current, samples) =
        tokio::join!(provider.fetch_current(request), provider.fetch_forecast(request));

    let forecast = samples.map(|samples| aggregate(&samples, horizon_days));

    info!(
        current_ok = current.is_ok(),
        forecast_days = forecast.as_ref().map_or(0, Vec::len),
        "refresh finished"
    );

    Refresh { current, forecast }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ForecastSample, UnitSystem};
    use async_trait::async_trait;
    use chrono::{NaiveDateTime, Utc};

    #[derive(Debug)]
    struct StubProvider {
        current: Result<CurrentConditions, FetchError>,
        forecast: Result<Vec<ForecastSample>, FetchError>,
    }

    #[async_trait]
    impl WeatherProvider for StubProvider {
        async fn fetch_current(
            &self,
            _request: &WeatherRequest,
        ) -> Result<CurrentConditions, FetchError> {
            self.current.clone()
        }

        async fn fetch_forecast(
            &self,
            _request: &WeatherRequest,
        ) -> Result<Vec<ForecastSample>, FetchError> {
            self.forecast.clone()
        }
    }

    fn current() -> CurrentConditions {
        CurrentConditions {
            location_name: "Oslo".into(),
            country: "NO".into(),
            temperature: -1.0,
            feels_like: -5.0,
            temp_min: -2.0,
            temp_max: 0.0,
            pressure: 1009,
            humidity_pct: 80,
            wind_speed: 3.0,
            wind_direction: 90,
            condition: None,
            sunrise: Utc::now(),
            sunset: Utc::now(),
        }
    }

    fn samples(days: u32) -> Vec<ForecastSample> {
        (1..=days)
            .map(|d| ForecastSample {
                timestamp: Utc::now(),
                local_time: NaiveDateTime::parse_from_str(
                    &format!("2024-12-{d:02} 12:00:00"),
                    "%Y-%m-%d %H:%M:%S",
                )
                .unwrap(),
                temp_min: 0.0,
                temp_max: 1.0,
                humidity_pct: 60,
                wind_speed: 1.0,
                conditions: Vec::new(),
                precipitation_probability: 0.2,
            })
            .collect()
    }

    fn request() -> WeatherRequest {
        WeatherRequest::new("Oslo", "KEY").unwrap().with_units(UnitSystem::Metric)
    }

    #[tokio::test]
    async fn both_halves_succeed_and_forecast_is_capped() {
        let provider = StubProvider {
            current: Ok(current()),
            forecast: Ok(samples(6)),
        };

        let r = refresh(&provider, &request(), 5).await;

        assert_eq!(r.current.unwrap().location_name, "Oslo");
        assert_eq!(r.forecast.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn forecast_failure_keeps_current() {
        let provider = StubProvider {
            current: Ok(current()),
            forecast: Err(FetchError::ServerError(502)),
        };

        let r = refresh(&provider, &request(), 5).await;

        assert!(r.current.is_ok());
        assert_eq!(r.forecast, Err(FetchError::ServerError(502)));
        assert!(!r.is_total_failure());
    }

    #[tokio::test]
    async fn current_failure_keeps_forecast() {
        let provider = StubProvider {
            current: Err(FetchError::NotFound),
            forecast: Ok(samples(2)),
        };

        let r = refresh(&provider, &request(), 5).await;

        assert_eq!(r.current, Err(FetchError::NotFound));
        assert_eq!(r.forecast.as_ref().map(Vec::len), Ok(2));
    }

    #[tokio::test]
    async fn report_flattens_errors_to_messages() {
        let provider = StubProvider {
            current: Err(FetchError::Unauthorized),
            forecast: Err(FetchError::RateLimited),
        };

        let r = refresh(&provider, &request(), 5).await;
        assert!(r.is_total_failure());

        let json = serde_json::to_value(RefreshReport::from(&r)).unwrap();
        assert_eq!(json["current"], serde_json::Value::Null);
        assert_eq!(json["current_error"], "Invalid API key");
        assert_eq!(json["forecast_error"], "Request limit exceeded");
    }
}
