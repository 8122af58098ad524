use anyhow::{Result, anyhow};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Measurement convention the provider is asked to report values in.
///
/// Deserialization goes through `TryFrom<String>`, so config files accept the
/// same spellings as the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    pub const fn all() -> &'static [UnitSystem] {
        &[UnitSystem::Metric, UnitSystem::Imperial]
    }

    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "°C",
            UnitSystem::Imperial => "°F",
        }
    }

    pub fn wind_speed_unit(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "m/s",
            UnitSystem::Imperial => "mph",
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for UnitSystem {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "metric" => Ok(UnitSystem::Metric),
            "imperial" => Ok(UnitSystem::Imperial),
            _ => Err(anyhow!(
                "Unknown unit system '{value}'. Supported unit systems: metric, imperial."
            )),
        }
    }
}

impl TryFrom<String> for UnitSystem {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        UnitSystem::try_from(value.as_str())
    }
}

impl FromStr for UnitSystem {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UnitSystem::try_from(s)
    }
}

/// Parameters shared by both provider calls of one refresh.
#[derive(Clone)]
pub struct WeatherRequest {
    location: String,
    api_key: String,
    units: UnitSystem,
    language: String,
}

impl WeatherRequest {
    /// Build a request for `location`. Only emptiness is checked; resolving
    /// ambiguous place names is left to the provider.
    pub fn new(location: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let location = location.into().trim().to_string();
        if location.is_empty() {
            return Err(anyhow!("Location must not be empty."));
        }

        Ok(Self {
            location,
            api_key: api_key.into(),
            units: UnitSystem::default(),
            language: crate::config::DEFAULT_LANGUAGE.to_string(),
        })
    }

    pub fn with_units(mut self, units: UnitSystem) -> Self {
        self.units = units;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn units(&self) -> UnitSystem {
        self.units
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}

impl fmt::Debug for WeatherRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherRequest")
            .field("location", &self.location)
            .field("api_key", &"<redacted>")
            .field("units", &self.units)
            .field("language", &self.language)
            .finish()
    }
}

/// One entry of the provider's condition array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherCondition {
    pub id: u32,
    pub main: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub location_name: String,
    pub country: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    /// Barometric pressure, hPa.
    pub pressure: u32,
    pub humidity_pct: u8,
    pub wind_speed: f64,
    /// Meteorological degrees.
    pub wind_direction: u16,
    /// Primary condition; `None` when the provider sent an empty array.
    pub condition: Option<WeatherCondition>,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
}

/// A single 3-hour forecast interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    pub timestamp: DateTime<Utc>,
    /// Wall-clock time of the interval as reported in `dt_txt`.
    pub local_time: NaiveDateTime,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity_pct: u8,
    pub wind_speed: f64,
    /// First entry is the primary condition.
    pub conditions: Vec<WeatherCondition>,
    /// Probability of precipitation, 0.0..=1.0.
    pub precipitation_probability: f64,
}

impl ForecastSample {
    pub fn date(&self) -> NaiveDate {
        self.local_time.date()
    }

    pub fn is_midday(&self) -> bool {
        self.local_time.hour() == 12 && self.local_time.minute() == 0
    }

    pub fn primary_condition(&self) -> Option<&WeatherCondition> {
        self.conditions.first()
    }
}

/// Per-day forecast derived from the samples sharing one calendar date.
///
/// The date is kept structured; day and month names are left to whoever
/// renders it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub temp_min: f64,
    pub temp_max: f64,
    pub description: String,
    pub icon: String,
    pub humidity_pct: u8,
    pub wind_speed: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_system_as_str_roundtrip() {
        for units in UnitSystem::all() {
            let parsed = UnitSystem::try_from(units.as_str()).expect("roundtrip should succeed");
            assert_eq!(*units, parsed);
        }
    }

    #[test]
    fn unit_system_parse_is_case_insensitive() {
        assert_eq!("Imperial".parse::<UnitSystem>().unwrap(), UnitSystem::Imperial);
        assert_eq!(" METRIC ".parse::<UnitSystem>().unwrap(), UnitSystem::Metric);
    }

    #[test]
    fn unit_system_deserializes_any_case() {
        let units: Vec<UnitSystem> =
            serde_json::from_str(r#"["Imperial", "METRIC", "imperial"]"#).unwrap();
        assert_eq!(units, vec![UnitSystem::Imperial, UnitSystem::Metric, UnitSystem::Imperial]);

        assert_eq!(serde_json::to_string(&UnitSystem::Imperial).unwrap(), "\"imperial\"");
        assert!(serde_json::from_str::<UnitSystem>("\"kelvin\"").is_err());
    }

    #[test]
    fn unknown_unit_system_error() {
        let err = UnitSystem::try_from("kelvin").unwrap_err();
        assert!(err.to_string().contains("Unknown unit system"));
    }

    #[test]
    fn request_rejects_blank_location() {
        let err = WeatherRequest::new("   ", "KEY").unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn request_trims_location_and_applies_defaults() {
        let req = WeatherRequest::new("  Berlin ", "KEY").unwrap();
        assert_eq!(req.location(), "Berlin");
        assert_eq!(req.units(), UnitSystem::Metric);
        assert_eq!(req.language(), "en");
    }

    #[test]
    fn request_debug_hides_api_key() {
        let req = WeatherRequest::new("Berlin", "SECRET_KEY")
            .unwrap()
            .with_units(UnitSystem::Imperial)
            .with_language("de");
        let dbg = format!("{req:?}");

        assert!(!dbg.contains("SECRET_KEY"));
        assert!(dbg.contains("Imperial"));
        assert!(dbg.contains("\"de\""));
    }

    #[test]
    fn midday_detection_requires_exact_noon() {
        let at = |s: &str| ForecastSample {
            timestamp: Utc::now(),
            local_time: NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap(),
            temp_min: 0.0,
            temp_max: 0.0,
            humidity_pct: 0,
            wind_speed: 0.0,
            conditions: Vec::new(),
            precipitation_probability: 0.0,
        };

        assert!(at("2024-12-01 12:00:00").is_midday());
        assert!(!at("2024-12-01 00:00:00").is_midday());
        assert!(!at("2024-12-12 15:00:00").is_midday());
    }
}
