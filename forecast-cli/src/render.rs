//! Plain-text rendering of a refresh for the terminal.

use chrono::Local;
use forecast_core::{CurrentConditions, DEFAULT_ICON, DailySummary, Refresh, UnitSystem};
use std::fmt;

const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

/// Render both halves of a refresh; a failed half shows its message only.
pub fn report(result: &Refresh, units: UnitSystem) -> String {
    let mut out = match &result.current {
        Ok(current) => CurrentView(current, units).to_string(),
        Err(e) => format!("Current weather unavailable: {}\n", e.user_message()),
    };

    out.push('\n');

    match &result.forecast {
        Ok(days) if days.is_empty() => out.push_str("No forecast data.\n"),
        Ok(days) => {
            out.push_str("Forecast\n");
            for day in days {
                out.push_str(&DayView(day, units).to_string());
            }
        }
        Err(e) => out.push_str(&format!("Forecast unavailable: {}\n", e.user_message())),
    }

    out
}

struct CurrentView<'a>(&'a CurrentConditions, UnitSystem);

impl fmt::Display for CurrentView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let CurrentView(c, units) = self;
        let temp_unit = units.temperature_symbol();
        let (description, icon) = match &c.condition {
            Some(cond) => (capitalize_first(&cond.description), cond.icon.as_str()),
            None => (String::new(), DEFAULT_ICON),
        };

        writeln!(f, "{}, {}", c.location_name, c.country)?;
        writeln!(f, "  {:.0}{temp_unit}  {description}", c.temperature)?;
        writeln!(f, "  Feels like {:.0}{temp_unit}", c.feels_like)?;
        writeln!(
            f,
            "  Min/Max: {:.0}{temp_unit} / {:.0}{temp_unit}",
            c.temp_min, c.temp_max
        )?;
        writeln!(f, "  Humidity: {}%", c.humidity_pct)?;
        writeln!(
            f,
            "  Wind: {:.0} {} ({}°)",
            c.wind_speed,
            units.wind_speed_unit(),
            c.wind_direction
        )?;
        writeln!(f, "  Pressure: {} hPa", c.pressure)?;
        writeln!(
            f,
            "  Sunrise {}  Sunset {}",
            c.sunrise.with_timezone(&Local).format("%H:%M"),
            c.sunset.with_timezone(&Local).format("%H:%M")
        )?;
        writeln!(f, "  {}", icon_url(icon, 4))
    }
}

/// One forecast line; an empty icon falls back to `DEFAULT_ICON`.
struct DayView<'a>(&'a DailySummary, UnitSystem);

impl fmt::Display for DayView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let DayView(d, units) = self;
        let temp_unit = units.temperature_symbol();
        let icon = if d.icon.is_empty() { DEFAULT_ICON } else { d.icon.as_str() };

        writeln!(
            f,
            "  {:<9} {}  {:>4.0}{temp_unit} / {:>4.0}{temp_unit}  {:<20}  {:>3}%  {:.0} {}  {}",
            d.date.format("%A"),
            d.date.format("%d %b"),
            d.temp_max,
            d.temp_min,
            capitalize_first(&d.description),
            d.humidity_pct,
            d.wind_speed,
            units.wind_speed_unit(),
            icon_url(icon, 2),
        )
    }
}

pub fn icon_url(icon: &str, scale: u8) -> String {
    format!("{ICON_BASE_URL}/{icon}@{scale}x.png")
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc, Weekday};
    use forecast_core::{FetchError, WeatherCondition};

    fn day() -> DailySummary {
        DailySummary {
            date: NaiveDate::from_ymd_opt(2024, 12, 2).unwrap(),
            weekday: Weekday::Mon,
            temp_min: -2.0,
            temp_max: 4.0,
            description: "light snow".into(),
            icon: "13d".into(),
            humidity_pct: 81,
            wind_speed: 3.0,
        }
    }

    fn current() -> CurrentConditions {
        CurrentConditions {
            location_name: "Berlin".into(),
            country: "DE".into(),
            temperature: 4.2,
            feels_like: 1.0,
            temp_min: 3.0,
            temp_max: 5.0,
            pressure: 1012,
            humidity_pct: 87,
            wind_speed: 5.1,
            wind_direction: 240,
            condition: Some(WeatherCondition {
                id: 500,
                main: "Rain".into(),
                description: "light rain".into(),
                icon: "10d".into(),
            }),
            sunrise: Utc::now(),
            sunset: Utc::now(),
        }
    }

    #[test]
    fn capitalizes_unicode_first_letter() {
        assert_eq!(capitalize_first("облачно"), "Облачно");
        assert_eq!(capitalize_first("clear sky"), "Clear sky");
        assert_eq!(capitalize_first(""), "");
    }

    #[test]
    fn icon_url_matches_provider_layout() {
        assert_eq!(icon_url("04d", 2), "https://openweathermap.org/img/wn/04d@2x.png");
    }

    #[test]
    fn day_line_shows_weekday_date_and_units() {
        let line = DayView(&day(), UnitSystem::Imperial).to_string();

        assert!(line.contains("Monday"));
        assert!(line.contains("02 Dec"));
        assert!(line.contains("°F"));
        assert!(line.contains("Light snow"));
        assert!(line.contains("81%"));
        assert!(line.contains("mph"));
    }

    #[test]
    fn failed_forecast_still_renders_current() {
        let result = Refresh {
            current: Ok(current()),
            forecast: Err(FetchError::RateLimited),
        };

        let out = report(&result, UnitSystem::Metric);

        assert!(out.contains("Berlin, DE"));
        assert!(out.contains("Light rain"));
        assert!(out.contains("1012 hPa"));
        assert!(out.contains("Forecast unavailable: Request limit exceeded"));
    }

    #[test]
    fn failed_current_still_renders_forecast() {
        let result = Refresh {
            current: Err(FetchError::NotFound),
            forecast: Ok(vec![day()]),
        };

        let out = report(&result, UnitSystem::Metric);

        assert!(out.contains("Current weather unavailable: Location not found"));
        assert!(out.contains("Monday"));
        assert!(out.contains("°C"));
    }

    #[test]
    fn daily_icon_url_is_rendered() {
        let result = Refresh {
            current: Err(FetchError::NotFound),
            forecast: Ok(vec![day()]),
        };

        let out = report(&result, UnitSystem::Metric);

        assert!(out.contains("https://openweathermap.org/img/wn/13d@2x.png"));
    }

    #[test]
    fn day_without_icon_uses_default() {
        let blank = DailySummary {
            icon: String::new(),
            ..day()
        };

        let line = DayView(&blank, UnitSystem::Metric).to_string();

        assert!(line.contains(&icon_url(DEFAULT_ICON, 2)));
        assert!(line.ends_with('\n'));
    }

    #[test]
    fn current_block_shows_large_icon() {
        let out = CurrentView(&current(), UnitSystem::Metric).to_string();

        assert!(out.contains("10d@4x.png"));
        assert!(out.contains("Feels like 1°C"));
    }
}
