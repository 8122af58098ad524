use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use forecast_core::{
    Config, RefreshReport, UnitSystem, WeatherRequest, provider_from_config, refresh,
};
use inquire::{CustomUserError, Password, PasswordDisplayMode, Select, Text, validator::Validation};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Current weather and 5-day forecast")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and default preferences.
    Configure,

    /// Show current weather and the daily forecast.
    Show(ShowArgs),

    /// Print where the configuration file lives.
    ConfigPath,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Location name; defaults to the configured one.
    pub location: Option<String>,

    /// Unit system: metric or imperial.
    #[arg(long, value_parser = parse_units)]
    pub units: Option<UnitSystem>,

    /// Language tag for condition descriptions, e.g. "en" or "ru".
    #[arg(long)]
    pub lang: Option<String>,

    /// Number of forecast days to show.
    #[arg(long)]
    pub days: Option<usize>,

    /// Print machine-readable JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

impl ShowArgs {
    /// Merge flags over the stored configuration.
    fn resolve(&self, config: &Config) -> Result<(WeatherRequest, usize)> {
        let api_key = config.resolve_api_key()?;
        let location = self.location.as_deref().unwrap_or(&config.location);

        let request = WeatherRequest::new(location, api_key)?
            .with_units(self.units.unwrap_or(config.units))
            .with_language(self.lang.as_deref().unwrap_or(&config.language));

        Ok((request, self.days.unwrap_or(config.forecast_days)))
    }
}

fn parse_units(s: &str) -> Result<UnitSystem, String> {
    UnitSystem::try_from(s).map_err(|e| e.to_string())
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show(args) => show(args).await,
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
                Ok(())
            }
        }
    }
}

fn configure() -> Result<()> {
    let mut cfg = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .with_help_message("Get one at https://openweathermap.org/api")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let api_key = api_key.trim();
    if !api_key.is_empty() {
        cfg.set_api_key(api_key.to_string());
    } else if !cfg.is_configured() {
        bail!("API key must not be empty.");
    }

    let location = Text::new("Default location:")
        .with_default(&cfg.location)
        .with_validator(validate_location)
        .prompt()
        .context("Failed to read location")?;
    cfg.set_location(&location)?;

    let units = UnitSystem::all();
    let cursor = units.iter().position(|u| *u == cfg.units).unwrap_or(0);
    cfg.units = Select::new("Units:", units.to_vec())
        .with_starting_cursor(cursor)
        .prompt()
        .context("Failed to read unit system")?;

    let language = Text::new("Language:")
        .with_default(&cfg.language)
        .with_help_message("Tag for condition descriptions, e.g. en, de, ru")
        .prompt()
        .context("Failed to read language")?;
    cfg.language = language.trim().to_string();

    cfg.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}

fn validate_location(input: &str) -> Result<Validation, CustomUserError> {
    if input.trim().is_empty() {
        Ok(Validation::Invalid("Location must not be empty.".into()))
    } else {
        Ok(Validation::Valid)
    }
}

async fn show(args: ShowArgs) -> Result<()> {
    let cfg = Config::load()?;
    let (request, days) = args.resolve(&cfg)?;
    let provider = provider_from_config(&cfg)?;

    let result = refresh(provider.as_ref(), &request, days).await;

    if args.json {
        let json = serde_json::to_string_pretty(&RefreshReport::from(&result))
            .context("Failed to serialize weather report")?;
        println!("{json}");
    } else {
        print!("{}", render::report(&result, request.units()));
    }

    if result.is_total_failure() {
        bail!("No weather data available for '{}'", request.location());
    }

    Ok(())
}
