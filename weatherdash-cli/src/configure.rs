//! `weatherdash configure`: interactive setup of the config file.

use anyhow::{Context, anyhow};
use inquire::{Password, PasswordDisplayMode, Text};
use weatherdash_core::{Config, Coordinates};

pub fn run() -> anyhow::Result<()> {
    let path = Config::config_file_path()?;
    let mut config = Config::load_from(&path)?;

    let has_key = config.api_key().is_some();
    let help = if has_key {
        "Leave empty to keep the current key"
    } else {
        "Get one at https://openweathermap.org/api"
    };
    let key = Password::new("OpenWeatherMap API key:")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .with_help_message(help)
        .prompt()
        .context("Configuration aborted")?;
    if !key.trim().is_empty() {
        config.api_key = Some(key.trim().to_string());
    }

    let city = Text::new("Default city:")
        .with_default(&config.default_city)
        .with_help_message("Shown when your location is unavailable")
        .prompt()
        .context("Configuration aborted")?;
    if !city.trim().is_empty() {
        config.default_city = city.trim().to_string();
    }

    let current = config.location.map(|c| c.to_string()).unwrap_or_default();
    let location = Text::new("Your location (lat,lon):")
        .with_initial_value(&current)
        .with_help_message("Used for \"use my location\"; leave empty to always use the default city")
        .prompt()
        .context("Configuration aborted")?;
    config.location = parse_location(&location)?;

    let saved = config.save()?;
    println!("Configuration saved to {}", saved.display());
    Ok(())
}

/// Parses `"lat,lon"`. An empty string clears the location.
fn parse_location(input: &str) -> anyhow::Result<Option<Coordinates>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }

    let (lat, lon) = input
        .split_once(',')
        .ok_or_else(|| anyhow!("Expected \"lat,lon\", got '{input}'"))?;
    let lat: f64 = lat.trim().parse().with_context(|| format!("Invalid latitude '{}'", lat.trim()))?;
    let lon: f64 = lon.trim().parse().with_context(|| format!("Invalid longitude '{}'", lon.trim()))?;

    Ok(Some(Coordinates::new(lat, lon)?))
}
