use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WeatherError;

/// The provider returns 3-hour steps for five days.
pub const MAX_FORECAST_POINTS: usize = 40;

/// Points per day in a 3-hour series.
pub const DAILY_STRIDE: usize = 8;

/// The daily view never shows more than a week.
pub const MAX_DAILY_ENTRIES: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Build validated coordinates.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, WeatherError> {
        let coords = Self { latitude, longitude };
        coords.validate()?;
        Ok(coords)
    }

    /// Latitude must be finite and within [-90, 90], longitude within [-180, 180].
    pub fn validate(&self) -> Result<(), WeatherError> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(WeatherError::InvalidInput(format!(
                "Latitude must be between -90 and 90, got {}",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(WeatherError::InvalidInput(format!(
                "Longitude must be between -180 and 180, got {}",
                self.longitude
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// Primary weather condition as reported by the provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    pub id: u32,
    pub main: String,
    pub description: String,
    pub icon: String,
}

/// Temperatures in degrees Celsius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Temperatures {
    pub current: f64,
    pub feels_like: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Wind {
    pub speed_mps: f64,
    pub direction_deg: f64,
}

/// Point-in-time snapshot from one successful current-weather call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentConditions {
    pub location_name: String,
    pub country: String,
    pub coordinates: Coordinates,
    pub observed_at: DateTime<Utc>,
    /// Offset of the location's local time from UTC.
    pub utc_offset_secs: i32,
    pub condition: Condition,
    pub temperature: Temperatures,
    pub humidity_pct: u8,
    pub pressure_hpa: f64,
    pub wind: Wind,
    pub visibility_m: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub at: DateTime<Utc>,
    pub condition: Condition,
    pub temperature: Temperatures,
    pub humidity_pct: u8,
    pub pressure_hpa: f64,
    pub wind: Wind,
    pub visibility_m: Option<u32>,
    /// Probability of precipitation in `0.0..=1.0`.
    pub precipitation_probability: f64,
}

/// 3-hour forecast steps, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSeries {
    pub location_name: String,
    pub country: String,
    pub coordinates: Coordinates,
    pub utc_offset_secs: i32,
    pub points: Vec<ForecastPoint>,
}

impl ForecastSeries {
    pub fn daily(&self) -> DailyForecast<'_> {
        DailyForecast::from_series(self)
    }
}

/// One representative point per day, sampled at a fixed stride.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyForecast<'a> {
    days: Vec<&'a ForecastPoint>,
}

impl<'a> DailyForecast<'a> {
    pub fn from_series(series: &'a ForecastSeries) -> Self {
        let days = series
            .points
            .iter()
            .step_by(DAILY_STRIDE)
            .take(MAX_DAILY_ENTRIES)
            .collect();

        Self { days }
    }

    pub fn days(&self) -> &[&'a ForecastPoint] {
        &self.days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Everything a completed acquisition hands to the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherView {
    pub current: CurrentConditions,
    pub forecast: ForecastSeries,
}

impl WeatherView {
    pub fn daily(&self) -> DailyForecast<'_> {
        self.forecast.daily()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Form written to durable storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "C",
            TemperatureUnit::Fahrenheit => "F",
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemperatureUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "c" | "celsius" => Ok(TemperatureUnit::Celsius),
            "f" | "fahrenheit" => Ok(TemperatureUnit::Fahrenheit),
            _ => Err(format!(
                "Unknown temperature unit '{s}'. Expected one of: c, f, celsius, fahrenheit."
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            _ => Err(format!("Unknown theme '{s}'. Expected 'light' or 'dark'.")),
        }
    }
}

/// User preferences, persisted across sessions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Preferences {
    pub temperature_unit: TemperatureUnit,
    pub theme_mode: ThemeMode,
    /// Most recent first, at most five entries.
    pub recent_searches: Vec<String>,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn condition() -> Condition {
        Condition {
            id: 800,
            main: "Clear".into(),
            description: "clear sky".into(),
            icon: "01d".into(),
        }
    }

    pub fn point(at: i64) -> ForecastPoint {
        ForecastPoint {
            at: DateTime::from_timestamp(at, 0).unwrap(),
            condition: condition(),
            temperature: Temperatures { current: 12.0, feels_like: 11.0, min: 10.0, max: 14.0 },
            humidity_pct: 60,
            pressure_hpa: 1012.0,
            wind: Wind { speed_mps: 3.5, direction_deg: 200.0 },
            visibility_m: Some(10_000),
            precipitation_probability: 0.1,
        }
    }

    pub fn series(len: usize) -> ForecastSeries {
        let start = 1_705_320_000;
        ForecastSeries {
            location_name: "London".into(),
            country: "GB".into(),
            coordinates: Coordinates { latitude: 51.51, longitude: -0.13 },
            utc_offset_secs: 0,
            points: (0..len).map(|i| point(start + i as i64 * 3 * 3600)).collect(),
        }
    }

    pub fn current(name: &str, coordinates: Coordinates) -> CurrentConditions {
        CurrentConditions {
            location_name: name.into(),
            country: "GB".into(),
            coordinates,
            observed_at: DateTime::from_timestamp(1_705_320_000, 0).unwrap(),
            utc_offset_secs: 0,
            condition: condition(),
            temperature: Temperatures { current: 8.0, feels_like: 6.5, min: 7.0, max: 9.0 },
            humidity_pct: 80,
            pressure_hpa: 1008.0,
            wind: Wind { speed_mps: 5.1, direction_deg: 250.0 },
            visibility_m: Some(9000),
        }
    }
}
