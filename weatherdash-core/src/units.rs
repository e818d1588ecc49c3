//! Display helpers for raw weather values.
//!
//! Everything here is pure: no I/O and no dependence on the host's locale
//! or timezone.

use chrono::{DateTime, FixedOffset, Offset, Utc};

use crate::model::TemperatureUnit;

const COMPASS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

const SECTOR_DEG: f64 = 360.0 / COMPASS.len() as f64;

/// Convert a Celsius reading for display, rounded half away from zero.
pub fn convert_temperature(celsius: f64, unit: TemperatureUnit) -> i64 {
    let value = match unit {
        TemperatureUnit::Celsius => celsius,
        TemperatureUnit::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
    };
    value.round() as i64
}

pub fn unit_symbol(unit: TemperatureUnit) -> &'static str {
    match unit {
        TemperatureUnit::Celsius => "°C",
        TemperatureUnit::Fahrenheit => "°F",
    }
}

/// 16-point compass label for a bearing in degrees.
pub fn wind_direction(degrees: f64) -> &'static str {
    let normalized = degrees.rem_euclid(360.0);
    let index = (normalized / SECTOR_DEG).round() as usize % COMPASS.len();
    COMPASS[index]
}

/// Wall-clock time at the location, e.g. `09:05 AM`.
///
/// Uses the provider's offset rather than the host timezone. Offsets outside
/// ±24h are treated as UTC.
pub fn format_local_time(timestamp: DateTime<Utc>, utc_offset_secs: i32) -> String {
    let offset = FixedOffset::east_opt(utc_offset_secs).unwrap_or_else(|| Utc.fix());
    timestamp.with_timezone(&offset).format("%I:%M %p").to_string()
}

/// Short date, e.g. `Mon, Jan 15`.
pub fn format_date(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%a, %b %-d").to_string()
}

/// Long date, e.g. `Monday, January 15, 2024`.
pub fn format_full_date(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%A, %B %-d, %Y").to_string()
}

/// Metres to kilometres with one decimal, e.g. `10.0 km`.
pub fn format_visibility(meters: u32) -> String {
    format!("{:.1} km", f64::from(meters) / 1000.0)
}

/// Probability of precipitation as a whole percentage.
pub fn precipitation_percent(probability: f64) -> String {
    format!("{:.0}%", probability * 100.0)
}

pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
