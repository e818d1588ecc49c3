//! Plain-text rendering of the dashboard.

use chrono::{DateTime, Utc};
use std::fmt::Write;
use weatherdash_core::{
    ForecastPoint, Preferences, TemperatureUnit, WeatherView,
    units::{
        capitalize_first, convert_temperature, format_date, format_full_date, format_local_time,
        format_visibility, precipitation_percent, unit_symbol, wind_direction,
    },
};

pub fn unit_name(unit: TemperatureUnit) -> &'static str {
    match unit {
        TemperatureUnit::Celsius => "Celsius",
        TemperatureUnit::Fahrenheit => "Fahrenheit",
    }
}

/// Current conditions followed by the daily forecast. `now` drives the
/// location's local clock.
pub fn render_view(view: &WeatherView, prefs: &Preferences, now: DateTime<Utc>) -> String {
    let unit = prefs.temperature_unit;
    let temp = |celsius: f64| format!("{}{}", convert_temperature(celsius, unit), unit_symbol(unit));
    let current = &view.current;

    let mut out = String::new();
    let place = if current.country.is_empty() {
        current.location_name.clone()
    } else {
        format!("{}, {}", current.location_name, current.country)
    };

    // Writing into a String cannot fail.
    let _ = writeln!(out, "{place}");
    let _ = writeln!(
        out,
        "{} · Local time {}",
        format_full_date(current.observed_at),
        format_local_time(now, current.utc_offset_secs)
    );
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "  {}  {}",
        temp(current.temperature.current),
        capitalize_first(&current.condition.description)
    );
    let _ = writeln!(
        out,
        "  Feels like {} · High {} · Low {}",
        temp(current.temperature.feels_like),
        temp(current.temperature.max),
        temp(current.temperature.min)
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "  Humidity    {}%", current.humidity_pct);
    let _ = writeln!(
        out,
        "  Wind        {:.0} m/s {}",
        current.wind.speed_mps,
        wind_direction(current.wind.direction_deg)
    );
    let _ = writeln!(out, "  Pressure    {:.0} mb", current.pressure_hpa);
    if let Some(visibility) = current.visibility_m {
        let _ = writeln!(out, "  Visibility  {}", format_visibility(visibility));
    }

    let daily = view.daily();
    if !daily.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "7-Day Forecast");
        for day in daily.days() {
            let _ = writeln!(out, "{}", render_day(day, unit));
        }
    }

    out
}

fn render_day(day: &ForecastPoint, unit: TemperatureUnit) -> String {
    let symbol = unit_symbol(unit);
    format!(
        "  {:<12} {:>5}  ↑ {}° ↓ {}°  {:<20} {:>3}% {:>3.0} m/s  rain {}",
        format_date(day.at),
        format!("{}{symbol}", convert_temperature(day.temperature.current, unit)),
        convert_temperature(day.temperature.max, unit),
        convert_temperature(day.temperature.min, unit),
        capitalize_first(&day.condition.description),
        day.humidity_pct,
        day.wind.speed_mps,
        precipitation_percent(day.precipitation_probability),
    )
}

pub fn render_history(history: &[String]) -> String {
    if history.is_empty() {
        return "No recent searches\n".to_string();
    }

    let mut out = String::from("Recent searches\n");
    for (i, city) in history.iter().enumerate() {
        let _ = writeln!(out, "  {}. {city}", i + 1);
    }
    out
}

pub fn render_preferences(prefs: &Preferences) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Temperature unit  {}", unit_name(prefs.temperature_unit));
    let _ = writeln!(out, "Theme             {}", prefs.theme_mode);
    out.push_str(&render_history(&prefs.recent_searches));
    out
}
