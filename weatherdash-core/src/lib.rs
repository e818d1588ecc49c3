//! Core library for the `weatherdash` dashboard.
//!
//! This crate defines:
//! - The weather data model and display helpers
//! - An OpenWeatherMap client behind the `WeatherProvider` trait
//! - The acquisition state machine (`Dashboard`) and its runner (`Acquirer`)
//! - Persisted user preferences and on-disk configuration
//!
//! It is used by `weatherdash-cli`, but holds no terminal code of its own.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod geolocation;
pub mod model;
pub mod preferences;
pub mod provider;
pub mod units;

pub use config::Config;
pub use dashboard::{AcquisitionEvent, Acquirer, Attempt, Completion, Dashboard, Phase, Trigger};
pub use error::{LocationError, StorageError, WeatherError};
pub use geolocation::{ConfiguredLocation, Geolocator};
pub use model::{
    Coordinates, CurrentConditions, DailyForecast, ForecastPoint, ForecastSeries, Preferences,
    TemperatureUnit, ThemeMode, WeatherView,
};
pub use preferences::{FileStorage, KeyValueStorage, MemoryStorage, PreferencesStore};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider, provider_from_config};
