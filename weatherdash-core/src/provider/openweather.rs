use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{debug, error, instrument};

use crate::{
    error::WeatherError,
    model::{
        Condition, Coordinates, CurrentConditions, ForecastPoint, ForecastSeries,
        MAX_FORECAST_POINTS, Temperatures, Wind,
    },
};

use super::WeatherProvider;

/// OpenWeatherMap 2.5 client (`/weather` and `/forecast`).
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Result<Self, WeatherError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WeatherError::ProviderUnavailable(e.to_string()))?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Issue a GET against `endpoint` and decode the body.
    ///
    /// `query_label` is what a 404 reports as the thing that was not found.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        query_label: &str,
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(%url, "requesting weather data");

        let res = self
            .http
            .get(&url)
            .query(params)
            .query(&[("appid", self.api_key.as_str()), ("units", "metric")])
            .send()
            .await
            .map_err(transport_error)?;

        let status = res.status();
        let body = res.text().await.map_err(transport_error)?;

        match status {
            s if s.is_success() => {}
            StatusCode::UNAUTHORIZED => return Err(WeatherError::Unauthorized),
            StatusCode::NOT_FOUND => {
                return Err(WeatherError::NotFound { query: query_label.to_string() });
            }
            s => {
                return Err(WeatherError::ProviderUnavailable(format!(
                    "{endpoint} request failed with status {s}: {}",
                    truncate_body(&body)
                )));
            }
        }

        serde_json::from_str(&body).map_err(|e| {
            error!(endpoint, error = %e, body = %truncate_body(&body), "unexpected payload shape");
            WeatherError::MalformedResponse(format!("{endpoint}: {e}"))
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    pressure: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    id: u32,
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    #[serde(default)]
    deg: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    coord: OwCoord,
    weather: Vec<OwWeather>,
    main: OwMain,
    visibility: Option<u32>,
    wind: OwWind,
    dt: i64,
    #[serde(default)]
    sys: OwSys,
    #[serde(default)]
    timezone: i32,
    name: String,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
    #[serde(default)]
    country: String,
    coord: OwCoord,
    #[serde(default)]
    timezone: i32,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    visibility: Option<u32>,
    #[serde(default)]
    pop: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

impl OwMain {
    fn temperatures(&self) -> Temperatures {
        Temperatures {
            current: self.temp,
            feels_like: self.feels_like,
            min: self.temp_min,
            max: self.temp_max,
        }
    }
}

impl From<&OwWind> for Wind {
    fn from(wind: &OwWind) -> Self {
        Wind { speed_mps: wind.speed, direction_deg: wind.deg }
    }
}

impl From<&OwCoord> for Coordinates {
    fn from(coord: &OwCoord) -> Self {
        Coordinates { latitude: coord.lat, longitude: coord.lon }
    }
}

fn primary_condition(weather: &[OwWeather]) -> Condition {
    weather
        .first()
        .map(|w| Condition {
            id: w.id,
            main: w.main.clone(),
            description: w.description.clone(),
            icon: w.icon.clone(),
        })
        .unwrap_or_else(|| Condition {
            id: 0,
            main: "Unknown".to_string(),
            description: "unknown".to_string(),
            icon: String::new(),
        })
}

impl TryFrom<OwCurrentResponse> for CurrentConditions {
    type Error = WeatherError;

    fn try_from(raw: OwCurrentResponse) -> Result<Self, Self::Error> {
        Ok(CurrentConditions {
            location_name: raw.name,
            country: raw.sys.country,
            coordinates: (&raw.coord).into(),
            observed_at: unix_to_utc(raw.dt)?,
            utc_offset_secs: checked_offset(raw.timezone)?,
            condition: primary_condition(&raw.weather),
            temperature: raw.main.temperatures(),
            humidity_pct: raw.main.humidity,
            pressure_hpa: raw.main.pressure,
            wind: (&raw.wind).into(),
            visibility_m: raw.visibility,
        })
    }
}

impl TryFrom<OwForecastResponse> for ForecastSeries {
    type Error = WeatherError;

    fn try_from(raw: OwForecastResponse) -> Result<Self, Self::Error> {
        let points = raw
            .list
            .into_iter()
            .take(MAX_FORECAST_POINTS)
            .map(|entry| {
                Ok(ForecastPoint {
                    at: unix_to_utc(entry.dt)?,
                    condition: primary_condition(&entry.weather),
                    temperature: entry.main.temperatures(),
                    humidity_pct: entry.main.humidity,
                    pressure_hpa: entry.main.pressure,
                    wind: (&entry.wind).into(),
                    visibility_m: entry.visibility,
                    precipitation_probability: entry.pop.clamp(0.0, 1.0),
                })
            })
            .collect::<Result<Vec<_>, WeatherError>>()?;

        Ok(ForecastSeries {
            location_name: raw.city.name,
            country: raw.city.country,
            coordinates: (&raw.city.coord).into(),
            utc_offset_secs: checked_offset(raw.city.timezone)?,
            points,
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip(self), fields(lat = coordinates.latitude, lon = coordinates.longitude))]
    async fn fetch_current_by_coordinates(
        &self,
        coordinates: Coordinates,
    ) -> Result<CurrentConditions, WeatherError> {
        coordinates.validate()?;

        let raw: OwCurrentResponse = self
            .get_json("weather", &coordinate_params(coordinates), &coordinates.to_string())
            .await?;

        CurrentConditions::try_from(raw)
    }

    #[instrument(skip(self))]
    async fn fetch_current_by_city(&self, name: &str) -> Result<CurrentConditions, WeatherError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WeatherError::InvalidInput("City name must not be empty".to_string()));
        }

        let raw: OwCurrentResponse =
            self.get_json("weather", &[("q", name.to_string())], name).await?;

        CurrentConditions::try_from(raw)
    }

    #[instrument(skip(self), fields(lat = coordinates.latitude, lon = coordinates.longitude))]
    async fn fetch_forecast(
        &self,
        coordinates: Coordinates,
    ) -> Result<ForecastSeries, WeatherError> {
        coordinates.validate()?;

        let raw: OwForecastResponse = self
            .get_json("forecast", &coordinate_params(coordinates), &coordinates.to_string())
            .await?;

        ForecastSeries::try_from(raw)
    }
}

fn coordinate_params(coordinates: Coordinates) -> [(&'static str, String); 2] {
    [
        ("lat", coordinates.latitude.to_string()),
        ("lon", coordinates.longitude.to_string()),
    ]
}

fn transport_error(err: reqwest::Error) -> WeatherError {
    if err.is_timeout() {
        WeatherError::ProviderUnavailable("request timed out".to_string())
    } else {
        WeatherError::ProviderUnavailable(err.to_string())
    }
}

fn unix_to_utc(ts: i64) -> Result<DateTime<Utc>, WeatherError> {
    DateTime::from_timestamp(ts, 0)
        .ok_or_else(|| WeatherError::MalformedResponse(format!("timestamp out of range: {ts}")))
}

fn checked_offset(secs: i32) -> Result<i32, WeatherError> {
    FixedOffset::east_opt(secs)
        .map(|_| secs)
        .ok_or_else(|| WeatherError::MalformedResponse(format!("timezone offset out of range: {secs}")))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
