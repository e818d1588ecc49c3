use crate::{
    Config,
    error::WeatherError,
    model::{Coordinates, CurrentConditions, ForecastSeries},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// Outbound calls to a weather provider.
///
/// Implementations are stateless apart from endpoint and credential
/// configuration, and never retry.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_current_by_coordinates(
        &self,
        coordinates: Coordinates,
    ) -> Result<CurrentConditions, WeatherError>;

    async fn fetch_current_by_city(&self, name: &str) -> Result<CurrentConditions, WeatherError>;

    /// 3-hour forecast steps for the next five days.
    async fn fetch_forecast(&self, coordinates: Coordinates)
    -> Result<ForecastSeries, WeatherError>;
}

/// Construct the OpenWeatherMap provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured.\n\
                 Hint: run `weatherdash configure` or set {}.",
            crate::config::API_KEY_ENV
        )
    })?;

    let provider = OpenWeatherProvider::new(
        api_key.to_owned(),
        config.base_url.clone(),
        config.timeout(),
    )?;

    Ok(Arc::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(&cfg).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No API key configured"));
        assert!(msg.contains("Hint: run `weatherdash configure`"));
    }

    #[test]
    fn provider_from_config_rejects_blank_api_key() {
        let cfg = Config { api_key: Some("   ".into()), ..Config::default() };
        assert!(provider_from_config(&cfg).is_err());
    }

    #[test]
    fn provider_from_config_works_when_configured() {
        let cfg = Config { api_key: Some("KEY".into()), ..Config::default() };
        assert!(provider_from_config(&cfg).is_ok());
    }
}
