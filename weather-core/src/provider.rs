use crate::{
    Config, WeatherError,
    model::{CurrentFragment, ForecastFragment},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::{fmt::Debug, time::Duration};

pub mod openweather;

/// Remote weather source. The three fetches are independent of each other.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_current(&self, latitude: f64, longitude: f64) -> Result<CurrentFragment, WeatherError>;

    async fn fetch_hourly(&self, latitude: f64, longitude: f64) -> Result<ForecastFragment, WeatherError>;

    async fn fetch_daily(&self, latitude: f64, longitude: f64) -> Result<ForecastFragment, WeatherError>;
}

/// Construct the OpenWeather provider described by `config`.
pub fn provider_from_config(config: &Config) -> anyhow::Result<OpenWeatherProvider> {
    let api_key = config.api_key()?;

    let provider = OpenWeatherProvider::new(
        api_key,
        &config.base_url,
        Duration::from_secs(config.timeout_secs),
    )?;

    Ok(provider)
}
