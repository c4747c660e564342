use crate::{
    Config, CurrentConditions, ForecastPoint, provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Source of current conditions and forecasts for a named city.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current_conditions(&self, city: &str) -> anyhow::Result<CurrentConditions>;

    /// The full 3-hour forecast feed, in provider order.
    async fn forecast(&self, city: &str) -> anyhow::Result<Vec<ForecastPoint>>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<OpenWeatherProvider> {
    let api_key = config.require_api_key()?;
    Ok(OpenWeatherProvider::new(config.base_url.clone(), api_key.to_owned()))
}
