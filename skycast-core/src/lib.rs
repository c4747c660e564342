//! Core library for the `skycast` CLI.
//!
//! This crate defines:
//! - Configuration (base URL, API key) from file and environment
//! - The [`WeatherProvider`] seam and its OpenWeather implementation
//! - Shared domain models (current conditions, forecast samples)
//! - The [`SearchController`] driving lookup-then-forecast searches
//! - Pure display helpers (icons, compass labels, theme buckets, time formatting)
//!
//! It is used by `skycast`, but can also be embedded in other front ends.

pub mod config;
pub mod format;
pub mod model;
pub mod provider;
pub mod search;

pub use config::Config;
pub use format::{BackgroundClass, ClockFormatter, DisplayFormatter, icon_url, wind_direction};
pub use model::{Condition, CurrentConditions, ForecastPoint};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider, provider_from_config};
pub use search::{Key, LOOKUP_FAILED_MESSAGE, Phase, SearchController, SearchError, SearchState};
