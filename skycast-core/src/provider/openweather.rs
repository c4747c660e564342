use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;

use crate::model::{Condition, CurrentConditions, ForecastPoint};

use super::WeatherProvider;

/// Client for the OpenWeather `weather` and `forecast` endpoints, metric units.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    base_url: String,
    api_key: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self::with_client(Client::new(), base_url, api_key)
    }

    pub fn with_client(http: Client, base_url: String, api_key: String) -> Self {
        Self { base_url, api_key, http }
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, city: &str, what: &str) -> Result<T> {
        let url = self.endpoint(path);
        debug!(%url, city, "requesting OpenWeather {what}");

        let res = self
            .http
            .get(&url)
            .query(&[("q", city), ("appid", self.api_key.as_str()), ("units", "metric")])
            .send()
            .await
            .with_context(|| format!("Failed to send request to OpenWeather ({what})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read OpenWeather {what} response body"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather {} request failed with status {}: {}",
                what,
                status,
                truncate_body(&body),
            ));
        }

        serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse OpenWeather {what} JSON"))
    }
}

#[derive(Debug, Deserialize)]
struct OwCondition {
    #[serde(default)]
    main: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    icon: String,
}

impl From<OwCondition> for Condition {
    fn from(w: OwCondition) -> Self {
        Condition { main: w.main, description: w.description, icon: w.icon }
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    #[serde(default)]
    feels_like: Option<f64>,
    #[serde(default)]
    temp_min: Option<f64>,
    #[serde(default)]
    temp_max: Option<f64>,
    #[serde(default)]
    humidity: f64,
    #[serde(default)]
    pressure: f64,
}

impl OwMain {
    fn humidity_pct(&self) -> u8 {
        self.humidity.round().clamp(0.0, 100.0) as u8
    }

    fn pressure_hpa(&self) -> u32 {
        self.pressure.round().max(0.0) as u32
    }
}

#[derive(Debug, Default, Deserialize)]
struct OwWind {
    #[serde(default)]
    speed: f64,
    #[serde(default)]
    deg: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: String,
    #[serde(default)]
    sunrise: i64,
    #[serde(default)]
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    #[serde(default)]
    name: String,
    #[serde(default)]
    sys: OwSys,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwCondition>,
    #[serde(default)]
    wind: OwWind,
    #[serde(default)]
    visibility: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    #[serde(default)]
    dt_txt: String,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwCondition>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

impl From<OwCurrentResponse> for CurrentConditions {
    fn from(parsed: OwCurrentResponse) -> Self {
        let main = parsed.main;
        CurrentConditions {
            location_name: parsed.name,
            country: parsed.sys.country,
            sunrise: parsed.sys.sunrise,
            sunset: parsed.sys.sunset,
            temperature_c: main.temp,
            feels_like_c: main.feels_like.unwrap_or(main.temp),
            temp_min_c: main.temp_min.unwrap_or(main.temp),
            temp_max_c: main.temp_max.unwrap_or(main.temp),
            humidity_pct: main.humidity_pct(),
            pressure_hpa: main.pressure_hpa(),
            conditions: parsed.weather.into_iter().map(Condition::from).collect(),
            wind_speed_mps: parsed.wind.speed,
            wind_deg: parsed.wind.deg,
            visibility_m: parsed.visibility,
        }
    }
}

impl From<OwForecastEntry> for ForecastPoint {
    fn from(entry: OwForecastEntry) -> Self {
        let main = entry.main;
        ForecastPoint {
            timestamp: entry.dt_txt,
            temperature_c: main.temp,
            temp_min_c: main.temp_min.unwrap_or(main.temp),
            temp_max_c: main.temp_max.unwrap_or(main.temp),
            humidity_pct: main.humidity_pct(),
            conditions: entry.weather.into_iter().map(Condition::from).collect(),
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_conditions(&self, city: &str) -> Result<CurrentConditions> {
        let parsed: OwCurrentResponse = self.get_json("weather", city, "current weather").await?;
        Ok(parsed.into())
    }

    async fn forecast(&self, city: &str) -> Result<Vec<ForecastPoint>> {
        let parsed: OwForecastResponse = self.get_json("forecast", city, "5-day forecast").await?;
        Ok(parsed.list.into_iter().map(ForecastPoint::from).collect())
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
