//! OpenWeatherMap client for the /weather command.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const API_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Current conditions for one city.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub city: String,
    pub description: String,
    pub temp_c: f64,
    pub feels_like_c: f64,
    pub humidity: u64,
    pub wind_speed_ms: f64,
}

#[derive(Debug, Deserialize)]
struct OwmResponse {
    name: String,
    main: OwmMain,
    #[serde(default)]
    weather: Vec<OwmCondition>,
    #[serde(default)]
    wind: OwmWind,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    feels_like: f64,
    humidity: u64,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    description: String,
}

#[derive(Debug, Default, Deserialize)]
struct OwmWind {
    #[serde(default)]
    speed: f64,
}

impl From<OwmResponse> for WeatherReport {
    fn from(response: OwmResponse) -> Self {
        let description = response
            .weather
            .first()
            .map(|c| c.description.clone())
            .unwrap_or_default();

        Self {
            city: response.name,
            description,
            temp_c: response.main.temp,
            feels_like_c: response.main.feels_like,
            humidity: response.main.humidity,
            wind_speed_ms: response.wind.speed,
        }
    }
}

/// Client for the OpenWeatherMap current-weather endpoint.
#[derive(Clone)]
pub struct WeatherClient {
    client: reqwest::Client,
    api_key: String,
}

impl WeatherClient {
    pub fn new(api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client for OpenWeatherMap")?;

        Ok(Self { client, api_key })
    }

    /// Current weather for a city by name, metric units, Russian descriptions.
    pub async fn current(&self, city: &str) -> Result<WeatherReport> {
        let response = self
            .client
            .get(API_URL)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
                ("lang", "ru"),
            ])
            .send()
            .await
            .context("Weather request failed")?
            .error_for_status()
            .context("Weather API returned an error status")?;

        let parsed: OwmResponse = response
            .json()
            .await
            .context("Failed to parse weather response")?;

        debug!(city, "Weather lookup finished");
        Ok(parsed.into())
    }
}
