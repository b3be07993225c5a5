use chrono::{DateTime, Local};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::error::{BriefingError, Provider, Result};
use crate::http;
use crate::models::{ForecastEntry, Units, WeatherReport};

/// Three-hour periods requested from the forecast endpoint (next 24 hours)
const FORECAST_PERIODS: &str = "8";

#[derive(Deserialize)]
struct CurrentResponse {
    name: String,
    main: MainBlock,
    weather: Vec<Condition>,
    wind: Wind,
}

#[derive(Deserialize)]
struct MainBlock {
    temp: f64,
    #[serde(default)]
    feels_like: Option<f64>,
    #[serde(default)]
    humidity: Option<u32>,
}

#[derive(Deserialize)]
struct Condition {
    description: String,
}

#[derive(Deserialize)]
struct Wind {
    speed: f64,
}

#[derive(Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    list: Vec<ForecastItem>,
}

#[derive(Deserialize)]
struct ForecastItem {
    dt: i64,
    main: MainBlock,
    weather: Vec<Condition>,
    #[serde(default)]
    pop: f64,
}

/// Map a weather description to an emoji
pub fn weather_emoji(description: &str) -> &'static str {
    let desc = description.to_lowercase();
    if desc.contains("thunder") {
        "⛈️"
    } else if desc.contains("snow") {
        "🌨️"
    } else if desc.contains("rain") || desc.contains("drizzle") {
        "🌧️"
    } else if desc.contains("mist") || desc.contains("fog") || desc.contains("haze") {
        "🌫️"
    } else if desc.contains("clear") {
        "☀️"
    } else if desc.contains("few clouds") || desc.contains("scattered") {
        "⛅"
    } else if desc.contains("cloud") {
        "☁️"
    } else {
        "🌡️"
    }
}

fn first_description(conditions: &[Condition]) -> Result<String> {
    conditions
        .first()
        .map(|c| c.description.clone())
        .ok_or_else(|| BriefingError::upstream(Provider::Weather, "response has no conditions"))
}

impl CurrentResponse {
    fn into_report(self) -> Result<WeatherReport> {
        let description = first_description(&self.weather)?;
        Ok(WeatherReport {
            city: self.name,
            temperature: self.main.temp.round() as i64,
            feels_like: self.main.feels_like.unwrap_or(self.main.temp).round() as i64,
            description,
            humidity: self.main.humidity.unwrap_or(0),
            wind_speed: self.wind.speed,
        })
    }
}

impl ForecastItem {
    fn into_entry(self) -> Result<ForecastEntry> {
        let description = first_description(&self.weather)?;
        let when = DateTime::from_timestamp(self.dt, 0)
            .ok_or_else(|| {
                BriefingError::upstream(
                    Provider::Weather,
                    format!("invalid forecast timestamp {}", self.dt),
                )
            })?
            .with_timezone(&Local);

        Ok(ForecastEntry {
            time: when.format("%-I %p").to_string(),
            temp: self.main.temp.round() as i64,
            emoji: weather_emoji(&description).to_string(),
            description,
            pop: (self.pop * 100.0).round().clamp(0.0, 100.0) as u32,
        })
    }
}

/// Client for an OpenWeatherMap-compatible API
pub struct WeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl WeatherClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http::build_client(Provider::Weather, timeout)?,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = http::endpoint(Provider::Weather, &self.base_url, path, params)?;
        tracing::debug!(url = %http::redacted(&url), "Requesting weather data");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| http::transport(Provider::Weather, "Failed to fetch weather", e))?;

        http::ensure_success(Provider::Weather, response)
            .await?
            .json::<T>()
            .await
            .map_err(|e| http::transport(Provider::Weather, "Failed to parse weather response", e))
    }

    /// Current conditions for `city`
    pub async fn current(&self, city: &str, units: Units) -> Result<WeatherReport> {
        let response: CurrentResponse = self
            .get_json(
                "weather",
                &[("q", city), ("appid", self.api_key.as_str()), ("units", units.as_str())],
            )
            .await?;
        response.into_report()
    }

    /// Forecast for the next 24 hours in three-hour periods
    pub async fn forecast(&self, city: &str, units: Units) -> Result<Vec<ForecastEntry>> {
        let response: ForecastResponse = self
            .get_json(
                "forecast",
                &[
                    ("q", city),
                    ("appid", self.api_key.as_str()),
                    ("units", units.as_str()),
                    ("cnt", FORECAST_PERIODS),
                ],
            )
            .await?;

        response
            .list
            .into_iter()
            .map(ForecastItem::into_entry)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_emoji_mapping() {
        assert_eq!(weather_emoji("thunderstorm with rain"), "⛈️");
        assert_eq!(weather_emoji("light snow"), "🌨️");
        assert_eq!(weather_emoji("Light Rain"), "🌧️");
        assert_eq!(weather_emoji("drizzle"), "🌧️");
        assert_eq!(weather_emoji("haze"), "🌫️");
        assert_eq!(weather_emoji("clear sky"), "☀️");
        assert_eq!(weather_emoji("scattered clouds"), "⛅");
        assert_eq!(weather_emoji("overcast clouds"), "☁️");
        assert_eq!(weather_emoji("tornado"), "🌡️");
    }

    #[test]
    fn test_current_response_rounds_values() {
        let json = r#"{
            "name": "Petaluma",
            "main": {"temp": 54.6, "feels_like": 50.2, "humidity": 80},
            "weather": [{"description": "light rain"}],
            "wind": {"speed": 6.3}
        }"#;
        let report = serde_json::from_str::<CurrentResponse>(json)
            .unwrap()
            .into_report()
            .unwrap();
        assert_eq!(report.city, "Petaluma");
        assert_eq!(report.temperature, 55);
        assert_eq!(report.feels_like, 50);
        assert_eq!(report.description, "light rain");
        assert_eq!(report.humidity, 80);
    }

    #[test]
    fn test_current_response_without_conditions_is_upstream_error() {
        let json = r#"{"name": "X", "main": {"temp": 1.0}, "weather": [], "wind": {"speed": 0}}"#;
        let err = serde_json::from_str::<CurrentResponse>(json)
            .unwrap()
            .into_report()
            .unwrap_err();
        assert!(err.is_upstream());
    }

    #[test]
    fn test_forecast_item_entry() {
        let json = r#"{"dt": 1760900400, "main": {"temp": 61.4}, "weather": [{"description": "clear sky"}], "pop": 0.234}"#;
        let entry = serde_json::from_str::<ForecastItem>(json)
            .unwrap()
            .into_entry()
            .unwrap();
        assert_eq!(entry.temp, 61);
        assert_eq!(entry.pop, 23);
        assert_eq!(entry.emoji, "☀️");
        assert!(entry.time.ends_with("AM") || entry.time.ends_with("PM"));
    }
}
