//! Weather Client: talks to the external current-conditions provider.
//!
//! The provider speaks the OpenWeather "current weather" JSON shape:
//! temperatures in Kelvin, a list of condition entries and a canonical city name.

use std::time::Duration;

use chrono::{DateTime, SubsecRound, Utc};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::weather::WeatherRecord;

const KELVIN_OFFSET: f64 = 273.15;
const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Weather provider unreachable: {0}")]
    Unavailable(#[from] reqwest::Error),

    #[error("Weather provider returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Weather provider response unusable: {0}")]
    Parse(String),
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    weather: Vec<Condition>,
    main: MainReadings,
    name: String,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    /// Kelvin.
    temp: f64,
}

impl CurrentConditions {
    /// Timestamps are cut to milliseconds, the precision the store keeps.
    fn into_record(self, fetched_at: DateTime<Utc>) -> Result<WeatherRecord, ProviderError> {
        if self.name.trim().is_empty() {
            return Err(ProviderError::Parse("missing city name".to_string()));
        }

        let description = self
            .weather
            .into_iter()
            .next()
            .map(|c| c.description)
            .ok_or_else(|| ProviderError::Parse("empty conditions list".to_string()))?;

        Ok(WeatherRecord {
            city: self.name,
            description,
            temp: kelvin_to_celsius(self.main.temp),
            last_updated: fetched_at.trunc_subsecs(3),
        })
    }
}

pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    kelvin - KELVIN_OFFSET
}

/// HTTP client for the weather provider. Cheap to clone; clones share a connection pool.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl WeatherClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    /// Fetches current conditions for `city` and converts them into a record
    /// stamped with the current time. The record carries the provider's
    /// canonical city name, not the caller's spelling.
    pub async fn fetch_current(&self, city: &str) -> Result<WeatherRecord, ProviderError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("appid", self.api_key.as_str()), ("q", city)])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = truncate(&body);
            warn!("Weather provider returned {status} for '{city}': {message}");
            return Err(ProviderError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let conditions: CurrentConditions =
            serde_json::from_str(&body).map_err(|e| ProviderError::Parse(e.to_string()))?;
        let record = conditions.into_record(Utc::now())?;

        debug!(
            "Fetched weather for '{city}' (canonical '{}'): {}, {:.2}C",
            record.city, record.description, record.temp
        );

        Ok(record)
    }
}

fn truncate(body: &str) -> String {
    if body.chars().count() > MAX_ERROR_BODY_CHARS {
        let head: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
        format!("{head}...")
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ENDPOINT: &str = "/data/2.5/weather";

    fn client_for(server: &MockServer) -> WeatherClient {
        WeatherClient::new(
            format!("{}{ENDPOINT}", server.uri()),
            "test-key",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_kelvin_to_celsius() {
        assert!((kelvin_to_celsius(300.0) - 26.85).abs() < 1e-9);
        assert!(kelvin_to_celsius(273.15).abs() < 1e-9);
    }

    #[test]
    fn test_record_timestamp_has_millisecond_precision() {
        let conditions: CurrentConditions = serde_json::from_value(json!({
            "weather": [{"description": "clear sky"}],
            "main": {"temp": 300.0},
            "name": "Paris"
        }))
        .unwrap();
        let fetched_at = DateTime::parse_from_rfc3339("2025-10-09T08:53:20.123456789Z")
            .unwrap()
            .with_timezone(&Utc);

        let record = conditions.into_record(fetched_at).unwrap();

        assert_eq!(
            record.last_updated.to_rfc3339(),
            "2025-10-09T08:53:20.123+00:00"
        );
    }

    #[test]
    fn test_truncate_long_body() {
        let long = "x".repeat(500);
        let out = truncate(&long);
        assert_eq!(out.chars().count(), MAX_ERROR_BODY_CHARS + 3);
        assert!(out.ends_with("..."));
        assert_eq!(truncate("short"), "short");
    }

    #[tokio::test]
    async fn test_fetch_current_success() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(ENDPOINT))
            .and(query_param("appid", "test-key"))
            .and(query_param("q", "paris"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "weather": [{"description": "clear sky"}, {"description": "mist"}],
                "main": {"temp": 300.0, "humidity": 40},
                "name": "Paris"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let record = client_for(&server).fetch_current("paris").await.unwrap();

        assert_eq!(record.city, "Paris");
        assert_eq!(record.description, "clear sky");
        assert!((record.temp - 26.85).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_city_with_spaces_is_encoded() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(ENDPOINT))
            .and(query_param("q", "New York"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "weather": [{"description": "haze"}],
                "main": {"temp": 280.0},
                "name": "New York"
            })))
            .mount(&server)
            .await;

        let record = client_for(&server).fetch_current("New York").await.unwrap();
        assert_eq!(record.city, "New York");
    }

    #[tokio::test]
    async fn test_empty_conditions_is_parse_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "weather": [],
                "main": {"temp": 300.0},
                "name": "Paris"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_current("Paris").await.unwrap_err();
        assert!(matches!(err, ProviderError::Parse(_)));
    }

    #[tokio::test]
    async fn test_missing_fields_is_parse_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "weather": [{"description": "rain"}],
                "name": "Paris"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_current("Paris").await.unwrap_err();
        assert!(matches!(err, ProviderError::Parse(_)));
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_current("Paris").await.unwrap_err();
        assert!(matches!(err, ProviderError::Parse(_)));
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(ENDPOINT))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"cod": "404", "message": "city not found"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_current("Atlantis").await.unwrap_err();
        match err {
            ProviderError::Status { status, message } => {
                assert_eq!(status, 404);
                assert!(message.contains("city not found"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_timeout_is_unavailable() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let client = WeatherClient::new(
            format!("{}{ENDPOINT}", server.uri()),
            "test-key",
            Duration::from_millis(100),
        )
        .unwrap();

        let err = client.fetch_current("Paris").await.unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_unavailable() {
        let client =
            WeatherClient::new("http://127.0.0.1:1/weather", "k", Duration::from_secs(2)).unwrap();
        let err = client.fetch_current("Paris").await.unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable(_)));
    }
}
