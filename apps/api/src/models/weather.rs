use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current conditions for one city, as stored and as served over HTTP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub city: String,
    pub description: String,
    /// Degrees Celsius.
    pub temp: f64,
    pub last_updated: DateTime<Utc>,
}
