use std::time::Duration;

use anyhow::{Context, Result};

/// The service always listens on this port.
pub const PORT: u16 = 8080;

/// Upper bound for each provider call and each store operation.
pub const IO_TIMEOUT: Duration = Duration::from_secs(10);

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
const DEFAULT_DATABASE: &str = "weatherdb";
const DEFAULT_COLLECTION: &str = "weather";

/// Application configuration loaded from environment variables.
/// Startup fails if `MONGO_URI` is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub mongo_uri: String,
    pub mongo_database: String,
    pub mongo_collection: String,
    pub base_url: String,
    pub api_key: String,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let mongo_uri = lookup("MONGO_URI")
            .filter(|v| !v.trim().is_empty())
            .context("Required environment variable 'MONGO_URI' is not set")?;

        Ok(Config {
            mongo_uri,
            mongo_database: optional("MONGO_DATABASE", DEFAULT_DATABASE),
            mongo_collection: optional("MONGO_COLLECTION", DEFAULT_COLLECTION),
            base_url: optional("BASE_URL", DEFAULT_BASE_URL),
            api_key: lookup("API_KEY").unwrap_or_default(),
            rust_log: optional("RUST_LOG", "info"),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_mongo_uri_fails() {
        let err = Config::from_lookup(lookup_from(&[("API_KEY", "k")])).unwrap_err();
        assert!(err.to_string().contains("MONGO_URI"));
    }

    #[test]
    fn test_blank_mongo_uri_fails() {
        assert!(Config::from_lookup(lookup_from(&[("MONGO_URI", "  ")])).is_err());
    }

    #[test]
    fn test_defaults_applied() {
        let config =
            Config::from_lookup(lookup_from(&[("MONGO_URI", "mongodb://localhost:27017")]))
                .unwrap();
        assert_eq!(config.mongo_database, "weatherdb");
        assert_eq!(config.mongo_collection, "weather");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api_key, "");
        assert_eq!(config.rust_log, "info");
    }

    #[test]
    fn test_overrides_respected() {
        let config = Config::from_lookup(lookup_from(&[
            ("MONGO_URI", "mongodb://db:27017"),
            ("MONGO_DATABASE", "wx"),
            ("BASE_URL", "http://provider.local/current"),
            ("API_KEY", "secret"),
        ]))
        .unwrap();
        assert_eq!(config.mongo_uri, "mongodb://db:27017");
        assert_eq!(config.mongo_database, "wx");
        assert_eq!(config.base_url, "http://provider.local/current");
        assert_eq!(config.api_key, "secret");
    }
}
