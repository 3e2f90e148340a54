use std::sync::Arc;

use crate::store::WeatherStore;
use crate::weather_client::WeatherClient;

/// Shared application state injected into all route handlers via Axum extractors.
/// Built once in `main`; clones share the same store handle and HTTP pool.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable store. Default: MongoWeatherStore.
    pub store: Arc<dyn WeatherStore>,
    pub weather: WeatherClient,
}
