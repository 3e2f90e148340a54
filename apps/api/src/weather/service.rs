use tracing::info;

use crate::errors::AppError;
use crate::models::weather::WeatherRecord;
use crate::store::WeatherStore;
use crate::weather_client::WeatherClient;

/// Returns the stored record for `city` (exact match). Never touches the
/// store when `city` is blank.
pub async fn retrieve_stored(
    store: &dyn WeatherStore,
    city: &str,
) -> Result<WeatherRecord, AppError> {
    if city.trim().is_empty() {
        return Err(AppError::Validation("City parameter is required".to_string()));
    }

    store
        .find_by_city(city)
        .await?
        .ok_or_else(|| AppError::NotFound("Weather data not found".to_string()))
}

/// Fetches current conditions from the provider and upserts them under the
/// provider's canonical city name. Nothing is written if the fetch fails.
pub async fn fetch_and_store(
    client: &WeatherClient,
    store: &dyn WeatherStore,
    city: &str,
) -> Result<WeatherRecord, AppError> {
    if city.trim().is_empty() {
        return Err(AppError::Validation("City is required".to_string()));
    }

    let record = client.fetch_current(city).await?;
    store.upsert(&record).await?;

    info!(
        "Stored weather for '{}' (requested as '{city}')",
        record.city
    );
    Ok(record)
}
