use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::errors::AppError;
use crate::models::weather::WeatherRecord;
use crate::state::AppState;
use crate::weather::service::{fetch_and_store, retrieve_stored};

#[derive(Debug, Deserialize)]
pub struct CityQuery {
    pub city: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FetchRequest {
    pub city: Option<String>,
}

/// GET /weather?city=<name>
pub async fn handle_get_weather(
    State(state): State<AppState>,
    query: Result<Query<CityQuery>, QueryRejection>,
) -> Result<Json<WeatherRecord>, AppError> {
    let Query(params) = query.map_err(|e| AppError::Validation(e.body_text()))?;
    let city = params.city.unwrap_or_default();

    let record = retrieve_stored(state.store.as_ref(), &city).await?;
    Ok(Json(record))
}

/// PUT /weather
///
/// The body is decoded by hand so a missing content type, malformed JSON or
/// a non-object body all surface as a plain 400.
pub async fn handle_put_weather(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<WeatherRecord>, AppError> {
    let invalid = |_| AppError::Validation("Invalid request body".to_string());
    let object: Map<String, Value> = serde_json::from_slice(&body).map_err(invalid)?;
    let request: FetchRequest = serde_json::from_value(Value::Object(object)).map_err(invalid)?;
    let city = request.city.unwrap_or_default();

    let record = fetch_and_store(&state.weather, state.store.as_ref(), &city).await?;
    Ok(Json(record))
}

pub async fn handle_method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
