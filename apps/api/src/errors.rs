use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::store::StoreError;
use crate::weather_client::ProviderError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Bodies are short plain-text messages; details only go to the log.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Weather provider unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Weather provider error: {0}")]
    UpstreamStatus(String),

    #[error("Weather provider response unusable: {0}")]
    UpstreamParse(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Unavailable(e) => AppError::UpstreamUnavailable(e.to_string()),
            e @ ProviderError::Status { .. } => AppError::UpstreamStatus(e.to_string()),
            ProviderError::Parse(msg) => AppError::UpstreamParse(msg),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::UpstreamUnavailable(_)
            | AppError::UpstreamStatus(_)
            | AppError::UpstreamParse(_)
            | AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::Validation(msg) | AppError::NotFound(msg) => {
                tracing::warn!("{self}");
                msg.clone()
            }
            AppError::MethodNotAllowed => "Method not allowed".to_string(),
            AppError::UpstreamUnavailable(_) | AppError::UpstreamStatus(_) => {
                tracing::error!("{self}");
                "Failed to fetch weather data".to_string()
            }
            AppError::UpstreamParse(_) => {
                tracing::error!("{self}");
                "Failed to parse weather data".to_string()
            }
            AppError::Storage(e) => {
                tracing::error!("Storage error: {e}");
                "Failed to access weather data".to_string()
            }
        };

        (self.status(), message).into_response()
    }
}
