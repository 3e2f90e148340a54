pub mod health;

use axum::{routing::get, Router};

use crate::state::AppState;
use crate::weather::handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/weather",
            get(handlers::handle_get_weather)
                .put(handlers::handle_put_weather)
                .head(handlers::handle_method_not_allowed)
                .fallback(handlers::handle_method_not_allowed),
        )
        .with_state(state)
}
