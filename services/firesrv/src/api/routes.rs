//! Route table

use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::{middleware, Router};

use super::{auth, handlers, AppState};

/// Create all API routes with state
pub fn create_routes(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/api/status", get(handlers::get_status))
        .route("/api/power/on", post(handlers::power_on))
        .route("/api/power/off", post(handlers::power_off))
        .route("/api/flame/{level}", post(handlers::set_flame))
        .route("/api/burner2/on", post(handlers::burner2_on))
        .route("/api/burner2/off", post(handlers::burner2_off))
        .route(
            "/api/keys",
            get(handlers::list_api_keys).post(handlers::create_api_key),
        )
        .route("/api/keys/{id}", delete(handlers::delete_api_key))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth::require_api_key,
        ));

    let mut router = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected);

    if state.config.service.dev_mode {
        router = router
            .route("/test/status", get(handlers::test_status))
            .route("/test/flame/{level}", post(handlers::test_flame))
            .route("/test/burner2/{state}", post(handlers::test_burner2));
    }

    router
        // Apply HTTP request logging middleware
        .layer(middleware::from_fn(common::logging::http_request_logger))
        .with_state(state)
}
