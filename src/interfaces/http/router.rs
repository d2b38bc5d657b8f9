//! REST API router

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{self, AppState};

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/trigger/{station_id}", get(handlers::trigger))
        .route("/api/v1/stations", get(handlers::list_stations))
        .route("/api/v1/stations/{station_id}", get(handlers::get_station))
        .route(
            "/api/v1/stations/{station_id}/remote-start",
            post(handlers::remote_start),
        )
        .route(
            "/api/v1/stations/{station_id}/remote-stop",
            post(handlers::remote_stop),
        )
        .route(
            "/api/v1/stations/{station_id}/configuration",
            post(handlers::set_configuration),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
