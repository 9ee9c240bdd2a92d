//! Bridge service library: configuration, auth, routing and state.
//!
//! The binary in `main.rs` is a thin wrapper so integration tests can build
//! the router against a fully wired [`state::AppState`].

pub mod allowlist;
pub mod auth;
pub mod config;
pub mod devices;
pub mod eventlog;
pub mod routes;
pub mod state;

use axum::http::{HeaderValue, Method};
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowHeaders, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use state::AppState;

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(AllowHeaders::any())
}

/// Build the full application router.
pub fn router(app_state: AppState) -> Router {
    // JWT-guarded control plane.
    let api = Router::new()
        .route(
            "/api/hikvision/sync-angajat-all-devices",
            post(routes::sync::sync_employee_all_devices),
        )
        .route(
            "/api/hikvision/sync-all-angajati-all-devices",
            post(routes::sync::sync_all_employees_all_devices),
        )
        .route(
            "/api/hikvision/sync-photo-angajat-all-devices",
            post(routes::sync::sync_photo_all_devices),
        )
        .route(
            "/api/hikvision/update-photo-angajat-all-devices",
            post(routes::sync::update_photo_all_devices),
        )
        .route(
            "/api/hikvision/delete-angajat-all-devices",
            post(routes::sync::delete_employee_all_devices),
        )
        .route("/api/health-auth", get(routes::health::health_auth))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth::require_auth,
        ));

    let cors = cors_layer(&app_state.config.allowed_origins);
    let faces_dir = app_state.config.faces_dir.clone();

    Router::new()
        .route("/api/health", get(routes::health::health))
        .merge(api)
        .nest_service("/faces", ServeDir::new(faces_dir))
        // Terminals post event notifications to arbitrary configured paths.
        .fallback(routes::events::device_webhook)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
