//! HTTP application wiring (Axum router + service wiring).
//!
//! Folder layout:
//! - `services.rs`: store/verifier wiring behind [`services::AppServices`]
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::{routing::get, Extension, Router};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
pub fn build_app(services: Arc<services::AppServices>) -> Router {
    let auth_state = middleware::AuthState {
        codec: services.codec.clone(),
    };
    let cors = cors_layer(&services.config.frontend_origin);
    let upload_dir = services.config.upload_dir.clone();

    // Protected routes resolve credentials before any handler runs.
    let api = routes::public_router().merge(routes::protected_router().layer(
        axum::middleware::from_fn_with_state(auth_state, middleware::auth_middleware),
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api", api)
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .layer(Extension(services))
        .layer(cors)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let origin = origin
        .parse::<HeaderValue>()
        .unwrap_or_else(|_| HeaderValue::from_static("http://localhost:3000"));

    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
