// src/routes.rs

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
};
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    handlers::{form, response, upload},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (forms, responses, upload).
/// * Applies global middleware (Trace, CORS, body limit).
/// * Serves uploaded files statically under /uploads.
/// * Injects global state (stores and configuration).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    // Submissions are the one unauthenticated write path; throttle per
    // peer address.
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(5)
        .burst_size(32)
        .finish()
        .expect("governor configuration");
    let governor_conf = Arc::new(governor_conf);

    let form_routes = Router::new()
        .route("/", get(form::list_forms).post(form::create_form))
        .route(
            "/{id}",
            get(form::get_form)
                .put(form::update_form)
                .patch(form::patch_form)
                .delete(form::delete_form),
        )
        .route("/{id}/render", get(form::get_fill_view))
        .route("/{id}/audit", get(form::get_audit));

    let response_routes = Router::new()
        .route(
            "/",
            post(response::submit_response).layer(GovernorLayer::new(governor_conf)),
        )
        .route("/form/{id}", get(response::list_for_form));

    let upload_routes = Router::new().route("/", post(upload::upload_image));

    let upload_dir = state.config.upload_dir.clone();

    Router::new()
        .route("/", get(root))
        .nest("/api/forms", form_routes)
        .nest("/api/responses", response_routes)
        .nest("/api/upload", upload_routes)
        .nest_service("/uploads", ServeDir::new(upload_dir))
        // Global Middleware (applied from outside in)
        .layer(DefaultBodyLimit::max(5 * 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}
