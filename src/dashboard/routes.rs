//! HTTP endpoints for the dashboard and its JSON API.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::render::{render_dashboard, render_unavailable};
use super::stats::DashboardQuery;

/// Shared state for dashboard routes.
#[derive(Clone)]
pub struct DashboardState {
    pub query: Arc<DashboardQuery>,
}

/// GET /dashboard
async fn dashboard_page(State(state): State<DashboardState>) -> Response {
    match state.query.snapshot().await {
        Ok(snapshot) => Html(render_dashboard(&snapshot)).into_response(),
        Err(e) => {
            tracing::error!("Dashboard read failed: {e}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Html(render_unavailable()),
            )
                .into_response()
        }
    }
}

/// GET /api/stats
async fn get_stats(State(state): State<DashboardState>) -> Response {
    match state.query.get_stats().await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => unavailable(e),
    }
}

/// GET /api/vehicles
async fn list_vehicles(State(state): State<DashboardState>) -> Response {
    match state.query.list_all().await {
        Ok(vehicles) => Json(vehicles).into_response(),
        Err(e) => unavailable(e),
    }
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "fleet-bot"
    }))
}

fn unavailable(e: crate::error::DatabaseError) -> Response {
    tracing::error!("Vehicle store read failed: {e}");
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(serde_json::json!({"error": "vehicle store unavailable"})),
    )
        .into_response()
}

/// Build the dashboard router.
pub fn dashboard_routes(state: DashboardState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET]);

    Router::new()
        .route("/", get(|| async { axum::response::Redirect::temporary("/dashboard") }))
        .route("/dashboard", get(dashboard_page))
        .route("/api/stats", get(get_stats))
        .route("/api/vehicles", get(list_vehicles))
        .route("/health", get(health))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
