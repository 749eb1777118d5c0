//! Axum router assembly.

use std::path::Path;

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use flowmail_app::ports::{AutomationRepository, Mailer, RunTracker, TestRunRepository};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Nests API routes under `/api`. When `frontend_dir` holds an `index.html`
/// the directory is served at `/` and unknown paths fall back to that file;
/// otherwise `GET /` answers with a short JSON pointer to the API.
/// Includes a [`TraceLayer`] that logs each HTTP request/response at the
/// `DEBUG` level and a permissive CORS layer for editors served elsewhere.
pub fn build<AR, TR, M, T>(state: AppState<AR, TR, M, T>, frontend_dir: Option<&Path>) -> Router
where
    AR: AutomationRepository + Send + Sync + 'static,
    TR: TestRunRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    T: RunTracker + Send + Sync + 'static,
{
    let router = Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes());

    let index = frontend_dir
        .map(|dir| (dir, dir.join("index.html")))
        .filter(|(_, index)| index.is_file());
    let router = match index {
        Some((dir, index)) => {
            tracing::info!(dir = %dir.display(), "serving frontend");
            router.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)))
        }
        None => router.route("/", get(api_hint)),
    };

    router
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn api_hint() -> Json<Value> {
    Json(json!({
        "message": "FlowMail backend is running. Build the editor frontend and set server.frontend_dir to serve it from here.",
        "health": "/health",
        "api": {
            "automations": "/api/automations",
            "testRuns": "/api/test-runs",
        },
    }))
}
