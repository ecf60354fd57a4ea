//! HTTP surface

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::hosting::RepositoryId;
use crate::service::presenter::{BadgeStatus, Presentation, ReportFormat, present};
use crate::service::trigger::{ChangeEvent, TriggerHandler};
use crate::version::cache::ReportStore;

#[derive(Clone)]
pub struct AppState {
    pub trigger: TriggerHandler,
    pub store: Arc<dyn ReportStore>,
}

impl AppState {
    pub fn new(trigger: TriggerHandler) -> Self {
        let store = trigger.pipeline().store().clone();
        Self { trigger, store }
    }
}

#[derive(Debug, Deserialize)]
struct ReportQuery {
    format: Option<String>,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

fn repository_from_path(owner: String, repo: String) -> Result<RepositoryId, Response> {
    RepositoryId::new(owner, repo).map_err(|e| error_response(StatusCode::BAD_REQUEST, e.to_string()))
}

async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn on_commit(State(state): State<AppState>, Json(event): Json<ChangeEvent>) -> Response {
    match state.trigger.on_change_event(&event) {
        Ok(_) => (StatusCode::ACCEPTED, Json(json!({}))).into_response(),
        Err(e) => {
            warn!("Rejected change event: {}", e);
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
    }
}

async fn get_report(
    State(state): State<AppState>,
    Path((owner, repo)): Path<(String, String)>,
    Query(query): Query<ReportQuery>,
) -> Response {
    let repository = match repository_from_path(owner, repo) {
        Ok(repository) => repository,
        Err(response) => return response,
    };
    let format = match query.format.as_deref().map(str::parse::<ReportFormat>) {
        None => ReportFormat::default(),
        Some(Ok(format)) => format,
        Some(Err(e)) => return error_response(StatusCode::BAD_REQUEST, e),
    };

    match present(&*state.store, &repository, format) {
        Presentation::NotAvailable => (
            StatusCode::NOT_FOUND,
            Json(json!({ "status": "not available" })),
        )
            .into_response(),
        Presentation::Json(report) => Json(report).into_response(),
        Presentation::Text(text) => text.into_response(),
        Presentation::Status(status) => Json(json!({ "status": status.as_str() })).into_response(),
    }
}

/// Badge endpoint, reports `up to date` until the first resolution lands
async fn get_status(
    State(state): State<AppState>,
    Path((owner, repo)): Path<(String, String)>,
) -> Response {
    let repository = match repository_from_path(owner, repo) {
        Ok(repository) => repository,
        Err(response) => return response,
    };

    let status = match present(&*state.store, &repository, ReportFormat::Status) {
        Presentation::Status(status) => status,
        _ => BadgeStatus::UpToDate,
    };
    Json(json!({ "status": status.as_str() })).into_response()
}

/// Build the service router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/commit", post(on_commit))
        .route("/repos/{owner}/{repo}/report", get(get_report))
        .route("/repos/{owner}/{repo}/status", get(get_status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
