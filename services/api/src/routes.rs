use crate::infra::{Allocator, AppState};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use review_allocator::error::AppError;
use review_allocator::workflows::assignment::{
    AssignmentReportSummary, AssignmentRequest, ExistingAssignments, Paper, ReviewerEntry,
    StrategyKind,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct AssignmentPayload {
    pub(crate) papers: Vec<Paper>,
    pub(crate) reviewers: Vec<ReviewerEntry>,
    #[serde(default)]
    pub(crate) existing: ExistingAssignments,
    #[serde(default)]
    pub(crate) strategy: Option<StrategyKind>,
    #[serde(default)]
    pub(crate) candidates_per_paper: Option<usize>,
}

pub(crate) fn with_assignment_routes(allocator: Arc<Allocator>) -> Router {
    Router::new()
        .route("/api/v1/assignments", post(assignments_endpoint))
        .with_state(allocator)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn assignments_endpoint(
    State(allocator): State<Arc<Allocator>>,
    Json(payload): Json<AssignmentPayload>,
) -> Result<Json<AssignmentReportSummary>, AppError> {
    let AssignmentPayload {
        papers,
        reviewers,
        existing,
        strategy,
        candidates_per_paper,
    } = payload;

    let mut settings = allocator.settings().clone();
    if let Some(strategy) = strategy {
        settings.strategy = strategy;
    }
    if candidates_per_paper.is_some() {
        settings.candidates_per_paper = candidates_per_paper;
    }

    let reviewers = reviewers
        .into_iter()
        .map(|entry| entry.into_reviewer(None, &settings.capacity))
        .collect();

    let run = allocator
        .with_settings(settings)
        .run(AssignmentRequest {
            papers,
            reviewers,
            existing,
            ..AssignmentRequest::default()
        })
        .await?;

    Ok(Json(run.report.into_summary()))
}
