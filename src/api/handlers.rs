use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::dataset::{self, DatasetSummary};
use crate::error::{AppError, AppResult};
use crate::models::{Course, EmptyReason, Recommendation, RecommendationOutcome, Strategy};
use crate::services::{export, recommend, RecommendationRequest};

use super::AppState;

// Response types

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Ok,
    Empty,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub strategy: Strategy,
    pub snapshot_id: Uuid,
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<EmptyReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub recommendations: Vec<Recommendation>,
}

impl RecommendationResponse {
    fn new(strategy: Strategy, snapshot_id: Uuid, outcome: RecommendationOutcome) -> Self {
        match outcome {
            RecommendationOutcome::Ranked(recommendations) => Self {
                strategy,
                snapshot_id,
                status: OutcomeStatus::Ok,
                reason: None,
                message: None,
                recommendations,
            },
            RecommendationOutcome::Empty(reason) => Self {
                strategy,
                snapshot_id,
                status: OutcomeStatus::Empty,
                message: Some(reason.to_string()),
                reason: Some(reason),
                recommendations: Vec::new(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TrainingResponse {
    pub snapshot_id: Uuid,
    pub trained_at: DateTime<Utc>,
    pub courses: usize,
    pub users: usize,
    pub interactions: usize,
}

fn parse_query(
    query: Result<Query<RecommendationRequest>, QueryRejection>,
) -> AppResult<RecommendationRequest> {
    query
        .map(|Query(request)| request)
        .map_err(|e| AppError::InvalidInput(e.body_text()))
}

// Handlers

/// Health check with the serving snapshot
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let snapshot = state.snapshot().await;
    Json(json!({
        "status": "healthy",
        "snapshot_id": snapshot.id,
        "trained_at": snapshot.trained_at,
    }))
}

/// All unique courses in catalog order
pub async fn list_courses(State(state): State<AppState>) -> Json<Vec<Course>> {
    let snapshot = state.snapshot().await;
    Json(snapshot.dataset().catalog().courses().to_vec())
}

pub async fn get_course(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> AppResult<Json<Course>> {
    let snapshot = state.snapshot().await;
    snapshot
        .dataset()
        .catalog()
        .get(&course_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Course {} not found", course_id)))
}

/// Ranked recommendations for the query's strategy
pub async fn get_recommendations(
    State(state): State<AppState>,
    query: Result<Query<RecommendationRequest>, QueryRejection>,
) -> AppResult<Json<RecommendationResponse>> {
    let request = parse_query(query)?;
    let snapshot = state.snapshot().await;
    let outcome = recommend(&snapshot, &request, &state.settings)?;

    Ok(Json(RecommendationResponse::new(
        request.strategy,
        snapshot.id,
        outcome,
    )))
}

/// Same ranking as `get_recommendations`, as a CSV download
pub async fn export_recommendations(
    State(state): State<AppState>,
    query: Result<Query<RecommendationRequest>, QueryRejection>,
) -> AppResult<impl IntoResponse> {
    let request = parse_query(query)?;
    let snapshot = state.snapshot().await;
    let outcome = recommend(&snapshot, &request, &state.settings)?;
    let body = export::to_csv(outcome.entries())?;

    let disposition = format!(
        "attachment; filename=\"{}_recommendations.csv\"",
        request.strategy
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

/// Dataset overview for dashboards
pub async fn get_stats(State(state): State<AppState>) -> Json<DatasetSummary> {
    let snapshot = state.snapshot().await;
    Json(DatasetSummary::from_dataset(snapshot.dataset()))
}

/// Replaces the dataset with the uploaded CSV and retrains both models
pub async fn upload_dataset(
    State(state): State<AppState>,
    body: String,
) -> AppResult<Json<TrainingResponse>> {
    tracing::info!(bytes = body.len(), "Dataset upload received");

    let dataset = dataset::load_from_reader(body.as_bytes())?;
    let courses = dataset.catalog().len();
    let users = dataset.users().len();
    let interactions = dataset.interactions().len();

    let snapshot = state.retrain(dataset).await?;

    Ok(Json(TrainingResponse {
        snapshot_id: snapshot.id,
        trained_at: snapshot.trained_at,
        courses,
        users,
        interactions,
    }))
}
