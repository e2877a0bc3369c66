use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::auth::session::CurrentSession;
use crate::errors::AppError;
use crate::jobs::board::{
    search_message, ApplicationReceipt, ApplicationRequest, JobPosting, JobQuery,
};
use crate::models::job::Job;
use crate::state::AppState;

#[derive(Serialize)]
pub struct JobSearchResponse {
    pub jobs: Vec<Job>,
    pub message: String,
}

#[derive(Serialize)]
pub struct JobPostedResponse {
    pub job: Job,
    pub message: String,
}

/// GET /api/v1/jobs
pub async fn handle_search(
    State(state): State<AppState>,
    Query(query): Query<JobQuery>,
) -> Json<JobSearchResponse> {
    tokio::time::sleep(state.config.job_search_latency).await;
    let jobs = state.jobs.search(&query).await;
    info!("Job search returned {} result(s)", jobs.len());
    Json(JobSearchResponse {
        message: search_message(jobs.len()),
        jobs,
    })
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<Job>, AppError> {
    state
        .jobs
        .get(id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))
}

/// POST /api/v1/jobs
pub async fn handle_post_job(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Json(posting): Json<JobPosting>,
) -> Result<(StatusCode, Json<JobPostedResponse>), AppError> {
    let job = state.jobs.post(posting, session.user.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(JobPostedResponse {
            job,
            message: "Job posted successfully! It will be reviewed by our team.".to_string(),
        }),
    ))
}

/// POST /api/v1/jobs/:id/applications
pub async fn handle_apply(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    Json(req): Json<ApplicationRequest>,
) -> Result<(StatusCode, Json<ApplicationReceipt>), AppError> {
    let receipt = state.jobs.apply(id, req).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}
