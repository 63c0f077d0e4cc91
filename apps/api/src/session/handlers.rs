//! Axum route handlers for the job description, resume and ranking APIs.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::analysis::jd_analyzer::{JdAnalysis, JobDescriptionInput};
use crate::analysis::narrative::{improvement_areas, match_label, strengths};
use crate::errors::AppError;
use crate::ingestion::UploadedFile;
use crate::models::resume::{JobDescription, Resume, ResumeScore};
use crate::ranking::manager::{RankedEntry, SortDirection};
use crate::session::pipeline::{
    submit_job_description, upload_resumes, JobSubmission, UploadSubmission,
};
use crate::session::Session;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingsResponse {
    pub direction: SortDirection,
    pub entries: Vec<RankedEntry>,
    pub selected_resume_id: Option<String>,
    pub analyzing: bool,
    pub strategy: &'static str,
    pub total: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeDetailResponse {
    pub score: ResumeScore,
    pub rank: usize,
    pub previous_rank: Option<usize>,
    pub match_label: &'static str,
    pub strengths: Vec<&'static str>,
    pub improvement_areas: Vec<&'static str>,
}

fn rankings_view(session: &Session, strategy: &'static str) -> RankingsResponse {
    RankingsResponse {
        direction: session.ranking().direction(),
        entries: session.ranking().ranked(),
        selected_resume_id: session.selected().map(String::from),
        analyzing: session.is_analyzing(),
        strategy,
        total: session.ranking().len(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Job description
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/job-description/analyze
///
/// Preview only: returns the analyzed sections without touching the session.
pub async fn handle_analyze_jd(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<JdAnalysis>, AppError> {
    let analysis = state.analyzer.analyze(&request.text).await?;
    Ok(Json(analysis))
}

/// POST /api/v1/job-description
///
/// Installs a new active job description and re-scores every uploaded resume.
pub async fn handle_submit_job(
    State(state): State<AppState>,
    Json(request): Json<JobDescriptionInput>,
) -> Result<Json<JobSubmission>, AppError> {
    let submission = submit_job_description(&state, request).await?;
    Ok(Json(submission))
}

/// GET /api/v1/job-description
pub async fn handle_get_job(
    State(state): State<AppState>,
) -> Result<Json<JobDescription>, AppError> {
    let session = state.session.read().await;
    let job = session
        .job()
        .ok_or_else(|| AppError::NotFound("No job description submitted".to_string()))?;
    Ok(Json(job.as_ref().clone()))
}

// ────────────────────────────────────────────────────────────────────────────
// Resumes
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resumes
///
/// Multipart upload; every part with a file name is treated as a resume.
pub async fn handle_upload_resumes(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadSubmission>, AppError> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let Some(file_name) = field.file_name().map(String::from) else {
            continue;
        };
        let content_type = field.content_type().map(String::from);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read {file_name}: {e}")))?;

        files.push(UploadedFile {
            file_name,
            content_type,
            data,
        });
    }

    let submission = upload_resumes(&state, files).await?;
    Ok(Json(submission))
}

/// GET /api/v1/resumes
pub async fn handle_list_resumes(State(state): State<AppState>) -> Json<Vec<Resume>> {
    let session = state.session.read().await;
    Json(session.resumes().to_vec())
}

// ────────────────────────────────────────────────────────────────────────────
// Rankings
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/rankings
pub async fn handle_get_rankings(State(state): State<AppState>) -> Json<RankingsResponse> {
    let session = state.session.read().await;
    Json(rankings_view(&session, state.engine.strategy_name()))
}

/// POST /api/v1/rankings/toggle-sort
pub async fn handle_toggle_sort(State(state): State<AppState>) -> Json<RankingsResponse> {
    let mut session = state.session.write().await;
    session.toggle_sort();
    Json(rankings_view(&session, state.engine.strategy_name()))
}

/// GET /api/v1/rankings/:resume_id
///
/// Opens the detail view for one resume.
pub async fn handle_select(
    State(state): State<AppState>,
    Path(resume_id): Path<String>,
) -> Result<Json<ResumeDetailResponse>, AppError> {
    let mut session = state.session.write().await;
    let score = session.select(&resume_id)?;
    let entry = session
        .ranking()
        .ranked()
        .into_iter()
        .find(|e| e.score.resume_id == resume_id)
        .ok_or_else(|| AppError::NotFound(format!("Resume {resume_id} not found in rankings")))?;

    Ok(Json(ResumeDetailResponse {
        rank: entry.rank,
        previous_rank: entry.previous_rank,
        match_label: match_label(score.overall_score),
        strengths: strengths(&score),
        improvement_areas: improvement_areas(&score),
        score,
    }))
}

/// DELETE /api/v1/selection
///
/// Back to the ranking list.
pub async fn handle_back(State(state): State<AppState>) -> StatusCode {
    state.session.write().await.back();
    StatusCode::NO_CONTENT
}
