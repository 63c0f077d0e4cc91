use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Job description text is empty")]
    EmptyInput,

    #[error("Job description analysis unavailable: {0}")]
    AnalysisUnavailable(String),

    #[error("No active job description")]
    MissingJobDescription,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid file type: {0}")]
    InvalidFileType(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable machine-readable code, also used when a failure is reported inside a batch.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::EmptyInput => "EMPTY_INPUT",
            AppError::AnalysisUnavailable(_) => "ANALYSIS_UNAVAILABLE",
            AppError::MissingJobDescription => "MISSING_JOB_DESCRIPTION",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InvalidFileType(_) => "INVALID_FILE_TYPE",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::EmptyInput => (
                StatusCode::BAD_REQUEST,
                "Job description text cannot be empty".to_string(),
            ),
            AppError::AnalysisUnavailable(msg) => {
                tracing::error!("Analysis unavailable: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Job description analysis is currently unavailable".to_string(),
                )
            }
            AppError::MissingJobDescription => (
                StatusCode::CONFLICT,
                "Submit a job description before scoring resumes".to_string(),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::InvalidFileType(msg) => (StatusCode::UNSUPPORTED_MEDIA_TYPE, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
