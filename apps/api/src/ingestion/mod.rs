//! Resume ingestion: turns uploaded files into `Resume` records.
//!
//! File type checks happen here, before anything reaches scoring. Text extraction is not
//! available, so `content` is a placeholder naming the file.

use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::Resume;

const ACCEPTED_CONTENT_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];
const ACCEPTED_EXTENSIONS: &[&str] = &["pdf", "doc", "docx"];

/// One file from a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedFile {
    pub file_name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestResult {
    pub accepted: Vec<Resume>,
    pub rejected: Vec<RejectedFile>,
}

/// Accepts PDF/DOC/DOCX files and rejects the rest individually.
/// Fails with `InvalidFileType` when nothing is accepted.
pub fn ingest_files(files: Vec<UploadedFile>) -> Result<IngestResult, AppError> {
    if files.is_empty() {
        return Err(AppError::Validation("No files uploaded".to_string()));
    }

    let mut accepted = Vec::new();
    let mut rejected = Vec::new();

    for file in files {
        if is_supported(&file) {
            accepted.push(to_resume(&file));
        } else {
            warn!(
                "Rejected upload {} ({:?})",
                file.file_name, file.content_type
            );
            rejected.push(RejectedFile {
                reason: format!(
                    "Unsupported file type {}; upload PDF or Word documents only",
                    file.content_type.as_deref().unwrap_or("unknown")
                ),
                file_name: file.file_name,
            });
        }
    }

    if accepted.is_empty() {
        let names: Vec<&str> = rejected.iter().map(|r| r.file_name.as_str()).collect();
        return Err(AppError::InvalidFileType(format!(
            "Please upload PDF or Word documents only (rejected: {})",
            names.join(", ")
        )));
    }

    info!(
        "Ingested {} resumes ({} rejected)",
        accepted.len(),
        rejected.len()
    );
    Ok(IngestResult { accepted, rejected })
}

/// Declared content type wins; generic or missing types fall back to the extension.
fn is_supported(file: &UploadedFile) -> bool {
    match file.content_type.as_deref() {
        Some(ct) if ACCEPTED_CONTENT_TYPES.contains(&ct) => true,
        None | Some("application/octet-stream") => file
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ACCEPTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false),
        Some(_) => false,
    }
}

fn to_resume(file: &UploadedFile) -> Resume {
    let name = file
        .file_name
        .split('.')
        .next()
        .filter(|stem| !stem.is_empty())
        .unwrap_or(&file.file_name)
        .to_string();

    Resume {
        id: format!("resume-{}", Uuid::new_v4()),
        name,
        file_name: file.file_name.clone(),
        upload_date: Utc::now(),
        content: format!(
            "Placeholder content for {} ({} bytes); text extraction is not available.",
            file.file_name,
            file.data.len()
        ),
    }
}
