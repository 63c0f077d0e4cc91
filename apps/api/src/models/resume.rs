use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An uploaded resume. Immutable once ingested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resume {
    pub id: String,
    pub name: String,
    pub file_name: String,
    pub upload_date: DateTime<Utc>,
    pub content: String,
}

/// The active job description resumes are scored against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDescription {
    pub id: String,
    pub title: String,
    pub company: String,
    pub description: String,
    pub skills: Vec<String>,
    pub requirements: Vec<String>,
}

/// Scores for one resume against one job description.
///
/// `evaluation_details` always holds four sentences: keyword, skills, experience, education.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeScore {
    pub resume_id: String,
    pub resume_name: String,
    pub file_name: String,
    pub overall_score: u8,
    pub keyword_match: u8,
    pub skills_match: u8,
    pub experience_match: u8,
    pub education_match: u8,
    pub evaluation_details: Vec<String>,
}
