//! Shared fixtures for unit tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::analysis::scoring::{ScoringEngine, ScoringStrategy, SubScores};
use crate::errors::AppError;
use crate::models::resume::{JobDescription, Resume, ResumeScore};

/// Returns the same raw scores for every resume.
pub struct FixedStrategy(pub SubScores<i32>);

#[async_trait]
impl ScoringStrategy for FixedStrategy {
    async fn sub_scores(
        &self,
        _content: &str,
        _job: &JobDescription,
    ) -> Result<SubScores<i32>, AppError> {
        Ok(self.0)
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Scores each resume uniformly by a value looked up from its content.
/// Content `"fail"` produces a strategy error; unknown content scores 50.
pub struct ContentStrategy(pub HashMap<String, i32>);

impl ContentStrategy {
    pub fn engine(pairs: &[(&str, i32)]) -> Arc<ScoringEngine> {
        let map = pairs
            .iter()
            .map(|(content, value)| (content.to_string(), *value))
            .collect();
        Arc::new(ScoringEngine::new(Arc::new(ContentStrategy(map))))
    }
}

#[async_trait]
impl ScoringStrategy for ContentStrategy {
    async fn sub_scores(
        &self,
        content: &str,
        _job: &JobDescription,
    ) -> Result<SubScores<i32>, AppError> {
        if content == "fail" {
            return Err(AppError::Internal(anyhow::anyhow!("strategy failure")));
        }
        let v = self.0.get(content).copied().unwrap_or(50);
        Ok(SubScores {
            keyword: v,
            skills: v,
            experience: v,
            education: v,
        })
    }

    fn name(&self) -> &'static str {
        "content"
    }
}

pub fn make_resume(id: &str, content: &str) -> Resume {
    Resume {
        id: id.to_string(),
        name: "alice".to_string(),
        file_name: "alice.pdf".to_string(),
        upload_date: Utc::now(),
        content: content.to_string(),
    }
}

pub fn make_job() -> JobDescription {
    JobDescription {
        id: "job-1".to_string(),
        title: "Python Developer".to_string(),
        company: "Acme".to_string(),
        description: "Looking for a Python developer building Django services".to_string(),
        skills: vec!["Python".to_string(), "Django".to_string(), "Redis".to_string()],
        requirements: vec![
            "3 years Python services".to_string(),
            "Bachelor degree".to_string(),
        ],
    }
}

/// A score whose sub-metrics all equal `overall`.
pub fn make_score(resume_id: &str, overall: u8) -> ResumeScore {
    ResumeScore {
        resume_id: resume_id.to_string(),
        resume_name: resume_id.to_string(),
        file_name: format!("{resume_id}.pdf"),
        overall_score: overall,
        keyword_match: overall,
        skills_match: overall,
        experience_match: overall,
        education_match: overall,
        evaluation_details: vec![String::new(); 4],
    }
}
