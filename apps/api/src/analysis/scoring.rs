//! Resume scoring: a pluggable strategy supplies four sub-scores, the engine clamps,
//! aggregates and narrates them.
//!
//! Default: `RandomStrategy` (demo values, optionally seeded).
//! Alternative: `KeywordStrategy` (pure-Rust term overlap, deterministic).
//!
//! `AppState` holds an `Arc<ScoringEngine>` built around an `Arc<dyn ScoringStrategy>`.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::debug;

use crate::analysis::narrative::evaluation_details;
use crate::errors::AppError;
use crate::models::resume::{JobDescription, Resume, ResumeScore};

/// Aggregation weights in percent: keyword, skills, experience, education. Sum to 100.
pub const WEIGHTS_PERCENT: [u32; 4] = [30, 30, 25, 15];

/// The four sub-metrics, in narrative order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubScores<T> {
    pub keyword: T,
    pub skills: T,
    pub experience: T,
    pub education: T,
}

impl SubScores<i32> {
    /// Clamps raw strategy output into [0, 100].
    pub fn clamped(self) -> SubScores<u8> {
        let clamp = |v: i32| v.clamp(0, 100) as u8;
        SubScores {
            keyword: clamp(self.keyword),
            skills: clamp(self.skills),
            experience: clamp(self.experience),
            education: clamp(self.education),
        }
    }
}

/// `round(0.30k + 0.30s + 0.25e + 0.15ed)`, rounding halves up.
///
/// Computed in hundredths so the result is exact for every integer input.
pub fn overall_score(scores: &SubScores<u8>) -> u8 {
    let values = [
        scores.keyword,
        scores.skills,
        scores.experience,
        scores.education,
    ];
    let hundredths: u32 = values
        .iter()
        .zip(WEIGHTS_PERCENT)
        .map(|(v, w)| u32::from(*v) * w)
        .sum();
    ((hundredths + 50) / 100).min(100) as u8
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Supplies raw sub-scores for one resume. Output may fall outside [0, 100];
/// the engine clamps before aggregating.
#[async_trait]
pub trait ScoringStrategy: Send + Sync {
    async fn sub_scores(
        &self,
        content: &str,
        job: &JobDescription,
    ) -> Result<SubScores<i32>, AppError>;

    /// Label reported alongside scores, e.g. "random" | "keyword".
    fn name(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// RandomStrategy: demo default
// ────────────────────────────────────────────────────────────────────────────

const BASE_MIN: i32 = 30;
const BASE_SPAN: i32 = 50;
const VARIATION: i32 = 20;

/// Demo strategy: a base in [30, 80) shared by all four metrics, each perturbed by an
/// offset in [-10, 10). Related but not identical sub-scores.
pub struct RandomStrategy {
    rng: Mutex<StdRng>,
}

impl RandomStrategy {
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

#[async_trait]
impl ScoringStrategy for RandomStrategy {
    async fn sub_scores(
        &self,
        _content: &str,
        _job: &JobDescription,
    ) -> Result<SubScores<i32>, AppError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("scoring rng lock poisoned")))?;

        let base = BASE_MIN + rng.gen_range(0..BASE_SPAN);
        let mut vary = || base + rng.gen_range(0..VARIATION) - VARIATION / 2;

        Ok(SubScores {
            keyword: vary(),
            skills: vary(),
            experience: vary(),
            education: vary(),
        })
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// KeywordStrategy: deterministic term overlap
// ────────────────────────────────────────────────────────────────────────────

/// Term-overlap strategy. No semantics, just presence checks on lowercase tokens.
///
/// Algorithm:
/// - keyword    = share of significant description terms found in the content
/// - skills     = share of job skills found in the content
/// - experience = share of experience-like requirements whose terms all appear
/// - education  = same, for education-like requirements
///
/// A metric with nothing to check against scores a neutral 50.
pub struct KeywordStrategy;

const NEUTRAL_SCORE: i32 = 50;
const MIN_TERM_LEN: usize = 4;
const STOPWORDS: &[&str] = &[
    "with", "that", "this", "from", "have", "will", "your", "their", "about", "looking",
    "including", "within", "years", "year", "experience", "strong", "team", "work",
];
const EDUCATION_TERMS: &[&str] = &["degree", "bachelor", "master", "phd", "diploma", "certif"];

#[async_trait]
impl ScoringStrategy for KeywordStrategy {
    async fn sub_scores(
        &self,
        content: &str,
        job: &JobDescription,
    ) -> Result<SubScores<i32>, AppError> {
        let content_terms = terms(content);

        let description_terms: Vec<String> = terms(&job.description)
            .into_iter()
            .filter(|t| t.len() >= MIN_TERM_LEN && !STOPWORDS.contains(&t.as_str()))
            .collect();
        let keyword = share(&description_terms, |t| content_terms.contains(t));

        let content_lower = content.to_lowercase();
        let skills = share(&job.skills, |s| content_lower.contains(&s.to_lowercase()));

        let (education_reqs, experience_reqs): (Vec<&String>, Vec<&String>) =
            job.requirements.iter().partition(|r| {
                let lower = r.to_lowercase();
                EDUCATION_TERMS.iter().any(|t| lower.contains(t))
            });
        let covered = |req: &&String| {
            terms(req)
                .iter()
                .filter(|t| t.len() >= MIN_TERM_LEN && !STOPWORDS.contains(&t.as_str()))
                .all(|t| content_terms.contains(t))
        };

        Ok(SubScores {
            keyword,
            skills,
            experience: share(&experience_reqs, covered),
            education: share(&education_reqs, covered),
        })
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}

fn terms(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || matches!(c, '+' | '#')))
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

fn share<T>(items: &[T], hit: impl Fn(&T) -> bool) -> i32 {
    if items.is_empty() {
        return NEUTRAL_SCORE;
    }
    let hits = items.iter().filter(|i| hit(i)).count();
    ((hits as f64 / items.len() as f64) * 100.0).round() as i32
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

/// Turns strategy output into a `ResumeScore`. Has no batching opinion: one resume per call.
pub struct ScoringEngine {
    strategy: Arc<dyn ScoringStrategy>,
}

impl ScoringEngine {
    pub fn new(strategy: Arc<dyn ScoringStrategy>) -> Self {
        Self { strategy }
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Fails with `MissingJobDescription` when `job` is `None`. Empty resume content is
    /// scored like any other content.
    pub async fn score(
        &self,
        resume: &Resume,
        job: Option<&JobDescription>,
    ) -> Result<ResumeScore, AppError> {
        let job = job.ok_or(AppError::MissingJobDescription)?;

        let raw = self.strategy.sub_scores(&resume.content, job).await?;
        let scores = raw.clamped();
        if raw != widen(scores) {
            debug!(
                "Clamped {} output for resume {}: {:?} -> {:?}",
                self.strategy.name(),
                resume.id,
                raw,
                scores
            );
        }

        Ok(ResumeScore {
            resume_id: resume.id.clone(),
            resume_name: resume.name.clone(),
            file_name: resume.file_name.clone(),
            overall_score: overall_score(&scores),
            keyword_match: scores.keyword,
            skills_match: scores.skills,
            experience_match: scores.experience,
            education_match: scores.education,
            evaluation_details: evaluation_details(&scores, job),
        })
    }
}

fn widen(scores: SubScores<u8>) -> SubScores<i32> {
    SubScores {
        keyword: scores.keyword.into(),
        skills: scores.skills.into(),
        experience: scores.experience.into(),
        education: scores.education.into(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
