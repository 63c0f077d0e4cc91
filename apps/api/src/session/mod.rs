//! Session: the single in-memory analysis session. Holds uploaded resumes, the active job
//! description, the ranking and the detail-view selection.
//!
//! Held behind `AppState::session` (`Arc<RwLock<Session>>`). Nothing outside this module
//! mutates the ranking.

pub mod handlers;
pub mod pipeline;

use std::sync::Arc;

use tracing::debug;

use crate::errors::AppError;
use crate::models::resume::{JobDescription, Resume, ResumeScore};
use crate::ranking::manager::RankingManager;

#[derive(Debug, Default)]
pub struct Session {
    resumes: Vec<Resume>,
    job: Option<Arc<JobDescription>>,
    /// Bumped every time the job description is replaced.
    generation: u64,
    ranking: RankingManager,
    /// `Some` while the current generation's full re-score is pending: scores merged in
    /// that window, to be carried over by `replace_scores`.
    late_scores: Option<Vec<ResumeScore>>,
    selected: Option<String>,
    batches_in_flight: usize,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resumes(&self) -> &[Resume] {
        &self.resumes
    }

    pub fn job(&self) -> Option<Arc<JobDescription>> {
        self.job.clone()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn ranking(&self) -> &RankingManager {
        &self.ranking
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_analyzing(&self) -> bool {
        self.batches_in_flight > 0
    }

    /// Replaces the job description wholesale. Returns the new generation.
    pub fn install_job(&mut self, job: JobDescription) -> (u64, Arc<JobDescription>) {
        let job = Arc::new(job);
        self.job = Some(Arc::clone(&job));
        self.generation += 1;
        self.late_scores = Some(Vec::new());
        (self.generation, job)
    }

    pub fn add_resumes(&mut self, resumes: &[Resume]) {
        self.resumes.extend_from_slice(resumes);
    }

    /// Merges a partial chunk unless the job description changed since it was scored.
    pub fn merge_chunk(&mut self, generation: u64, chunk: Vec<ResumeScore>) -> bool {
        if generation != self.generation {
            debug!(
                "Discarding {} scores from stale generation {generation} (current {})",
                chunk.len(),
                self.generation
            );
            return false;
        }
        if let Some(late) = self.late_scores.as_mut() {
            late.extend(chunk.iter().cloned());
        }
        self.ranking.merge_incremental(chunk);
        true
    }

    /// Installs a full re-score unless the job description changed since it was scored.
    ///
    /// Resumes uploaded after the re-score took its snapshot were merged under the same
    /// generation; they are carried over instead of being dropped by the replacement.
    pub fn replace_scores(&mut self, generation: u64, mut scores: Vec<ResumeScore>) -> bool {
        if generation != self.generation {
            debug!("Discarding full re-score from stale generation {generation}");
            return false;
        }
        for late in self.late_scores.take().unwrap_or_default() {
            if !scores.iter().any(|s| s.resume_id == late.resume_id) {
                scores.push(late);
            }
        }
        self.ranking.replace_all(scores);
        true
    }

    pub fn toggle_sort(&mut self) {
        self.ranking.toggle_sort_direction();
    }

    /// Opens the detail view for `resume_id`.
    pub fn select(&mut self, resume_id: &str) -> Result<ResumeScore, AppError> {
        let score = self.ranking.select(resume_id)?.clone();
        self.selected = Some(resume_id.to_string());
        Ok(score)
    }

    /// Closes the detail view.
    pub fn back(&mut self) {
        self.selected = None;
    }

    pub(crate) fn begin_batch(&mut self) {
        self.batches_in_flight += 1;
    }

    pub(crate) fn end_batch(&mut self) {
        self.batches_in_flight = self.batches_in_flight.saturating_sub(1);
    }
}
