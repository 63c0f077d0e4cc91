//! Ranking Manager: ordered scores, sort direction and rank deltas.
//!
//! Owned exclusively by the session; every transition snapshots the current ranks before
//! re-sorting so callers can render movement badges.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::resume::ResumeScore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Movement of an entry across the latest re-sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "places", rename_all = "lowercase")]
pub enum RankMovement {
    New,
    Unchanged,
    Improved(usize),
    Declined(usize),
}

/// A score at its position in the current order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntry {
    pub score: ResumeScore,
    pub rank: usize,
    pub previous_rank: Option<usize>,
    /// `previous_rank - rank`; positive means moved toward rank 0. Absent for new entries.
    pub delta: Option<i64>,
    pub movement: RankMovement,
}

impl RankMovement {
    fn from_delta(delta: Option<i64>) -> Self {
        match delta {
            None => RankMovement::New,
            Some(0) => RankMovement::Unchanged,
            Some(d) if d > 0 => RankMovement::Improved(d as usize),
            Some(d) => RankMovement::Declined(d.unsigned_abs() as usize),
        }
    }
}

impl RankedEntry {
    pub fn movement(&self) -> RankMovement {
        self.movement
    }
}

#[derive(Debug, Clone, Default)]
pub struct RankingManager {
    /// Always kept in the current sort order.
    scores: Vec<ResumeScore>,
    direction: SortDirection,
    previous_ranks: HashMap<String, usize>,
}

impl RankingManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Scores in current rank order.
    pub fn scores(&self) -> &[ResumeScore] {
        &self.scores
    }

    /// Discards prior scores and installs `scores`. Entries that were ranked before keep
    /// their old rank as `previous_rank`.
    pub fn replace_all(&mut self, scores: Vec<ResumeScore>) {
        self.snapshot();
        self.scores.clear();
        for score in scores {
            self.upsert(score);
        }
        self.resort();
    }

    /// Replaces scores with a matching `resume_id` in place, appends the rest, then
    /// re-sorts. Equal overall scores keep their relative order.
    ///
    /// The snapshot only covers entries that held a rank before the merge, so appended
    /// entries come out as new.
    pub fn merge_incremental(&mut self, scores: Vec<ResumeScore>) {
        self.snapshot();
        for score in scores {
            self.upsert(score);
        }
        self.resort();
    }

    pub fn toggle_sort_direction(&mut self) {
        self.snapshot();
        self.direction = self.direction.flipped();
        self.resort();
    }

    pub fn select(&self, resume_id: &str) -> Result<&ResumeScore, AppError> {
        self.scores
            .iter()
            .find(|s| s.resume_id == resume_id)
            .ok_or_else(|| AppError::NotFound(format!("Resume {resume_id} not found in rankings")))
    }

    /// Current order with rank, previous rank and delta per entry.
    pub fn ranked(&self) -> Vec<RankedEntry> {
        self.scores
            .iter()
            .enumerate()
            .map(|(rank, score)| {
                let previous_rank = self.previous_ranks.get(&score.resume_id).copied();
                let delta = previous_rank.map(|prev| prev as i64 - rank as i64);
                RankedEntry {
                    score: score.clone(),
                    rank,
                    previous_rank,
                    delta,
                    movement: RankMovement::from_delta(delta),
                }
            })
            .collect()
    }

    fn upsert(&mut self, score: ResumeScore) {
        match self
            .scores
            .iter_mut()
            .find(|s| s.resume_id == score.resume_id)
        {
            Some(existing) => *existing = score,
            None => self.scores.push(score),
        }
    }

    fn snapshot(&mut self) {
        self.previous_ranks = self
            .scores
            .iter()
            .enumerate()
            .map(|(rank, s)| (s.resume_id.clone(), rank))
            .collect();
    }

    fn resort(&mut self) {
        // sort_by is stable: ties keep their current relative order
        match self.direction {
            SortDirection::Descending => self
                .scores
                .sort_by(|a, b| b.overall_score.cmp(&a.overall_score)),
            SortDirection::Ascending => self
                .scores
                .sort_by(|a, b| a.overall_score.cmp(&b.overall_score)),
        }
    }
}
