//! Batch scoring: fans a set of resumes out over a `JoinSet` and streams partial results.
//!
//! Chunks are released in resume input order: a flush emits the longest prefix of resumes
//! whose scoring has settled, so the merged result does not depend on completion order.
//! A failing resume is reported in `BatchOutcome::failures` and never blocks the rest.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use crate::analysis::scoring::ScoringEngine;
use crate::errors::AppError;
use crate::models::resume::{JobDescription, Resume, ResumeScore};

/// When to release partial results: after the first completion, then every `every` completions.
#[derive(Debug, Clone, Copy)]
pub struct FlushPolicy {
    every: usize,
}

impl FlushPolicy {
    pub fn every(every: usize) -> Self {
        Self {
            every: every.max(1),
        }
    }

    pub fn should_flush(&self, completed: usize) -> bool {
        completed == 1 || completed % self.every == 0
    }
}

impl Default for FlushPolicy {
    fn default() -> Self {
        Self::every(5)
    }
}

/// A resume that could not be scored.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreFailure {
    pub resume_id: String,
    pub file_name: String,
    pub code: &'static str,
    pub message: String,
}

impl ScoreFailure {
    fn new(resume: &Resume, err: &AppError) -> Self {
        Self {
            resume_id: resume.id.clone(),
            file_name: resume.file_name.clone(),
            code: err.code(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub scored: usize,
    pub failures: Vec<ScoreFailure>,
}

/// Scores every resume against `job`, sending partial chunks on `chunks` as the flush
/// policy allows plus a final flush. A dropped receiver only discards delivery; scoring
/// still runs to completion.
pub async fn score_batch(
    engine: Arc<ScoringEngine>,
    resumes: Vec<Resume>,
    job: Arc<JobDescription>,
    policy: FlushPolicy,
    chunks: mpsc::Sender<Vec<ResumeScore>>,
) -> BatchOutcome {
    let total = resumes.len();
    let mut outcome = BatchOutcome::default();
    if total == 0 {
        return outcome;
    }

    let mut set = JoinSet::new();
    for (index, resume) in resumes.iter().cloned().enumerate() {
        let engine = Arc::clone(&engine);
        let job = Arc::clone(&job);
        set.spawn(async move { (index, engine.score(&resume, Some(&job)).await) });
    }

    let mut slots: Vec<Option<ResumeScore>> = vec![None; total];
    let mut settled = vec![false; total];
    let mut cursor = 0;
    let mut completed = 0;

    while let Some(joined) = set.join_next().await {
        completed += 1;
        match joined {
            Ok((index, Ok(score))) => {
                slots[index] = Some(score);
                settled[index] = true;
                outcome.scored += 1;
            }
            Ok((index, Err(e))) => {
                warn!("Scoring failed for resume {}: {e}", resumes[index].id);
                outcome.failures.push(ScoreFailure::new(&resumes[index], &e));
                settled[index] = true;
            }
            // The slot stays unsettled and is reported after the loop.
            Err(e) => error!("Scoring task aborted: {e}"),
        }

        if policy.should_flush(completed) && completed < total {
            let end = settled[cursor..]
                .iter()
                .position(|done| !done)
                .map_or(total, |offset| cursor + offset);
            let chunk: Vec<ResumeScore> = slots[cursor..end]
                .iter_mut()
                .filter_map(Option::take)
                .collect();
            cursor = end;
            deliver(&chunks, chunk).await;
        }
    }

    for index in cursor..total {
        if !settled[index] {
            let err = AppError::Internal(anyhow::anyhow!("scoring task did not complete"));
            outcome.failures.push(ScoreFailure::new(&resumes[index], &err));
        }
    }
    let rest: Vec<ResumeScore> = slots[cursor..].iter_mut().filter_map(Option::take).collect();
    deliver(&chunks, rest).await;

    debug!(
        "Batch finished: {} scored, {} failed",
        outcome.scored,
        outcome.failures.len()
    );
    outcome
}

async fn deliver(chunks: &mpsc::Sender<Vec<ResumeScore>>, chunk: Vec<ResumeScore>) {
    if chunk.is_empty() {
        return;
    }
    if chunks.send(chunk).await.is_err() {
        debug!("Partial results receiver dropped; discarding chunk");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{make_job, make_resume, ContentStrategy};

    async fn run(
        resumes: Vec<Resume>,
        policy: FlushPolicy,
        pairs: &[(&str, i32)],
    ) -> (BatchOutcome, Vec<Vec<ResumeScore>>) {
        let (tx, mut rx) = mpsc::channel(64);
        let outcome = score_batch(
            ContentStrategy::engine(pairs),
            resumes,
            Arc::new(make_job()),
            policy,
            tx,
        )
        .await;

        let mut chunks = Vec::new();
        while let Some(chunk) = rx.recv().await {
            chunks.push(chunk);
        }
        (outcome, chunks)
    }

    #[test]
    fn test_flush_policy_cadence() {
        let policy = FlushPolicy::every(5);
        let flushes: Vec<usize> = (1..=12).filter(|n| policy.should_flush(*n)).collect();
        assert_eq!(flushes, vec![1, 5, 10]);

        // zero is coerced to one
        assert!(FlushPolicy::every(0).should_flush(3));
    }

    #[tokio::test]
    async fn test_chunks_concatenate_in_input_order() {
        let resumes: Vec<Resume> = (0..12)
            .map(|i| make_resume(&format!("r{i}"), &format!("c{}", i % 3)))
            .collect();
        let (outcome, chunks) = run(
            resumes,
            FlushPolicy::every(5),
            &[("c0", 90), ("c1", 60), ("c2", 30)],
        )
        .await;

        assert_eq!(outcome.scored, 12);
        assert!(outcome.failures.is_empty());
        assert!(!chunks.is_empty());

        let ids: Vec<String> = chunks.into_iter().flatten().map(|s| s.resume_id).collect();
        let expected: Vec<String> = (0..12).map(|i| format!("r{i}")).collect();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn test_failure_is_isolated() {
        let resumes = vec![
            make_resume("ok-1", "good"),
            make_resume("broken", "fail"),
            make_resume("ok-2", "good"),
        ];
        let (outcome, chunks) = run(resumes, FlushPolicy::every(5), &[("good", 85)]).await;

        assert_eq!(outcome.scored, 2);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].resume_id, "broken");
        assert_eq!(outcome.failures[0].code, "INTERNAL_ERROR");

        let scores: Vec<ResumeScore> = chunks.into_iter().flatten().collect();
        let ids: Vec<&str> = scores.iter().map(|s| s.resume_id.as_str()).collect();
        assert_eq!(ids, vec!["ok-1", "ok-2"]);
        assert!(scores.iter().all(|s| s.overall_score == 85));
    }

    #[tokio::test]
    async fn test_empty_batch_sends_nothing() {
        let (outcome, chunks) = run(vec![], FlushPolicy::default(), &[]).await;
        assert_eq!(outcome.scored, 0);
        assert!(chunks.is_empty());
    }

    #[tokio::test]
    async fn test_dropped_receiver_still_completes() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let resumes = (0..7).map(|i| make_resume(&format!("r{i}"), "x")).collect();
        let outcome = score_batch(
            ContentStrategy::engine(&[]),
            resumes,
            Arc::new(make_job()),
            FlushPolicy::every(2),
            tx,
        )
        .await;
        assert_eq!(outcome.scored, 7);
    }
}
