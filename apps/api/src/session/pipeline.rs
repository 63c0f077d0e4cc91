//! Session pipeline: orchestrates analysis, ingestion and scoring against the session.
//!
//! Flows:
//! - job description: analyze → build JobDescription → install (new generation) →
//!   full re-score of every resume → `replace_all`
//! - upload: ingest → store resumes → if a job is active, score only the new resumes and
//!   merge each partial chunk as it arrives
//!
//! Scoring runs in a spawned task so an abandoned request still completes and updates
//! the ranking.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::info;

use crate::analysis::batch::{score_batch, BatchOutcome, FlushPolicy};
use crate::analysis::jd_analyzer::{build_job_description, JdAnalysis, JobDescriptionInput};
use crate::errors::AppError;
use crate::ingestion::{ingest_files, RejectedFile, UploadedFile};
use crate::models::resume::{JobDescription, Resume};
use crate::state::AppState;

/// Buffered partial chunks between the batch and the merger.
const CHUNK_BUFFER: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MergeMode {
    /// Collect the whole batch, then `replace_all`.
    Replace,
    /// `merge_incremental` every chunk as it arrives.
    Incremental,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSubmission {
    pub job_description: JobDescription,
    pub analysis: JdAnalysis,
    pub outcome: BatchOutcome,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSubmission {
    pub accepted: Vec<Resume>,
    pub rejected: Vec<RejectedFile>,
    /// Absent when no job description is active yet.
    pub outcome: Option<BatchOutcome>,
}

/// Analyzes the text, installs the resulting job description and re-scores every resume.
pub async fn submit_job_description(
    state: &AppState,
    input: JobDescriptionInput,
) -> Result<JobSubmission, AppError> {
    let analysis = state.analyzer.analyze(&input.description).await?;
    info!(
        "JD analyzed by {} backend: {} sections",
        state.analyzer.backend(),
        analysis.sections.len()
    );

    let job = build_job_description(input, &analysis);

    let (generation, job, resumes) = {
        let mut session = state.session.write().await;
        let (generation, job) = session.install_job(job);
        (generation, job, session.resumes().to_vec())
    };
    info!(
        "Installed job description {} (generation {generation}); re-scoring {} resumes",
        job.id,
        resumes.len()
    );

    let outcome = run_scoring(
        state,
        resumes,
        Arc::clone(&job),
        generation,
        MergeMode::Replace,
    )
    .await?;

    Ok(JobSubmission {
        job_description: job.as_ref().clone(),
        analysis,
        outcome,
    })
}

/// Stores the accepted files and, when a job description is active, scores them.
pub async fn upload_resumes(
    state: &AppState,
    files: Vec<UploadedFile>,
) -> Result<UploadSubmission, AppError> {
    let ingested = ingest_files(files)?;

    let (generation, job) = {
        let mut session = state.session.write().await;
        session.add_resumes(&ingested.accepted);
        (session.generation(), session.job())
    };

    let outcome = match job {
        Some(job) => Some(
            run_scoring(
                state,
                ingested.accepted.clone(),
                job,
                generation,
                MergeMode::Incremental,
            )
            .await?,
        ),
        None => {
            info!(
                "{} resumes stored; waiting for a job description before scoring",
                ingested.accepted.len()
            );
            None
        }
    };

    Ok(UploadSubmission {
        accepted: ingested.accepted,
        rejected: ingested.rejected,
        outcome,
    })
}

async fn run_scoring(
    state: &AppState,
    resumes: Vec<Resume>,
    job: Arc<JobDescription>,
    generation: u64,
    mode: MergeMode,
) -> Result<BatchOutcome, AppError> {
    let session = Arc::clone(&state.session);
    let engine = Arc::clone(&state.engine);
    let policy = FlushPolicy::every(state.config.partial_flush_every);

    let task = tokio::spawn(async move {
        session.write().await.begin_batch();

        let (tx, mut rx) = mpsc::channel(CHUNK_BUFFER);
        let batch = tokio::spawn(score_batch(engine, resumes, job, policy, tx));

        let mut collected = Vec::new();
        while let Some(chunk) = rx.recv().await {
            match mode {
                MergeMode::Incremental => {
                    session.write().await.merge_chunk(generation, chunk);
                }
                MergeMode::Replace => collected.extend(chunk),
            }
        }

        let outcome = batch.await;

        let mut guard = session.write().await;
        if mode == MergeMode::Replace && outcome.is_ok() {
            guard.replace_scores(generation, collected);
        }
        guard.end_batch();
        drop(guard);

        outcome.map_err(|e| AppError::Internal(anyhow::anyhow!("scoring batch failed: {e}")))
    });

    let outcome = task
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("scoring task failed: {e}")))??;

    info!(
        "Scored {} resumes ({} failed, {:?})",
        outcome.scored,
        outcome.failures.len(),
        mode
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::jd_analyzer::HeuristicJdAnalyzer;
    use crate::config::Config;
    use crate::analysis::scoring::{ScoringEngine, ScoringStrategy, SubScores};
    use crate::models::resume::JobDescription;
    use crate::test_utils::ContentStrategy;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Sleeps on its first `slow_calls` calls, then answers immediately.
    struct SlowStartStrategy {
        calls: AtomicUsize,
        slow_calls: usize,
    }

    #[async_trait]
    impl ScoringStrategy for SlowStartStrategy {
        async fn sub_scores(
            &self,
            _content: &str,
            _job: &JobDescription,
        ) -> Result<SubScores<i32>, AppError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) < self.slow_calls {
                tokio::time::sleep(Duration::from_millis(300)).await;
            }
            Ok(SubScores {
                keyword: 60,
                skills: 60,
                experience: 60,
                education: 60,
            })
        }

        fn name(&self) -> &'static str {
            "slow-start"
        }
    }

    fn state_with(pairs: &[(&str, i32)]) -> AppState {
        AppState::new(
            Config::default(),
            Arc::new(HeuristicJdAnalyzer),
            ContentStrategy::engine(pairs),
        )
    }

    fn pdf(name: &str) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            content_type: Some("application/pdf".to_string()),
            data: Bytes::from_static(b"%PDF"),
        }
    }

    fn jd_input(description: &str) -> JobDescriptionInput {
        JobDescriptionInput {
            title: "Python Developer".to_string(),
            description: description.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_upload_without_job_stores_but_does_not_score() {
        let state = state_with(&[]);
        let submission = upload_resumes(&state, vec![pdf("a.pdf"), pdf("b.pdf")])
            .await
            .unwrap();

        assert_eq!(submission.accepted.len(), 2);
        assert!(submission.outcome.is_none());

        let session = state.session.read().await;
        assert_eq!(session.resumes().len(), 2);
        assert!(session.ranking().is_empty());
    }

    #[tokio::test]
    async fn test_job_submission_rescores_existing_resumes() {
        let state = state_with(&[]);
        upload_resumes(&state, vec![pdf("a.pdf"), pdf("b.pdf"), pdf("c.pdf")])
            .await
            .unwrap();

        let submission = submit_job_description(
            &state,
            jd_input("Looking for a Python developer with 3 years experience"),
        )
        .await
        .unwrap();

        assert_eq!(submission.job_description.skills, vec!["Python"]);
        assert_eq!(submission.outcome.scored, 3);

        let session = state.session.read().await;
        assert_eq!(session.ranking().len(), 3);
        assert!(!session.is_analyzing());
    }

    #[tokio::test]
    async fn test_upload_with_active_job_merges_incrementally() {
        let state = state_with(&[]);
        submit_job_description(&state, jd_input("Rust engineer, 5 years experience"))
            .await
            .unwrap();

        let files = (0..7).map(|i| pdf(&format!("r{i}.pdf"))).collect();
        let submission = upload_resumes(&state, files).await.unwrap();
        assert_eq!(submission.outcome.unwrap().scored, 7);

        upload_resumes(&state, vec![pdf("late.pdf")]).await.unwrap();

        let session = state.session.read().await;
        assert_eq!(session.ranking().len(), 8);
    }

    #[tokio::test]
    async fn test_upload_during_full_rescore_is_kept_in_ranking() {
        let state = AppState::new(
            Config::default(),
            Arc::new(HeuristicJdAnalyzer),
            Arc::new(ScoringEngine::new(Arc::new(SlowStartStrategy {
                calls: AtomicUsize::new(0),
                slow_calls: 2,
            }))),
        );
        upload_resumes(&state, vec![pdf("a.pdf"), pdf("b.pdf")])
            .await
            .unwrap();

        let submit_state = state.clone();
        let submit = tokio::spawn(async move {
            submit_job_description(&submit_state, jd_input("Python developer, 3 years experience"))
                .await
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        let late = upload_resumes(&state, vec![pdf("c.pdf")]).await.unwrap();
        assert_eq!(late.outcome.unwrap().scored, 1);

        let submission = submit.await.unwrap().unwrap();
        assert_eq!(submission.outcome.scored, 2);

        let session = state.session.read().await;
        assert_eq!(session.resumes().len(), 3);
        assert_eq!(session.ranking().len(), 3);
        assert!(!session.is_analyzing());
    }

    #[tokio::test]
    async fn test_empty_job_description_is_rejected_without_side_effects() {
        let state = state_with(&[]);
        let err = submit_job_description(&state, jd_input("  "))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EmptyInput));

        let session = state.session.read().await;
        assert!(session.job().is_none());
        assert_eq!(session.generation(), 0);
    }

    #[tokio::test]
    async fn test_invalid_upload_leaves_session_untouched() {
        let state = state_with(&[]);
        let err = upload_resumes(
            &state,
            vec![UploadedFile {
                file_name: "x.png".to_string(),
                content_type: Some("image/png".to_string()),
                data: Bytes::new(),
            }],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidFileType(_)));
        assert!(state.session.read().await.resumes().is_empty());
    }
}
