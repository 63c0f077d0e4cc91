use std::sync::Arc;

use tokio::sync::RwLock;

use crate::analysis::jd_analyzer::JdAnalyzer;
use crate::analysis::scoring::ScoringEngine;
use crate::config::Config;
use crate::session::Session;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable analyzer. Default: HeuristicJdAnalyzer. Swap via ANALYZER_BACKEND.
    pub analyzer: Arc<dyn JdAnalyzer>,
    /// Engine around the strategy picked by SCORING_STRATEGY.
    pub engine: Arc<ScoringEngine>,
    /// In-memory session; volatile, gone on restart.
    pub session: Arc<RwLock<Session>>,
}

impl AppState {
    pub fn new(config: Config, analyzer: Arc<dyn JdAnalyzer>, engine: Arc<ScoringEngine>) -> Self {
        Self {
            config,
            analyzer,
            engine,
            session: Arc::new(RwLock::new(Session::new())),
        }
    }
}
