mod analysis;
mod config;
mod errors;
mod ingestion;
mod llm_client;
mod models;
mod ranking;
mod routes;
mod session;
mod state;
#[cfg(test)]
mod test_utils;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::jd_analyzer::{HeuristicJdAnalyzer, JdAnalyzer, LlmJdAnalyzer};
use crate::analysis::scoring::{KeywordStrategy, RandomStrategy, ScoringEngine, ScoringStrategy};
use crate::config::{AnalyzerBackend, Config, StrategyKind};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume ranking API v{}", env!("CARGO_PKG_VERSION"));

    let analyzer = build_analyzer(&config)?;
    info!("JD analyzer backend: {}", analyzer.backend());

    let engine = Arc::new(ScoringEngine::new(build_strategy(&config)));
    info!(
        "Scoring strategy: {} (partial flush every {} resumes)",
        engine.strategy_name(),
        config.partial_flush_every
    );

    let state = AppState::new(config.clone(), analyzer, engine);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_analyzer(config: &Config) -> Result<Arc<dyn JdAnalyzer>> {
    match config.analyzer_backend {
        AnalyzerBackend::Heuristic => Ok(Arc::new(HeuristicJdAnalyzer)),
        AnalyzerBackend::Llm => {
            let api_key = config
                .anthropic_api_key
                .clone()
                .context("ANTHROPIC_API_KEY is required for the llm analyzer")?;
            let client = LlmClient::new(api_key).context("failed to build LLM HTTP client")?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Ok(Arc::new(LlmJdAnalyzer(client)))
        }
    }
}

fn build_strategy(config: &Config) -> Arc<dyn ScoringStrategy> {
    match (config.scoring_strategy, config.scoring_seed) {
        (StrategyKind::Keyword, _) => Arc::new(KeywordStrategy),
        (StrategyKind::Random, Some(seed)) => Arc::new(RandomStrategy::seeded(seed)),
        (StrategyKind::Random, None) => Arc::new(RandomStrategy::from_entropy()),
    }
}
