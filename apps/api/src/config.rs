use anyhow::{bail, Context, Result};

/// Which job description analyzer backs `/api/v1/job-description`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzerBackend {
    Heuristic,
    Llm,
}

/// Which scoring strategy the engine is built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Random,
    Keyword,
}

/// Application configuration loaded from environment variables.
/// Startup fails if a variable is present but malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub analyzer_backend: AnalyzerBackend,
    /// Only required when `analyzer_backend` is `Llm`.
    pub anthropic_api_key: Option<String>,
    pub scoring_strategy: StrategyKind,
    pub scoring_seed: Option<u64>,
    /// Partial ranking results are flushed after the first resume and then every N resumes.
    pub partial_flush_every: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            analyzer_backend: AnalyzerBackend::Heuristic,
            anthropic_api_key: None,
            scoring_strategy: StrategyKind::Random,
            scoring_seed: None,
            partial_flush_every: 5,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let analyzer_backend = match optional_env("ANALYZER_BACKEND").as_deref() {
            None | Some("heuristic") => AnalyzerBackend::Heuristic,
            Some("llm") => AnalyzerBackend::Llm,
            Some(other) => bail!("ANALYZER_BACKEND must be 'heuristic' or 'llm', got '{other}'"),
        };

        let anthropic_api_key = optional_env("ANTHROPIC_API_KEY");
        if analyzer_backend == AnalyzerBackend::Llm && anthropic_api_key.is_none() {
            bail!("Required environment variable 'ANTHROPIC_API_KEY' is not set (ANALYZER_BACKEND=llm)");
        }

        let scoring_strategy = match optional_env("SCORING_STRATEGY").as_deref() {
            None | Some("random") => StrategyKind::Random,
            Some("keyword") => StrategyKind::Keyword,
            Some(other) => bail!("SCORING_STRATEGY must be 'random' or 'keyword', got '{other}'"),
        };

        let scoring_seed = optional_env("SCORING_SEED")
            .map(|s| s.parse::<u64>())
            .transpose()
            .context("SCORING_SEED must be an unsigned integer")?;

        let partial_flush_every = optional_env("PARTIAL_FLUSH_EVERY")
            .unwrap_or_else(|| "5".to_string())
            .parse::<usize>()
            .context("PARTIAL_FLUSH_EVERY must be a positive integer")?;
        if partial_flush_every == 0 {
            bail!("PARTIAL_FLUSH_EVERY must be at least 1");
        }

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            analyzer_backend,
            anthropic_api_key,
            scoring_strategy,
            scoring_seed,
            partial_flush_every,
        })
    }
}

/// Treats unset and blank variables the same way.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
