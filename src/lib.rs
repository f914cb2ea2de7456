// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod aggregate;
pub mod analyze;
pub mod api;
pub mod cache;
pub mod config;
pub mod content;
pub mod dataset;
pub mod error;
pub mod metrics;

// ---- Re-exports for stable public API ----
pub use crate::analyze::{AnalysisResult, EngineMode, TitleEvaluator};
pub use crate::api::{create_router, AppState};
pub use crate::content::ContentRecord;
pub use crate::error::EvalError;

use std::env;

use tracing::{info, warn};

use crate::analyze::HeuristicConfig;
use crate::config::ai::AiConfig;

/// Assemble the application router from the deployment environment.
///
/// Honors `DATASET_PATH`, `AI_CONFIG_PATH`, and `HEURISTICS_CONFIG_PATH`,
/// each falling back to its conventional location. A missing AI config file
/// downgrades the deployment to heuristic-only; an enabled provider without
/// a credential in strict mode refuses to start.
pub async fn app() -> anyhow::Result<axum::Router> {
    let dataset_path =
        env::var("DATASET_PATH").unwrap_or_else(|_| dataset::DEFAULT_DATASET_PATH.to_string());
    let records = dataset::load_records(&dataset_path)?;

    let heuristics_path =
        env::var("HEURISTICS_CONFIG_PATH").unwrap_or_else(|_| "config/heuristics.toml".to_string());
    let heuristics = HeuristicConfig::load_from_file(&heuristics_path);

    let ai_path = env::var("AI_CONFIG_PATH").unwrap_or_else(|_| "config/ai.json".to_string());
    let ai = match AiConfig::load_from_file(&ai_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(error = %e, path = %ai_path, "AI config unavailable, running heuristic-only");
            AiConfig::disabled()
        }
    };

    let evaluator = TitleEvaluator::from_config(&ai, heuristics)?;
    info!(
        records = records.len(),
        delegated = evaluator.is_delegated(),
        mode = ?evaluator.mode(),
        "evaluator assembled"
    );

    let state = AppState::new(records, evaluator);
    Ok(create_router(state))
}
