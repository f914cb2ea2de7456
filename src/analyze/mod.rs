// src/analyze/mod.rs
//! # Title Analysis
//!
//! The evaluator facade: input validation, cache consult, engine dispatch,
//! and the strict/lenient failure policy around the delegated engine.

pub mod delegated;
pub mod extract;
pub mod heuristic;
pub mod provider;

use std::sync::Arc;

use metrics::counter;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::cache::AnalysisCache;
use crate::config::ai::AiConfig;
use crate::content::ContentRecord;
use crate::error::EvalError;

// Re-export convenient types.
pub use crate::analyze::delegated::DelegatedEngine;
pub use crate::analyze::heuristic::{HeuristicConfig, HeuristicEngine};
pub use crate::analyze::provider::{
    CompletionProvider, GeminiProvider, GenerationParams, MockProvider,
};

static LETTER_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z]{3,}").expect("letter run regex"));

/// The structured assessment returned for a title. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Overall quality score, always within `[0, 100]`.
    pub score: u8,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    /// Up to three alternative titles.
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    /// True when a lenient deployment substituted the heuristic engine after
    /// a delegated failure.
    #[serde(default)]
    pub degraded: bool,
}

/// Contextual example handed to the delegated engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    pub title: String,
    pub views: u64,
    pub engagement: f64,
}

impl From<&ContentRecord> for ReferenceRecord {
    fn from(r: &ContentRecord) -> Self {
        Self {
            title: r.title.clone(),
            views: r.views,
            engagement: r.engagement_rate(),
        }
    }
}

/// Failure policy for the delegated engine, chosen explicitly per deployment.
/// The two behaviors never mix within one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineMode {
    /// Every delegated failure reaches the caller as a typed error.
    Strict,
    /// Transient and configuration failures degrade to the heuristic engine.
    Lenient,
}

/// Gate before any external call: at least 2 whitespace-separated words, at
/// least one run of 3+ ASCII letters, at least 5 characters overall.
pub fn validate_title(title: &str) -> Result<(), EvalError> {
    let trimmed = title.trim();
    if trimmed.split_whitespace().count() < 2 {
        return Err(EvalError::InvalidTitle(
            "enter a title with at least 2 words".to_string(),
        ));
    }
    if !LETTER_RUN.is_match(trimmed) {
        return Err(EvalError::InvalidTitle(
            "title must contain meaningful text (letters/words)".to_string(),
        ));
    }
    if trimmed.chars().count() < 5 {
        return Err(EvalError::InvalidTitle(
            "title must be at least 5 characters long".to_string(),
        ));
    }
    Ok(())
}

/// Evaluator facade owning the cache and both engines.
pub struct TitleEvaluator {
    heuristic: HeuristicEngine,
    delegated: Option<DelegatedEngine>,
    mode: EngineMode,
    cache: AnalysisCache,
}

impl TitleEvaluator {
    /// Heuristic-only evaluator, used when AI is disabled.
    pub fn heuristic_only(config: HeuristicConfig) -> Self {
        Self {
            heuristic: HeuristicEngine::new(config),
            delegated: None,
            mode: EngineMode::Strict,
            cache: AnalysisCache::default(),
        }
    }

    /// Delegated evaluator with the given failure policy.
    pub fn with_provider(
        provider: Arc<dyn CompletionProvider>,
        mode: EngineMode,
        config: HeuristicConfig,
    ) -> Self {
        Self {
            heuristic: HeuristicEngine::new(config),
            delegated: Some(DelegatedEngine::new(provider)),
            mode,
            cache: AnalysisCache::default(),
        }
    }

    /// Build from deployment config.
    ///
    /// * `AI_TEST_MODE=mock` substitutes the deterministic mock provider.
    /// * AI disabled: heuristic-only evaluator.
    /// * AI enabled in strict mode without a credential: refused here, at
    ///   startup, rather than on the first request.
    pub fn from_config(ai: &AiConfig, heuristics: HeuristicConfig) -> Result<Self, EvalError> {
        if std::env::var("AI_TEST_MODE")
            .map(|v| v == "mock")
            .unwrap_or(false)
        {
            return Ok(Self::with_provider(
                Arc::new(MockProvider::canned_analysis()),
                ai.mode,
                heuristics,
            ));
        }

        if !ai.enabled {
            return Ok(Self::heuristic_only(heuristics));
        }

        match ai.provider.as_str() {
            "gemini" => {
                if ai.mode == EngineMode::Strict && ai.api_key.is_empty() {
                    return Err(EvalError::Configuration(
                        "gemini provider enabled in strict mode without GEMINI_API_KEY"
                            .to_string(),
                    ));
                }
                let provider = GeminiProvider::new(ai.api_key.clone(), ai.model.as_deref());
                Ok(Self::with_provider(Arc::new(provider), ai.mode, heuristics))
            }
            other => Err(EvalError::Configuration(format!(
                "unsupported provider: {other}"
            ))),
        }
    }

    /// Evaluate a title.
    ///
    /// Flow: cache consult, input validation, engine run, cache write.
    /// Strict mode propagates every delegated failure; lenient mode degrades
    /// to the heuristic engine and marks the result. Degraded results are
    /// not cached, so a later call retries the remote path.
    pub async fn evaluate(
        &self,
        title: &str,
        references: &[ReferenceRecord],
    ) -> Result<AnalysisResult, EvalError> {
        counter!("analyze_requests_total").increment(1);

        if title.trim().is_empty() {
            return Err(EvalError::InvalidTitle("title is empty".to_string()));
        }

        if let Some(hit) = self.cache.get(title) {
            counter!("analyze_cache_hits_total").increment(1);
            debug!(title_hash = %short_hash(title), "cache hit");
            return Ok(hit);
        }
        counter!("analyze_cache_misses_total").increment(1);

        let delegated = match &self.delegated {
            None => {
                let result = self.heuristic.analyze(title)?;
                self.cache.put(title, result.clone());
                return Ok(result);
            }
            Some(engine) => engine,
        };

        validate_title(title)?;

        match delegated.analyze(title, references).await {
            Ok(result) => {
                self.cache.put(title, result.clone());
                Ok(result)
            }
            Err(err) => {
                counter!("provider_errors_total").increment(1);
                if self.mode == EngineMode::Lenient && !err.is_input_fault() {
                    counter!("analyze_fallback_total").increment(1);
                    warn!(
                        provider = delegated.provider_name(),
                        error = %err,
                        title_hash = %short_hash(title),
                        "delegated engine failed, degrading to heuristic"
                    );
                    let mut result = self.heuristic.analyze(title)?;
                    result.degraded = true;
                    result.reasoning = Some(format!(
                        "AI analysis via {} unavailable ({err}); rule-based assessment shown instead.",
                        delegated.provider_name()
                    ));
                    Ok(result)
                } else {
                    Err(err)
                }
            }
        }
    }

    pub fn cache(&self) -> &AnalysisCache {
        &self.cache
    }

    pub fn mode(&self) -> EngineMode {
        self.mode
    }

    /// True when a completion provider is wired in.
    pub fn is_delegated(&self) -> bool {
        self.delegated.is_some()
    }
}

/// Short stable hash so logs never carry user-entered text.
fn short_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    digest.iter().take(4).map(|b| format!("{b:02x}")).collect()
}
