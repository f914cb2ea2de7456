// src/config/ai.rs
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path};

use crate::analyze::EngineMode;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    pub enabled: bool,
    /// "gemini" (case-insensitive)
    pub provider: String,
    /// Failure policy, "strict" or "lenient". No default: every deployment
    /// states its policy.
    pub mode: EngineMode,
    /// "ENV" means: read from GEMINI_API_KEY
    pub api_key: String,
    /// Model override; the provider picks its default when absent.
    #[serde(default)]
    pub model: Option<String>,
}

impl AiConfig {
    /// Config for a deployment with no delegated engine at all.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            provider: "gemini".to_string(),
            mode: EngineMode::Strict,
            api_key: String::new(),
            model: None,
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)?;
        let mut cfg: AiConfig = serde_json::from_str(&data)?;

        // Normalize provider
        cfg.provider = cfg.provider.to_lowercase();

        // Resolve api key if "ENV". An absent variable resolves to empty;
        // whether that is acceptable depends on the mode and is decided at
        // evaluator construction, not here.
        if cfg.api_key.trim().eq_ignore_ascii_case("env") {
            cfg.api_key = match cfg.provider.as_str() {
                "gemini" => env::var("GEMINI_API_KEY").unwrap_or_default(),
                other => anyhow::bail!("Unsupported provider in config: {other}"),
            };
        }

        // Sanitize model
        if let Some(model) = &cfg.model {
            if model.trim().is_empty() {
                cfg.model = None;
            }
        }

        Ok(cfg)
    }
}
