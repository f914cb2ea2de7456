//! Completion providers: the seam between the delegated engine and a remote
//! text-completion model. One real provider (Gemini) plus a deterministic
//! mock for tests and `AI_TEST_MODE=mock` runs.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::EvalError;

/// Sampling parameters forwarded with every completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 1024,
        }
    }
}

/// A remote text-completion backend. Implementations return the raw model
/// text; all JSON handling happens downstream in the response pipeline.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &str, params: &GenerationParams)
        -> Result<String, EvalError>;
    /// Provider name for diagnostics/logs.
    fn name(&self) -> &'static str;
}

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Google Gemini `generateContent` provider. Requires an API key.
pub struct GeminiProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiProvider {
    /// `model_override`: pass Some("gemini-1.5-pro") to replace the default
    /// flash model.
    pub fn new(api_key: String, model_override: Option<&str>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("fincontent-analyzer/0.1 (+github.com/fincontent/fincontent-analyzer)")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(15))
            .build()
            .expect("reqwest client");
        let model = model_override.unwrap_or(DEFAULT_GEMINI_MODEL).to_string();
        Self {
            http,
            api_key,
            model,
        }
    }
}

#[async_trait]
impl CompletionProvider for GeminiProvider {
    async fn complete(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, EvalError> {
        if self.api_key.is_empty() {
            return Err(EvalError::Configuration(
                "GEMINI_API_KEY is not set".to_string(),
            ));
        }

        #[derive(Serialize)]
        struct Part<'a> {
            text: &'a str,
        }
        #[derive(Serialize)]
        struct Content<'a> {
            parts: Vec<Part<'a>>,
        }
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct GenerationConfig {
            temperature: f32,
            top_k: u32,
            top_p: f32,
            max_output_tokens: u32,
        }
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Req<'a> {
            contents: Vec<Content<'a>>,
            generation_config: GenerationConfig,
        }
        #[derive(Deserialize)]
        struct Resp {
            #[serde(default)]
            candidates: Vec<Candidate>,
        }
        #[derive(Deserialize)]
        struct Candidate {
            content: CandidateContent,
        }
        #[derive(Deserialize)]
        struct CandidateContent {
            #[serde(default)]
            parts: Vec<RespPart>,
        }
        #[derive(Deserialize)]
        struct RespPart {
            #[serde(default)]
            text: String,
        }

        let req = Req {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: params.temperature,
                top_k: params.top_k,
                top_p: params.top_p,
                max_output_tokens: params.max_output_tokens,
            },
        };

        // Key travels as a query parameter; never log this URL.
        let url = format!(
            "{GEMINI_ENDPOINT}/{}:generateContent?key={}",
            self.model, self.api_key
        );

        let resp = self
            .http
            .post(&url)
            .json(&req)
            .send()
            .await
            .map_err(|e| EvalError::Upstream {
                status: None,
                message: format!("request failed: {e}"),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let message = upstream_message(resp).await;
            return Err(EvalError::Upstream {
                status: Some(status.as_u16()),
                message,
            });
        }

        let body: Resp = resp.json().await.map_err(|e| EvalError::Upstream {
            status: None,
            message: format!("unreadable response body: {e}"),
        })?;

        let text = body
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(EvalError::Upstream {
                status: Some(status.as_u16()),
                message: "no candidates in response".to_string(),
            });
        }
        Ok(text)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

/// Best-effort extraction of the upstream error message from a failed reply.
async fn upstream_message(resp: reqwest::Response) -> String {
    #[derive(Deserialize)]
    struct ErrBody {
        error: Option<ErrDetail>,
    }
    #[derive(Deserialize)]
    struct ErrDetail {
        message: Option<String>,
    }
    match resp.json::<ErrBody>().await {
        Ok(ErrBody {
            error: Some(ErrDetail { message: Some(m) }),
        }) => m,
        _ => "unknown upstream error".to_string(),
    }
}

/// Deterministic provider used in tests and local mock runs.
#[derive(Debug, Clone)]
pub struct MockProvider {
    reply: String,
}

impl MockProvider {
    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }

    /// A reply shaped like a typical model answer: fenced JSON.
    pub fn canned_analysis() -> Self {
        Self::with_reply(
            "```json\n{\"score\": 72, \"strengths\": [\"Clear topic\"], \
             \"improvements\": [\"Add a number\"], \"suggestions\": \
             [\"7 Stocks to Watch This Quarter\"], \
             \"reasoning\": \"Solid but generic.\"}\n```",
        )
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    async fn complete(
        &self,
        _prompt: &str,
        _params: &GenerationParams,
    ) -> Result<String, EvalError> {
        Ok(self.reply.clone())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
