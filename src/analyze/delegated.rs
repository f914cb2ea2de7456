//! Delegated engine: formats reference context into the strategist prompt,
//! invokes the completion provider, and validates the reply into an
//! [`AnalysisResult`].

use std::sync::Arc;

use tracing::debug;

use crate::analyze::extract::{extract_json_object, parse_analysis};
use crate::analyze::provider::{CompletionProvider, GenerationParams};
use crate::analyze::{AnalysisResult, ReferenceRecord};
use crate::error::EvalError;

/// How many reference titles ride along in the prompt.
const MAX_REFERENCES: usize = 10;

/// Remote scorer behind a [`CompletionProvider`].
pub struct DelegatedEngine {
    provider: Arc<dyn CompletionProvider>,
    params: GenerationParams,
}

impl DelegatedEngine {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            provider,
            params: GenerationParams::default(),
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Ask the model for an assessment. The caller has validated the title
    /// before this point.
    pub async fn analyze(
        &self,
        title: &str,
        references: &[ReferenceRecord],
    ) -> Result<AnalysisResult, EvalError> {
        let prompt = build_prompt(title, references);
        debug!(provider = self.provider.name(), "requesting title analysis");
        let reply = self.provider.complete(&prompt, &self.params).await?;
        let json = extract_json_object(&reply)?;
        parse_analysis(&json)
    }
}

/// Fixed strategist prompt. The scoring rubric is advisory text for the
/// model; nothing in it is enforced on this side.
fn build_prompt(title: &str, references: &[ReferenceRecord]) -> String {
    let mut top: Vec<&ReferenceRecord> = references.iter().collect();
    top.sort_by(|a, b| b.views.cmp(&a.views));
    top.truncate(MAX_REFERENCES);

    let context = if top.is_empty() {
        "No reference data".to_string()
    } else {
        top.iter()
            .map(|r| {
                format!(
                    "\"{}\" ({} views, {}% engagement)",
                    r.title, r.views, r.engagement
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        r#"You are an expert YouTube/LinkedIn content strategist analyzing finance content titles.

CONTEXT - Top performing finance titles:
{context}

ANALYZE THIS TITLE: "{title}"

Provide analysis in STRICT JSON format (no markdown, no extra text):
{{
  "score": <number 0-100>,
  "strengths": [<2-4 specific strengths as strings>],
  "improvements": [<2-4 specific actionable suggestions>],
  "suggestions": [<3 alternative title variations>],
  "reasoning": "<1 sentence explaining the score>"
}}

Scoring criteria (total 100):
- Length (40-60 chars ideal): 20 points
- Numbers/specificity: 20 points
- Emotional/power words: 20 points
- Clarity & curiosity gap: 20 points
- Platform optimization: 20 points

Rules:
- Be specific and actionable
- Suggestions should be creative but realistic
- Consider finance audience (investors, beginners)
- Avoid generic advice
- Give honest scores (random letters should score 0-10)"#
    )
}
