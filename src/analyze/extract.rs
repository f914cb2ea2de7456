//! Model-reply JSON pipeline: pull a JSON object out of surrounding prose,
//! then validate it into an [`AnalysisResult`].
//!
//! The two stages fail differently on purpose. "No JSON at all" (`Parse`)
//! usually means a truncated or chatty reply; "JSON with the wrong shape"
//! (`Schema`) means the model ignored the contract. The distinction matters
//! to callers deciding whether to retry.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::analyze::AnalysisResult;
use crate::error::EvalError;

/// First fenced code block, with or without a language tag.
static FENCED_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```[a-zA-Z]*\s*(.*?)```").expect("fenced block regex"));

/// Extract the JSON object from a model reply.
///
/// If a fenced code block is present, the search is confined to its content;
/// otherwise the whole reply is searched. Within that scope the widest
/// `{ ... }` span (first opening to last closing brace) is taken. No span
/// yields `Parse`.
pub fn extract_json_object(text: &str) -> Result<String, EvalError> {
    let scope = match FENCED_BLOCK.captures(text).and_then(|c| c.get(1)) {
        Some(m) => m.as_str(),
        None => text,
    };

    let start = scope.find('{');
    let end = scope.rfind('}');
    match (start, end) {
        (Some(s), Some(e)) if s < e => Ok(scope[s..=e].to_string()),
        _ => Err(EvalError::Parse(
            "no JSON object found in model reply".to_string(),
        )),
    }
}

/// Validate extracted JSON into an [`AnalysisResult`].
///
/// `Parse` when the text is not valid JSON; `Schema` when `score` is not
/// numeric or any of the three list fields is not an array. The score is
/// rounded and clamped to `[0, 100]`; suggestions are capped at three.
pub fn parse_analysis(json: &str) -> Result<AnalysisResult, EvalError> {
    let value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| EvalError::Parse(format!("reply is not valid JSON: {e}")))?;

    let obj = value
        .as_object()
        .ok_or_else(|| EvalError::Schema("reply is not a JSON object".to_string()))?;

    let score = obj
        .get("score")
        .and_then(|v| v.as_f64())
        .ok_or_else(|| EvalError::Schema("missing or non-numeric `score`".to_string()))?;

    let strengths = string_array(obj, "strengths")?;
    let improvements = string_array(obj, "improvements")?;
    let mut suggestions = string_array(obj, "suggestions")?;
    suggestions.truncate(3);

    let reasoning = obj
        .get("reasoning")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());

    Ok(AnalysisResult {
        score: clamp_score(score),
        strengths,
        improvements,
        suggestions,
        reasoning,
        degraded: false,
    })
}

fn string_array(
    obj: &serde_json::Map<String, serde_json::Value>,
    field: &str,
) -> Result<Vec<String>, EvalError> {
    let arr = obj
        .get(field)
        .and_then(|v| v.as_array())
        .ok_or_else(|| EvalError::Schema(format!("missing or non-array `{field}`")))?;
    Ok(arr
        .iter()
        .filter_map(|v| v.as_str())
        .map(|s| s.to_string())
        .collect())
}

/// Round and clamp a raw model score into the promised `[0, 100]` range.
pub(crate) fn clamp_score(raw: f64) -> u8 {
    let rounded = raw.round();
    if rounded.is_nan() || rounded < 0.0 {
        0
    } else if rounded > 100.0 {
        100
    } else {
        rounded as u8
    }
}
