// src/dataset.rs
//! # Dataset Loading
//!
//! Reads the finance-video dataset from a JSON file and normalizes the
//! scraped text fields before anything downstream sees them.

use std::fs;
use std::path::Path;

use metrics::gauge;
use tracing::{info, warn};

use crate::content::ContentRecord;

pub const DEFAULT_DATASET_PATH: &str = "data/finance_content.json";

/// Normalize scraped text: decode HTML entities, collapse whitespace, trim.
pub fn normalize_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();

    out.trim().to_string()
}

/// Parse and clean a dataset document. Records whose title normalizes to
/// empty are dropped with a warning rather than failing the whole load.
pub fn parse_records(data: &str) -> anyhow::Result<Vec<ContentRecord>> {
    let raw: Vec<ContentRecord> = serde_json::from_str(data)?;

    let total = raw.len();
    let mut records = Vec::with_capacity(total);
    for mut record in raw {
        record.title = normalize_text(&record.title);
        record.channel = normalize_text(&record.channel);
        if record.title.is_empty() {
            warn!(channel = %record.channel, "dropping record with empty title");
            continue;
        }
        records.push(record);
    }

    let dropped = total - records.len();
    if dropped > 0 {
        warn!(dropped, total, "dataset records dropped during normalization");
    }

    Ok(records)
}

/// Load the dataset from disk and publish its size as a gauge.
pub fn load_records<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<ContentRecord>> {
    let path = path.as_ref();
    let data = fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read dataset {}: {e}", path.display()))?;
    let records = parse_records(&data)?;

    gauge!("dataset_records").set(records.len() as f64);
    info!(count = records.len(), path = %path.display(), "dataset loaded");

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_decodes_entities_and_collapses_ws() {
        let s = "  Top&nbsp;&nbsp;Stocks &amp; Funds\n2024  ";
        assert_eq!(normalize_text(s), "Top Stocks & Funds 2024");
    }

    #[test]
    fn parse_keeps_good_records_and_drops_empty_titles() {
        let data = r#"[
            {
                "title": "5 Index Funds &amp; ETFs",
                "channel": "Markets  Daily",
                "views": 1000,
                "likes": 50,
                "comments": 5,
                "duration_seconds": 480,
                "published_at": "2024-03-01T10:00:00Z"
            },
            {
                "title": "   ",
                "channel": "Ghost Channel",
                "views": 10,
                "likes": 0,
                "comments": 0,
                "published_at": "2024-03-02T10:00:00Z"
            }
        ]"#;
        let records = parse_records(data).expect("parses");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "5 Index Funds & ETFs");
        assert_eq!(records[0].channel, "Markets Daily");
    }

    #[test]
    fn parse_rejects_malformed_documents() {
        assert!(parse_records("{\"not\": \"an array\"}").is_err());
        assert!(parse_records("not json").is_err());
    }

    #[test]
    fn missing_duration_defaults_to_zero() {
        let data = r#"[{
            "title": "Budgeting Basics",
            "channel": "Money Talk",
            "views": 100,
            "likes": 10,
            "comments": 1,
            "published_at": "2024-01-15T08:30:00Z"
        }]"#;
        let records = parse_records(data).expect("parses");
        assert_eq!(records[0].duration_seconds, 0);
    }
}
