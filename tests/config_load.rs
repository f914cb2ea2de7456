// tests/config_load.rs
//
// File-level loading behavior for the deployment configs and the dataset,
// exercised against temp files.

use std::fs;

use fincontent_analyzer::analyze::{EngineMode, HeuristicConfig};
use fincontent_analyzer::config::ai::AiConfig;
use fincontent_analyzer::dataset;

#[test]
fn ai_config_parses_and_normalizes() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("ai.json");
    fs::write(
        &p,
        r#"{"enabled": true, "provider": "Gemini", "mode": "lenient", "api_key": "k-123", "model": "  "}"#,
    )
    .unwrap();

    let cfg = AiConfig::load_from_file(&p).unwrap();
    assert_eq!(cfg.provider, "gemini", "provider is lowercased");
    assert_eq!(cfg.mode, EngineMode::Lenient);
    assert_eq!(cfg.api_key, "k-123");
    assert!(cfg.model.is_none(), "blank model collapses to None");
}

#[serial_test::serial]
#[test]
fn ai_config_resolves_env_credential() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("ai.json");
    fs::write(
        &p,
        r#"{"enabled": true, "provider": "gemini", "mode": "strict", "api_key": "ENV"}"#,
    )
    .unwrap();

    std::env::set_var("GEMINI_API_KEY", "from-env");
    let cfg = AiConfig::load_from_file(&p).unwrap();
    assert_eq!(cfg.api_key, "from-env");

    // Absent variable resolves to empty; whether that is acceptable is the
    // evaluator's call, not the loader's.
    std::env::remove_var("GEMINI_API_KEY");
    let cfg = AiConfig::load_from_file(&p).unwrap();
    assert_eq!(cfg.api_key, "");
}

#[test]
fn ai_config_rejects_unknown_provider_for_env_key() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("ai.json");
    fs::write(
        &p,
        r#"{"enabled": true, "provider": "openai", "mode": "strict", "api_key": "ENV"}"#,
    )
    .unwrap();

    let err = AiConfig::load_from_file(&p).unwrap_err();
    assert!(
        err.to_string().contains("Unsupported provider"),
        "got: {err}"
    );
}

#[test]
fn heuristics_partial_file_overrides_only_named_keys() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("heuristics.toml");
    fs::write(&p, "base_score = 30\nlength_points = 20\n").unwrap();

    let cfg = HeuristicConfig::load_from_file(&p);
    assert_eq!(cfg.base_score, 30);
    assert_eq!(cfg.length_points, 20);
    // Everything unnamed keeps the seed.
    assert_eq!(cfg.numeral_points, 15);
    assert!(cfg.finance_terms.contains(&"mutual funds".to_string()));
}

#[test]
fn dataset_loads_and_normalizes_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("content.json");
    fs::write(
        &p,
        r#"[{
            "title": "Tax &amp; Budget   Basics",
            "channel": "Money Talk",
            "views": 1000,
            "likes": 50,
            "comments": 5,
            "duration_seconds": 480,
            "published_at": "2024-03-01T10:00:00Z"
        }]"#,
    )
    .unwrap();

    let records = dataset::load_records(&p).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "Tax & Budget Basics");
}

#[test]
fn dataset_missing_file_is_a_readable_error() {
    let err = dataset::load_records("/nonexistent/content.json").unwrap_err();
    assert!(
        err.to_string().contains("failed to read dataset"),
        "got: {err}"
    );
}
