use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::aggregate::{
    self, ChannelAverage, DurationBucket, EmptyInput, EngagementEntry, SummaryStats,
    DEFAULT_DURATION_CUTS,
};
use crate::analyze::{AnalysisResult, ReferenceRecord, TitleEvaluator};
use crate::content::ContentRecord;
use crate::error::EvalError;

#[derive(Clone)]
pub struct AppState {
    records: Arc<Vec<ContentRecord>>,
    references: Arc<Vec<ReferenceRecord>>,
    evaluator: Arc<TitleEvaluator>,
}

impl AppState {
    pub fn new(records: Vec<ContentRecord>, evaluator: TitleEvaluator) -> Self {
        let references = records.iter().map(ReferenceRecord::from).collect();
        Self {
            records: Arc::new(records),
            references: Arc::new(references),
            evaluator: Arc::new(evaluator),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/stats", get(stats))
        .route("/rankings", get(rankings))
        .route("/channels", get(channels))
        .route("/durations", get(durations))
        .route("/analyze", post(analyze))
        .route("/debug/cache", get(debug_cache))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Error envelope for every non-2xx payload: message, fault class, and
/// whether a retry of the same request can help.
pub struct ApiError {
    status: StatusCode,
    kind: &'static str,
    retryable: bool,
    message: String,
}

impl From<EvalError> for ApiError {
    fn from(err: EvalError) -> Self {
        // Classification lives on EvalError; this impl only picks the
        // presentation for each class.
        let retryable = err.is_transient();
        let (status, kind) = if err.is_input_fault() {
            (StatusCode::UNPROCESSABLE_ENTITY, "input")
        } else if retryable {
            (StatusCode::BAD_GATEWAY, "transient")
        } else {
            (StatusCode::SERVICE_UNAVAILABLE, "configuration")
        };
        Self {
            status,
            kind,
            retryable,
            message: err.to_string(),
        }
    }
}

impl From<EmptyInput> for ApiError {
    fn from(err: EmptyInput) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            kind: "input",
            retryable: false,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.message,
            "kind": self.kind,
            "retryable": self.retryable,
        });
        (self.status, Json(body)).into_response()
    }
}

async fn stats(State(state): State<AppState>) -> Result<Json<SummaryStats>, ApiError> {
    let out = aggregate::summary_stats(&state.records)?;
    Ok(Json(out))
}

async fn rankings(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> Json<Vec<EngagementEntry>> {
    let limit = q
        .get("limit")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(10);
    let mut out = aggregate::engagement_ranking(&state.records);
    out.truncate(limit);
    Json(out)
}

async fn channels(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> Json<Vec<ChannelAverage>> {
    let top = q
        .get("top")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(8);
    Json(aggregate::average_views_by_channel(&state.records, top))
}

async fn durations(State(state): State<AppState>) -> Json<Vec<DurationBucket>> {
    Json(aggregate::duration_histogram(
        &state.records,
        &DEFAULT_DURATION_CUTS,
    ))
}

#[derive(serde::Deserialize)]
struct AnalyzeReq {
    title: String,
}

async fn analyze(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeReq>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let result = state
        .evaluator
        .evaluate(&body.title, &state.references)
        .await?;
    Ok(Json(result))
}

#[derive(serde::Serialize)]
struct CacheInfo {
    entries: usize,
    capacity: usize,
}

async fn debug_cache(State(state): State<AppState>) -> Json<CacheInfo> {
    let cache = state.evaluator.cache();
    Json(CacheInfo {
        entries: cache.len(),
        capacity: cache.capacity(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_faults_map_to_422() {
        let err = ApiError::from(EvalError::InvalidTitle("too short".into()));
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.kind, "input");
        assert!(!err.retryable);

        let err = ApiError::from(EmptyInput);
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.kind, "input");
    }

    #[test]
    fn transient_faults_map_to_502_retryable() {
        for err in [
            EvalError::Upstream {
                status: Some(500),
                message: "boom".into(),
            },
            EvalError::Parse("no JSON".into()),
            EvalError::Schema("missing score".into()),
        ] {
            let api = ApiError::from(err);
            assert_eq!(api.status, StatusCode::BAD_GATEWAY);
            assert_eq!(api.kind, "transient");
            assert!(api.retryable);
        }
    }

    #[test]
    fn configuration_faults_map_to_503() {
        let err = ApiError::from(EvalError::Configuration("no key".into()));
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.kind, "configuration");
        assert!(!err.retryable);
    }

    #[test]
    fn retryable_flag_tracks_error_transience() {
        let faults = [
            EvalError::InvalidTitle("x".into()),
            EvalError::Configuration("x".into()),
            EvalError::Upstream {
                status: None,
                message: "x".into(),
            },
            EvalError::Parse("x".into()),
            EvalError::Schema("x".into()),
        ];
        for err in faults {
            let transient = err.is_transient();
            let api = ApiError::from(err);
            assert_eq!(
                api.retryable, transient,
                "retryable must follow is_transient() for kind {:?}",
                api.kind
            );
            assert_eq!(api.kind == "transient", transient);
        }
    }
}
