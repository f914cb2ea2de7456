use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Initialize the Prometheus recorder and register series descriptions
    /// so they show up on /metrics before the first event.
    pub fn init() -> Self {
        let builder = PrometheusBuilder::new();

        let handle = builder
            .install_recorder()
            .expect("prometheus: install recorder");

        describe_counter!("analyze_requests_total", "Title analyses requested.");
        describe_counter!("analyze_cache_hits_total", "Analyses served from cache.");
        describe_counter!(
            "analyze_cache_misses_total",
            "Analyses that missed the cache."
        );
        describe_counter!(
            "analyze_fallback_total",
            "Delegated failures absorbed by the heuristic engine."
        );
        describe_counter!("provider_errors_total", "Completion provider failures.");
        describe_gauge!("dataset_records", "Records in the loaded dataset.");

        Self { handle }
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
