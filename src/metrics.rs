// src/metrics.rs
use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics::{describe_counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder. Call once, from the binary only;
    /// without a recorder the `counter!` calls elsewhere are no-ops.
    pub fn init(cache_ttl_secs: u64) -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;

        describe_counter!(
            "content_resolve_total",
            "Resolved content payloads by kind and serving source."
        );
        describe_counter!(
            "content_source_errors_total",
            "Content source failures that triggered a fallback."
        );
        describe_counter!(
            "contact_submissions_total",
            "Contact form submissions by outcome."
        );

        // Static gauge with the configured reuse window
        gauge!("content_cache_ttl_seconds").set(cache_ttl_secs as f64);

        Ok(Self { handle })
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
