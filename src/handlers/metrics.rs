//! Metrics endpoint handler for Prometheus scraping.
//!
//! This module provides the `/metrics` endpoint handler. It serves the cached
//! report immediately and starts a background collection when the cache has
//! outlived `cache_ttl`.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use prometheus::{Encoder, TextEncoder};
use std::time::{Duration, Instant};
use tracing::{debug, error, instrument};

use crate::config::DEFAULT_CACHE_TTL;
use crate::state::SharedState;

/// Buffer capacity for metrics encoding.
const BUFFER_CAP: usize = 64 * 1024;

/// Error type for metrics endpoint failures.
#[derive(Debug)]
pub enum MetricsError {
    EncodingFailed,
}

impl IntoResponse for MetricsError {
    fn into_response(self) -> axum::response::Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to encode metrics",
        )
            .into_response()
    }
}

/// Handler for the /metrics endpoint.
#[instrument(skip(state))]
pub async fn metrics_handler(State(state): State<SharedState>) -> Result<String, MetricsError> {
    let start = Instant::now();
    debug!("Processing /metrics request");

    // Fire-and-forget refresh when nothing is running and the report is stale
    let ttl = Duration::from_secs(state.config.cache_ttl.unwrap_or(DEFAULT_CACHE_TTL));
    let should_trigger_update = {
        let cache = state.cache.read().await;
        !cache.is_updating && cache.is_stale(ttl)
    };

    if should_trigger_update {
        debug!("Triggering on-demand collection");
        let state_clone = state.clone();
        tokio::spawn(async move {
            if let Err(e) = crate::cache_updater::update_cache(&state_clone).await {
                error!("On-demand collection failed: {}", e);
            }
        });
    } else {
        debug!("Collection running or report still fresh, serving cached report");
    }

    let exported_series = {
        let cache = state.cache.read().await;

        state.collection_duration.set(cache.update_duration_seconds);
        state
            .collection_success
            .set(if cache.update_success { 1.0 } else { 0.0 });
        state
            .collecting
            .set(if cache.is_updating { 1.0 } else { 0.0 });

        let cfg = &state.config;
        state.metrics.export(
            &cache.report,
            cfg.enable_process_metrics.unwrap_or(true),
            cfg.enable_device_metrics.unwrap_or(true),
        )
    };

    // Scrape duration covers the export; encoding follows below
    state.scrape_duration.set(start.elapsed().as_secs_f64());

    let families = state.registry.gather();
    let mut buffer = Vec::with_capacity(BUFFER_CAP);
    let encoder = TextEncoder::new();

    if encoder.encode(&families, &mut buffer).is_err() {
        error!("Failed to encode Prometheus metrics");
        return Err(MetricsError::EncodingFailed);
    }

    let request_duration_ms = start.elapsed().as_secs_f64() * 1000.0;
    state
        .health_stats
        .record_metrics_endpoint_call(request_duration_ms);
    state.health_stats.record_http_request();

    debug!(
        "Metrics request completed: {} series, {} bytes, {:.3}ms",
        exported_series,
        buffer.len(),
        request_duration_ms
    );

    String::from_utf8(buffer).map_err(|_| MetricsError::EncodingFailed)
}
