//! Root endpoint handler for the landing page.
//!
//! This module provides the `/` endpoint handler that lists the available
//! endpoints together with version and uptime.

use axum::{extract::State, response::IntoResponse};
use std::fmt::Write as FmtWrite;
use tracing::{debug, instrument};

use crate::handlers::health::FOOTER_TEXT;
use crate::state::SharedState;

/// Handler for the root `/` endpoint.
#[instrument(skip(state))]
pub async fn root_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing / request");
    state.health_stats.record_http_request();

    let uptime_secs = state.start_time.elapsed().as_secs();
    let uptime_str = format!(
        "{}h {}m {}s",
        uptime_secs / 3600,
        (uptime_secs % 3600) / 60,
        uptime_secs % 60
    );

    let mut out = String::new();
    writeln!(out, "HERAKLES POWERTOP EXPORTER").ok();
    writeln!(out, "==========================").ok();
    writeln!(out).ok();
    writeln!(out, "Version:  {}", version_string()).ok();
    writeln!(out, "Uptime:   {}", uptime_str).ok();
    writeln!(out, "Source:   {}", state.source.describe()).ok();
    writeln!(out).ok();
    writeln!(out, "ENDPOINTS").ok();
    writeln!(out, "---------").ok();
    writeln!(out, "/metrics    Prometheus metrics for power consumers").ok();
    writeln!(out, "/consumers  Last decoded report as JSON").ok();
    if state.config.enable_health.unwrap_or(true) {
        writeln!(out, "/health     Exporter health and collection statistics").ok();
    }
    writeln!(out, "/config     Effective configuration (YAML)").ok();
    writeln!(out).ok();
    writeln!(out, "{}", FOOTER_TEXT).ok();

    ([("Content-Type", "text/plain; charset=utf-8")], out)
}

/// Crate version with the git revision when the build recorded one.
fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("VERGEN_GIT_SHA") {
        Some(sha) if !sha.is_empty() => format!("{} ({})", version, sha),
        _ => version.to_string(),
    }
}
