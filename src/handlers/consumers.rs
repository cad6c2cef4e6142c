//! Power consumers endpoint handler.
//!
//! Serves the last decoded report as JSON, using the same field names as
//! the `parse` subcommand.

use axum::{extract::State, Json};
use herakles_powertop_exporter::SysPower;
use tracing::{debug, instrument};

use crate::state::SharedState;

/// Handler for the /consumers endpoint.
#[instrument(skip(state))]
pub async fn consumers_handler(State(state): State<SharedState>) -> Json<SysPower> {
    debug!("Processing /consumers request");
    state.health_stats.record_http_request();

    let cache = state.cache.read().await;
    Json(cache.report.clone())
}
