//! Report collection for the exporter cache.
//!
//! Collections are triggered on demand by the metrics endpoint (and once at
//! startup). powertop blocks for the whole sampling period, so the run is
//! moved off the async runtime with `spawn_blocking`.

use herakles_powertop_exporter::{collect, SysPower};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::state::SharedState;

/// Collects a fresh report and stores it in the cache.
///
/// Returns immediately when another collection is already running. A failed
/// collection empties the cached report and marks the cache unsuccessful.
#[instrument(skip(state))]
pub async fn update_cache(state: &SharedState) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();

    {
        let mut cache = state.cache.write().await;
        if cache.is_updating {
            debug!("Collection already in progress, serving stale report");
            return Ok(());
        }
        cache.is_updating = true;
        state.collecting.set(1.0);
    }

    info!("Starting collection from {}", state.source.describe());

    let source = state.source.clone();
    let outcome = tokio::task::spawn_blocking(move || collect(&source)).await;
    let duration = start.elapsed().as_secs_f64();

    let mut cache = state.cache.write().await;
    cache.is_updating = false;
    cache.last_updated = Some(Instant::now());
    cache.update_duration_seconds = duration;
    state.collecting.set(0.0);
    state.collection_duration.set(duration);

    let result = match outcome {
        Ok(Ok(report)) => {
            info!(
                "Collection completed: {} process consumers, {} device consumers in {:.2}s",
                report.process_consumers.len(),
                report.device_consumers.len(),
                duration
            );
            state.health_stats.record_collection(
                report.process_consumers.len(),
                report.device_consumers.len(),
                duration,
            );
            cache.report = report;
            cache.update_success = true;
            Ok(())
        }
        Ok(Err(e)) => {
            warn!("Collection failed: {}", e);
            Err(e.into())
        }
        Err(e) => {
            warn!("Collection task failed: {}", e);
            Err(e.into())
        }
    };

    if result.is_err() {
        state.health_stats.record_collection_failure(duration);
        cache.report = SysPower::default();
        cache.update_success = false;
    }
    state
        .collection_success
        .set(if cache.update_success { 1.0 } else { 0.0 });

    result
}
