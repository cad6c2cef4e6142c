//! Application state management for the exporter.
//!
//! This module defines the shared application state that is passed
//! to HTTP handlers and used by the on-demand collection task.

use herakles_powertop_exporter::health_stats::HealthStats;
use herakles_powertop_exporter::ReportSource;
use prometheus::{Gauge, Registry};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

use crate::cache::ReportCache;
use crate::config::Config;
use crate::metrics::PowerMetrics;

/// Type alias for shared application state.
pub type SharedState = Arc<AppState>;

/// Global application state shared across requests and background tasks.
pub struct AppState {
    pub registry: Registry,
    pub metrics: PowerMetrics,
    pub scrape_duration: Gauge,
    pub collection_duration: Gauge,
    pub collection_success: Gauge,
    pub collecting: Gauge,
    pub cache: Arc<RwLock<ReportCache>>,
    pub config: Arc<Config>,
    /// Where reports are collected from.
    pub source: ReportSource,
    pub health_stats: Arc<HealthStats>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}
