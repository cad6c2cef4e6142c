//! Cache management for collected powertop reports.
//!
//! This module provides the `ReportCache` structure holding the last decoded
//! report between collections, along with metadata about the cache state.

use herakles_powertop_exporter::SysPower;
use std::time::{Duration, Instant};

/// Cache state for the last collected report with update timing information.
#[derive(Clone, Default)]
pub struct ReportCache {
    pub report: SysPower,
    pub last_updated: Option<Instant>,
    pub update_duration_seconds: f64,
    pub update_success: bool,
    pub is_updating: bool,
}

impl ReportCache {
    /// True when no collection ran yet or the last one is older than `ttl`.
    pub fn is_stale(&self, ttl: Duration) -> bool {
        self.last_updated.map(|t| t.elapsed() >= ttl).unwrap_or(true)
    }
}
