//! Health statistics for the exporter.
//!
//! This module tracks how report collections perform (duration, consumer
//! counts, success rate) together with HTTP request counters, and renders
//! them as the plain-text table served by `/health`.

use std::collections::VecDeque;
use std::fmt::Write as FmtWrite;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock as StdRwLock};
use std::time::{Duration, Instant, SystemTime};

/// Running statistics for a single metric.
#[derive(Clone, Copy, Default)]
pub struct RunningStat {
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
    last: f64,
}

impl RunningStat {
    pub fn add(&mut self, value: f64) {
        if self.count == 0 {
            *self = RunningStat {
                count: 1,
                sum: value,
                min: value,
                max: value,
                last: value,
            };
            return;
        }
        self.count += 1;
        self.sum += value;
        self.last = value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn avg(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / (self.count as f64)
        }
    }
}

/// Thread-safe wrapper for running statistics.
#[derive(Default)]
pub struct Stat {
    inner: Mutex<RunningStat>,
}

impl Stat {
    pub fn add_sample(&self, value: f64) {
        if let Ok(mut s) = self.inner.lock() {
            s.add(value);
        }
    }

    /// Returns `(current, average, max, min, count)`.
    pub fn snapshot(&self) -> (f64, f64, f64, f64, u64) {
        if let Ok(s) = self.inner.lock() {
            (s.last, s.avg(), s.max, s.min, s.count)
        } else {
            (0.0, 0.0, 0.0, 0.0, 0)
        }
    }
}

/// Request timestamps of the last ten minutes.
pub struct RequestTimestamps {
    inner: Mutex<VecDeque<Instant>>,
}

const REQUEST_WINDOW: Duration = Duration::from_secs(600);

impl Default for RequestTimestamps {
    fn default() -> Self {
        Self {
            inner: Mutex::new(VecDeque::with_capacity(1024)),
        }
    }
}

impl RequestTimestamps {
    pub fn record(&self) {
        if let Ok(mut guard) = self.inner.lock() {
            let now = Instant::now();
            guard.push_back(now);
            while guard
                .front()
                .is_some_and(|&t| now.duration_since(t) > REQUEST_WINDOW)
            {
                guard.pop_front();
            }
        }
    }

    pub fn count_last_minute(&self) -> u64 {
        if let Ok(guard) = self.inner.lock() {
            guard
                .iter()
                .filter(|t| t.elapsed() <= Duration::from_secs(60))
                .count() as u64
        } else {
            0
        }
    }
}

/// Exporter health statistics.
pub struct HealthStats {
    // Collections
    pub collection_duration_seconds: Stat,
    pub process_consumers: Stat,
    pub device_consumers: Stat,
    pub total_collections: AtomicU64,
    pub collection_success_count: AtomicU64,
    pub collection_failure_count: AtomicU64,

    // HTTP server
    pub http_request_timestamps: RequestTimestamps,
    pub metrics_endpoint_calls: AtomicU64,
    pub scrape_duration_ms: Stat,

    // Timing
    pub start_time: Instant,
    pub last_collection_time: StdRwLock<Option<SystemTime>>,
}

impl Default for HealthStats {
    fn default() -> Self {
        Self {
            collection_duration_seconds: Stat::default(),
            process_consumers: Stat::default(),
            device_consumers: Stat::default(),
            total_collections: AtomicU64::new(0),
            collection_success_count: AtomicU64::new(0),
            collection_failure_count: AtomicU64::new(0),
            http_request_timestamps: RequestTimestamps::default(),
            metrics_endpoint_calls: AtomicU64::new(0),
            scrape_duration_ms: Stat::default(),
            start_time: Instant::now(),
            last_collection_time: StdRwLock::new(None),
        }
    }
}

impl HealthStats {
    pub fn new() -> Self {
        Default::default()
    }

    /// Records a successful collection.
    pub fn record_collection(&self, processes: usize, devices: usize, duration_seconds: f64) {
        self.process_consumers.add_sample(processes as f64);
        self.device_consumers.add_sample(devices as f64);
        self.collection_duration_seconds.add_sample(duration_seconds);
        self.total_collections.fetch_add(1, Ordering::Relaxed);
        self.collection_success_count.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut guard) = self.last_collection_time.write() {
            *guard = Some(SystemTime::now());
        }
    }

    /// Records a failed collection.
    pub fn record_collection_failure(&self, duration_seconds: f64) {
        self.collection_duration_seconds.add_sample(duration_seconds);
        self.total_collections.fetch_add(1, Ordering::Relaxed);
        self.collection_failure_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_http_request(&self) {
        self.http_request_timestamps.record();
    }

    pub fn record_metrics_endpoint_call(&self, duration_ms: f64) {
        self.metrics_endpoint_calls.fetch_add(1, Ordering::Relaxed);
        self.scrape_duration_ms.add_sample(duration_ms);
    }

    /// Percentage of successful collections; 100 before the first one.
    pub fn get_collection_success_rate(&self) -> f64 {
        let success = self.collection_success_count.load(Ordering::Relaxed);
        let failure = self.collection_failure_count.load(Ordering::Relaxed);
        let total = success + failure;
        if total == 0 {
            100.0
        } else {
            (success as f64 / total as f64) * 100.0
        }
    }

    pub fn get_uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Wall clock time (UTC, HH:MM:SS) of the last successful collection.
    pub fn get_last_collection_time_str(&self) -> String {
        const SECS_PER_DAY: u64 = 86400;
        const SECS_PER_HOUR: u64 = 3600;
        const SECS_PER_MINUTE: u64 = 60;

        let last = match self.last_collection_time.read() {
            Ok(guard) => *guard,
            Err(_) => None,
        };

        last.and_then(|t| t.duration_since(SystemTime::UNIX_EPOCH).ok())
            .map(|since_epoch| {
                let secs = since_epoch.as_secs();
                format!(
                    "{:02}:{:02}:{:02}",
                    (secs % SECS_PER_DAY) / SECS_PER_HOUR,
                    (secs % SECS_PER_HOUR) / SECS_PER_MINUTE,
                    secs % SECS_PER_MINUTE
                )
            })
            .unwrap_or_else(|| "N/A".to_string())
    }

    pub fn render_table(&self) -> String {
        let mut out = String::new();

        writeln!(out, "HEALTH ENDPOINT - EXPORTER INTERNAL STATS").ok();
        writeln!(out, "==========================================").ok();
        writeln!(out).ok();
        write_row(&mut out, "", ["current", "average", "max", "min"]);

        writeln!(out).ok();
        writeln!(out, "COLLECTIONS").ok();
        writeln!(out, "-----------").ok();
        write_stat_row(&mut out, "collection_duration (s)", &self.collection_duration_seconds, 3);
        write_stat_row(&mut out, "process_consumers", &self.process_consumers, 0);
        write_stat_row(&mut out, "device_consumers", &self.device_consumers, 0);
        write_counter_row(
            &mut out,
            "collection_success_rate (%)",
            format!("{:.1}", self.get_collection_success_rate()),
        );
        write_counter_row(
            &mut out,
            "collection_failures",
            self.collection_failure_count
                .load(Ordering::Relaxed)
                .to_string(),
        );

        writeln!(out).ok();
        writeln!(out, "HTTP SERVER").ok();
        writeln!(out, "-----------").ok();
        write_counter_row(
            &mut out,
            "http_requests_last_minute",
            self.http_request_timestamps.count_last_minute().to_string(),
        );
        write_counter_row(
            &mut out,
            "metrics_endpoint_calls",
            self.metrics_endpoint_calls.load(Ordering::Relaxed).to_string(),
        );
        write_stat_row(&mut out, "scrape_duration (ms)", &self.scrape_duration_ms, 1);

        writeln!(out).ok();
        writeln!(
            out,
            "number of collections: {} | last collection: {} | uptime: {:.1}h",
            self.total_collections.load(Ordering::Relaxed),
            self.get_last_collection_time_str(),
            self.start_time.elapsed().as_secs_f64() / 3600.0
        )
        .ok();

        out
    }
}

const LEFT_COL: usize = 28;
const COL_W: usize = 12;

fn write_row(out: &mut String, label: &str, cols: [&str; 4]) {
    writeln!(
        out,
        "{:left$} | {:^col$} | {:^col$} | {:^col$} | {:^col$}",
        label,
        cols[0],
        cols[1],
        cols[2],
        cols[3],
        left = LEFT_COL,
        col = COL_W
    )
    .ok();
}

fn write_stat_row(out: &mut String, label: &str, stat: &Stat, precision: usize) {
    let (cur, avg, max, min, _) = stat.snapshot();
    let fmt = |v: f64| format!("{:.*}", precision, v);
    write_row(
        out,
        label,
        [&fmt(cur), &format!("{:.*}", precision.max(1), avg), &fmt(max), &fmt(min)],
    );
}

fn write_counter_row(out: &mut String, label: &str, value: String) {
    write_row(out, label, [&value, "N/A", "N/A", "N/A"]);
}
