//! Obtaining powertop reports.
//!
//! A report is either produced on demand by running `powertop --csv` or read
//! from an existing CSV file (useful for testing and for hosts where another
//! job already runs powertop periodically).

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::report::{parse_report, read_records_from_path, ReportError, SysPower};

/// Errors raised while collecting a report.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("Failed to start {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{binary} exited with {status}: {stderr}")]
    Failed {
        binary: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Runs powertop to produce a CSV report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowertopRunner {
    /// powertop executable, resolved through PATH when not absolute.
    pub binary: String,
    /// Where powertop writes the CSV report.
    pub report_path: PathBuf,
    /// Measurement duration passed as `--time`.
    pub sample_seconds: u64,
}

impl PowertopRunner {
    pub fn new(
        binary: impl Into<String>,
        report_path: impl Into<PathBuf>,
        sample_seconds: u64,
    ) -> Self {
        Self {
            binary: binary.into(),
            report_path: report_path.into(),
            sample_seconds,
        }
    }

    /// Command line arguments passed to powertop.
    pub fn args(&self) -> Vec<String> {
        vec![
            format!("--csv={}", self.report_path.display()),
            format!("--time={}", self.sample_seconds),
        ]
    }

    /// Runs powertop and waits for it to finish writing the report.
    #[instrument(skip(self), fields(binary = %self.binary))]
    pub fn run(&self) -> Result<&Path, CollectError> {
        let args = self.args();
        info!("Running {} {}", self.binary, args.join(" "));

        let output = Command::new(&self.binary)
            .args(&args)
            .output()
            .map_err(|source| CollectError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(CollectError::Failed {
                binary: self.binary.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        debug!(
            "{} finished, report written to {}",
            self.binary,
            self.report_path.display()
        );
        Ok(&self.report_path)
    }
}

/// Where reports come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportSource {
    /// Parse an existing CSV report.
    File(PathBuf),
    /// Run powertop for every collection.
    Powertop(PowertopRunner),
}

impl ReportSource {
    pub fn describe(&self) -> String {
        match self {
            ReportSource::File(path) => format!("file {}", path.display()),
            ReportSource::Powertop(runner) => {
                format!("{} ({}s samples)", runner.binary, runner.sample_seconds)
            }
        }
    }
}

/// Collects one report and decodes its consumers.
pub fn collect(source: &ReportSource) -> Result<SysPower, CollectError> {
    let start = Instant::now();

    let path = match source {
        ReportSource::File(path) => path.as_path(),
        ReportSource::Powertop(runner) => runner.run()?,
    };

    let records = read_records_from_path(path)?;
    let power = parse_report(&records);

    debug!(
        "Collected {} records from {} in {:.2}s",
        records.len(),
        source.describe(),
        start.elapsed().as_secs_f64()
    );
    Ok(power)
}

/// Like [`collect`], but logs failures and returns an empty report instead.
pub fn collect_or_default(source: &ReportSource) -> SysPower {
    match collect(source) {
        Ok(power) => power,
        Err(e) => {
            warn!("Could not collect powertop report: {}", e);
            SysPower::default()
        }
    }
}
