//! Herakles Powertop Exporter Library
//!
//! This library turns the CSV report written by `powertop --csv` into typed
//! per-process and per-device power consumers. It is used by the
//! `herakles-powertop-exporter` binary and can be embedded in other tools.
//!
//! # Features
//!
//! - **Report Parsing**: Section splitting and consumer decoding with unit normalization
//! - **Best-Effort Decoding**: Malformed fields fall back to zero or verbatim values
//! - **Collection**: Run powertop or read an existing report
//! - **Health Statistics**: Thread-safe collection statistics for the exporter
//!
//! # Usage
//!
//! ```rust
//! use herakles_powertop_exporter::parse_report_str;
//!
//! let report = "\
//! Device Power Report
//! Usage;Device Name
//!  100.0%;Display backlight
//! ____________________
//! ";
//!
//! let power = parse_report_str(report).unwrap();
//! for device in &power.device_consumers {
//!     println!("{}: {}", device.device_name, device.usage);
//! }
//! ```

pub mod health_stats;
pub mod powertop;
pub mod report;

// Re-export main types for convenience
pub use powertop::{collect, collect_or_default, CollectError, PowertopRunner, ReportSource};
pub use report::{
    parse_report, parse_report_str, DeviceConsumer, ProcessConsumer, RawRecord, ReportError,
    SysPower,
};
