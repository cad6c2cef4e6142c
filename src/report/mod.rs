//! Parsing of powertop CSV reports into typed power consumers.
//!
//! This module provides:
//! - `reader`: splitting the `;` separated report text into records
//! - `sections`: grouping records into titled sections
//! - `consumers`: decoding the software and device consumer tables
//! - `units`: normalizing `<number> <unit>` fields
//!
//! Everything here is a pure function of its input; no state is kept between
//! calls.

pub mod consumers;
pub mod reader;
pub mod sections;
pub mod units;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use consumers::{
    decode_device_consumers, decode_process_consumers, extract_command_name, extract_pid,
    Category, DeviceConsumer, ProcessConsumer,
};
pub use reader::{read_records, read_records_from_path, ReportError};
pub use sections::{split_sections, BANNER_TITLE};
pub use units::{power_to_watts, usage_to_ms_per_second};

/// One row of the report: its fields in order.
pub type RawRecord = Vec<String>;

/// Title of the per-process table.
pub const SOFTWARE_CONSUMERS_SECTION: &str = "Overview of Software Power Consumers";
/// Title of the per-device table.
pub const DEVICE_REPORT_SECTION: &str = "Device Power Report";

/// Power consumers extracted from one powertop report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SysPower {
    pub process_consumers: Vec<ProcessConsumer>,
    pub device_consumers: Vec<DeviceConsumer>,
}

impl SysPower {
    pub fn is_empty(&self) -> bool {
        self.process_consumers.is_empty() && self.device_consumers.is_empty()
    }
}

/// Builds the consumer lists from the records of a report.
///
/// Sections missing from the report yield empty lists.
pub fn parse_report(records: &[RawRecord]) -> SysPower {
    let sections = split_sections(records);
    debug!("Report split into {} sections", sections.len());

    let process_consumers = sections
        .get(SOFTWARE_CONSUMERS_SECTION)
        .map(|rows| decode_process_consumers(rows))
        .unwrap_or_default();
    let device_consumers = sections
        .get(DEVICE_REPORT_SECTION)
        .map(|rows| decode_device_consumers(rows))
        .unwrap_or_default();

    debug!(
        "Decoded {} process consumers and {} device consumers",
        process_consumers.len(),
        device_consumers.len()
    );

    SysPower {
        process_consumers,
        device_consumers,
    }
}

/// Reads records from report text and parses them.
pub fn parse_report_str(input: &str) -> Result<SysPower, ReportError> {
    let records = read_records(input)?;
    Ok(parse_report(&records))
}
