//! Decoding of the consumer tables of a powertop report.
//!
//! Two tables are understood:
//! - "Overview of Software Power Consumers": one row per process, kernel
//!   work item, interrupt or timer, with usage, disk I/O and a power estimate.
//! - "Device Power Report": one row per device with its utilization.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::units::{parse_rate, power_to_watts, usage_to_ms_per_second};
use super::RawRecord;

// Column positions in the software consumers table.
const COL_USAGE: usize = 0;
const COL_DISK_IO: usize = 4;
const COL_CATEGORY: usize = 5;
const COL_DESCRIPTION: usize = 6;
const COL_PW_ESTIMATE: usize = 7;

/// Category label powertop uses for userspace processes.
pub const PROCESS_CATEGORY: &str = "Process";

/// One row of the software power consumers table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessConsumer {
    /// Process id, 0 when the row does not carry one.
    pub pid: u32,
    /// Activity in milliseconds per second.
    pub usage: f64,
    pub disk_io_per_second: f64,
    pub category: String,
    pub description: String,
    /// Estimated power draw in watts.
    #[serde(rename = "pwEstimate")]
    pub power_estimate_watts: f64,
}

/// One row of the device power report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceConsumer {
    /// Utilization exactly as printed by powertop (e.g. `100.0%`, `0.5 pkts/s`).
    pub usage: String,
    pub device_name: String,
}

/// How the description column of a row is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Userspace process: the description holds a command line.
    Process,
    /// Anything else (kernel work, interrupts, timers, devices).
    Other,
}

impl Category {
    pub fn from_label(label: &str) -> Self {
        if label == PROCESS_CATEGORY {
            Category::Process
        } else {
            Category::Other
        }
    }
}

/// Decodes the software consumers table. The first row is the column header
/// and is skipped.
pub fn decode_process_consumers(rows: &[RawRecord]) -> Vec<ProcessConsumer> {
    rows.iter().skip(1).map(|row| decode_process_row(row)).collect()
}

fn decode_process_row(row: &[String]) -> ProcessConsumer {
    let mut consumer = ProcessConsumer::default();

    for (idx, field) in row.iter().enumerate() {
        match idx {
            COL_USAGE => consumer.usage = usage_to_ms_per_second(field),
            COL_DISK_IO => consumer.disk_io_per_second = parse_rate(field),
            COL_CATEGORY => consumer.category = field.clone(),
            COL_DESCRIPTION => {
                consumer.pid = extract_pid(field);
                consumer.description = match Category::from_label(&consumer.category) {
                    Category::Process => extract_command_name(field),
                    Category::Other => field.clone(),
                };
            }
            COL_PW_ESTIMATE => consumer.power_estimate_watts = power_to_watts(field),
            _ => {}
        }
    }

    consumer
}

/// Decodes the device power report. The first row is the column header and
/// is skipped. Usage is kept verbatim.
pub fn decode_device_consumers(rows: &[RawRecord]) -> Vec<DeviceConsumer> {
    rows.iter()
        .skip(1)
        .map(|row| DeviceConsumer {
            usage: row.first().cloned().unwrap_or_default(),
            device_name: row.get(1).cloned().unwrap_or_default(),
        })
        .collect()
}

/// Extracts the pid from a description such as `[PID 1234] /usr/bin/foo`.
///
/// The pid is the last space separated token inside the first bracket pair.
/// Returns 0 when there is no bracket pair or the token is not a number.
pub fn extract_pid(field: &str) -> u32 {
    let Some(open) = field.find('[') else {
        return 0;
    };
    let inner = &field[open + 1..];
    let Some(close) = inner.find(']') else {
        return 0;
    };

    inner[..close]
        .split(' ')
        .next_back()
        .and_then(|token| token.parse().ok())
        .unwrap_or(0)
}

/// Extracts the command name from a process description.
///
/// A single token is returned as is. With three or more tokens the third one
/// is taken to be the executable and its file name is returned. Any other
/// shape returns the original field.
pub fn extract_command_name(field: &str) -> String {
    let tokens: Vec<&str> = field.trim().split(' ').collect();
    match tokens.len() {
        1 => tokens[0].to_string(),
        n if n > 2 => base_name(tokens[2]),
        _ => field.to_string(),
    }
}

/// Final path component of `path`, or `path` itself when it has none.
fn base_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(fields: &[&str]) -> RawRecord {
        fields.iter().map(|s| s.to_string()).collect()
    }

    fn header() -> RawRecord {
        rec(&[
            "Usage",
            "Wakeups/s",
            "GPU ops/s",
            "VFS ops/s",
            "Disk IO/s",
            "Category",
            "Description",
            "PW Estimate",
        ])
    }

    // -------------------------------------------------------------------------
    // pid / command name extraction
    // -------------------------------------------------------------------------

    #[test]
    fn test_extract_pid() {
        assert_eq!(extract_pid("foo [bar 1234]"), 1234);
        assert_eq!(extract_pid("[PID 42] /usr/bin/Xorg -core"), 42);
        assert_eq!(extract_pid("no brackets here"), 0);
        assert_eq!(extract_pid("[PID abc] x"), 0);
        assert_eq!(extract_pid("[unterminated 12"), 0);
    }

    #[test]
    fn test_extract_pid_uses_first_bracket_pair() {
        assert_eq!(extract_pid("[PID 7] cmd [other 9]"), 7);
    }

    #[test]
    fn test_extract_command_name_single_token() {
        assert_eq!(extract_command_name("kworker"), "kworker");
    }

    #[test]
    fn test_extract_command_name_path() {
        assert_eq!(extract_command_name("a b /usr/bin/foo"), "foo");
        assert_eq!(
            extract_command_name("[PID 1234] /usr/lib/firefox/firefox -contentproc"),
            "firefox"
        );
    }

    #[test]
    fn test_extract_command_name_two_tokens_returns_field() {
        assert_eq!(extract_command_name("[PID] x"), "[PID] x");
    }

    // -------------------------------------------------------------------------
    // table decoding
    // -------------------------------------------------------------------------

    #[test]
    fn test_decode_process_row() {
        let rows = vec![
            header(),
            rec(&[
                "2.5 ms/s",
                "30.2",
                "",
                "",
                "1.5",
                "Process",
                "[PID 1234] /usr/bin/gnome-shell",
                "350 mW",
            ]),
        ];

        let consumers = decode_process_consumers(&rows);
        assert_eq!(
            consumers,
            vec![ProcessConsumer {
                pid: 1234,
                usage: 2.5,
                disk_io_per_second: 1.5,
                category: "Process".to_string(),
                description: "gnome-shell".to_string(),
                power_estimate_watts: 0.35,
            }]
        );
    }

    #[test]
    fn test_decode_disk_io_reads_fifth_column_only() {
        let rows = vec![
            header(),
            rec(&["1 ms/s", "1.0", "", "9.5", "", "Process", "foo", "1 W"]),
            rec(&["1 ms/s", "1.0", "", "9.5", "0.25", "Process", "foo", "1 W"]),
        ];

        let consumers = decode_process_consumers(&rows);
        assert_eq!(consumers[0].disk_io_per_second, 0.0);
        assert_eq!(consumers[1].disk_io_per_second, 0.25);
    }

    #[test]
    fn test_decode_non_process_keeps_description() {
        let rows = vec![
            header(),
            rec(&[
                "500 us/s",
                "12.0",
                "",
                "",
                "",
                "Interrupt",
                "[9] acpi",
                "3 uW",
            ]),
        ];

        let consumer = &decode_process_consumers(&rows)[0];
        assert_eq!(consumer.pid, 9);
        assert_eq!(consumer.usage, 0.5);
        assert_eq!(consumer.disk_io_per_second, 0.0);
        assert_eq!(consumer.category, "Interrupt");
        assert_eq!(consumer.description, "[9] acpi");
        assert_eq!(consumer.power_estimate_watts, 0.000003);
    }

    #[test]
    fn test_decode_short_row_defaults() {
        let rows = vec![header(), rec(&["1 s/s", "x"])];

        let consumer = &decode_process_consumers(&rows)[0];
        assert_eq!(consumer.usage, 1000.0);
        assert_eq!(consumer.pid, 0);
        assert!(consumer.category.is_empty());
        assert!(consumer.description.is_empty());
        assert_eq!(consumer.power_estimate_watts, 0.0);
    }

    #[test]
    fn test_decode_malformed_numbers_never_fail() {
        let rows = vec![
            header(),
            rec(&["fast", "", "", "", "lots", "Process", "x", "much W"]),
        ];

        let consumer = &decode_process_consumers(&rows)[0];
        assert_eq!(consumer.usage, 0.0);
        assert_eq!(consumer.disk_io_per_second, 0.0);
        assert_eq!(consumer.power_estimate_watts, 0.0);
        assert_eq!(consumer.description, "x");
    }

    #[test]
    fn test_decode_skips_header_only() {
        assert!(decode_process_consumers(&[header()]).is_empty());
        assert!(decode_process_consumers(&[]).is_empty());
        assert!(decode_device_consumers(&[]).is_empty());
    }

    #[test]
    fn test_decode_device_consumers() {
        let rows = vec![
            rec(&["Usage", "Device Name"]),
            rec(&["100.0%", "Display backlight"]),
            rec(&["0.5 pkts/s", "Network interface: wlp2s0 (iwlwifi)"]),
        ];

        let devices = decode_device_consumers(&rows);
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].usage, "100.0%");
        assert_eq!(devices[0].device_name, "Display backlight");
        assert_eq!(devices[1].usage, "0.5 pkts/s");
    }

    #[test]
    fn test_category_from_label() {
        assert_eq!(Category::from_label("Process"), Category::Process);
        assert_eq!(Category::from_label("process"), Category::Other);
        assert_eq!(Category::from_label("Timer"), Category::Other);
    }

    #[test]
    fn test_serialized_field_names() {
        let consumer = ProcessConsumer {
            pid: 1,
            ..Default::default()
        };
        let json = serde_json::to_value(&consumer).unwrap();
        assert!(json.get("diskIoPerSecond").is_some());
        assert!(json.get("pwEstimate").is_some());

        let device = DeviceConsumer::default();
        let json = serde_json::to_value(&device).unwrap();
        assert!(json.get("deviceName").is_some());
    }
}
