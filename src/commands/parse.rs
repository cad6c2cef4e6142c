//! Parse command implementation.
//!
//! Collects a single report and prints the decoded power consumers.

use std::path::PathBuf;
use std::time::Instant;

use herakles_powertop_exporter::{collect, ReportSource, SysPower};

use crate::cli::ConfigFormat;
use crate::config::Config;

/// Collects one report (from `input` or by running powertop) and prints it.
pub fn command_parse(
    input: Option<PathBuf>,
    format: ConfigFormat,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let source = match input {
        Some(path) => ReportSource::File(path),
        None => config.report_source(),
    };

    let start = Instant::now();
    let report = collect(&source)?;
    eprintln!(
        "📊 {}: {} process consumers, {} device consumers in {:.2}s",
        source.describe(),
        report.process_consumers.len(),
        report.device_consumers.len(),
        start.elapsed().as_secs_f64()
    );

    println!("{}", render_report(&report, &format)?);
    Ok(())
}

/// Serializes a report in the requested format.
pub fn render_report(
    report: &SysPower,
    format: &ConfigFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    Ok(match format {
        ConfigFormat::Json => serde_json::to_string_pretty(report)?,
        ConfigFormat::Yaml => serde_yaml::to_string(report)?,
        ConfigFormat::Toml => toml::to_string_pretty(report)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use herakles_powertop_exporter::{DeviceConsumer, ProcessConsumer};

    fn report() -> SysPower {
        SysPower {
            process_consumers: vec![ProcessConsumer {
                pid: 1042,
                usage: 12.5,
                disk_io_per_second: 0.0,
                category: "Process".into(),
                description: "firefox".into(),
                power_estimate_watts: 0.75,
            }],
            device_consumers: vec![DeviceConsumer {
                usage: "35.0%".into(),
                device_name: "Display backlight".into(),
            }],
        }
    }

    #[test]
    fn test_render_json_uses_wire_names() {
        let out = render_report(&report(), &ConfigFormat::Json).unwrap();
        assert!(out.contains(r#""processConsumers""#));
        assert!(out.contains(r#""pwEstimate": 0.75"#));
        assert!(out.contains(r#""deviceName": "Display backlight""#));
    }

    #[test]
    fn test_render_toml_has_array_tables() {
        let out = render_report(&report(), &ConfigFormat::Toml).unwrap();
        assert!(out.contains("[[processConsumers]]"));
        assert!(out.contains("[[deviceConsumers]]"));
    }

    #[test]
    fn test_missing_input_fails() {
        let result = command_parse(
            Some(PathBuf::from("/nonexistent/powertop.csv")),
            ConfigFormat::Json,
            &Config::default(),
        );
        assert!(result.is_err());
    }
}
