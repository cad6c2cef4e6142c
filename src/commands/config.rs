//! Config command implementation.
//!
//! Generates configuration files in various formats.

use std::fs;
use std::path::PathBuf;

use crate::cli::ConfigFormat;
use crate::config::{render_config, Config};

/// Generates configuration files.
pub fn command_config(
    output: Option<PathBuf>,
    format: ConfigFormat,
    commented: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let output = match output {
        Some(path) => path,
        None => PathBuf::from("herakles-powertop-exporter.yaml"),
    };

    let mut content = render_config(&config, &format)?;
    if commented && matches!(format, ConfigFormat::Yaml) {
        content = add_config_comments(content);
    }

    if output.to_string_lossy() == "-" {
        print!("{}", content);
    } else {
        fs::write(&output, content)?;
        println!("✅ Configuration written to: {}", output.display());
    }

    Ok(())
}

/// Adds comments to YAML configuration.
fn add_config_comments(yaml: String) -> String {
    let comments = r#"# Herakles Powertop Exporter Configuration
# =========================================
#
# Server Configuration
# --------------------
# bind: "0.0.0.0"              # Bind IP (0.0.0.0 = all interfaces)
# port: 9216                   # HTTP port
#
# Collection
# ----------
# cache_ttl: 30                # Serve a collected report for N seconds
# powertop_path: "powertop"    # powertop executable (looked up in PATH)
# sample_seconds: 5            # Measurement duration (powertop --time)
# report_path: "/tmp/herakles-powertop.csv"  # Where powertop writes its CSV report
# report_file: null            # Parse this report instead of running powertop
#
# Feature Flags
# -------------
# enable_health: true          # Enable /health endpoint
# enable_process_metrics: true # Export software power consumers
# enable_device_metrics: true  # Export device power report
#
# Logging
# -------
# log_level: "info"            # off, error, warn, info, debug, trace
"#;

    format!("{comments}\n{yaml}")
}
