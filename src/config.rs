//! Configuration management for herakles-powertop-exporter.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments. It supports YAML, JSON, and TOML formats.

use crate::cli::{Args, ConfigFormat, LogLevel};
use clap::ValueEnum;
use herakles_powertop_exporter::{PowertopRunner, ReportSource};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

// Default configuration constants
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 9216;
pub const DEFAULT_CACHE_TTL: u64 = 30;
pub const DEFAULT_POWERTOP_PATH: &str = "powertop";
pub const DEFAULT_SAMPLE_SECONDS: u64 = 5;
pub const DEFAULT_REPORT_PATH: &str = "/tmp/herakles-powertop.csv";

/// Exporter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server configuration
    pub port: Option<u16>,
    pub bind: Option<String>,

    // Collection
    /// Seconds a collected report is served before a new collection starts
    #[serde(alias = "cache-ttl")]
    pub cache_ttl: Option<u64>,
    #[serde(alias = "powertop-path")]
    pub powertop_path: Option<String>,
    /// Measurement duration passed to `powertop --time`
    #[serde(alias = "sample-seconds")]
    pub sample_seconds: Option<u64>,
    /// Where powertop writes its CSV report
    #[serde(alias = "report-path")]
    pub report_path: Option<PathBuf>,
    /// Existing report to parse instead of running powertop
    #[serde(alias = "report-file")]
    pub report_file: Option<PathBuf>,

    // Feature flags
    #[serde(alias = "enable-health")]
    pub enable_health: Option<bool>,
    #[serde(alias = "enable-process-metrics")]
    pub enable_process_metrics: Option<bool>,
    #[serde(alias = "enable-device-metrics")]
    pub enable_device_metrics: Option<bool>,

    // Logging
    #[serde(alias = "log-level")]
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: Some(DEFAULT_BIND_ADDR.to_string()),
            port: Some(DEFAULT_PORT),
            cache_ttl: Some(DEFAULT_CACHE_TTL),
            powertop_path: Some(DEFAULT_POWERTOP_PATH.to_string()),
            sample_seconds: Some(DEFAULT_SAMPLE_SECONDS),
            report_path: Some(PathBuf::from(DEFAULT_REPORT_PATH)),
            report_file: None,
            enable_health: Some(true),
            enable_process_metrics: Some(true),
            enable_device_metrics: Some(true),
            log_level: Some("info".into()),
        }
    }
}

impl Config {
    /// Report source described by this configuration.
    pub fn report_source(&self) -> ReportSource {
        match &self.report_file {
            Some(path) => ReportSource::File(path.clone()),
            None => ReportSource::Powertop(self.powertop_runner()),
        }
    }

    pub fn powertop_runner(&self) -> PowertopRunner {
        PowertopRunner::new(
            self.powertop_path
                .clone()
                .unwrap_or_else(|| DEFAULT_POWERTOP_PATH.to_string()),
            self.report_path
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_PATH)),
            self.sample_seconds.unwrap_or(DEFAULT_SAMPLE_SECONDS),
        )
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let enable_process = cfg.enable_process_metrics.unwrap_or(true);
    let enable_device = cfg.enable_device_metrics.unwrap_or(true);

    if !(enable_process || enable_device) {
        return Err(
            "At least one of enable_process_metrics/enable_device_metrics must be true".into(),
        );
    }

    if cfg.sample_seconds == Some(0) {
        return Err("sample_seconds must be greater than 0".into());
    }

    if cfg
        .powertop_path
        .as_deref()
        .is_some_and(|p| p.trim().is_empty())
    {
        return Err("powertop_path must not be empty".into());
    }

    if let Some(level) = cfg.log_level.as_deref() {
        if LogLevel::from_str(level, true).is_err() {
            return Err(format!("Unknown log_level: {}", level).into());
        }
    }

    if let Some(report) = &cfg.report_file {
        if !report.exists() {
            return Err(format!("Report file not found: {}", report.display()).into());
        }
        if fs::metadata(report)?.is_dir() {
            return Err(format!("Report file is a directory: {}", report.display()).into());
        }
    }

    Ok(())
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if let Some(bind_ip) = args.bind {
        config.bind = Some(bind_ip.to_string());
    }
    if let Some(cli_port) = args.port {
        config.port = Some(cli_port);
    }
    if let Some(cache_ttl) = args.cache_ttl {
        config.cache_ttl = Some(cache_ttl);
    }
    if args.disable_health {
        config.enable_health = Some(false);
    }
    if let Some(level) = &args.log_level {
        config.log_level = level
            .to_possible_value()
            .map(|v| v.get_name().to_string());
    }

    // Collection overrides: CLI wins if provided
    if let Some(report) = &args.report_file {
        config.report_file = Some(report.clone());
    }
    if let Some(path) = &args.powertop_path {
        config.powertop_path = Some(path.clone());
    }
    if let Some(seconds) = args.sample_seconds {
        config.sample_seconds = Some(seconds);
    }

    Ok(config)
}

/// Resolves configuration for a one-shot parse.
/// An explicit input file replaces any configured `report_file`.
pub fn resolve_parse_config(
    args: &Args,
    input: Option<&Path>,
) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = resolve_config(args)?;
    if let Some(path) = input {
        config.report_file = Some(path.to_path_buf());
    }
    Ok(config)
}

/// Configuration loading with multiple format support
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            // Try default locations
            let defaults = [
                "/etc/herakles/powertop-exporter.yaml",
                "/etc/herakles/powertop-exporter.yml",
                "/etc/herakles/powertop-exporter.json",
                "./herakles-powertop-exporter.yaml",
                "./herakles-powertop-exporter.yml",
                "./herakles-powertop-exporter.json",
            ];

            match defaults.iter().find(|p| Path::new(p).exists()) {
                Some(p) => PathBuf::from(p),
                None => return Ok(Config::default()),
            }
        }
    };

    if !path.exists() {
        return Err(format!("Config file not found: {}", path.display()).into());
    }

    let content = fs::read_to_string(&path)?;

    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => {
            let config: Config = serde_json::from_str(&content)?;
            info!("Loaded JSON configuration from: {}", path.display());
            Ok(config)
        }
        Some("toml") => {
            let config: Config = toml::from_str(&content)?;
            info!("Loaded TOML configuration from: {}", path.display());
            Ok(config)
        }
        _ => {
            // Default to YAML
            let config: Config = serde_yaml::from_str(&content)?;
            info!("Loaded YAML configuration from: {}", path.display());
            Ok(config)
        }
    }
}

/// Serializes configuration in the requested format.
pub fn render_config(
    config: &Config,
    format: &ConfigFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    Ok(match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    })
}

/// Shows configuration in requested format
pub fn show_config(
    config: &Config,
    format: ConfigFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", render_config(config, &format)?);
    Ok(())
}
