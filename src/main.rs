//! herakles-powertop-exporter - version 0.1.0
//!
//! Prometheus exporter for the software and device power consumers reported
//! by powertop. This is the main entry point that initializes the server and
//! handles subcommands.

mod cache;
mod cache_updater;
mod cli;
mod commands;
mod config;
mod handlers;
mod metrics;
mod startup_checks;
mod state;

use axum::{routing::get, Router};
use clap::{Parser, ValueEnum};
use herakles_powertop_exporter::health_stats::HealthStats;
use herakles_powertop_exporter::ReportSource;
use prometheus::{Gauge, Registry};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::{net::TcpListener, signal, sync::RwLock};
use tracing::level_filters::LevelFilter;
use tracing::{debug, error, info};

use cache::ReportCache;
use cli::{Args, Commands, LogLevel};
use commands::{command_check, command_config, command_parse};
use config::{
    resolve_config, resolve_parse_config, show_config, validate_effective_config, Config,
    DEFAULT_BIND_ADDR, DEFAULT_PORT,
};
use handlers::{config_handler, consumers_handler, health_handler, metrics_handler, root_handler};
use metrics::PowerMetrics;
use state::AppState;

/// Maps a configured level name to a filter; unknown names fall back to info.
fn level_filter(level_name: &str) -> LevelFilter {
    match LogLevel::from_str(level_name, true).unwrap_or(LogLevel::Info) {
        LogLevel::Off => LevelFilter::OFF,
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Trace => LevelFilter::TRACE,
    }
}

/// Initializes tracing logging subsystem with configured log level.
fn setup_logging(config: &Config) {
    let level_name = config.log_level.as_deref().unwrap_or("info");
    let log_level = level_filter(level_name);

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    info!("Logging initialized with level: {}", level_name);
}

/// Helper function to validate a resolved configuration.
/// Exits the process with error code 1 if validation fails.
fn ensure_valid_config(config: Config) -> Config {
    if let Err(e) = validate_effective_config(&config) {
        eprintln!("❌ Configuration invalid: {}", e);
        std::process::exit(1);
    }
    config
}

/// Creates and registers a self-monitoring gauge.
fn register_gauge(
    registry: &Registry,
    name: &str,
    help: &str,
) -> Result<Gauge, Box<dyn std::error::Error>> {
    let gauge = Gauge::new(name, help)?;
    registry.register(Box::new(gauge.clone()))?;
    Ok(gauge)
}

/// Main application entry point.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Early config resolution for show/check modes
    if args.show_config || args.check_config {
        let config = resolve_config(&args)?;

        if args.check_config {
            if let Err(e) = validate_effective_config(&config) {
                eprintln!("❌ Configuration invalid: {}", e);
                std::process::exit(1);
            }
            println!("✅ Configuration is valid");
            return Ok(());
        }

        return show_config(&config, args.config_format);
    }

    // Handle subcommands
    if let Some(command) = &args.command {
        return match command {
            Commands::Config {
                output,
                format,
                commented,
            } => command_config(output.clone(), format.clone(), *commented),

            Commands::Check => command_check(&resolve_config(&args)?),

            Commands::Parse { input, format } => {
                let config = ensure_valid_config(resolve_parse_config(&args, input.as_deref())?);
                command_parse(input.clone(), format.clone(), &config)
            }
        };
    }

    // Load configuration for main server mode
    let config = ensure_valid_config(resolve_config(&args)?);

    setup_logging(&config);

    info!("Starting herakles-powertop-exporter");

    let source = config.report_source();
    match &source {
        ReportSource::Powertop(runner) => {
            if let Err(e) = startup_checks::validate_requirements(&runner.binary) {
                error!("❌ Startup validation failed: {}", e);
                error!("   The exporter will start but collections will fail!");
                // Continue anyway - don't fail hard
            }
        }
        ReportSource::File(path) => {
            info!("Serving static report from {}", path.display());
        }
    }

    let bind_ip_str = config.bind.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
    let port = config.port.unwrap_or(DEFAULT_PORT);

    // Initialize Prometheus metrics registry
    let registry = Registry::new();
    debug!("Prometheus registry initialized");

    let metrics = PowerMetrics::new(&registry)?;
    let scrape_duration = register_gauge(
        &registry,
        "herakles_powertop_exporter_scrape_duration_seconds",
        "Time spent serving /metrics request (reading from cache)",
    )?;
    let collection_duration = register_gauge(
        &registry,
        "herakles_powertop_exporter_collection_duration_seconds",
        "Time spent running powertop and decoding its report",
    )?;
    let collection_success = register_gauge(
        &registry,
        "herakles_powertop_exporter_collection_success",
        "Whether the last collection was successful (1) or failed (0)",
    )?;
    let collecting = register_gauge(
        &registry,
        "herakles_powertop_exporter_collecting",
        "Whether a collection is currently in progress (1) or idle (0)",
    )?;

    debug!("All metrics registered successfully");

    let state = Arc::new(AppState {
        registry,
        metrics,
        scrape_duration,
        collection_duration,
        collection_success,
        collecting,
        cache: Arc::new(RwLock::new(ReportCache::default())),
        config: Arc::new(config.clone()),
        source,
        health_stats: Arc::new(HealthStats::new()),
        start_time: Instant::now(),
    });

    // Perform initial cache population
    info!("Performing initial collection");
    if let Err(e) = cache_updater::update_cache(&state).await {
        error!("Initial collection failed: {}", e);
    } else {
        info!("Initial collection completed successfully");
    }

    info!("Note: No background refresh task - collections are triggered by /metrics requests");

    // Setup graceful shutdown signal handlers
    let shutdown_signal = async {
        let ctrl_c = async {
            signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("Failed to install signal handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received SIGINT (Ctrl+C), shutting down gracefully...");
            }
            _ = terminate => {
                info!("Received SIGTERM, shutting down gracefully...");
            }
        }
    };

    // Configure HTTP server routes
    let addr: SocketAddr = format!("{}:{}", bind_ip_str, port).parse()?;

    let mut app = Router::new()
        .route("/", get(root_handler))
        .route("/metrics", get(metrics_handler))
        .route("/consumers", get(consumers_handler));

    if config.enable_health.unwrap_or(true) {
        app = app.route("/health", get(health_handler));
    }

    let app = app
        .route("/config", get(config_handler))
        .with_state(state.clone());

    let listener = TcpListener::bind(addr).await?;
    info!(
        "herakles-powertop-exporter listening on http://{}:{}",
        bind_ip_str, port
    );

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("Server error: {}", e);
                return Err(e.into());
            }
        }
        _ = shutdown_signal => {
            info!("Shutdown signal received, exiting...");
        }
    }

    info!("herakles-powertop-exporter stopped gracefully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filter_off_disables_all_events() {
        assert_eq!(level_filter("off"), LevelFilter::OFF);
        assert!(level_filter("off").into_level().is_none());
    }

    #[test]
    fn test_level_filter_names() {
        assert_eq!(level_filter("error"), LevelFilter::ERROR);
        assert_eq!(level_filter("DEBUG"), LevelFilter::DEBUG);
        assert_eq!(level_filter("bogus"), LevelFilter::INFO);
    }
}
