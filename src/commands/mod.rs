//! CLI command implementations for herakles-powertop-exporter.
//!
//! This module provides implementations for all CLI subcommands:
//! - `parse`: One-shot collection printed to stdout
//! - `config`: Configuration file generation
//! - `check`: System validation

pub mod check;
pub mod config;
pub mod parse;

// Re-export command functions
pub use check::command_check;
pub use config::command_config;
pub use parse::command_parse;
