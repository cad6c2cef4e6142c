//! Startup requirement validation for herakles-powertop-exporter.
//!
//! This module validates that powertop can be executed and that the exporter
//! has the privileges powertop needs before starting.

use nix::unistd::geteuid;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Validate all runtime requirements for running `binary`
pub fn validate_requirements(binary: &str) -> Result<PathBuf, ValidationError> {
    info!("🔍 Validating runtime requirements...");

    check_user_privileges();
    let resolved = locate_powertop(binary)?;

    info!("✅ All runtime requirements validated");
    Ok(resolved)
}

/// Check if running with sufficient privileges
fn check_user_privileges() {
    if !is_root() {
        warn!("⚠️  Not running as root - powertop cannot read RAPL and perf counters");
        warn!("   Recommendation: Run as root for accurate power estimates");
        // Not an error - continue but warn
    } else {
        info!("✅ Running as root (uid=0)");
    }
}

/// Resolve the powertop executable (bare names are looked up in PATH)
fn locate_powertop(binary: &str) -> Result<PathBuf, ValidationError> {
    match which::which(binary) {
        Ok(path) => {
            info!("✅ powertop found: {}", path.display());
            Ok(path)
        }
        Err(e) => {
            error!("❌ Cannot find powertop executable '{}': {}", binary, e);
            error!("   Solutions:");
            error!("   1. Install powertop:");
            error!("      apt install powertop   |   dnf install powertop");
            error!("   2. Point the exporter at it:");
            error!("      --powertop-path /usr/sbin/powertop");
            error!("   3. Parse an existing report instead:");
            error!("      --report-file /path/to/powertop.csv");
            Err(ValidationError::PowertopNotFound {
                binary: binary.to_string(),
                reason: e.to_string(),
            })
        }
    }
}

/// Returns true when the current process runs as root.
pub fn is_root() -> bool {
    geteuid().is_root()
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("powertop executable '{binary}' not found: {reason}")]
    PowertopNotFound { binary: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_is_rejected() {
        let err = validate_requirements("herakles-no-such-powertop-binary").unwrap_err();
        assert!(matches!(err, ValidationError::PowertopNotFound { .. }));
        assert!(err.to_string().contains("herakles-no-such-powertop-binary"));
    }

    #[test]
    fn test_existing_binary_is_resolved() {
        // `sh` is present on every system the exporter targets.
        let path = validate_requirements("sh").unwrap();
        assert!(path.is_absolute());
    }
}
