//! Check command implementation.
//!
//! Validates configuration and system requirements.

use herakles_powertop_exporter::{collect, ReportSource};

use crate::config::{validate_effective_config, Config};
use crate::startup_checks::{is_root, validate_requirements};

/// Validates system requirements and configuration.
pub fn command_check(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Herakles Powertop Exporter - System Check");
    println!("============================================");

    let mut all_ok = true;

    println!("\n⚙️  Checking configuration...");
    match validate_effective_config(config) {
        Ok(_) => println!("   ✅ Configuration is valid"),
        Err(e) => {
            println!("   ❌ Configuration invalid: {}", e);
            all_ok = false;
        }
    }

    println!("\n🔐 Checking privileges...");
    if is_root() {
        println!("   ✅ Running as root");
    } else {
        println!("   ⚠️  Not running as root - powertop estimates will be incomplete");
    }

    let source = config.report_source();
    match &source {
        ReportSource::Powertop(runner) => {
            println!("\n⚡ Checking powertop...");
            match validate_requirements(&runner.binary) {
                Ok(path) => println!("   ✅ powertop found: {}", path.display()),
                Err(e) => {
                    println!("   ❌ {}", e);
                    all_ok = false;
                }
            }
        }
        ReportSource::File(_) => {
            println!("\n📄 Checking report file...");
            match collect(&source) {
                Ok(report) if report.is_empty() => {
                    println!("   ⚠️  Report parsed but contains no consumers");
                }
                Ok(report) => println!(
                    "   ✅ Report parsed: {} process consumers, {} device consumers",
                    report.process_consumers.len(),
                    report.device_consumers.len()
                ),
                Err(e) => {
                    println!("   ❌ {}", e);
                    all_ok = false;
                }
            }
        }
    }

    println!("\n📋 Summary:");
    if all_ok {
        println!("   ✅ All checks passed - system is ready");
        Ok(())
    } else {
        println!("   ❌ Some checks failed - please review warnings");
        std::process::exit(1);
    }
}
