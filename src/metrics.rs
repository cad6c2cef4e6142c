//! Prometheus metrics definitions for herakles-powertop-exporter.
//!
//! Per-process values come from the software power consumers table, device
//! values from the device power report. Both are exported per consumer.

use herakles_powertop_exporter::SysPower;
use prometheus::{Gauge, GaugeVec, Opts, Registry};

/// Labels identifying a software consumer.
const PROCESS_LABELS: &[&str] = &["pid", "category", "description"];
/// Labels identifying a device consumer.
const DEVICE_LABELS: &[&str] = &["device", "usage"];

/// Collection of Prometheus metrics for power consumers.
#[derive(Clone)]
pub struct PowerMetrics {
    // ========== Software Consumers ==========
    pub process_usage_ms_per_second: GaugeVec, // labels: pid, category, description
    pub process_disk_io_per_second: GaugeVec,  // labels: pid, category, description
    pub process_power_watts: GaugeVec,         // labels: pid, category, description
    pub process_consumers: Gauge,

    // ========== Devices ==========
    pub device_usage_info: GaugeVec, // labels: device, usage
    pub device_consumers: Gauge,
}

impl PowerMetrics {
    /// Creates and registers all Prometheus metrics with the registry.
    pub fn new(registry: &Registry) -> Result<Self, Box<dyn std::error::Error>> {
        let process_usage_ms_per_second = GaugeVec::new(
            Opts::new(
                "herakles_powertop_process_usage_ms_per_second",
                "Activity of a software consumer in milliseconds per second",
            ),
            PROCESS_LABELS,
        )?;
        let process_disk_io_per_second = GaugeVec::new(
            Opts::new(
                "herakles_powertop_process_disk_io_per_second",
                "Disk I/O operations per second of a software consumer",
            ),
            PROCESS_LABELS,
        )?;
        let process_power_watts = GaugeVec::new(
            Opts::new(
                "herakles_powertop_process_power_watts",
                "Estimated power draw of a software consumer in watts",
            ),
            PROCESS_LABELS,
        )?;
        let process_consumers = Gauge::new(
            "herakles_powertop_process_consumers",
            "Number of software consumers in the last report",
        )?;
        let device_usage_info = GaugeVec::new(
            Opts::new(
                "herakles_powertop_device_usage_info",
                "Device utilization as printed by powertop (always 1)",
            ),
            DEVICE_LABELS,
        )?;
        let device_consumers = Gauge::new(
            "herakles_powertop_device_consumers",
            "Number of devices in the last report",
        )?;

        registry.register(Box::new(process_usage_ms_per_second.clone()))?;
        registry.register(Box::new(process_disk_io_per_second.clone()))?;
        registry.register(Box::new(process_power_watts.clone()))?;
        registry.register(Box::new(process_consumers.clone()))?;
        registry.register(Box::new(device_usage_info.clone()))?;
        registry.register(Box::new(device_consumers.clone()))?;

        Ok(Self {
            process_usage_ms_per_second,
            process_disk_io_per_second,
            process_power_watts,
            process_consumers,
            device_usage_info,
            device_consumers,
        })
    }

    /// Drops all per-consumer series so consumers gone from the report vanish.
    pub fn reset_consumer_metrics(&self) {
        self.process_usage_ms_per_second.reset();
        self.process_disk_io_per_second.reset();
        self.process_power_watts.reset();
        self.device_usage_info.reset();
    }

    /// Publishes a report. Rows sharing the same labels are summed.
    ///
    /// Returns the number of exported series.
    pub fn export(&self, power: &SysPower, enable_process: bool, enable_device: bool) -> usize {
        self.reset_consumer_metrics();
        let mut series = 0usize;

        if enable_process {
            for p in &power.process_consumers {
                let pid = p.pid.to_string();
                let labels = [pid.as_str(), p.category.as_str(), p.description.as_str()];

                self.process_usage_ms_per_second
                    .with_label_values(&labels)
                    .add(p.usage);
                self.process_disk_io_per_second
                    .with_label_values(&labels)
                    .add(p.disk_io_per_second);
                self.process_power_watts
                    .with_label_values(&labels)
                    .add(p.power_estimate_watts);
                series += 3;
            }
        }
        self.process_consumers
            .set(power.process_consumers.len() as f64);

        if enable_device {
            for d in &power.device_consumers {
                self.device_usage_info
                    .with_label_values(&[d.device_name.as_str(), d.usage.as_str()])
                    .set(1.0);
                series += 1;
            }
        }
        self.device_consumers.set(power.device_consumers.len() as f64);

        series
    }
}
