//! Integration tests for report parsing and collection.
//!
//! These tests feed complete powertop CSV reports through the public API,
//! both from strings and from report files on disk.

use herakles_powertop_exporter::{
    collect, collect_or_default, parse_report_str, CollectError, PowertopRunner, ReportError,
    ReportSource, SysPower,
};
use std::io::Write;
use std::path::PathBuf;

const SEPARATOR: &str = "____________________________________________________________________";

/// Builds a report with the usual banner and system information blocks
/// around the given body.
fn report(body: &str) -> String {
    format!(
        "{sep}\n                                 P o w e r T O P\n{sep}\n \
         *  *  *   System Information   *  *  *\nPowerTOP Version;v2.15\nKernel Version;6.8.0\n\
         {sep}\n{body}{sep}\n",
        sep = SEPARATOR
    )
}

fn software_section(rows: &[&str]) -> String {
    let mut out = String::from(
        " *  *  *   Overview of Software Power Consumers   *  *  *\n\n\
         Usage;Wakeups/s;GPU ops/s;VFS ops/s;Disk IO/s;Category;Description;PW Estimate\n",
    );
    for row in rows {
        out.push_str(row);
        out.push('\n');
    }
    out
}

fn write_report(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_realistic_report() {
    let body = format!(
        "{}{sep}\n *  *  *   Device Power Report   *  *  *\n\nUsage;Device Name\n  \
         100.0%;Display backlight\n  12.4%;Radio device: iwlwifi\n  0.0 pkts/s;Network interface: eth0\n",
        software_section(&[
            "  25.3 ms/s;  110.2;  0.0;  0.0;  1.2;Process;[PID 1751] /usr/lib/firefox/firefox -contentproc; 750 mW",
            "  3.1 ms/s;  45.0;  0.0;  0.0;  0.0;Timer;tick_sched_timer; 120 mW",
            "  800 us/s;  20.0;  0.0;  0.0;  0.0;Interrupt;[124] iwlwifi; 40 uW",
            "  1.5 s/s;  2.0;  0.0;  0.0;  0.0;Process;[2044] Xorg; 2.1 W",
        ]),
        sep = SEPARATOR
    );
    let power = parse_report_str(&report(&body)).unwrap();

    let procs = &power.process_consumers;
    assert_eq!(procs.len(), 4);

    assert_eq!(procs[0].pid, 1751);
    assert_eq!(procs[0].description, "firefox");
    assert_eq!(procs[0].usage, 25.3);
    assert_eq!(procs[0].disk_io_per_second, 1.2);
    assert_eq!(procs[0].power_estimate_watts, 0.75);

    // Non-process categories keep the description verbatim.
    assert_eq!(procs[1].pid, 0);
    assert_eq!(procs[1].category, "Timer");
    assert_eq!(procs[1].description, "tick_sched_timer");
    assert_eq!(procs[1].power_estimate_watts, 0.12);

    assert_eq!(procs[2].pid, 124);
    assert_eq!(procs[2].usage, 0.8);
    assert_eq!(procs[2].description, "[124] iwlwifi");
    assert_eq!(procs[2].power_estimate_watts, 0.00004);

    // Two tokens: neither a bare name nor a path in third position.
    assert_eq!(procs[3].pid, 2044);
    assert_eq!(procs[3].usage, 1500.0);
    assert_eq!(procs[3].description, "[2044] Xorg");
    assert_eq!(procs[3].power_estimate_watts, 2.1);

    let devices = &power.device_consumers;
    assert_eq!(devices.len(), 3);
    assert_eq!(devices[1].usage, "12.4%");
    assert_eq!(devices[1].device_name, "Radio device: iwlwifi");
    assert_eq!(devices[2].usage, "0.0 pkts/s");
}

#[test]
fn test_trailing_section_without_separator_is_dropped() {
    let mut content = report(&software_section(&[
        "  1.0 ms/s;  1.0;  0.0;  0.0;  0.0;Process;[PID 1] /sbin/init splash; 1 mW",
    ]));
    content.push_str(
        " *  *  *   Device Power Report   *  *  *\nUsage;Device Name\n 50.0%;USB device\n",
    );

    let power = parse_report_str(&content).unwrap();
    assert_eq!(power.process_consumers.len(), 1);
    assert_eq!(power.process_consumers[0].description, "init");
    assert!(power.device_consumers.is_empty());
}

#[test]
fn test_crlf_report_and_comments() {
    let content = report(&software_section(&[
        "# comment lines are ignored",
        "  2 ms/s;  1.0;  0.0;  0.0;  0.0;kWork;\"flush;wq\"; 3 mW",
    ]))
    .replace('\n', "\r\n");

    let power = parse_report_str(&content).unwrap();
    assert_eq!(power.process_consumers.len(), 1);
    assert_eq!(power.process_consumers[0].description, "flush;wq");
    assert_eq!(power.process_consumers[0].power_estimate_watts, 0.003);
}

#[test]
fn test_unterminated_quote_is_an_error() {
    let err = parse_report_str("Usage;\"broken\n").unwrap_err();
    assert!(matches!(err, ReportError::UnterminatedQuote { .. }));
}

#[test]
fn test_collect_from_report_file() {
    let file = write_report(&report(&software_section(&[
        "  4 ms/s;  1.0;  0.0;  0.0;  0.0;Process;[PID 300] /usr/sbin/sshd -D; 10 mW",
    ])));

    let source = ReportSource::File(file.path().to_path_buf());
    let power = collect(&source).unwrap();

    assert_eq!(power.process_consumers.len(), 1);
    assert_eq!(power.process_consumers[0].pid, 300);
    assert_eq!(power.process_consumers[0].description, "sshd");
    assert!(power.device_consumers.is_empty());
}

#[test]
fn test_collect_missing_file_fails_and_defaults() {
    let source = ReportSource::File(PathBuf::from("/nonexistent/powertop.csv"));

    assert!(matches!(
        collect(&source),
        Err(CollectError::Report(ReportError::NotFound { .. }))
    ));
    assert_eq!(collect_or_default(&source), SysPower::default());
}

#[test]
fn test_collect_reports_missing_powertop() {
    let dir = tempfile::tempdir().unwrap();
    let runner = PowertopRunner::new(
        "herakles-no-such-powertop-binary",
        dir.path().join("report.csv"),
        1,
    );

    let err = collect(&ReportSource::Powertop(runner)).unwrap_err();
    assert!(matches!(err, CollectError::Spawn { .. }));
}

#[cfg(unix)]
#[test]
fn test_collect_reports_failing_powertop() {
    let dir = tempfile::tempdir().unwrap();
    let runner = PowertopRunner::new("false", dir.path().join("report.csv"), 1);

    let source = ReportSource::Powertop(runner);
    assert!(matches!(collect(&source), Err(CollectError::Failed { .. })));
    assert!(collect_or_default(&source).is_empty());
}

#[test]
fn test_json_output_field_names() {
    let power = parse_report_str(&report(&software_section(&[
        "  1 ms/s;  1.0;  0.0;  0.0;  2.0;Process;[PID 42] /usr/bin/foo --bar; 1 W",
    ])))
    .unwrap();

    let json = serde_json::to_value(&power).unwrap();
    let consumer = &json["processConsumers"][0];
    assert_eq!(consumer["pid"], 42);
    assert_eq!(consumer["usage"], 1.0);
    assert_eq!(consumer["diskIoPerSecond"], 2.0);
    assert_eq!(consumer["category"], "Process");
    assert_eq!(consumer["description"], "foo");
    assert_eq!(consumer["pwEstimate"], 1.0);
    assert_eq!(json["deviceConsumers"], serde_json::json!([]));
}
