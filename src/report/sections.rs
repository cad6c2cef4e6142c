//! Section splitting for powertop CSV reports.
//!
//! A powertop report is a sequence of blocks. Each block starts with a title
//! row (for example `*  *  *   Device Power Report   *  *  *`) and is closed by
//! a horizontal rule made of underscores. This module groups the data rows of
//! every closed block under its title.

use ahash::AHashMap as HashMap;
use regex::Regex;
use tracing::{debug, warn};

use super::RawRecord;

/// Title of the decorative banner block printed at the top of every report.
pub const BANNER_TITLE: &str = "P o w e r T O P";

/// Pattern of a horizontal rule: one leading character followed by underscores.
const SEPARATOR_PATTERN: &str = r"^(.)_+$";

/// Groups report rows into sections keyed by their title.
///
/// Only sections closed by a separator row are returned; rows following the
/// last separator are dropped. Sections without data rows never appear, and
/// the banner block is discarded.
pub fn split_sections(records: &[RawRecord]) -> HashMap<String, Vec<RawRecord>> {
    let separator = match Regex::new(SEPARATOR_PATTERN) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!("Failed to compile section separator pattern: {}", e);
            None
        }
    };

    let mut sections = HashMap::new();
    let mut title = String::new();
    let mut current: Vec<RawRecord> = Vec::new();

    for record in records {
        let first = record.first().map(String::as_str).unwrap_or("");

        if is_separator(separator.as_ref(), first) {
            if current.is_empty() {
                continue;
            }
            if title == BANNER_TITLE {
                debug!("Discarding {} banner rows", current.len());
            } else {
                debug!("Closing section '{}' with {} rows", title, current.len());
                sections.insert(std::mem::take(&mut title), std::mem::take(&mut current));
            }
            title.clear();
            current.clear();
        } else if title.is_empty() {
            title = clean_title(first);
        } else {
            let row: RawRecord = record.iter().map(|f| f.trim().to_string()).collect();
            if row.iter().any(|f| !f.is_empty()) {
                current.push(row);
            }
        }
    }

    if !current.is_empty() {
        // Trailing sections without a closing rule are never flushed.
        debug!(
            "Dropping unterminated section '{}' with {} rows",
            title,
            current.len()
        );
    }

    sections
}

/// Returns true when `field` is a horizontal rule.
fn is_separator(separator: Option<&Regex>, field: &str) -> bool {
    separator.is_some_and(|re| re.is_match(field))
}

/// Strips surrounding whitespace and the `*` decoration from a title row.
pub fn clean_title(field: &str) -> String {
    field
        .trim_matches(|c: char| c.is_whitespace() || c == '*')
        .to_string()
}
