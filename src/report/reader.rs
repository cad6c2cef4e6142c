//! Record reader for the `;` separated CSV files written by `powertop --csv`.
//!
//! The format is loose: field counts vary from row to row, `#` starts a
//! comment line and fields may be double quoted. Every line is turned into
//! one [`RawRecord`] unless a quoted field carries on to the next line; no
//! field is trimmed here.

use std::fs;
use std::path::{Path, PathBuf};

use super::RawRecord;

/// Field delimiter used by powertop.
pub const DELIMITER: char = ';';
/// Lines starting with this character are skipped.
pub const COMMENT: char = '#';

/// Errors raised while obtaining report records.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Report file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Failed to read report {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unterminated quoted field on line {line}")]
    UnterminatedQuote { line: usize },
}

/// Splits report text into records.
///
/// A quoted field may run over several lines; the line breaks are kept in
/// the field as `\n`. A quote still open at the end of the input is reported
/// with the line its record started on.
pub fn read_records(input: &str) -> Result<Vec<RawRecord>, ReportError> {
    let mut records = Vec::new();
    let mut pending: Option<(RecordBuilder, usize)> = None;

    for (idx, line) in input.lines().enumerate() {
        let (mut builder, start_line) = match pending.take() {
            Some((mut builder, start_line)) => {
                builder.field.push('\n');
                (builder, start_line)
            }
            None if line.is_empty() || line.starts_with(COMMENT) => continue,
            None => (RecordBuilder::default(), idx + 1),
        };

        builder.feed(line);
        if builder.in_quotes {
            pending = Some((builder, start_line));
        } else {
            records.push(builder.finish());
        }
    }

    if let Some((_, line)) = pending {
        return Err(ReportError::UnterminatedQuote { line });
    }

    Ok(records)
}

/// Reads and splits the report at `path`.
pub fn read_records_from_path(path: &Path) -> Result<Vec<RawRecord>, ReportError> {
    if !path.exists() {
        return Err(ReportError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let bytes = fs::read(path).map_err(|source| ReportError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    // powertop copies device and process names verbatim; keep going on odd bytes.
    read_records(&String::from_utf8_lossy(&bytes))
}

/// Record under construction; survives line breaks inside quoted fields.
#[derive(Default)]
struct RecordBuilder {
    fields: Vec<String>,
    field: String,
    in_quotes: bool,
}

impl RecordBuilder {
    /// Consumes one line, splitting on the delimiter outside of quotes.
    fn feed(&mut self, line: &str) {
        let mut chars = line.chars().peekable();

        while let Some(c) = chars.next() {
            if self.in_quotes {
                match c {
                    '"' if chars.peek() == Some(&'"') => {
                        self.field.push('"');
                        chars.next();
                    }
                    '"' => self.in_quotes = false,
                    _ => self.field.push(c),
                }
            } else {
                match c {
                    '"' if self.field.is_empty() => self.in_quotes = true,
                    DELIMITER => self.fields.push(std::mem::take(&mut self.field)),
                    _ => self.field.push(c),
                }
            }
        }
    }

    fn finish(mut self) -> RawRecord {
        self.fields.push(self.field);
        self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_records_variable_width() {
        let input = "a;b;c\nsingle\n x ; y \n";
        let records = read_records(input).unwrap();
        assert_eq!(
            records,
            vec![
                vec!["a".to_string(), "b".to_string(), "c".to_string()],
                vec!["single".to_string()],
                vec![" x ".to_string(), " y ".to_string()],
            ]
        );
    }

    #[test]
    fn test_read_records_skips_comments_and_empty_lines() {
        let input = "# generated\n\nfirst\n#second\nthird\r\n";
        let records = read_records(input).unwrap();
        assert_eq!(records, vec![vec!["first".to_string()], vec!["third".to_string()]]);
    }

    #[test]
    fn test_read_records_keeps_trailing_empty_fields() {
        let records = read_records("a;;b;").unwrap();
        assert_eq!(records[0], vec!["a", "", "b", ""]);
    }

    #[test]
    fn test_read_records_quoted_fields() {
        let records = read_records(r#""x;y";"say ""hi""";z"#).unwrap();
        assert_eq!(records[0], vec!["x;y", r#"say "hi""#, "z"]);
    }

    #[test]
    fn test_read_records_unterminated_quote() {
        let err = read_records("ok\n\"broken;field").unwrap_err();
        assert!(matches!(err, ReportError::UnterminatedQuote { line: 2 }));
    }

    #[test]
    fn test_read_records_quoted_field_spans_lines() {
        let input = "a;\"first\n\n# not a comment\";b\nnext\n";
        let records = read_records(input).unwrap();
        assert_eq!(
            records,
            vec![
                vec!["a".to_string(), "first\n\n# not a comment".to_string(), "b".to_string()],
                vec!["next".to_string()],
            ]
        );
    }

    #[test]
    fn test_read_records_unterminated_quote_reports_start_line() {
        let err = read_records("ok\n\"open\nstill open\n").unwrap_err();
        assert!(matches!(err, ReportError::UnterminatedQuote { line: 2 }));
    }

    #[test]
    fn test_read_records_whitespace_line_is_a_record() {
        let records = read_records("   \n").unwrap();
        assert_eq!(records, vec![vec!["   ".to_string()]]);
    }

    #[test]
    fn test_read_records_from_missing_path() {
        let err = read_records_from_path(Path::new("/nonexistent/powertop.csv")).unwrap_err();
        assert!(matches!(err, ReportError::NotFound { .. }));
    }
}
