//! CSV export of record tables

use chrono::{DateTime, Utc};

use crate::table::{CellFormat, TableSchema};

pub mod file_export;
pub use file_export::{CsvExporter, ExportError};

/// MIME type of exported files
pub const CSV_MIME_TYPE: &str = "text/csv;charset=utf-8";

/// How field values are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CsvQuoting {
    /// Plain comma join. Values containing a comma, quote or newline corrupt the row.
    Verbatim,
    /// Quote only the fields that need it.
    #[default]
    Rfc4180,
}

impl std::str::FromStr for CsvQuoting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "verbatim" | "plain" => Ok(CsvQuoting::Verbatim),
            "rfc4180" | "quoted" => Ok(CsvQuoting::Rfc4180),
            other => Err(format!("unknown CSV quoting {:?} (expected verbatim or rfc4180)", other)),
        }
    }
}

/// Encode records as CSV text: a header line, then one line per record,
/// joined by `\n` with no trailing newline.
pub fn encode_csv<T>(
    schema: &TableSchema<T>,
    records: &[T],
    format: &CellFormat,
    quoting: CsvQuoting,
) -> Result<String, csv::Error> {
    let headers = schema.headers();
    let rows = schema.rows(records, format);

    match quoting {
        CsvQuoting::Verbatim => {
            let mut lines = Vec::with_capacity(rows.len() + 1);
            lines.push(headers.join(","));
            lines.extend(rows.iter().map(|row| row.join(",")));
            Ok(lines.join("\n"))
        }
        CsvQuoting::Rfc4180 => {
            let mut writer = csv::WriterBuilder::new()
                .terminator(csv::Terminator::Any(b'\n'))
                .quote_style(csv::QuoteStyle::Necessary)
                .from_writer(Vec::new());

            writer.write_record(&headers)?;
            for row in &rows {
                writer.write_record(row)?;
            }

            let bytes = writer
                .into_inner()
                .map_err(|e| csv::Error::from(e.into_error()))?;
            let mut text = String::from_utf8_lossy(&bytes).into_owned();
            if text.ends_with('\n') {
                text.pop();
            }
            Ok(text)
        }
    }
}

/// File name for an export taken at `now`: `{base}_{ISO timestamp}.csv`
/// with `:` and `.` in the timestamp replaced by `-`.
pub fn export_file_name(base: &str, now: DateTime<Utc>) -> String {
    let timestamp = now
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
        .replace([':', '.'], "-");
    format!("{}_{}.csv", base, timestamp)
}
