//! Schema-driven record tables.
//!
//! A [`TableSchema`] names the columns of one record type and how to pull each
//! cell out of a record. The terminal table and the CSV encoder both read the
//! same schema, so what is on screen is what gets exported.

use chrono::NaiveDateTime;
use std::fmt::Write;

use crate::models::DEFAULT_DATE_FORMAT;

pub mod schemas;

/// Formatting options shared by every cell extractor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellFormat {
    pub date_format: String,
}

impl Default for CellFormat {
    fn default() -> Self {
        Self::new(DEFAULT_DATE_FORMAT)
    }
}

impl CellFormat {
    pub fn new(date_format: impl Into<String>) -> Self {
        Self {
            date_format: date_format.into(),
        }
    }

    /// Calendar date of a timestamp, empty when the backend had none or the
    /// format cannot render it
    pub fn date(&self, timestamp: Option<NaiveDateTime>) -> String {
        let Some(ts) = timestamp else {
            return String::new();
        };
        let mut out = String::new();
        if write!(out, "{}", ts.format(&self.date_format)).is_err() {
            tracing::debug!("Cannot render {} with date format {:?}", ts, self.date_format);
            return String::new();
        }
        out
    }
}

/// Label for a paid-status flag
pub fn paid_label(paid: bool) -> &'static str {
    if paid {
        "Paid"
    } else {
        "Unpaid"
    }
}

/// Text of an optional field, empty when absent
pub fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

/// Extracts one cell of a record
pub type Extractor<T> = fn(&T, &CellFormat) -> String;

/// One named column
pub struct Column<T: 'static> {
    pub header: &'static str,
    pub extract: Extractor<T>,
    /// Relative width hint for the terminal table
    pub width: u16,
}

/// Column layout and display texts for one record type
pub struct TableSchema<T: 'static> {
    pub title: &'static str,
    pub export_base: &'static str,
    pub columns: &'static [Column<T>],
    pub emphasis: Option<fn(&T) -> bool>,
    pub loading_message: &'static str,
    pub empty_message: &'static str,
}

impl<T> TableSchema<T> {
    pub fn headers(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.header).collect()
    }

    pub fn row(&self, record: &T, format: &CellFormat) -> Vec<String> {
        self.columns
            .iter()
            .map(|c| (c.extract)(record, format))
            .collect()
    }

    pub fn rows(&self, records: &[T], format: &CellFormat) -> Vec<Vec<String>> {
        records.iter().map(|r| self.row(r, format)).collect()
    }

    pub fn is_emphasized(&self, record: &T) -> bool {
        self.emphasis.is_some_and(|f| f(record))
    }

    pub fn widths(&self) -> Vec<u16> {
        self.columns.iter().map(|c| c.width).collect()
    }
}
