//! Cell values as they come out of a decoded sheet.

use std::borrow::Cow;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

/// Largest serial number Excel can represent (9999-12-31).
pub const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

/// One decoded cell. CSV only ever yields `Empty` and `Text`; workbooks also
/// carry typed numbers and dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl CellValue {
    /// Build a cell from raw text; whitespace-only text counts as empty.
    pub fn from_text(raw: &str) -> Self {
        if raw.trim().is_empty() {
            Self::Empty
        } else {
            Self::Text(raw.to_string())
        }
    }

    /// `true` for empty cells and text that is blank after trimming.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(_) | Self::Date(_) => false,
        }
    }

    /// Trimmed textual rendering of the cell.
    ///
    /// Whole numbers render without a fractional part so an ID typed as
    /// `1042` in a workbook does not come back as `1042.0`.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Empty => Cow::Borrowed(""),
            Self::Text(s) => Cow::Borrowed(s.trim()),
            Self::Number(n) => Cow::Owned(format_number(*n)),
            Self::Date(d) => Cow::Owned(d.format("%Y-%m-%d").to_string()),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Normalise a header or alias for comparison: trim, lower-case and collapse
/// internal whitespace runs to a single space.
pub fn normalize_header(header: &str) -> String {
    header
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Convert an Excel serial day number (1900 date system) to a calendar date.
///
/// The time-of-day fraction is dropped. Serials outside Excel's range yield
/// `None`. Dates before 1900-03-01 are off by one because of Excel's
/// fictitious 1900-02-29; CRM data never goes back that far.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > MAX_EXCEL_SERIAL {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.floor() as i64))
}
