//! Coercion strategies for [`FieldKind`](super::FieldKind).
//!
//! Each function returns `None` when the cell cannot be coerced; callers turn
//! that into a field error. Nothing here ever falls back to a default value.

use chrono::NaiveDate;

use super::cell::{excel_serial_to_date, CellValue};

/// Currency symbols tolerated in front of an amount.
const CURRENCY_PREFIXES: &[char] = &['$', '€', '£', '₹'];

/// Date layouts accepted for text cells, tried in order. Numeric layouts are
/// day-first: `03/04/2024` is the 3rd of April.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%d-%b-%Y", "%d %b %Y",
    "%d %B %Y", "%b %d, %Y", "%B %d, %Y",
];

/// Coerce a cell to a finite number.
///
/// Accepts grouping commas and one leading currency symbol. A lone `-`,
/// blank text, `NaN` and infinities are all rejected.
pub fn number(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Number(n) => n.is_finite().then_some(*n),
        CellValue::Text(s) => parse_number_text(s),
        CellValue::Empty | CellValue::Date(_) => None,
    }
}

fn parse_number_text(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let unsigned = trimmed.trim_start_matches(['-', '+']);
    let sign = &trimmed[..trimmed.len() - unsigned.len()];
    let digits = unsigned
        .strip_prefix(CURRENCY_PREFIXES)
        .unwrap_or(unsigned)
        .trim_start()
        .replace(',', "");
    if !digits.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return None;
    }
    let value: f64 = format!("{sign}{digits}").parse().ok()?;
    value.is_finite().then_some(value)
}

/// Coerce a cell to a calendar date.
///
/// Workbook date cells pass through, numeric cells are read as Excel serial
/// dates and text is matched against the accepted layouts. An ISO date
/// followed by a time part (`2024-01-15T09:30:00`) keeps only the date.
pub fn date(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::Date(d) => Some(*d),
        CellValue::Number(n) => excel_serial_to_date(*n),
        CellValue::Text(s) => parse_date_text(s.trim()),
        CellValue::Empty => None,
    }
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
    {
        return Some(date);
    }
    // ISO date-time: keep the date part.
    let (date_part, _time) = text.split_once(['T', ' '])?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Match `value` case-insensitively against the allowed values, returning
/// the canonical spelling.
pub fn enumeration<'a>(value: &str, allowed: &'a [String]) -> Option<&'a str> {
    let value = value.trim().to_lowercase();
    allowed
        .iter()
        .find(|candidate| candidate.to_lowercase() == value)
        .map(String::as_str)
}
