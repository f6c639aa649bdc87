//! Sheet decoder: uploaded bytes to header-labeled rows.
//!
//! Row 0 of the decoded grid is the header row. Every following row that is
//! not completely blank becomes a [`RawRow`] whose `row_number` is its grid
//! index (1-based, header excluded), so numbers line up with what the user
//! sees in their own file even when blank rows are dropped.

use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_from_rs, Data, Reader, Xls, Xlsx};
use serde::{Deserialize, Serialize};

use super::cell::{excel_serial_to_date, CellValue};
use crate::error::FormatError;

/// Maximum number of data rows accepted in one upload.
pub const MAX_DATA_ROWS: usize = 10_000;

/// Delimiters tried when sniffing a CSV header line.
const CSV_DELIMITERS: &[u8] = b",;\t|";

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const CFB_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A file as received from the upload transport.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Spreadsheet container formats the decoder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetFormat {
    Csv,
    Xlsx,
    Xls,
}

impl SheetFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::Xls => "xls",
        }
    }

    /// Parse a file extension (without the dot, any case).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" => Some(Self::Xlsx),
            "xls" => Some(Self::Xls),
            _ => None,
        }
    }

    /// Guess the format from leading magic bytes. Anything that is neither a
    /// zip container nor a compound file is treated as CSV text.
    pub fn sniff(bytes: &[u8]) -> Self {
        if bytes.starts_with(ZIP_MAGIC) {
            Self::Xlsx
        } else if bytes.starts_with(CFB_MAGIC) {
            Self::Xls
        } else {
            Self::Csv
        }
    }

    /// Declared format from the file name, falling back to sniffing when the
    /// name carries no extension.
    pub fn detect(file: &UploadedFile) -> Result<Self, FormatError> {
        match Path::new(&file.file_name).extension() {
            Some(ext) => {
                let ext = ext.to_string_lossy();
                Self::from_extension(&ext).ok_or_else(|| FormatError::UnsupportedFormat {
                    extension: ext.into_owned(),
                })
            }
            None => Ok(Self::sniff(&file.bytes)),
        }
    }
}

impl std::fmt::Display for SheetFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// One non-blank data row. `cells` is aligned with [`DecodedSheet::headers`].
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub row_number: usize,
    pub cells: Vec<CellValue>,
}

impl RawRow {
    /// Cell at column `index`; columns past the row's end read as empty.
    pub fn cell(&self, index: usize) -> &CellValue {
        self.cells.get(index).unwrap_or(&CellValue::Empty)
    }
}

/// Header row plus every non-blank data row of the first sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSheet {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode an uploaded file into header-labeled rows.
///
/// Pure and deterministic for a given file. Fails with [`FormatError`] when
/// the format is unsupported, the content cannot be parsed, or there is no
/// header row followed by at least one non-blank data row.
pub fn decode(file: &UploadedFile) -> Result<DecodedSheet, FormatError> {
    let format = SheetFormat::detect(file)?;
    let grid = match format {
        SheetFormat::Csv => read_csv_grid(&file.bytes)?,
        SheetFormat::Xlsx => read_workbook_grid::<Xlsx<Cursor<Vec<u8>>>>(&file.bytes)?,
        SheetFormat::Xls => read_workbook_grid::<Xls<Cursor<Vec<u8>>>>(&file.bytes)?,
    };
    let sheet = grid_to_sheet(grid)?;

    tracing::debug!(
        file_name = %file.file_name,
        format = %format,
        columns = sheet.headers.len(),
        rows = sheet.rows.len(),
        "Decoded upload"
    );

    Ok(sheet)
}

fn grid_to_sheet(grid: Vec<Vec<CellValue>>) -> Result<DecodedSheet, FormatError> {
    let mut grid = grid
        .into_iter()
        .skip_while(|row| row.iter().all(CellValue::is_blank));

    let header_row = grid.next().ok_or(FormatError::NoDataRows)?;
    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| cell.as_text().into_owned())
        .collect();
    let width = headers.len();

    let mut rows = Vec::new();
    for (index, mut cells) in grid.enumerate() {
        if cells.iter().all(CellValue::is_blank) {
            continue;
        }
        cells.resize(width, CellValue::Empty);
        rows.push(RawRow {
            row_number: index + 1,
            cells,
        });
    }

    if rows.is_empty() {
        return Err(FormatError::NoDataRows);
    }
    if rows.len() > MAX_DATA_ROWS {
        return Err(FormatError::TooManyRows {
            found: rows.len(),
            limit: MAX_DATA_ROWS,
        });
    }

    Ok(DecodedSheet { headers, rows })
}

/// Parse CSV text into a grid, keeping empty lines as blank grid rows so
/// row numbers match line positions in the source file.
fn read_csv_grid(bytes: &[u8]) -> Result<Vec<Vec<CellValue>>, FormatError> {
    if bytes.contains(&0) {
        return Err(FormatError::Unreadable(
            "file contains binary data, not CSV text".to_string(),
        ));
    }
    let text = std::str::from_utf8(bytes).map_err(|_| {
        FormatError::Unreadable("file is not valid UTF-8 text".to_string())
    })?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let delimiter = sniff_delimiter(text);
    let text = mark_empty_lines(text, delimiter);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| FormatError::Unreadable(e.to_string()))?;
        grid.push(record.iter().map(CellValue::from_text).collect());
    }
    Ok(grid)
}

/// The CSV reader skips empty lines outright. Give each empty line outside a
/// quoted field a lone delimiter so it survives as a blank grid row.
///
/// Quoting follows the reader: a `"` opens a quoted field only as the first
/// character of a field, `""` inside a quoted field is an escaped quote, and
/// a `"` in the middle of an unquoted field is a literal character.
fn mark_empty_lines(text: &str, delimiter: u8) -> String {
    let delimiter = delimiter as char;
    let mut out = String::with_capacity(text.len());
    let mut in_quotes = false;
    let mut closing_quote = false;
    let mut at_line_start = true;
    let mut at_field_start = true;
    for ch in text.chars() {
        if ch == '"' {
            if in_quotes {
                in_quotes = false;
                closing_quote = true;
            } else if closing_quote {
                in_quotes = true;
                closing_quote = false;
            } else if at_field_start {
                in_quotes = true;
            }
            at_line_start = false;
            at_field_start = false;
            out.push(ch);
            continue;
        }

        closing_quote = false;
        if !in_quotes {
            match ch {
                '\r' | '\n' => {
                    if at_line_start {
                        out.push(delimiter);
                    }
                    at_line_start = ch == '\n';
                    at_field_start = true;
                }
                c if c == delimiter => {
                    at_line_start = false;
                    at_field_start = true;
                }
                _ => {
                    at_line_start = false;
                    at_field_start = false;
                }
            }
        }
        out.push(ch);
    }
    out
}

/// Pick the delimiter that occurs most often in the first non-blank line.
fn sniff_delimiter(text: &str) -> u8 {
    let header_line = text
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("");
    CSV_DELIMITERS
        .iter()
        .copied()
        .map(|d| (d, header_line.bytes().filter(|b| *b == d).count()))
        .filter(|(_, count)| *count > 0)
        .max_by_key(|(_, count)| *count)
        .map_or(b',', |(d, _)| d)
}

/// Read the first sheet of a workbook into a grid.
fn read_workbook_grid<R>(bytes: &[u8]) -> Result<Vec<Vec<CellValue>>, FormatError>
where
    R: Reader<Cursor<Vec<u8>>>,
    R::Error: std::fmt::Display,
{
    let mut workbook: R = open_workbook_from_rs::<R, _>(Cursor::new(bytes.to_vec()))
        .map_err(|e| FormatError::Unreadable(e.to_string()))?;
    let first_sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| FormatError::Unreadable("workbook contains no sheets".to_string()))?;
    let range = workbook
        .worksheet_range(&first_sheet)
        .map_err(|e| FormatError::Unreadable(e.to_string()))?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(workbook_cell).collect())
        .collect())
}

fn workbook_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::from_text(s),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            excel_serial_to_date(serial).map_or(CellValue::Number(serial), CellValue::Date)
        }
        Data::DateTimeIso(s) => s
            .get(..10)
            .and_then(|prefix| chrono::NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
            .map_or_else(|| CellValue::from_text(s), CellValue::Date),
        Data::DurationIso(s) => CellValue::from_text(s),
        Data::Error(e) => CellValue::Text(format!("#{e:?}")),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
