//! Row validator and mapper. Pure logic, no database access.
//!
//! Maps each decoded row onto an entity's field contract, coercing values and
//! collecting every field error in one pass so the user can fix the whole
//! file at once.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;

use super::cell::{normalize_header, CellValue};
use super::coerce;
use super::decoder::DecodedSheet;
use super::field_spec::{FieldKind, FieldSpec};

/// A coerced field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

/// Target key to typed value, in field-contract order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RecordFields(IndexMap<String, FieldValue>);

impl RecordFields {
    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    /// Text value for `key`; `None` when absent, null or not text.
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(FieldValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        match self.0.get(key) {
            Some(FieldValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn date(&self, key: &str) -> Option<NaiveDate> {
        match self.0.get(key) {
            Some(FieldValue::Date(d)) => Some(*d),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One row after validation.
///
/// A record with no `errors` is importable; any error keeps it out of the
/// commit while it stays visible in the preview.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedRecord {
    pub row_number: usize,
    pub fields: RecordFields,
    pub errors: Vec<String>,
}

impl ValidatedRecord {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Cell read for a field whose column is absent from the sheet.
static MISSING: CellValue = CellValue::Empty;

/// Validate every row of `sheet` against `specs`.
///
/// Output order matches input row order. Headers not claimed by any spec are
/// ignored. Column resolution happens once per sheet, so each spec resolves
/// its own declared aliases independently of the others.
pub fn validate(sheet: &DecodedSheet, specs: &[FieldSpec]) -> Vec<ValidatedRecord> {
    let normalized: Vec<String> = sheet.headers.iter().map(|h| normalize_header(h)).collect();
    let bindings: Vec<(&FieldSpec, Option<usize>)> = specs
        .iter()
        .map(|spec| (spec, spec.resolve_normalized(&normalized)))
        .collect();

    sheet
        .rows
        .iter()
        .map(|row| {
            let mut fields = RecordFields::default();
            let mut errors = Vec::new();

            for (spec, column) in &bindings {
                let cell = match column {
                    Some(index) => row.cell(*index),
                    None => &MISSING,
                };
                let value = if cell.is_blank() {
                    if spec.required {
                        errors.push(format!("{} is required", spec.label));
                    }
                    FieldValue::Null
                } else {
                    coerce_field(spec, cell, &mut errors)
                };
                fields.insert(spec.target_key.clone(), value);
            }

            ValidatedRecord {
                row_number: row.row_number,
                fields,
                errors,
            }
        })
        .collect()
}

fn coerce_field(spec: &FieldSpec, cell: &CellValue, errors: &mut Vec<String>) -> FieldValue {
    match &spec.kind {
        FieldKind::String => FieldValue::Text(cell.as_text().into_owned()),
        FieldKind::Number => match coerce::number(cell) {
            Some(n) => FieldValue::Number(n),
            None => {
                errors.push(format!("{} must be a number", spec.label));
                FieldValue::Null
            }
        },
        FieldKind::Date => match coerce::date(cell) {
            Some(d) => FieldValue::Date(d),
            None => {
                errors.push(format!("{} must be a valid date", spec.label));
                FieldValue::Null
            }
        },
        FieldKind::Enum(allowed) => match coerce::enumeration(&cell.as_text(), allowed) {
            Some(canonical) => FieldValue::Text(canonical.to_string()),
            None => {
                errors.push(format!(
                    "{} must be one of: {}",
                    spec.label,
                    allowed.join(", ")
                ));
                FieldValue::Null
            }
        },
    }
}
