//! Preview aggregation.

use serde::Serialize;

use super::decoder::{decode, UploadedFile};
use super::field_spec::FieldSpec;
use super::validator::{validate, ValidatedRecord};
use crate::error::FormatError;

/// Number of records shown in a preview sample.
pub const PREVIEW_SAMPLE_SIZE: usize = 10;

/// Counts over the full record set plus the first few records for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub total_rows: usize,
    pub valid_rows: usize,
    pub error_rows: usize,
    pub sample_records: Vec<ValidatedRecord>,
}

impl ImportSummary {
    /// Summarise `records`. Counts cover every record; only the sample is
    /// truncated.
    pub fn from_records(records: &[ValidatedRecord]) -> Self {
        let valid_rows = records.iter().filter(|r| r.is_valid()).count();
        Self {
            total_rows: records.len(),
            valid_rows,
            error_rows: records.len() - valid_rows,
            sample_records: records.iter().take(PREVIEW_SAMPLE_SIZE).cloned().collect(),
        }
    }
}

/// Decode and validate `file`, returning every record.
///
/// Sessions keep this full set so a later commit never re-reads the file.
pub fn validate_file(
    file: &UploadedFile,
    specs: &[FieldSpec],
) -> Result<Vec<ValidatedRecord>, FormatError> {
    let sheet = decode(file)?;
    Ok(validate(&sheet, specs))
}

/// Decode, validate and summarise `file`. Side-effect free.
pub fn preview(file: &UploadedFile, specs: &[FieldSpec]) -> Result<ImportSummary, FormatError> {
    let records = validate_file(file, specs)?;
    Ok(ImportSummary::from_records(&records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::validator::RecordFields;
    use assert_matches::assert_matches;

    fn record(row_number: usize, errors: &[&str]) -> ValidatedRecord {
        ValidatedRecord {
            row_number,
            fields: RecordFields::default(),
            errors: errors.iter().map(|e| e.to_string()).collect(),
        }
    }

    #[test]
    fn counts_partition_on_errors() {
        let records = vec![record(1, &[]), record(2, &["Name is required"]), record(3, &[])];
        let summary = ImportSummary::from_records(&records);
        assert_eq!(summary.total_rows, 3);
        assert_eq!(summary.valid_rows, 2);
        assert_eq!(summary.error_rows, 1);
        assert_eq!(summary.sample_records.len(), 3);
    }

    #[test]
    fn sample_truncated_counts_exact() {
        let records: Vec<_> = (1..=25)
            .map(|n| if n % 5 == 0 { record(n, &["bad"]) } else { record(n, &[]) })
            .collect();
        let summary = ImportSummary::from_records(&records);
        assert_eq!(summary.total_rows, 25);
        assert_eq!(summary.valid_rows, 20);
        assert_eq!(summary.error_rows, 5);
        assert_eq!(summary.sample_records.len(), PREVIEW_SAMPLE_SIZE);
        assert_eq!(summary.sample_records[9].row_number, 10);
    }

    #[test]
    fn empty_record_set() {
        let summary = ImportSummary::from_records(&[]);
        assert_eq!(summary.total_rows, 0);
        assert!(summary.sample_records.is_empty());
    }

    #[test]
    fn preview_propagates_format_error() {
        let specs = vec![FieldSpec::string("name", "Name")];
        let file = UploadedFile::new("notes.txt", b"hello".to_vec());
        assert_matches!(
            preview(&file, &specs),
            Err(FormatError::UnsupportedFormat { .. })
        );
    }

    #[test]
    fn preview_serializes_camel_case() {
        let specs = vec![FieldSpec::string("name", "Name").required()];
        let file = UploadedFile::new("a.csv", b"name\nAcme\n\n".to_vec());
        let json = serde_json::to_value(preview(&file, &specs).unwrap()).unwrap();
        assert_eq!(json["totalRows"], 1);
        assert_eq!(json["validRows"], 1);
        assert_eq!(json["errorRows"], 0);
        assert_eq!(json["sampleRecords"][0]["fields"]["name"], "Acme");
    }
}
