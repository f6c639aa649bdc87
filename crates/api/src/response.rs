//! Shared response envelope types for API handlers.
//!
//! Read endpoints use a `{ "data": ... }` envelope. Import endpoints answer
//! with the flat `success`-flagged bodies the upload client expects.

use crm_core::import::{ImportResult, ImportSummary, RowFailure, ValidatedRecord};
use serde::Serialize;
use uuid::Uuid;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// Body returned by preview endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    pub success: bool,
    pub session_id: Uuid,
    pub total_rows: usize,
    pub valid_rows: usize,
    pub error_rows: usize,
    /// First rows of the file, errors included.
    pub data: Vec<ValidatedRecord>,
}

impl PreviewResponse {
    pub fn new(session_id: Uuid, summary: &ImportSummary) -> Self {
        Self {
            success: true,
            session_id,
            total_rows: summary.total_rows,
            valid_rows: summary.valid_rows,
            error_rows: summary.error_rows,
            data: summary.sample_records.clone(),
        }
    }
}

/// Body returned by commit endpoints.
///
/// `success` is false only when the store went away mid-commit; rows rejected
/// one by one are reported through `failed` and `failures`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitResponse {
    pub success: bool,
    pub imported: usize,
    pub failed: usize,
    pub failures: Vec<RowFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&ImportResult> for CommitResponse {
    fn from(result: &ImportResult) -> Self {
        let error = result.interrupted.then(|| {
            format!(
                "Import stopped early: the database became unavailable. \
                 {} row(s) were not attempted",
                result.not_attempted
            )
        });
        Self {
            success: !result.interrupted,
            imported: result.imported_count,
            failed: result.failed_count,
            failures: result.failure_details.clone(),
            error,
        }
    }
}
