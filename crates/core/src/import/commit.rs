//! Commit accumulator: one write per valid record, failures isolated by row.
//!
//! The loop is sequential so every failure is attributed to exactly one
//! `row_number`. A rejected row is recorded and the loop moves on; a store
//! outage is recorded against the row that hit it and stops the loop, and the
//! partial result is returned.

use async_trait::async_trait;
use serde::Serialize;

use super::validator::{RecordFields, ValidatedRecord};
use crate::error::WriteError;

// ---------------------------------------------------------------------------
// Writer seam
// ---------------------------------------------------------------------------

/// Who is performing the import. Passed to every write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportContext {
    pub imported_by: Option<String>,
}

impl ImportContext {
    pub fn imported_by(user: impl Into<String>) -> Self {
        Self {
            imported_by: Some(user.into()),
        }
    }
}

/// Target store writer: persists one validated record.
#[async_trait]
pub trait RecordWriter: Send + Sync {
    async fn write(&self, ctx: &ImportContext, fields: &RecordFields) -> Result<(), WriteError>;
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowFailure {
    pub row_number: usize,
    pub reason: String,
}

/// Outcome of one commit invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub imported_count: usize,
    pub failed_count: usize,
    pub failure_details: Vec<RowFailure>,
    /// The store became unavailable and the remaining rows were skipped.
    pub interrupted: bool,
    /// Valid rows never attempted because of an interruption.
    pub not_attempted: usize,
}

impl ImportResult {
    /// True when every attempted row was written and nothing was skipped.
    pub fn is_complete_success(&self) -> bool {
        self.failed_count == 0 && !self.interrupted
    }

    fn record_failure(&mut self, row_number: usize, reason: &str) {
        self.failed_count += 1;
        self.failure_details.push(RowFailure {
            row_number,
            reason: reason.to_string(),
        });
    }
}

// ---------------------------------------------------------------------------
// Commit loop
// ---------------------------------------------------------------------------

/// Write every valid record in `records`, in order.
///
/// Records carrying field errors are skipped without being counted.
pub async fn commit<W>(
    records: &[ValidatedRecord],
    writer: &W,
    ctx: &ImportContext,
) -> ImportResult
where
    W: RecordWriter + ?Sized,
{
    let valid: Vec<&ValidatedRecord> = records.iter().filter(|r| r.is_valid()).collect();
    let mut result = ImportResult::default();

    for (attempted, record) in valid.iter().enumerate() {
        match writer.write(ctx, &record.fields).await {
            Ok(()) => result.imported_count += 1,
            Err(err @ WriteError::Rejected(_)) => {
                tracing::warn!(
                    row_number = record.row_number,
                    reason = err.reason(),
                    "Import row rejected by store",
                );
                result.record_failure(record.row_number, err.reason());
            }
            Err(err @ WriteError::Unavailable(_)) => {
                result.record_failure(record.row_number, err.reason());
                result.interrupted = true;
                result.not_attempted = valid.len() - attempted - 1;
                tracing::error!(
                    row_number = record.row_number,
                    error = %err,
                    not_attempted = result.not_attempted,
                    "Store unavailable, stopping import",
                );
                break;
            }
        }
    }

    tracing::info!(
        imported = result.imported_count,
        failed = result.failed_count,
        interrupted = result.interrupted,
        "Import commit finished",
    );
    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
