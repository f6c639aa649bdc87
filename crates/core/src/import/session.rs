//! State machine for one upload -> preview -> commit conversation.
//!
//! ```text
//! Idle -> FileSelected -> Previewing -> PreviewReady -> Committing -> Done
//!   ^          |              |              |
//!   +----------+--------------+--------------+   (cancel)
//! ```
//!
//! The file is decoded once, during preview. Commit works from the cached
//! records and never re-reads the upload.

use std::time::Instant;

use serde::Serialize;

use super::commit::ImportResult;
use super::decoder::UploadedFile;
use super::entities::EntityKind;
use super::summary::{validate_file, ImportSummary};
use super::validator::ValidatedRecord;
use crate::error::FormatError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportPhase {
    Idle,
    FileSelected,
    Previewing,
    PreviewReady,
    Committing,
    Done,
}

impl ImportPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::FileSelected => "file_selected",
            Self::Previewing => "previewing",
            Self::PreviewReady => "preview_ready",
            Self::Committing => "committing",
            Self::Done => "done",
        }
    }

    /// Phases from which a cancel is still allowed.
    pub fn is_cancellable(&self) -> bool {
        !matches!(self, Self::Committing | Self::Done)
    }
}

impl std::fmt::Display for ImportPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Cannot {action} while import is {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: ImportPhase,
    },

    #[error("Import is already being committed")]
    AlreadyCommitting,

    #[error("Import has already been committed")]
    AlreadyCommitted,

    #[error("No valid rows to import")]
    NothingToCommit,
}

/// One import conversation for a single entity.
#[derive(Debug, Clone)]
pub struct ImportSession {
    entity: EntityKind,
    phase: ImportPhase,
    file: Option<UploadedFile>,
    records: Vec<ValidatedRecord>,
    summary: Option<ImportSummary>,
    result: Option<ImportResult>,
    last_touched: Instant,
}

impl ImportSession {
    pub fn new(entity: EntityKind) -> Self {
        Self {
            entity,
            phase: ImportPhase::Idle,
            file: None,
            records: Vec::new(),
            summary: None,
            result: None,
            last_touched: Instant::now(),
        }
    }

    pub fn entity(&self) -> EntityKind {
        self.entity
    }

    pub fn phase(&self) -> ImportPhase {
        self.phase
    }

    pub fn summary(&self) -> Option<&ImportSummary> {
        self.summary.as_ref()
    }

    pub fn result(&self) -> Option<&ImportResult> {
        self.result.as_ref()
    }

    pub fn records(&self) -> &[ValidatedRecord] {
        &self.records
    }

    pub fn last_touched(&self) -> Instant {
        self.last_touched
    }

    fn touch(&mut self) {
        self.last_touched = Instant::now();
    }

    fn guard(&self, action: &'static str, allowed: &[ImportPhase]) -> Result<(), SessionError> {
        if allowed.contains(&self.phase) {
            return Ok(());
        }
        Err(match self.phase {
            ImportPhase::Committing => SessionError::AlreadyCommitting,
            ImportPhase::Done => SessionError::AlreadyCommitted,
            phase => SessionError::InvalidTransition { action, phase },
        })
    }

    /// Select (or re-select) the file to import. Drops any earlier preview.
    pub fn select_file(&mut self, file: UploadedFile) -> Result<(), SessionError> {
        self.guard(
            "select a file",
            &[ImportPhase::Idle, ImportPhase::FileSelected, ImportPhase::PreviewReady],
        )?;
        self.file = Some(file);
        self.records.clear();
        self.summary = None;
        self.phase = ImportPhase::FileSelected;
        self.touch();
        Ok(())
    }

    /// Take the selected file for decoding, moving to `Previewing`.
    pub fn begin_preview(&mut self) -> Result<UploadedFile, SessionError> {
        self.guard("preview", &[ImportPhase::FileSelected])?;
        let file = self.file.take().ok_or(SessionError::InvalidTransition {
            action: "preview",
            phase: self.phase,
        })?;
        self.phase = ImportPhase::Previewing;
        self.touch();
        Ok(file)
    }

    /// Store the outcome of decoding. A format error returns the session to
    /// `Idle` so the user can pick another file.
    ///
    /// Fails with a session error if the preview was cancelled meanwhile.
    pub fn finish_preview(
        &mut self,
        outcome: Result<Vec<ValidatedRecord>, FormatError>,
    ) -> Result<&ImportSummary, PreviewError> {
        self.guard("finish a preview", &[ImportPhase::Previewing])?;
        self.touch();
        match outcome {
            Ok(records) => {
                let summary = ImportSummary::from_records(&records);
                self.records = records;
                self.phase = ImportPhase::PreviewReady;
                Ok(self.summary.insert(summary))
            }
            Err(err) => {
                self.records.clear();
                self.summary = None;
                self.phase = ImportPhase::Idle;
                Err(err.into())
            }
        }
    }

    /// Select, decode and summarise in one step.
    pub fn preview(&mut self, file: UploadedFile) -> Result<&ImportSummary, PreviewError> {
        self.select_file(file)?;
        let file = self.begin_preview()?;
        let outcome = validate_file(&file, self.entity.field_specs());
        self.finish_preview(outcome)
    }

    /// Move to `Committing` and hand out the valid cached records.
    ///
    /// A second call before [`finish_commit`](Self::finish_commit) fails with
    /// [`SessionError::AlreadyCommitting`].
    pub fn begin_commit(&mut self) -> Result<Vec<ValidatedRecord>, SessionError> {
        self.guard("commit", &[ImportPhase::PreviewReady])?;
        let valid: Vec<ValidatedRecord> =
            self.records.iter().filter(|r| r.is_valid()).cloned().collect();
        if valid.is_empty() {
            return Err(SessionError::NothingToCommit);
        }
        self.phase = ImportPhase::Committing;
        self.touch();
        Ok(valid)
    }

    pub fn finish_commit(&mut self, result: ImportResult) -> Result<(), SessionError> {
        self.guard("finish a commit", &[ImportPhase::Committing])?;
        self.result = Some(result);
        self.phase = ImportPhase::Done;
        self.touch();
        Ok(())
    }

    /// Abandon the import and return to `Idle`.
    pub fn cancel(&mut self) -> Result<(), SessionError> {
        if !self.phase.is_cancellable() {
            return self.guard("cancel", &[]);
        }
        self.file = None;
        self.records.clear();
        self.summary = None;
        self.phase = ImportPhase::Idle;
        self.touch();
        Ok(())
    }
}

/// Failure of the combined [`ImportSession::preview`] step.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreviewError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Format(#[from] FormatError),
}
