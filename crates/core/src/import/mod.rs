//! Tabular import pipeline.
//!
//! Data flows one way:
//!
//! ```text
//! UploadedFile -> decoder -> DecodedSheet -> validator -> Vec<ValidatedRecord>
//!                                                          |-> summary (preview, pure)
//!                                                          |-> commit  (one write per valid row)
//! ```
//!
//! [`session`] tracks a single upload/preview/commit conversation and
//! [`entities`] holds the fixed field contracts for each importable entity.

pub mod cell;
pub mod coerce;
pub mod commit;
pub mod decoder;
pub mod entities;
pub mod field_spec;
pub mod session;
pub mod summary;
pub mod validator;

pub use cell::CellValue;
pub use commit::{commit, ImportContext, ImportResult, RecordWriter, RowFailure};
pub use decoder::{decode, DecodedSheet, RawRow, SheetFormat, UploadedFile};
pub use entities::EntityKind;
pub use field_spec::{FieldKind, FieldSpec};
pub use session::{ImportPhase, ImportSession, PreviewError, SessionError};
pub use summary::{preview, validate_file, ImportSummary, PREVIEW_SAMPLE_SIZE};
pub use validator::{validate, FieldValue, RecordFields, ValidatedRecord};
