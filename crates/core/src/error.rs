#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Format(#[from] FormatError),
}

/// The uploaded file could not be turned into header-labeled rows.
///
/// Always fatal to the whole import attempt: no partial preview is produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("Unsupported file type '{extension}'. Upload a .csv, .xlsx or .xls file")]
    UnsupportedFormat { extension: String },

    #[error("Could not read file: {0}")]
    Unreadable(String),

    #[error("Could not read file: it needs a header row and at least one data row")]
    NoDataRows,

    #[error("File has {found} data rows; at most {limit} can be imported at once")]
    TooManyRows { found: usize, limit: usize },
}

/// Failure reported by a target store writer for a single record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WriteError {
    /// The store refused this row (constraint violation, bad value).
    /// The commit records it and moves on to the next row.
    #[error("{0}")]
    Rejected(String),

    /// The store could not be reached. The commit stops issuing writes.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl WriteError {
    /// Human-readable reason recorded against the failed row.
    pub fn reason(&self) -> &str {
        match self {
            Self::Rejected(reason) | Self::Unavailable(reason) => reason,
        }
    }
}
