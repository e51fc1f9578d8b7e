//! Error types for the annotation pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal data errors. I/O failures travel as `anyhow` errors with path context.
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    /// An annotation line that cannot be turned into a full record.
    #[error(
        "length error in {path:?}, line {line_number}: {line:?}\nLength is {found} and should have been {expected}!"
    )]
    MalformedRecord {
        path: PathBuf,
        line_number: usize,
        line: String,
        found: usize,
        expected: usize,
    },

    /// A merged-table row that does not decode back into a record.
    #[error("malformed row {row} in merged table {path:?}: {reason}")]
    MalformedRow {
        path: PathBuf,
        row: usize,
        reason: String,
    },
}
