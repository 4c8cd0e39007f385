// ⛔ Error taxonomy for a seed run
//
// Everything here aborts the whole run. Unresolved registry references are
// NOT errors: they degrade to synthetic codes and land in the run report.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("input file '{}' not found", .0.display())]
    InputNotFound(PathBuf),

    /// Header has neither ward nor constituency/MP markers
    #[error("could not detect file type from columns {columns:?}; expected a 'constituency', 'mp' or 'ward' column")]
    UnknownFileType { columns: Vec<String> },

    #[error("required column '{column}' missing from {shape} input (accepted names: {candidates})")]
    MissingColumn {
        shape: &'static str,
        column: &'static str,
        candidates: String,
    },

    #[error("line {line}: required field '{field}' is empty")]
    MissingValue { line: u64, field: &'static str },

    #[error("line {line}: field '{field}' must be a whole number, got '{value}'")]
    InvalidNumber {
        line: u64,
        field: &'static str,
        value: String,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("malformed CSV input: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SeedResult<T> = std::result::Result<T, SeedError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offending_input() {
        let err = SeedError::MissingValue { line: 7, field: "ward code" };
        assert_eq!(err.to_string(), "line 7: required field 'ward code' is empty");

        let err = SeedError::InputNotFound(PathBuf::from("wards.csv"));
        assert!(err.to_string().contains("wards.csv"));
    }
}
