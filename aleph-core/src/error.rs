//! Error types for aleph-core.

use thiserror::Error;

/// Why a result row was rejected at the boundary.
///
/// Rows carrying one of these are skipped and counted; they never abort a
/// batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    /// A binding the row must carry is absent or has no value.
    #[error("row {row}: missing field `{field}`")]
    MissingField {
        /// Position of the row in its result set.
        row: usize,
        /// Variable (or `var.type`) that was missing.
        field: String,
    },

    /// The term type tag is not one the builder understands.
    #[error("row {row}: unsupported term type `{kind}` for `{field}`")]
    UnsupportedTermType {
        row: usize,
        field: String,
        kind: String,
    },

    /// A start time that does not parse as RFC 3339.
    #[error("row {row}: invalid timestamp `{value}` for `{field}`")]
    InvalidTimestamp {
        row: usize,
        field: String,
        value: String,
    },
}

/// Errors raised by the playback controller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("state index {index} out of range (timeline has {len} states)")]
    OutOfRange { index: usize, len: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RowError::MissingField {
            row: 3,
            field: "o.type".to_string(),
        };
        assert_eq!(err.to_string(), "row 3: missing field `o.type`");

        let err = PlaybackError::OutOfRange { index: 9, len: 4 };
        assert!(err.to_string().contains('9'));
        assert!(err.to_string().contains('4'));
    }
}
