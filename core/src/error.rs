use thiserror::Error;

// Everything a generator can reject. All of these are raised before the
// first random draw, so a failed call never leaves a partial grid behind.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NlmError {
    #[error("Invalid dimensions: {rows} rows x {cols} cols ({reason})")]
    InvalidDimension {
        rows: usize,
        cols: usize,
        reason: &'static str,
    },

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("Length mismatch: {name} has {got} entries, expected {expected}")]
    ConfigMismatch {
        name: &'static str,
        got: usize,
        expected: String,
    },

    #[error("Cell ({col}, {row}) out of range for a {cols}x{rows} grid")]
    OutOfRange {
        col: usize,
        row: usize,
        cols: usize,
        rows: usize,
    },
}

impl NlmError {
    pub(crate) fn invalid_parameter(
        name: &'static str,
        value: impl ToString,
        reason: &'static str,
    ) -> Self {
        NlmError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}

// Result alias used across the crate
pub type Result<T> = std::result::Result<T, NlmError>;
