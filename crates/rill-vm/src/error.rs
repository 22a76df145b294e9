//! Errors that abort evaluation.
//!
//! Runtime failures are not diagnostics: they carry no source location and
//! surface only when a clean program misbehaves on concrete inputs.

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuntimeError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("index {index} is out of bounds for length {len}")]
    IndexOutOfBounds { index: i64, len: usize },

    #[error("'{0}' cannot be converted to a number")]
    InvalidNumber(String),

    #[error("a single-character string is required")]
    ExpectedSingleCharacter,

    #[error("random bound must be positive, got {0}")]
    InvalidRandomBound(i64),

    #[error("i/o error: {0}")]
    Io(String),
}

impl From<std::io::Error> for RuntimeError {
    fn from(error: std::io::Error) -> Self {
        RuntimeError::Io(error.to_string())
    }
}
