//! Error types for the variant codec.

/// Errors produced while parsing type signatures or GVariant text.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VariantError {
    #[error("unsupported type signature '{0}'")]
    UnsupportedSignature(String),

    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("unexpected '{found}' at offset {offset}, expected {expected}")]
    Unexpected {
        expected: &'static str,
        found: char,
        offset: usize,
    },

    #[error("invalid escape sequence at offset {0}")]
    InvalidEscape(usize),

    #[error("invalid boolean '{0}'")]
    InvalidBoolean(String),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("trailing input at offset {0}")]
    TrailingInput(usize),
}
