//! Decode error types.

/// A line started with a recognized keyword but its payload is malformed.
///
/// Every variant carries the normalized line that failed to decode.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// `id` line that is neither `id name ...` nor `id author ...`.
    #[error("Malformed id line: {line}")]
    MalformedId { line: String },

    /// `bestmove` line whose move does not match the move grammar.
    #[error("Malformed bestmove line: {line}")]
    MalformedBestMove { line: String },

    /// `option` line without the ` type ` marker.
    #[error("Option line has no type: {line}")]
    MissingOptionType { line: String },

    /// `option` line with an unknown type or a malformed type-specific tail.
    #[error("Malformed option line ({reason}): {line}")]
    MalformedOption { line: String, reason: String },

    /// A recognized keyword was the last token on the line.
    #[error("Missing value for '{key}': {line}")]
    MissingValue { key: String, line: String },

    /// A recognized keyword was followed by a non-numeric value.
    #[error("Invalid number '{value}' for '{key}': {line}")]
    InvalidNumber {
        key: String,
        value: String,
        line: String,
    },
}

impl DecodeError {
    /// The normalized line that failed to decode.
    #[must_use]
    pub fn line(&self) -> &str {
        match self {
            Self::MalformedId { line }
            | Self::MalformedBestMove { line }
            | Self::MissingOptionType { line }
            | Self::MalformedOption { line, .. }
            | Self::MissingValue { line, .. }
            | Self::InvalidNumber { line, .. } => line,
        }
    }
}
