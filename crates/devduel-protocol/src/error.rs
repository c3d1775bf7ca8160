//! Error types for the protocol layer.

/// Errors from parsing score fractions.
#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    /// The string is not a well-formed `"solved/total"` fraction:
    /// missing slash, non-numeric parts, a zero denominator, or
    /// `solved > total`.
    #[error("malformed score: {0:?}")]
    Malformed(String),
}
