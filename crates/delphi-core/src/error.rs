use thiserror::Error;

/// Engine-wide error types for the Delphi consensus core.
///
/// Every error is terminal for the invocation that raised it: the engine
/// is a pure computation with no retries and no partial results.
#[derive(Debug, Error)]
pub enum DelphiError {
    /// Malformed input: empty or ragged report matrix, bound or reputation
    /// arity mismatch, or an event bound with max <= min.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A supplied reputation vector with non-positive total mass, which
    /// makes every weighted aggregate undefined.
    #[error("Degenerate reputation: {0}")]
    DegenerateReputation(String),

    /// An event column with zero observed reports cannot be imputed and
    /// would propagate NaN through the covariance step.
    #[error("Insufficient observations: {0}")]
    InsufficientObservations(String),
}
