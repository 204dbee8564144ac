//! Domain-level errors.

/// Errors raised by pure domain logic.
///
/// `Validation` messages are display-ready; the sync layer surfaces them
/// to the user verbatim.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    /// Form input that cannot be coerced to a wire value.
    #[error("{0}")]
    Validation(String),
}
