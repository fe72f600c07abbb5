//! Validation, sanitisation and partial-update building for intake
//! submissions.
//!
//! Everything in here is synchronous and free of I/O: the HTTP layer hands
//! in raw JSON objects, and gets back either normalized values or an
//! [`UpdateStatement`] for the storage layer to execute.

pub mod email;
pub mod sanitize;
pub mod update;
pub mod validate;

pub use update::{build_update, BoundValue, PlaceholderStyle, UpdateStatement};
pub use validate::{validate_submission, NewSubmission};

/// Failures produced by the intake core. Both are recoverable and meant to be
/// shown to the caller as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    #[error("Validation failed: {}", .0.join("; "))]
    ValidationFailed(Vec<String>),

    #[error("No fields to update")]
    NoFieldsProvided,
}
