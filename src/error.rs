//! Error types for identifier generation.

use thiserror::Error;

/// A result type using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Two inclusions resolved to the same identifier and re-advancing did not help.
    #[error(
        "identifier `{identifier}` is already defined in this unit \
         (gave up after {attempts} extraction attempts)"
    )]
    DefinitionConflict { identifier: String, attempts: u32 },

    /// The cutoff does not equal `2^bit_width`.
    #[error("cutoff {cutoff} does not match bit width {bit_width} (expected 2^{bit_width})")]
    ConfigurationMisuse { bit_width: u32, cutoff: u64 },

    #[error("bit width {0} is out of range (expected 1..=63)")]
    InvalidBitWidth(u32),

    #[error("{kind} `{name}` is not a valid Rust identifier")]
    InvalidName { kind: &'static str, name: String },

    /// The once-only guard saw a second definition of the continuation points.
    #[error("continuation entry points are already defined")]
    ContinuationRedefined,

    /// Continuation points were requested before the counter crossed the cutoff.
    #[error("continuation entry points are not defined yet")]
    ContinuationMissing,

    #[error("configuration cannot change after the first inclusion")]
    LateConfiguration,
}
