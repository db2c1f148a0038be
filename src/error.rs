//! Models the ways a patch run can fail.

use std::io;

use thiserror::Error;

/// Convenient alias for crate-wide results.
pub type Result<T> = std::result::Result<T, PatchError>;

/// The ways a patch run can fail.
///
/// A run that completes with zero changes is not a failure; it is reported
/// through the change count of [`PatchReport`](crate::PatchReport) so the
/// caller can surface it as a warning.
#[derive(Debug, Error)]
pub enum PatchError {
    /// The input could not be opened or read.
    #[error("could not read {input}: {source}")]
    ReadInput {
        /// The endpoint that failed, as shown to the operator.
        input: String,
        /// The underlying I/O failure.
        source: io::Error,
    },

    /// The output could not be created or written.
    #[error("could not write {output}: {source}")]
    WriteOutput {
        /// The endpoint that failed, as shown to the operator.
        output: String,
        /// The underlying I/O failure.
        source: io::Error,
    },

    /// A rule whose pattern and replacement differ in length.
    ///
    /// Detected at rule construction, before any output exists.
    #[error(
        "rule pattern `{}` ({} bytes) and replacement `{}` ({} bytes) differ in length",
        .pattern.escape_ascii(),
        .pattern.len(),
        .replacement.escape_ascii(),
        .replacement.len()
    )]
    RuleLengthMismatch {
        /// The pattern of the offending rule.
        pattern: Vec<u8>,
        /// The replacement of the offending rule.
        replacement: Vec<u8>,
    },

    /// A rule whose pattern is empty.
    ///
    /// An empty pattern matches at every position, so it is rejected at
    /// construction.
    #[error("rule patterns must not be empty")]
    EmptyRulePattern,

    /// A command line rule specification without a separator.
    #[error("rule `{spec}` is missing a `=` separator (expected `PATTERN=REPLACEMENT`)")]
    InvalidRuleSpec {
        /// The specification as given on the command line.
        spec: String,
    },

    /// A context marker without any bytes.
    #[error("the context marker must not be empty")]
    EmptyMarker,
}
