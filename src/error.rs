//! Error types for the sounding-network crate.
use crate::network::Ref;
use thiserror::Error;

/// Error type for the crate.
#[derive(Clone, PartialEq, Debug, Error)]
pub enum AnalysisError {
    /// A cell was constructed without any inputs.
    #[error("Cell '{cell}' requires at least one input.")]
    NoInputs {
        /// Name of the offending cell.
        cell: String,
    },
    /// A reference does not belong to the network.
    #[error("Unknown reference {0}.")]
    UnknownReference(Ref),
    /// A cell was wired to consume its own output.
    #[error("Cell '{cell}' consumes its own output.")]
    SelfReference {
        /// Name of the offending cell.
        cell: String,
    },
    /// A slot already has a cell producing its value.
    #[error("{0} is already produced by a cell.")]
    AlreadyProduced(Ref),
    /// Adding a cell would have created a dependency cycle.
    #[error("Adding '{cell}' creates a cycle: {child} depends on {ancestor}, which depends on '{cell}'.")]
    CycleDetected {
        /// The input of the new cell through which the cycle closes.
        ancestor: Ref,
        /// The slot whose input wiring leads back to the new cell.
        child: Ref,
        /// Name of the cell being added.
        cell: String,
    },
    /// A value does not have the physical kind or shape a consumer expects.
    #[error("Domain mismatch, expected {expected} but found {found}.")]
    DomainMismatch {
        /// Description of what was expected.
        expected: String,
        /// Description of what was supplied.
        found: String,
    },
    /// An index was outside of the valid range.
    #[error("Index {index} out of range for length {len}.")]
    IndexOutOfRange {
        /// The requested index.
        index: i64,
        /// The number of valid positions.
        len: usize,
    },
    /// Only externally supplied sources may be set.
    #[error("{0} is computed by a cell and cannot be set.")]
    NotASource(Ref),
    /// Bad or invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(&'static str),
    /// Not enough data available for analysis.
    #[error("Not enough data available for analysis.")]
    NotEnoughData,
    /// The network's edge set could not be ordered.
    #[error("The network could not be sorted topologically.")]
    Unorderable,
}

/// Shorthand for results.
pub type Result<T> = std::result::Result<T, AnalysisError>;

impl AnalysisError {
    pub(crate) fn mismatch<E, F>(expected: E, found: F) -> Self
    where
        E: std::fmt::Display,
        F: std::fmt::Display,
    {
        AnalysisError::DomainMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}
