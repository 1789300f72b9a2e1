//! Error types for the proving core
//!
//! Every failure aborts the proving run. The enums only classify *why*, so a
//! caller can decide whether to retry the whole run from scratch.

use thiserror::Error;

/// Structural mismatch between relation definitions, trace schema and key
/// material. Raised at construction time, never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("relation `{relation}` reads column `{column}` which is not in the trace schema")]
    MissingColumn { relation: String, column: String },

    #[error("column `{0}` is declared more than once")]
    DuplicateColumn(String),

    #[error("circuit size {0} is not a non-zero power of two")]
    CircuitSizeNotPowerOfTwo(usize),

    #[error("circuit size {circuit_size} needs at least one variable")]
    CircuitTooSmall { circuit_size: usize },

    #[error("column `{column}` has {actual} rows, expected {expected}")]
    ColumnLength { column: String, expected: usize, actual: usize },

    #[error("circuit size {circuit_size} exceeds commitment key capacity {capacity}")]
    CommitmentKeyTooSmall { circuit_size: usize, capacity: usize },

    #[error("column `{0}` is read shifted but does not start with zero")]
    ShiftedColumnNonZeroStart(String),

    #[error("argument `{argument}`: {reason}")]
    MalformedArgument { argument: String, reason: String },

    #[error("column `{0}` is derived by the prover and cannot be assigned directly")]
    DerivedColumnAssigned(String),

    #[error("derived column `{0}` is not produced by any lookup or permutation argument")]
    UnownedDerivedColumn(String),

    #[error("failed to build the prover thread pool: {0}")]
    ThreadPool(String),
}

/// Fiat-Shamir misuse and proof-log decoding failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranscriptError {
    #[error("challenge `{0}` requested before any message was sent in its round")]
    UnboundChallenge(String),

    #[error("transcript already exported, `{0}` rejected")]
    Exported(String),

    #[error("failed to serialize `{0}`")]
    Serialization(String),

    #[error("proof data ended or was malformed while reading `{0}`")]
    MalformedProof(String),

    #[error("{0} unread bytes left in proof data")]
    TrailingBytes(usize),
}

/// Commitment key failures (capacity, malformed input)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommitmentError {
    #[error("polynomial of size {size} exceeds commitment key capacity {capacity}")]
    PolynomialTooLarge { size: usize, capacity: usize },

    #[error("structured reference string must contain at least one point")]
    EmptySrs,
}

/// Top-level error of a proving run
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProverError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("transcript error: {0}")]
    Transcript(#[from] TranscriptError),

    #[error("commitment error: {0}")]
    Commitment(#[from] CommitmentError),

    #[error("round `{requested}` cannot run in state {state}")]
    OutOfOrder { requested: &'static str, state: &'static str },

    #[error("zero denominator at row {row} while computing `{column}`")]
    NonInvertible { column: String, row: usize },
}

pub type Result<T> = std::result::Result<T, ProverError>;
