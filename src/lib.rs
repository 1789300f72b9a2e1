//! # honk-prover: sum-check and ZeroMorph proving core
//!
//! Proves that a trace of named columns satisfies a set of polynomial
//! relations on every row, over BLS12-381.
//!
//! ## Structure
//!
//! - `field`: Scalar field and curve re-exports
//! - `trace`: Column schema and trace storage
//! - `relations`: Relation trait, column binding, permutation and lookup arguments
//! - `polynomial`: Multilinear tables, round univariates, the pow polynomial
//! - `transcript`: Labelled Fiat-Shamir transcript and proof bytes
//! - `commitment`: Commitment key trait and the KZG instantiation
//! - `sumcheck`: Relation sum-check over the boolean hypercube
//! - `zeromorph`: Multilinear opening through univariate commitments
//! - `prover`: Proving/verification keys and the round state machine
//!
//! ## Flow
//!
//! ```ignore
//! let relations = RelationSet::new().with_relation(MyGate);
//! let ck = Srs::unsafe_setup(1 << 10, &mut rng)?.commitment_key();
//! let mut prover = Prover::new(ProvingKey::new(trace), &relations, &ck, ProverConfig::default())?;
//! let proof = prover.construct_proof()?;
//! ```

pub mod commitment;
pub mod field;
pub mod polynomial;
pub mod prover;
pub mod relations;
pub mod sumcheck;
pub mod trace;
pub mod transcript;
pub mod zeromorph;

pub mod errors;
pub mod utils;

// Re-exports
pub use commitment::{CommitmentKey, KzgCommitmentKey, KzgVerifierKey, Srs};
pub use errors::{CommitmentError, ConfigError, ProverError, Result, TranscriptError};
pub use prover::{Prover, ProverConfig, ProverState, ProvingKey, VerificationKey};
pub use relations::{
    ColumnRef, LookupArgument, PermutationArgument, Relation, RelationParameters, RelationSchema, RelationSet,
    RelationView, SubrelationSpec,
};
pub use trace::{Boundary, ColumnKind, ColumnSpec, Trace, TraceSchema};
pub use transcript::{Manifest, Proof, ProverTranscript, VerifierTranscript};
