//! Commitment key contract
//!
//! The prover only needs two operations from its commitment scheme: commit
//! to a univariate polynomial in coefficient form, and commit to the
//! quotient that opens a polynomial at a point. Both are homomorphic
//! commitments, which the ZeroMorph verifier relies on to combine them.
//!
//! `KzgCommitmentKey` implements the contract over BLS12-381 G1.

pub mod kzg;

use ark_ff::Field;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use core::fmt::Debug;

use crate::errors::CommitmentError;

pub use kzg::{KzgCommitmentKey, KzgVerifierKey, Srs};

pub trait CommitmentKey<F: Field>: Send + Sync {
    type Commitment: Clone
        + Debug
        + PartialEq
        + Eq
        + Send
        + Sync
        + CanonicalSerialize
        + CanonicalDeserialize;

    type OpeningProof: Clone
        + Debug
        + PartialEq
        + Eq
        + Send
        + Sync
        + CanonicalSerialize
        + CanonicalDeserialize;

    /// Largest number of coefficients the key can commit to
    fn max_size(&self) -> usize;

    /// Commit to Σ coeffs[i]·X^i
    fn commit(&self, coeffs: &[F]) -> Result<Self::Commitment, CommitmentError>;

    /// Prove that the committed polynomial takes `value` at `point`
    fn open(&self, coeffs: &[F], point: F, value: F) -> Result<Self::OpeningProof, CommitmentError>;
}
