//! Sum-check reduction of the batched relation claim
//!
//! Proves Σ_x pow_ζ(x)·Σ_i α^i R_i(x) + Σ_x Σ_j α^j D_j(x) = 0 over the
//! hypercube of trace rows, where R_i are the linearly independent
//! subrelations and D_j the linearly dependent ones. Each round binds the
//! lowest remaining variable; after d rounds the claim is reduced to the
//! evaluations of every entity at the challenge point u.

mod prover;
mod round;

pub use prover::SumcheckProver;
pub use round::RelationBatch;

use ark_ff::Field;

use crate::polynomial::Univariate;
use crate::relations::ColumnRegistry;

/// Entity evaluations at the sum-check challenge, split the way the opening
/// argument consumes them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimedEvaluations<F: Field> {
    pub unshifted: Vec<F>,
    /// In the order of `ColumnRegistry::shifted_bases`
    pub shifted: Vec<F>,
}

impl<F: Field> ClaimedEvaluations<F> {
    pub fn from_entities(mut evaluations: Vec<F>, num_unshifted: usize) -> Self {
        let shifted = evaluations.split_off(num_unshifted);
        Self { unshifted: evaluations, shifted }
    }

    /// All evaluations in entity order
    pub fn all(&self) -> Vec<F> {
        self.unshifted.iter().chain(&self.shifted).copied().collect()
    }

    /// Evaluation of a named entity (`x` or `x_shift`)
    pub fn get(&self, registry: &ColumnRegistry, name: &str) -> Option<F> {
        let idx = registry.names().iter().position(|n| n == name)?;
        self.unshifted.get(idx).or_else(|| self.shifted.get(idx - self.unshifted.len())).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SumcheckOutput<F: Field> {
    /// u_0, ..., u_{d-1}
    pub challenge: Vec<F>,
    pub claimed_evaluations: ClaimedEvaluations<F>,
    pub round_univariates: Vec<Univariate<F>>,
}

/// Transcript label of the round-k univariate
pub fn univariate_label(round: usize) -> String {
    format!("Sumcheck:univariate_{}", round)
}

/// Transcript label of the round-k challenge
pub fn challenge_label(round: usize) -> String {
    format!("Sumcheck:u_{}", round)
}

pub const EVALUATIONS_LABEL: &str = "Sumcheck:evaluations";
