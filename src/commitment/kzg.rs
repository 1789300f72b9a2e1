//! KZG commitments over BLS12-381
//!
//! The key holds [τ^i]_1 for i < capacity; a commitment is the MSM of the
//! coefficients with those powers. An opening of p at x to v is the
//! commitment to the quotient π(X) = (p(X) - v)/(X - x), checked with
//!   e(C - v·[1]_1 + x·π, [1]_2) == e(π, [τ]_2).

use std::sync::Arc;

use ark_ec::pairing::Pairing;
use ark_ec::{AffineRepr, CurveGroup, PrimeGroup, VariableBaseMSM};
use ark_ff::{Field, UniformRand};
use rand::RngCore;
use rayon::prelude::*;

use super::CommitmentKey;
use crate::errors::CommitmentError;
use crate::field::{Bls12_381, Fr, G1Affine, G1Projective, G2Affine, G2Projective};
use crate::polynomial::UnivariatePolynomial;

/// Structured reference string: G1 powers of τ plus [1]_2 and [τ]_2
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Srs {
    g1_powers: Vec<G1Affine>,
    g2_generator: G2Affine,
    g2_tau: G2Affine,
}

impl Srs {
    pub fn new(g1_powers: Vec<G1Affine>, g2_generator: G2Affine, g2_tau: G2Affine) -> Result<Self, CommitmentError> {
        if g1_powers.is_empty() {
            return Err(CommitmentError::EmptySrs);
        }
        Ok(Self { g1_powers, g2_generator, g2_tau })
    }

    /// Sample τ locally and derive `size` powers from it
    ///
    /// τ is known to whoever runs this, so the result is only fit for tests
    /// and benchmarks.
    #[tracing::instrument(skip_all, name = "Srs::unsafe_setup", fields(size = size))]
    pub fn unsafe_setup<R: RngCore>(size: usize, rng: &mut R) -> Result<Self, CommitmentError> {
        let tau = Fr::rand(rng);
        let mut scalars = Vec::with_capacity(size);
        let mut power = Fr::ONE;
        for _ in 0..size {
            scalars.push(power);
            power *= tau;
        }

        let g1 = G1Projective::generator();
        let powers: Vec<G1Projective> = scalars.par_iter().map(|s| g1 * s).collect();
        let g2 = G2Projective::generator();
        Self::new(G1Projective::normalize_batch(&powers), g2.into_affine(), (g2 * tau).into_affine())
    }

    pub fn len(&self) -> usize {
        self.g1_powers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.g1_powers.is_empty()
    }

    pub fn commitment_key(&self) -> KzgCommitmentKey {
        KzgCommitmentKey { powers: Arc::new(self.g1_powers.clone()) }
    }

    pub fn verifier_key(&self) -> KzgVerifierKey {
        KzgVerifierKey {
            g1_generator: self.g1_powers[0],
            g2_generator: self.g2_generator,
            g2_tau: self.g2_tau,
        }
    }
}

#[derive(Debug, Clone)]
pub struct KzgCommitmentKey {
    powers: Arc<Vec<G1Affine>>,
}

impl KzgCommitmentKey {
    fn check_size(&self, size: usize) -> Result<(), CommitmentError> {
        if size > self.powers.len() {
            return Err(CommitmentError::PolynomialTooLarge { size, capacity: self.powers.len() });
        }
        Ok(())
    }
}

impl CommitmentKey<Fr> for KzgCommitmentKey {
    type Commitment = G1Affine;
    type OpeningProof = G1Affine;

    fn max_size(&self) -> usize {
        self.powers.len()
    }

    #[tracing::instrument(skip_all, name = "KzgCommitmentKey::commit", fields(len = coeffs.len()))]
    fn commit(&self, coeffs: &[Fr]) -> Result<G1Affine, CommitmentError> {
        self.check_size(coeffs.len())?;
        Ok(G1Projective::msm_unchecked(&self.powers[..coeffs.len()], coeffs).into_affine())
    }

    #[tracing::instrument(skip_all, name = "KzgCommitmentKey::open", fields(len = coeffs.len()))]
    fn open(&self, coeffs: &[Fr], point: Fr, value: Fr) -> Result<G1Affine, CommitmentError> {
        self.check_size(coeffs.len())?;
        let poly = UnivariatePolynomial::new(coeffs.to_vec());
        if poly.evaluate(point) != value {
            tracing::warn!("opening claim does not match the polynomial; the proof will not verify");
        }
        let quotient = poly.factor_root(point);
        self.commit(&quotient.coeffs)
    }
}

/// Group elements the pairing check needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KzgVerifierKey {
    pub g1_generator: G1Affine,
    pub g2_generator: G2Affine,
    pub g2_tau: G2Affine,
}

impl KzgVerifierKey {
    /// e(C - v·[1]_1 + x·π, [1]_2) == e(π, [τ]_2)
    pub fn verify(&self, commitment: &G1Affine, point: Fr, value: Fr, proof: &G1Affine) -> bool {
        let lhs = commitment.into_group() - self.g1_generator * value + *proof * point;
        Bls12_381::pairing(lhs, self.g2_generator) == Bls12_381::pairing(*proof, self.g2_tau)
    }

    /// Pairing check for an opening already folded into one G1 element P:
    /// e(P, [1]_2) == e(π, [τ]_2)
    pub fn verify_folded(&self, folded: &G1Projective, proof: &G1Affine) -> bool {
        Bls12_381::pairing(*folded, self.g2_generator) == Bls12_381::pairing(*proof, self.g2_tau)
    }
}
