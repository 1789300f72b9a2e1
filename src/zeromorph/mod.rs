//! ZeroMorph: opening multilinear claims with univariate commitments
//!
//! A multilinear table f of size N = 2^n is committed as the univariate
//! U(f)(X) = Σ_l f[l]·X^l. A claim f(u) = v is equivalent to quotients q_k
//! (in the first k variables) with
//!   f - v = Σ_k (X_k - u_k)·q_k(X_0, ..., X_{k-1}),
//! which under U becomes the univariate identity
//!   U(f) - v·Φ_n(X) = Σ_k (X^{2^k}·Φ_{n-k-1}(X^{2^{k+1}}) - u_k·Φ_{n-k}(X^{2^k}))·U(q_k)
//! with Φ_m(X) = Σ_{i<2^m} X^i. The prover commits to the q_k, proves their
//! degree bounds through one lifted quotient q̂ and checks the identity at a
//! random x with a single KZG-style opening of ζ_x + z·Z_x at x to 0.
//!
//! Columns read at the next row are opened through their bases: when g[0]
//! is zero, U(shift(g)) = U(g)/X, so x·Z_x only needs U(g) itself.

use ark_ff::{Field, Zero};
use rayon::prelude::*;

use crate::commitment::CommitmentKey;
use crate::errors::ProverError;
use crate::field::Fr;
use crate::polynomial::multilinear::{last_row_indicator, PARALLEL_THRESHOLD};
use crate::polynomial::UnivariatePolynomial;
use crate::sumcheck::ClaimedEvaluations;
use crate::transcript::ProverTranscript;
use crate::utils::batching::{batch_polynomials_into, batch_values, powers_of_alpha};

pub const RHO_LABEL: &str = "rho";
pub const Y_LABEL: &str = "ZM:y";
pub const BATCHED_QUOTIENT_LABEL: &str = "ZM:C_q";
pub const X_LABEL: &str = "ZM:x";
pub const Z_LABEL: &str = "ZM:z";
pub const PROOF_LABEL: &str = "ZM:PI";

pub fn quotient_label(k: usize) -> String {
    format!("ZM:C_q_{}", k)
}

/// Φ_m(x) = (x^{2^m} - 1)/(x - 1)
pub fn phi<F: Field>(x: F, m: usize) -> F {
    let mut power = x;
    for _ in 0..m {
        power.square_in_place();
    }
    match (x - F::one()).inverse() {
        Some(inv) => (power - F::one()) * inv,
        None => F::from(1u64 << m),
    }
}

/// Scalar of U(q_k) in the identity, evaluated at x:
///   x^{2^k}·Φ_{n-k-1}(x^{2^{k+1}}) - u_k·Φ_{n-k}(x^{2^k})
pub fn quotient_scalars<F: Field>(x: F, u: &[F]) -> Vec<F> {
    let n = u.len();
    let mut x_power = x; // x^{2^k}
    let mut scalars = Vec::with_capacity(n);
    for (k, u_k) in u.iter().enumerate() {
        let next = x_power.square();
        scalars.push(x_power * phi(next, n - k - 1) - *u_k * phi(x_power, n - k));
        x_power = next;
    }
    scalars
}

/// y^k·x^{N-2^k}, the factor that moves q_k to the top of the lifted quotient
pub fn lift_scalars<F: Field>(x: F, y: F, num_vars: usize) -> Vec<F> {
    let size = 1u64 << num_vars;
    let y_powers = powers_of_alpha(&y, num_vars);
    (0..num_vars)
        .map(|k| y_powers[k] * x.pow([size - (1u64 << k)]))
        .collect()
}

/// Quotients q_0..q_{n-1} (q_k has 2^k entries) and the evaluation f(u)
pub fn multilinear_quotients<F: Field>(poly: &[F], u: &[F]) -> (Vec<Vec<F>>, F) {
    assert_eq!(poly.len(), 1 << u.len(), "table size must be 2^n");
    let mut quotients = vec![Vec::new(); u.len()];
    let mut current = poly.to_vec();

    for k in (0..u.len()).rev() {
        let half = 1 << k;
        let (lo, hi) = current.split_at(half);
        let quotient: Vec<F> = if half >= PARALLEL_THRESHOLD {
            lo.par_iter().zip(hi).map(|(l, h)| *h - l).collect()
        } else {
            lo.iter().zip(hi).map(|(l, h)| *h - l).collect()
        };
        let next: Vec<F> = lo.iter().zip(&quotient).map(|(l, q)| *l + u[k] * q).collect();
        quotients[k] = quotient;
        current = next;
    }
    (quotients, current[0])
}

/// Everything the opening round needs about the sum-check claims
pub struct OpeningClaims<'a> {
    pub unshifted: Vec<&'a [Fr]>,
    /// Bases of the shifted entities, each starting with zero
    pub to_be_shifted: Vec<&'a [Fr]>,
    /// Last-row value of each shifted entity
    pub boundaries: Vec<Fr>,
    pub evaluations: &'a ClaimedEvaluations<Fr>,
    pub challenge: &'a [Fr],
}

impl<'a> OpeningClaims<'a> {
    /// ρ-batched evaluation, with each shifted claim reduced to its
    /// zero-boundary part
    pub fn batched_evaluation(&self, rho_powers: &[Fr]) -> Fr {
        let m = self.unshifted.len();
        let indicator = last_row_indicator(self.challenge);
        let shifted: Vec<Fr> = self
            .evaluations
            .shifted
            .iter()
            .zip(&self.boundaries)
            .map(|(w, b)| *w - *b * indicator)
            .collect();
        batch_values(&self.evaluations.unshifted, &rho_powers[..m]) + batch_values(&shifted, &rho_powers[m..])
    }
}

pub struct ZeroMorphProver<'k, CK: CommitmentKey<Fr>> {
    ck: &'k CK,
}

impl<'k, CK: CommitmentKey<Fr>> ZeroMorphProver<'k, CK> {
    pub fn new(ck: &'k CK) -> Self {
        Self { ck }
    }

    #[tracing::instrument(skip_all, name = "ZeroMorphProver::prove", fields(num_vars = claims.challenge.len()))]
    pub fn prove(&self, transcript: &mut ProverTranscript, claims: &OpeningClaims<'_>) -> Result<(), ProverError> {
        let n = claims.challenge.len();
        let size = 1usize << n;
        let m = claims.unshifted.len();
        assert!(
            claims.to_be_shifted.iter().all(|g| g[0].is_zero()),
            "a column opened through its shift must start with zero"
        );

        let rho = transcript.get_challenge(RHO_LABEL)?;
        let rho_powers = powers_of_alpha(&rho, m + claims.to_be_shifted.len());

        let mut f_batched = vec![Fr::zero(); size];
        batch_polynomials_into(&mut f_batched, &claims.unshifted, &rho_powers[..m]);
        let mut g_batched = vec![Fr::zero(); size];
        batch_polynomials_into(&mut g_batched, &claims.to_be_shifted, &rho_powers[m..]);
        let batched_evaluation = claims.batched_evaluation(&rho_powers);

        // multilinear table of f + shift(g)
        let mut combined = f_batched.clone();
        for (c, g) in combined.iter_mut().zip(g_batched.iter().skip(1)) {
            *c += g;
        }
        let (quotients, evaluation) = multilinear_quotients(&combined, claims.challenge);
        assert_eq!(evaluation, batched_evaluation, "batched evaluation claim does not match the opened polynomials");

        for (k, quotient) in quotients.iter().enumerate() {
            let commitment = self.ck.commit(quotient)?;
            transcript.send_to_verifier(&quotient_label(k), &commitment)?;
        }
        let y = transcript.get_challenge(Y_LABEL)?;

        // q̂ = Σ y^k·X^{N-2^k}·q_k
        let y_powers = powers_of_alpha(&y, n);
        let mut batched_quotient = UnivariatePolynomial::zero(size);
        for (k, quotient) in quotients.iter().enumerate() {
            batched_quotient.add_scaled_at(quotient, y_powers[k], size - (1 << k));
        }
        transcript.send_to_verifier(BATCHED_QUOTIENT_LABEL, &self.ck.commit(&batched_quotient.coeffs)?)?;

        let [x, z] = transcript.get_challenges([X_LABEL, Z_LABEL])?;

        // ζ_x = q̂ - Σ y^k·x^{N-2^k}·q_k
        let mut zeta_x = batched_quotient;
        for (quotient, scalar) in quotients.iter().zip(lift_scalars(x, y, n)) {
            zeta_x.add_scaled(quotient, -scalar);
        }

        // Z_x = x·f + g - v·x·Φ_n(x) - x·Σ_k scalar_k·q_k
        let mut z_x = UnivariatePolynomial::new(g_batched);
        z_x.add_scaled(&f_batched, x);
        z_x.coeffs[0] -= batched_evaluation * x * phi(x, n);
        for (quotient, scalar) in quotients.iter().zip(quotient_scalars(x, claims.challenge)) {
            z_x.add_scaled(quotient, -(x * scalar));
        }

        let mut combined_identity = zeta_x;
        combined_identity.add_scaled(&z_x.coeffs, z);
        let proof = self.ck.open(&combined_identity.coeffs, x, Fr::zero())?;
        transcript.send_to_verifier(PROOF_LABEL, &proof)?;
        Ok(())
    }
}
