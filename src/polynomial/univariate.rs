//! Univariate polynomials
//!
//! Two forms:
//! - `Univariate`: values on the integer domain {0, 1, ..., n-1}; a sum-check
//!   round message of degree n-1 is sent this way
//! - `UnivariatePolynomial`: coefficients c0 + c1·X + ... ; a trace column
//!   read as a univariate polynomial by the ZeroMorph argument

use ark_ff::{batch_inversion, Field};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::vec::Vec;

/// Univariate polynomial given by its values at X = 0, 1, ..., n-1
#[derive(Debug, Clone, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct Univariate<F: Field> {
    pub evaluations: Vec<F>,
}

impl<F: Field> Univariate<F> {
    pub fn new(evaluations: Vec<F>) -> Self {
        assert!(!evaluations.is_empty(), "univariate needs at least one evaluation");
        Self { evaluations }
    }

    pub fn len(&self) -> usize {
        self.evaluations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.evaluations.is_empty()
    }

    /// Returns g(0) + g(1)
    pub fn sum_over_boolean(&self) -> F {
        match self.evaluations.as_slice() {
            [g0] => g0.double(),
            [g0, g1, ..] => *g0 + g1,
            [] => F::zero(),
        }
    }

    /// Lagrange evaluation at an arbitrary point
    ///
    /// g(u) = Σ_i y_i · N(u) / ((u - i) · d_i) with N(u) = Π_j (u - j) and
    /// d_i = Π_{j≠i} (i - j).
    pub fn evaluate(&self, u: F) -> F {
        let n = self.evaluations.len();
        let domain: Vec<F> = (0..n as u64).map(F::from).collect();
        if let Some(i) = domain.iter().position(|x| *x == u) {
            return self.evaluations[i];
        }

        let numerator = domain.iter().fold(F::one(), |acc, x| acc * (u - x));
        let mut denominators: Vec<F> = (0..n)
            .map(|i| {
                let d_i = (0..n)
                    .filter(|&j| j != i)
                    .fold(F::one(), |acc, j| acc * (domain[i] - domain[j]));
                d_i * (u - domain[i])
            })
            .collect();
        batch_inversion(&mut denominators);

        self.evaluations
            .iter()
            .zip(denominators)
            .map(|(y, inv)| *y * inv)
            .sum::<F>()
            * numerator
    }
}

/// Univariate polynomial in coefficient form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnivariatePolynomial<F: Field> {
    /// Coefficients [c0, c1, c2, ...] for c0 + c1*t + c2*t² + ...
    pub coeffs: Vec<F>,
}

impl<F: Field> UnivariatePolynomial<F> {
    pub fn new(coeffs: Vec<F>) -> Self {
        Self { coeffs }
    }

    pub fn zero(size: usize) -> Self {
        Self { coeffs: vec![F::zero(); size] }
    }

    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    pub fn evaluate(&self, t: F) -> F {
        // Horner's method
        self.coeffs.iter().rev().fold(F::zero(), |acc, c| acc * t + c)
    }

    /// `self += scalar · other`, growing `self` if `other` is longer
    pub fn add_scaled(&mut self, other: &[F], scalar: F) {
        if other.len() > self.coeffs.len() {
            self.coeffs.resize(other.len(), F::zero());
        }
        for (a, b) in self.coeffs.iter_mut().zip(other) {
            *a += scalar * b;
        }
    }

    /// Add `scalar · other · X^offset`
    pub fn add_scaled_at(&mut self, other: &[F], scalar: F, offset: usize) {
        let needed = offset + other.len();
        if needed > self.coeffs.len() {
            self.coeffs.resize(needed, F::zero());
        }
        for (a, b) in self.coeffs[offset..].iter_mut().zip(other) {
            *a += scalar * b;
        }
    }

    /// Quotient of (p(X) - p(r)) / (X - r) by synthetic division
    pub fn factor_root(&self, r: F) -> Self {
        if self.coeffs.len() <= 1 {
            return Self::zero(1);
        }
        let mut quotient = vec![F::zero(); self.coeffs.len() - 1];
        let mut carry = F::zero();
        for i in (1..self.coeffs.len()).rev() {
            carry = self.coeffs[i] + r * carry;
            quotient[i - 1] = carry;
        }
        Self::new(quotient)
    }
}
