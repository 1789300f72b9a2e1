//! Multilinear polynomial with dense representation over {0,1}^d
//!
//! Row `i` of a trace column is the evaluation at the Boolean point whose
//! k-th coordinate is bit k of `i`. Binding the lowest variable to `u` folds
//! the pair (2i, 2i+1) into one value, halving the table.

use ark_ff::Field;
use rayon::prelude::*;

/// Tables at least this long are folded with rayon
pub const PARALLEL_THRESHOLD: usize = 1 << 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultilinearPolynomial<F: Field> {
    pub evaluations: Vec<F>, // dense evaluations over Boolean hypercube
    pub num_vars: usize,     // d
}

impl<F: Field> MultilinearPolynomial<F> {
    /// Create from evaluations; len must be 2^d
    pub fn from_evaluations(evaluations: Vec<F>, num_vars: usize) -> Self {
        let expected = 1usize << num_vars;
        assert_eq!(evaluations.len(), expected, "evaluation length must be 2^d");
        Self { evaluations, num_vars }
    }

    pub fn len(&self) -> usize {
        self.evaluations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.evaluations.is_empty()
    }

    /// Bind the lowest remaining variable to `u`
    ///
    /// p'(x_1..x_{d-1}) = p(u, x_1..x_{d-1}) = p[2i] + u·(p[2i+1] - p[2i])
    pub fn fold(&mut self, u: F) {
        assert!(self.num_vars > 0, "cannot fold a constant");
        let half = self.evaluations.len() / 2;

        if self.evaluations.len() >= PARALLEL_THRESHOLD {
            self.evaluations = fold_evaluations(&self.evaluations, u);
        } else {
            for i in 0..half {
                let lo = self.evaluations[2 * i];
                let hi = self.evaluations[2 * i + 1];
                self.evaluations[i] = lo + u * (hi - lo);
            }
            self.evaluations.truncate(half);
        }
        self.num_vars -= 1;
    }

    /// Evaluate MLE at arbitrary point x ∈ F^d in O(2^d)
    ///
    /// `point[k]` binds variable k (bit k of the row index).
    pub fn evaluate(&self, point: &[F]) -> F {
        assert_eq!(point.len(), self.num_vars, "point dimension mismatch");
        if self.num_vars == 0 {
            return self.evaluations[0];
        }
        let mut scratch = self.clone();
        for &u in point {
            scratch.fold(u);
        }
        scratch.evaluations[0]
    }

    /// Next-row view materialized as its own table: row i holds p[i+1], the
    /// last row holds `boundary`
    pub fn shifted(&self, boundary: F) -> Self {
        let mut evaluations = Vec::with_capacity(self.evaluations.len());
        evaluations.extend_from_slice(&self.evaluations[1..]);
        evaluations.push(boundary);
        Self { evaluations, num_vars: self.num_vars }
    }
}

/// Bind the lowest variable of a borrowed table, returning the half-size table
pub fn fold_evaluations<F: Field>(evaluations: &[F], u: F) -> Vec<F> {
    let fold_pair = |pair: &[F]| pair[0] + u * (pair[1] - pair[0]);
    if evaluations.len() >= PARALLEL_THRESHOLD {
        evaluations.par_chunks(2).map(fold_pair).collect()
    } else {
        evaluations.chunks(2).map(fold_pair).collect()
    }
}

/// Multilinear extension of the last-row indicator, Π_k u_k
pub fn last_row_indicator<F: Field>(point: &[F]) -> F {
    point.iter().fold(F::one(), |acc, u| acc * u)
}
