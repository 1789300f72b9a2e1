//! Gate separator pow_ζ(X) = Π_k (1 + (ζ^{2^k} - 1)·X_k)
//!
//! On the hypercube pow_ζ(i) = ζ^i, so Σ_i pow_ζ(i)·R(i) = 0 for a random ζ
//! implies R vanishes on every row, up to Schwartz-Zippel error N/|F|.

use ark_ff::Field;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowPolynomial<F: Field> {
    pub zeta: F,
    /// ζ^{2^k} for the variable bound in the current round
    current_element: F,
    /// Π_{m<k} (1 + (ζ^{2^m} - 1)·u_m)
    partial_evaluation: F,
}

impl<F: Field> PowPolynomial<F> {
    pub fn new(zeta: F) -> Self {
        Self { zeta, current_element: zeta, partial_evaluation: F::one() }
    }

    pub fn current_element(&self) -> F {
        self.current_element
    }

    pub fn partial_evaluation(&self) -> F {
        self.partial_evaluation
    }

    /// Factor of the current round's variable: 1 + t·(ζ^{2^k} - 1)
    pub fn univariate_eval(&self, t: F) -> F {
        F::one() + t * (self.current_element - F::one())
    }

    /// Fix the current round's variable to `u` and move to the next one
    pub fn partially_evaluate(&mut self, u: F) {
        self.partial_evaluation *= self.univariate_eval(u);
        self.current_element.square_in_place();
    }

    /// Weights ζ^{2^{k+1}·j} of the `count` edges still summed in this round
    pub fn edge_weights(&self, count: usize) -> Vec<F> {
        let step = self.current_element.square();
        let mut weights = Vec::with_capacity(count);
        let mut acc = F::one();
        for _ in 0..count {
            weights.push(acc);
            acc *= step;
        }
        weights
    }

    /// pow_ζ evaluated at an arbitrary point
    pub fn evaluate(zeta: F, point: &[F]) -> F {
        let mut element = zeta;
        let mut acc = F::one();
        for u in point {
            acc *= F::one() + *u * (element - F::one());
            element.square_in_place();
        }
        acc
    }
}
