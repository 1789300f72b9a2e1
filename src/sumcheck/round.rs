//! Round univariate computation
//!
//! With c = Π_{m<k} (1 + (ζ^{2^m} - 1)·u_m) the round-k univariate is
//!   g_k(t) = c·(1 + t·(ζ^{2^k} - 1))·Σ_j ζ^{2^{k+1}·j}·R(edge_j(t)) + Σ_j D(edge_j(t))
//! where edge j is the row pair (2j, 2j+1) of the current tables and
//! edge_j(t) interpolates every entity linearly between them. R has degree D
//! in t and the pow factor adds one, so D + 2 evaluations determine g_k.

use ark_ff::Field;
use rayon::prelude::*;

use crate::polynomial::multilinear::PARALLEL_THRESHOLD;
use crate::polynomial::{PowPolynomial, Univariate};
use crate::relations::{BoundRelation, RelationParameters};
use crate::utils::batching::powers_of_alpha;

/// Bound relations with the α power of each of their subrelations
pub struct RelationBatch<'r, F: Field> {
    relations: Vec<BoundRelation<'r, F>>,
    alphas: Vec<Vec<F>>,
    univariate_length: usize,
}

impl<'r, F: Field> RelationBatch<'r, F> {
    /// α powers are assigned over all subrelations, in relation order
    pub fn new(relations: Vec<BoundRelation<'r, F>>, alpha: F) -> Self {
        let total: usize = relations.iter().map(|r| r.num_subrelations()).sum();
        let mut powers = powers_of_alpha(&alpha, total).into_iter();
        let alphas = relations
            .iter()
            .map(|r| powers.by_ref().take(r.num_subrelations()).collect())
            .collect();
        let max_degree = relations.iter().map(|r| r.schema().max_degree()).max().unwrap_or(0);
        Self { relations, alphas, univariate_length: max_degree + 2 }
    }

    /// Number of evaluations per round univariate (D + 2)
    pub fn univariate_length(&self) -> usize {
        self.univariate_length
    }

    /// (Σ_indep α^i R_i, Σ_dep α^j D_j) at one point of entity values
    pub fn evaluate(&self, values: &[F], params: &RelationParameters<F>, scratch: &mut Vec<F>) -> (F, F) {
        let mut independent = F::zero();
        let mut dependent = F::zero();
        for (bound, alphas) in self.relations.iter().zip(&self.alphas) {
            scratch.clear();
            scratch.resize(bound.num_subrelations(), F::zero());
            bound.relation().accumulate(&bound.view(values), params, scratch);

            for ((spec, alpha), value) in bound.schema().subrelations.iter().zip(alphas).zip(scratch.iter()) {
                if spec.linearly_independent {
                    independent += *alpha * value;
                } else {
                    dependent += *alpha * value;
                }
            }
        }
        (independent, dependent)
    }

    /// g_k on {0, ..., D+1} for the current tables (one per entity)
    pub fn compute_univariate(
        &self,
        tables: &[&[F]],
        pow: &PowPolynomial<F>,
        params: &RelationParameters<F>,
    ) -> Univariate<F> {
        let size = tables.first().map_or(0, |t| t.len());
        let edges = size / 2;
        let weights = pow.edge_weights(edges);
        let fresh = || EdgeAccumulator::new(tables.len(), self.univariate_length);

        let total = if size >= PARALLEL_THRESHOLD {
            (0..edges)
                .into_par_iter()
                .fold(fresh, |mut acc, j| {
                    self.accumulate_edge(&mut acc, tables, j, weights[j], params);
                    acc
                })
                .reduce(fresh, EdgeAccumulator::merge)
        } else {
            let mut acc = fresh();
            for (j, weight) in weights.iter().enumerate() {
                self.accumulate_edge(&mut acc, tables, j, *weight, params);
            }
            acc
        };

        let scale = pow.partial_evaluation();
        let mut t = F::zero();
        let evaluations = total
            .independent
            .iter()
            .zip(&total.dependent)
            .map(|(indep, dep)| {
                let value = scale * pow.univariate_eval(t) * indep + dep;
                t += F::one();
                value
            })
            .collect();
        Univariate::new(evaluations)
    }

    fn accumulate_edge(
        &self,
        acc: &mut EdgeAccumulator<F>,
        tables: &[&[F]],
        edge: usize,
        weight: F,
        params: &RelationParameters<F>,
    ) {
        for (e, table) in tables.iter().enumerate() {
            let lo = table[2 * edge];
            acc.values[e] = lo;
            acc.slopes[e] = table[2 * edge + 1] - lo;
        }
        for k in 0..self.univariate_length {
            if k > 0 {
                for (value, slope) in acc.values.iter_mut().zip(&acc.slopes) {
                    *value += slope;
                }
            }
            let (indep, dep) = self.evaluate(&acc.values, params, &mut acc.scratch);
            acc.independent[k] += weight * indep;
            acc.dependent[k] += dep;
        }
    }
}

/// Per-thread partial sums plus scratch space
struct EdgeAccumulator<F: Field> {
    independent: Vec<F>,
    dependent: Vec<F>,
    values: Vec<F>,
    slopes: Vec<F>,
    scratch: Vec<F>,
}

impl<F: Field> EdgeAccumulator<F> {
    fn new(num_entities: usize, length: usize) -> Self {
        Self {
            independent: vec![F::zero(); length],
            dependent: vec![F::zero(); length],
            values: vec![F::zero(); num_entities],
            slopes: vec![F::zero(); num_entities],
            scratch: Vec::new(),
        }
    }

    fn merge(mut self, other: Self) -> Self {
        for (a, b) in self.independent.iter_mut().zip(&other.independent) {
            *a += b;
        }
        for (a, b) in self.dependent.iter_mut().zip(&other.dependent) {
            *a += b;
        }
        self
    }
}
