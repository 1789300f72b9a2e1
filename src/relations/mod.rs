//! Relations over trace rows
//!
//! A relation is a set of polynomial identities ("subrelations") in the
//! values of a fixed list of columns, each optionally read at the next row.
//! Its `RelationSchema` names those columns; the binder resolves the names
//! once per relation set, and `accumulate` then reads them through a
//! `RelationView` by slot, without knowing where the data lives.
//!
//! Subrelations are either linearly independent (must vanish on every row)
//! or linearly dependent (only their sum over all rows must vanish, e.g. a
//! log-derivative lookup identity).

pub mod binder;
pub mod lookup;
pub mod permutation;
pub mod set;

use ark_ff::Field;
use core::ops::Index;

pub use binder::{BoundRelation, ColumnRegistry, TraceView};
pub use lookup::{LookupArgument, LookupRelation};
pub use permutation::{PermutationArgument, PermutationRelation};
pub use set::{OptionalRounds, RelationSet, RowFailure};

/// A column a relation reads, at the current or the next row
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    pub name: String,
    pub shifted: bool,
}

impl ColumnRef {
    pub fn current(name: impl Into<String>) -> Self {
        Self { name: name.into(), shifted: false }
    }

    pub fn shifted(name: impl Into<String>) -> Self {
        Self { name: name.into(), shifted: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubrelationSpec {
    /// Total degree in the column values
    pub degree: usize,
    pub linearly_independent: bool,
}

impl SubrelationSpec {
    pub fn independent(degree: usize) -> Self {
        Self { degree, linearly_independent: true }
    }

    pub fn dependent(degree: usize) -> Self {
        Self { degree, linearly_independent: false }
    }
}

/// Columns read (slot i is `columns[i]`) and subrelations produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationSchema {
    pub columns: Vec<ColumnRef>,
    pub subrelations: Vec<SubrelationSpec>,
}

impl RelationSchema {
    pub fn new(columns: Vec<ColumnRef>, subrelations: Vec<SubrelationSpec>) -> Self {
        Self { columns, subrelations }
    }

    pub fn max_degree(&self) -> usize {
        self.subrelations.iter().map(|s| s.degree).max().unwrap_or(0)
    }
}

/// Challenge-derived scalars used inside permutation and lookup relations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RelationParameters<F: Field> {
    pub beta: F,
    pub gamma: F,
}

impl<F: Field> RelationParameters<F> {
    /// Σ_j values[j]·β^j + γ
    pub fn compress(&self, values: impl IntoIterator<Item = F>) -> F {
        let mut acc = self.gamma;
        let mut beta_power = F::one();
        for v in values {
            acc += v * beta_power;
            beta_power *= self.beta;
        }
        acc
    }
}

/// Values of one row (or one sum-check edge point) as seen by a relation
///
/// `view[slot]` is the value of the column at `schema.columns[slot]`.
#[derive(Debug, Clone, Copy)]
pub struct RelationView<'a, F: Field> {
    values: &'a [F],
    slots: &'a [usize],
}

impl<'a, F: Field> RelationView<'a, F> {
    pub fn new(values: &'a [F], slots: &'a [usize]) -> Self {
        Self { values, slots }
    }

    pub fn get(&self, slot: usize) -> F {
        self.values[self.slots[slot]]
    }

    pub fn num_slots(&self) -> usize {
        self.slots.len()
    }
}

impl<'a, F: Field> Index<usize> for RelationView<'a, F> {
    type Output = F;

    fn index(&self, slot: usize) -> &F {
        &self.values[self.slots[slot]]
    }
}

/// A named set of polynomial identities over trace rows
pub trait Relation<F: Field>: Send + Sync {
    fn name(&self) -> &str;

    fn schema(&self) -> RelationSchema;

    /// Add the value of every subrelation at this row to `evals`
    /// (`evals.len() == schema().subrelations.len()`)
    fn accumulate(&self, view: &RelationView<'_, F>, params: &RelationParameters<F>, evals: &mut [F]);
}
