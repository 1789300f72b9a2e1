//! Grand-product permutation argument
//!
//! Proves that the rows of the tuple columns `lhs` form a permutation of the
//! rows of `rhs` (restricted to the rows their selectors enable). With
//! compressed terms
//!   L_i = s_l·(Σ_j lhs_j[i]·β^j + γ - 1) + 1,   R_i likewise,
//! the prover derives the grand product column
//!   z[0] = 0,  z[i+1] = Π_{k≤i} L_k / R_k
//! and the relation
//!   (z + first)·L - (z_shift + last)·R = 0
//! holds on every row iff Π_i L_i = Π_i R_i. `z` starts at zero so it can be
//! opened shifted; `first`/`last` patch the two ends.

use ark_ff::{batch_inversion, Field};

use super::{ColumnRef, Relation, RelationParameters, RelationSchema, RelationView, SubrelationSpec};
use crate::errors::{ConfigError, ProverError};
use crate::trace::{ColumnKind, Trace};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermutationArgument {
    pub name: String,
    pub lhs: Vec<String>,
    pub rhs: Vec<String>,
    pub lhs_selector: Option<String>,
    pub rhs_selector: Option<String>,
    /// Derived column holding z
    pub grand_product: String,
    /// Precomputed Lagrange indicators of the first and last rows
    pub first_row: String,
    pub last_row: String,
}

impl PermutationArgument {
    pub fn new(
        name: impl Into<String>,
        lhs: Vec<String>,
        rhs: Vec<String>,
        grand_product: impl Into<String>,
        first_row: impl Into<String>,
        last_row: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            lhs,
            rhs,
            lhs_selector: None,
            rhs_selector: None,
            grand_product: grand_product.into(),
            first_row: first_row.into(),
            last_row: last_row.into(),
        }
    }

    pub fn with_selectors(mut self, lhs: impl Into<String>, rhs: impl Into<String>) -> Self {
        self.lhs_selector = Some(lhs.into());
        self.rhs_selector = Some(rhs.into());
        self
    }

    pub(crate) fn validate<F: Field>(&self, trace: &Trace<F>) -> Result<(), ConfigError> {
        if self.lhs.is_empty() || self.lhs.len() != self.rhs.len() {
            return Err(ConfigError::MalformedArgument {
                argument: self.name.clone(),
                reason: format!("tuple arity {} vs {}", self.lhs.len(), self.rhs.len()),
            });
        }
        match trace.schema().get(&self.grand_product) {
            Some(spec) if spec.kind == ColumnKind::Derived => Ok(()),
            _ => Err(ConfigError::MalformedArgument {
                argument: self.name.clone(),
                reason: format!("`{}` must be a derived column", self.grand_product),
            }),
        }
    }

    /// Compute z from the current trace
    #[tracing::instrument(skip_all, name = "PermutationArgument::grand_product", fields(name = %self.name))]
    pub fn compute_grand_product<F: Field>(
        &self,
        trace: &Trace<F>,
        params: &RelationParameters<F>,
    ) -> Result<Vec<F>, ProverError> {
        let n = trace.circuit_size();
        let numerators = self.terms(trace, params, &self.lhs, self.lhs_selector.as_deref())?;
        let mut denominators = self.terms(trace, params, &self.rhs, self.rhs_selector.as_deref())?;

        if let Some(row) = denominators.iter().position(|d| d.is_zero()) {
            return Err(ProverError::NonInvertible { column: self.grand_product.clone(), row });
        }
        batch_inversion(&mut denominators);

        let mut z = Vec::with_capacity(n);
        z.push(F::zero());
        let mut acc = F::one();
        for i in 0..n - 1 {
            acc *= numerators[i] * denominators[i];
            z.push(acc);
        }
        Ok(z)
    }

    fn terms<F: Field>(
        &self,
        trace: &Trace<F>,
        params: &RelationParameters<F>,
        tuple: &[String],
        selector: Option<&str>,
    ) -> Result<Vec<F>, ConfigError> {
        let columns = tuple
            .iter()
            .map(|name| self.column(trace, name))
            .collect::<Result<Vec<_>, _>>()?;
        let selector = selector.map(|name| self.column(trace, name)).transpose()?;

        Ok((0..trace.circuit_size())
            .map(|row| {
                let compressed = params.compress(columns.iter().map(|c| c[row]));
                match selector {
                    Some(sel) => gated(sel[row], compressed),
                    None => compressed,
                }
            })
            .collect())
    }

    fn column<'t, F: Field>(&self, trace: &'t Trace<F>, name: &str) -> Result<&'t [F], ConfigError> {
        trace.column(name).ok_or_else(|| ConfigError::MissingColumn {
            relation: self.name.clone(),
            column: name.to_string(),
        })
    }
}

/// s·(t - 1) + 1: the term itself where the selector is on, 1 where it is off
fn gated<F: Field>(selector: F, term: F) -> F {
    selector * (term - F::one()) + F::one()
}

/// The relation side of a `PermutationArgument`
pub struct PermutationRelation {
    argument: PermutationArgument,
}

impl PermutationRelation {
    pub fn new(argument: PermutationArgument) -> Self {
        Self { argument }
    }

    pub fn argument(&self) -> &PermutationArgument {
        &self.argument
    }

    fn arity(&self) -> usize {
        self.argument.lhs.len()
    }
}

// slot layout: z, z_shift, first, last, lhs.., rhs.., [lhs_sel, rhs_sel]
impl<F: Field> Relation<F> for PermutationRelation {
    fn name(&self) -> &str {
        &self.argument.name
    }

    fn schema(&self) -> RelationSchema {
        let a = &self.argument;
        let mut columns = vec![
            ColumnRef::current(&a.grand_product),
            ColumnRef::shifted(&a.grand_product),
            ColumnRef::current(&a.first_row),
            ColumnRef::current(&a.last_row),
        ];
        columns.extend(a.lhs.iter().map(ColumnRef::current));
        columns.extend(a.rhs.iter().map(ColumnRef::current));
        let selected = a.lhs_selector.is_some() || a.rhs_selector.is_some();
        if let Some(sel) = &a.lhs_selector {
            columns.push(ColumnRef::current(sel));
        }
        if let Some(sel) = &a.rhs_selector {
            columns.push(ColumnRef::current(sel));
        }
        let degree = if selected { 3 } else { 2 };
        RelationSchema::new(columns, vec![SubrelationSpec::independent(degree)])
    }

    fn accumulate(&self, view: &RelationView<'_, F>, params: &RelationParameters<F>, evals: &mut [F]) {
        let k = self.arity();
        let z = view[0];
        let z_shift = view[1];
        let first = view[2];
        let last = view[3];

        let mut lhs = params.compress((0..k).map(|j| view[4 + j]));
        let mut rhs = params.compress((0..k).map(|j| view[4 + k + j]));
        let mut next = 4 + 2 * k;
        if self.argument.lhs_selector.is_some() {
            lhs = gated(view[next], lhs);
            next += 1;
        }
        if self.argument.rhs_selector.is_some() {
            rhs = gated(view[next], rhs);
        }

        evals[0] += (z + first) * lhs - (z_shift + last) * rhs;
    }
}
