//! Log-derivative lookup argument
//!
//! Every row with `read_selector = 1` reads a tuple that must appear among
//! the rows of the table enabled by `table_selector`. With compressed terms
//! `read_i = compress(reads[i])` and `write_i = compress(table[i])` the
//! argument rests on
//!   Σ_i q_r[i] / read_i = Σ_i counts[i] / write_i
//! where `counts[i]` is how often table row i is read. The prover derives the
//! helper column `I = 1 / (read·write)` on active rows (0 elsewhere) and two
//! subrelations tie it down:
//!   - independent: I·read·write - (q_r + q_t - q_r·q_t) = 0 on every row
//!   - dependent:   Σ_i (q_r·I·write - counts·I·read) = 0

use std::collections::HashMap;

use ark_ff::{batch_inversion, Field};

use super::{ColumnRef, Relation, RelationParameters, RelationSchema, RelationView, SubrelationSpec};
use crate::errors::{ConfigError, ProverError};
use crate::trace::{ColumnKind, Trace};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupArgument {
    pub name: String,
    pub read_selector: String,
    pub reads: Vec<String>,
    pub table_selector: String,
    pub table: Vec<String>,
    /// Witness multiplicities of the table rows
    pub counts: String,
    /// Derived column holding I
    pub inverses: String,
}

impl LookupArgument {
    pub fn new(
        name: impl Into<String>,
        read_selector: impl Into<String>,
        reads: Vec<String>,
        table_selector: impl Into<String>,
        table: Vec<String>,
        counts: impl Into<String>,
        inverses: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            read_selector: read_selector.into(),
            reads,
            table_selector: table_selector.into(),
            table,
            counts: counts.into(),
            inverses: inverses.into(),
        }
    }

    pub(crate) fn validate<F: Field>(&self, trace: &Trace<F>) -> Result<(), ConfigError> {
        if self.reads.is_empty() || self.reads.len() != self.table.len() {
            return Err(ConfigError::MalformedArgument {
                argument: self.name.clone(),
                reason: format!("tuple arity {} vs {}", self.reads.len(), self.table.len()),
            });
        }
        match trace.schema().get(&self.inverses) {
            Some(spec) if spec.kind == ColumnKind::Derived => Ok(()),
            _ => Err(ConfigError::MalformedArgument {
                argument: self.name.clone(),
                reason: format!("`{}` must be a derived column", self.inverses),
            }),
        }
    }

    /// Multiplicity of every table row among the active reads
    ///
    /// A witness-generation helper: the result is what the `counts` column
    /// must hold. Fails if some read tuple is missing from the table.
    pub fn compute_counts<F: Field>(&self, trace: &Trace<F>) -> Result<Vec<F>, ConfigError> {
        let n = trace.circuit_size();
        let q_r = self.column(trace, &self.read_selector)?;
        let q_t = self.column(trace, &self.table_selector)?;
        let reads = self.columns(trace, &self.reads)?;
        let table = self.columns(trace, &self.table)?;

        let mut index: HashMap<Vec<F>, usize> = HashMap::new();
        for row in (0..n).filter(|&row| !q_t[row].is_zero()) {
            let tuple: Vec<F> = table.iter().map(|c| c[row]).collect();
            index.entry(tuple).or_insert(row);
        }

        let mut counts = vec![F::zero(); n];
        for row in (0..n).filter(|&row| !q_r[row].is_zero()) {
            let tuple: Vec<F> = reads.iter().map(|c| c[row]).collect();
            let hit = index.get(&tuple).ok_or_else(|| ConfigError::MalformedArgument {
                argument: self.name.clone(),
                reason: format!("read at row {} is not in the table", row),
            })?;
            counts[*hit] += F::one();
        }
        Ok(counts)
    }

    /// Compute I from the current trace
    #[tracing::instrument(skip_all, name = "LookupArgument::inverses", fields(name = %self.name))]
    pub fn compute_inverses<F: Field>(
        &self,
        trace: &Trace<F>,
        params: &RelationParameters<F>,
    ) -> Result<Vec<F>, ProverError> {
        let n = trace.circuit_size();
        let q_r = self.column(trace, &self.read_selector)?;
        let q_t = self.column(trace, &self.table_selector)?;
        let reads = self.columns(trace, &self.reads)?;
        let table = self.columns(trace, &self.table)?;

        let mut inverses = vec![F::zero(); n];
        let mut active = Vec::new();
        for row in 0..n {
            if q_r[row].is_zero() && q_t[row].is_zero() {
                continue;
            }
            let read = params.compress(reads.iter().map(|c| c[row]));
            let write = params.compress(table.iter().map(|c| c[row]));
            let product = read * write;
            if product.is_zero() {
                return Err(ProverError::NonInvertible { column: self.inverses.clone(), row });
            }
            inverses[row] = product;
            active.push(row);
        }

        let mut packed: Vec<F> = active.iter().map(|&row| inverses[row]).collect();
        batch_inversion(&mut packed);
        for (row, inv) in active.into_iter().zip(packed) {
            inverses[row] = inv;
        }
        tracing::debug!(active_rows = inverses.iter().filter(|v| !v.is_zero()).count());
        Ok(inverses)
    }

    fn column<'t, F: Field>(&self, trace: &'t Trace<F>, name: &str) -> Result<&'t [F], ConfigError> {
        trace.column(name).ok_or_else(|| ConfigError::MissingColumn {
            relation: self.name.clone(),
            column: name.to_string(),
        })
    }

    fn columns<'t, F: Field>(&self, trace: &'t Trace<F>, names: &[String]) -> Result<Vec<&'t [F]>, ConfigError> {
        names.iter().map(|name| self.column(trace, name)).collect()
    }
}

/// The relation side of a `LookupArgument`
pub struct LookupRelation {
    argument: LookupArgument,
}

impl LookupRelation {
    pub fn new(argument: LookupArgument) -> Self {
        Self { argument }
    }

    pub fn argument(&self) -> &LookupArgument {
        &self.argument
    }
}

// slot layout: I, q_r, q_t, counts, reads.., table..
impl<F: Field> Relation<F> for LookupRelation {
    fn name(&self) -> &str {
        &self.argument.name
    }

    fn schema(&self) -> RelationSchema {
        let a = &self.argument;
        let mut columns = vec![
            ColumnRef::current(&a.inverses),
            ColumnRef::current(&a.read_selector),
            ColumnRef::current(&a.table_selector),
            ColumnRef::current(&a.counts),
        ];
        columns.extend(a.reads.iter().map(ColumnRef::current));
        columns.extend(a.table.iter().map(ColumnRef::current));
        RelationSchema::new(
            columns,
            vec![SubrelationSpec::independent(3), SubrelationSpec::dependent(3)],
        )
    }

    fn accumulate(&self, view: &RelationView<'_, F>, params: &RelationParameters<F>, evals: &mut [F]) {
        let k = self.argument.reads.len();
        let inverse = view[0];
        let q_r = view[1];
        let q_t = view[2];
        let counts = view[3];
        let read = params.compress((0..k).map(|j| view[4 + j]));
        let write = params.compress((0..k).map(|j| view[4 + k + j]));

        let active = q_r + q_t - q_r * q_t;
        evals[0] += inverse * read * write - active;
        evals[1] += q_r * inverse * write - counts * inverse * read;
    }
}
