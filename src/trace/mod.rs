//! Trace schema and column storage
//!
//! A trace is a table of named columns of equal power-of-two length. Columns
//! are either fixed by the circuit (`Precomputed`: selectors, Lagrange
//! indicators, tables), supplied by the witness generator (`Witness`) or
//! late-bound helpers the prover derives during proving (`Derived`).
//!
//! A relation may read a column at the next row. That shifted view is never
//! stored in the trace: it is always derived from its base column, with the
//! column's `Boundary` standing in for the row past the end.

use ark_ff::Field;

use crate::errors::ConfigError;
use crate::utils::checked_num_vars;

/// Suffix of the entity name under which a shifted column is registered
pub const SHIFT_SUFFIX: &str = "_shift";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Precomputed,
    Witness,
    Derived,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Precomputed => "precomputed",
            ColumnKind::Witness => "witness",
            ColumnKind::Derived => "derived",
        }
    }
}

/// Value a shifted view yields at the last row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Boundary<F: Field> {
    #[default]
    Zero,
    Constant(F),
}

impl<F: Field> Boundary<F> {
    pub fn value(&self) -> F {
        match self {
            Boundary::Zero => F::zero(),
            Boundary::Constant(v) => *v,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec<F: Field> {
    pub name: String,
    pub kind: ColumnKind,
    pub boundary: Boundary<F>,
}

impl<F: Field> ColumnSpec<F> {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self { name: name.into(), kind, boundary: Boundary::Zero }
    }

    pub fn precomputed(name: impl Into<String>) -> Self {
        Self::new(name, ColumnKind::Precomputed)
    }

    pub fn witness(name: impl Into<String>) -> Self {
        Self::new(name, ColumnKind::Witness)
    }

    pub fn derived(name: impl Into<String>) -> Self {
        Self::new(name, ColumnKind::Derived)
    }

    pub fn with_boundary(mut self, boundary: Boundary<F>) -> Self {
        self.boundary = boundary;
        self
    }
}

/// Ordered, duplicate-free list of column declarations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceSchema<F: Field> {
    columns: Vec<ColumnSpec<F>>,
}

impl<F: Field> TraceSchema<F> {
    pub fn new(columns: Vec<ColumnSpec<F>>) -> Result<Self, ConfigError> {
        for (i, spec) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.name == spec.name) {
                return Err(ConfigError::DuplicateColumn(spec.name.clone()));
            }
        }
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[ColumnSpec<F>] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&ColumnSpec<F>> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Names of the columns of one kind, in schema order
    pub fn names_of(&self, kind: ColumnKind) -> impl Iterator<Item = &str> {
        self.columns.iter().filter(move |c| c.kind == kind).map(|c| c.name.as_str())
    }
}

/// Column data for one trace instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace<F: Field> {
    schema: TraceSchema<F>,
    circuit_size: usize,
    columns: Vec<Vec<F>>,
}

impl<F: Field> Trace<F> {
    /// Zero-filled trace of `circuit_size` rows
    pub fn new(schema: TraceSchema<F>, circuit_size: usize) -> Result<Self, ConfigError> {
        checked_num_vars(circuit_size)?;
        let columns = vec![vec![F::zero(); circuit_size]; schema.len()];
        Ok(Self { schema, circuit_size, columns })
    }

    pub fn schema(&self) -> &TraceSchema<F> {
        &self.schema
    }

    pub fn circuit_size(&self) -> usize {
        self.circuit_size
    }

    /// Assign a full precomputed or witness column
    pub fn assign(&mut self, name: &str, values: Vec<F>) -> Result<(), ConfigError> {
        let idx = self.index_of(name)?;
        if self.schema.columns[idx].kind == ColumnKind::Derived {
            return Err(ConfigError::DerivedColumnAssigned(name.to_string()));
        }
        if values.len() != self.circuit_size {
            return Err(ConfigError::ColumnLength {
                column: name.to_string(),
                expected: self.circuit_size,
                actual: values.len(),
            });
        }
        self.columns[idx] = values;
        Ok(())
    }

    /// Overwrite a late-bound column with the values the prover derived
    pub(crate) fn assign_derived(&mut self, idx: usize, values: Vec<F>) {
        debug_assert_eq!(self.schema.columns[idx].kind, ColumnKind::Derived);
        debug_assert_eq!(values.len(), self.circuit_size);
        self.columns[idx] = values;
    }

    pub fn column(&self, name: &str) -> Option<&[F]> {
        self.schema.position(name).map(|idx| self.columns[idx].as_slice())
    }

    pub fn column_at(&self, idx: usize) -> &[F] {
        &self.columns[idx]
    }

    pub fn columns(&self) -> impl Iterator<Item = (&ColumnSpec<F>, &[F])> {
        self.schema.columns.iter().zip(self.columns.iter().map(Vec::as_slice))
    }

    fn index_of(&self, name: &str) -> Result<usize, ConfigError> {
        self.schema.position(name).ok_or_else(|| ConfigError::MissingColumn {
            relation: "<trace>".to_string(),
            column: name.to_string(),
        })
    }
}

/// Read-only accessor for one column of a raw trace
#[derive(Debug, Clone, Copy)]
pub enum ColumnView<'a, F: Field> {
    Current(&'a [F]),
    Shifted { base: &'a [F], boundary: F },
}

impl<'a, F: Field> ColumnView<'a, F> {
    pub fn at(&self, row: usize) -> F {
        match self {
            ColumnView::Current(values) => values[row],
            ColumnView::Shifted { base, boundary } => {
                if row + 1 < base.len() {
                    base[row + 1]
                } else {
                    *boundary
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnView::Current(values) => values.len(),
            ColumnView::Shifted { base, .. } => base.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Fr;

    fn schema() -> TraceSchema<Fr> {
        TraceSchema::new(vec![
            ColumnSpec::precomputed("sel"),
            ColumnSpec::witness("x").with_boundary(Boundary::Constant(Fr::from(7u64))),
            ColumnSpec::derived("helper"),
        ])
        .unwrap()
    }

    #[test]
    fn duplicate_columns_are_rejected() {
        let err = TraceSchema::<Fr>::new(vec![ColumnSpec::witness("a"), ColumnSpec::witness("a")])
            .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateColumn("a".into()));
    }

    #[test]
    fn circuit_size_must_be_power_of_two() {
        assert_eq!(
            Trace::new(schema(), 6).unwrap_err(),
            ConfigError::CircuitSizeNotPowerOfTwo(6)
        );
    }

    #[test]
    fn assign_checks_length_and_kind() {
        let mut trace = Trace::new(schema(), 4).unwrap();
        assert!(matches!(
            trace.assign("x", vec![Fr::from(1u64); 3]),
            Err(ConfigError::ColumnLength { expected: 4, actual: 3, .. })
        ));
        assert_eq!(
            trace.assign("helper", vec![Fr::from(1u64); 4]),
            Err(ConfigError::DerivedColumnAssigned("helper".into()))
        );
        trace.assign("x", (0..4u64).map(Fr::from).collect()).unwrap();
        assert_eq!(trace.column("x").unwrap()[3], Fr::from(3u64));
    }

    #[test]
    fn shifted_view_reads_next_row_then_boundary() {
        let mut trace = Trace::new(schema(), 8).unwrap();
        let values: Vec<Fr> = (10..18u64).map(Fr::from).collect();
        trace.assign("x", values.clone()).unwrap();

        let spec = trace.schema().get("x").unwrap().clone();
        let view = ColumnView::Shifted {
            base: trace.column("x").unwrap(),
            boundary: spec.boundary.value(),
        };
        for i in 0..7 {
            assert_eq!(view.at(i), values[i + 1]);
        }
        assert_eq!(view.at(7), Fr::from(7u64));
    }
}
