//! Column registry and relation binding
//!
//! The registry lists every polynomial the prover works with ("entities"):
//! all trace columns in schema order, then one `<name>_shift` entity per
//! column some relation reads at the next row. Binding a relation resolves
//! each of its schema slots to an entity index once; evaluation afterwards
//! only indexes.

use ark_ff::Field;

use super::{ColumnRef, Relation, RelationSchema, RelationView};
use crate::errors::ConfigError;
use crate::trace::{ColumnView, Trace, TraceSchema, SHIFT_SUFFIX};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRegistry {
    names: Vec<String>,
    num_unshifted: usize,
    /// Base column index of each shifted entity, in entity order
    shifted_bases: Vec<usize>,
}

impl ColumnRegistry {
    /// Register the trace columns and every shifted column the relations read
    ///
    /// Fails on the first column a relation names that the trace lacks.
    pub fn build<F: Field>(
        schema: &TraceSchema<F>,
        relations: &[Box<dyn Relation<F>>],
    ) -> Result<Self, ConfigError> {
        let mut names: Vec<String> = schema.columns().iter().map(|c| c.name.clone()).collect();
        let num_unshifted = names.len();
        let mut shifted_bases = Vec::new();

        for relation in relations {
            for column in relation.schema().columns {
                let base = schema.position(&column.name).ok_or_else(|| ConfigError::MissingColumn {
                    relation: relation.name().to_string(),
                    column: column.name.clone(),
                })?;
                if column.shifted && !shifted_bases.contains(&base) {
                    shifted_bases.push(base);
                    names.push(format!("{}{}", column.name, SHIFT_SUFFIX));
                }
            }
        }

        Ok(Self { names, num_unshifted, shifted_bases })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn num_unshifted(&self) -> usize {
        self.num_unshifted
    }

    pub fn num_shifted(&self) -> usize {
        self.shifted_bases.len()
    }

    pub fn shifted_bases(&self) -> &[usize] {
        &self.shifted_bases
    }

    /// Entity index of a (possibly shifted) column reference
    pub fn entity(&self, column: &ColumnRef) -> Option<usize> {
        let base = self.names[..self.num_unshifted].iter().position(|n| *n == column.name)?;
        if !column.shifted {
            return Some(base);
        }
        self.shifted_bases
            .iter()
            .position(|b| *b == base)
            .map(|pos| self.num_unshifted + pos)
    }

    pub fn bind<'r, F: Field>(
        &self,
        relation: &'r dyn Relation<F>,
    ) -> Result<BoundRelation<'r, F>, ConfigError> {
        let schema = relation.schema();
        let slots = schema
            .columns
            .iter()
            .map(|column| {
                self.entity(column).ok_or_else(|| ConfigError::MissingColumn {
                    relation: relation.name().to_string(),
                    column: column.name.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(BoundRelation { relation, schema, slots })
    }
}

/// A relation whose schema slots are resolved to entity indices
pub struct BoundRelation<'r, F: Field> {
    relation: &'r dyn Relation<F>,
    schema: RelationSchema,
    slots: Vec<usize>,
}

impl<'r, F: Field> BoundRelation<'r, F> {
    pub fn relation(&self) -> &'r dyn Relation<F> {
        self.relation
    }

    pub fn schema(&self) -> &RelationSchema {
        &self.schema
    }

    pub fn slots(&self) -> &[usize] {
        &self.slots
    }

    pub fn num_subrelations(&self) -> usize {
        self.schema.subrelations.len()
    }

    /// View over one row of entity values
    pub fn view<'a>(&'a self, entity_values: &'a [F]) -> RelationView<'a, F> {
        RelationView::new(entity_values, &self.slots)
    }
}

/// A relation bound directly to the columns of a raw trace
///
/// Used to evaluate relations row by row before any polynomial is built.
pub struct TraceView<'t, F: Field> {
    accessors: Vec<ColumnView<'t, F>>,
    identity: Vec<usize>,
}

impl<'t, F: Field> TraceView<'t, F> {
    pub fn bind(trace: &'t Trace<F>, relation: &dyn Relation<F>) -> Result<Self, ConfigError> {
        let accessors = relation
            .schema()
            .columns
            .iter()
            .map(|column| {
                let idx = trace.schema().position(&column.name).ok_or_else(|| ConfigError::MissingColumn {
                    relation: relation.name().to_string(),
                    column: column.name.clone(),
                })?;
                let spec = &trace.schema().columns()[idx];
                let values = trace.column_at(idx);
                Ok(if column.shifted {
                    ColumnView::Shifted { base: values, boundary: spec.boundary.value() }
                } else {
                    ColumnView::Current(values)
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        let identity = (0..accessors.len()).collect();
        Ok(Self { accessors, identity })
    }

    /// Fill `buffer` with the slot values of `row`
    pub fn load_row(&self, row: usize, buffer: &mut Vec<F>) {
        buffer.clear();
        buffer.extend(self.accessors.iter().map(|a| a.at(row)));
    }

    pub fn view<'a>(&'a self, buffer: &'a [F]) -> RelationView<'a, F> {
        RelationView::new(buffer, &self.identity)
    }
}
