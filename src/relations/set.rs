//! The full set of relations a trace must satisfy

use ark_ff::Field;

use super::{
    LookupArgument, LookupRelation, PermutationArgument, PermutationRelation, Relation,
    RelationParameters, SubrelationSpec, TraceView,
};
use crate::errors::ConfigError;
use crate::trace::{ColumnKind, Trace};

/// Which optional rounds the prover runs, fixed once per relation set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OptionalRounds {
    pub lookups: bool,
    pub permutations: bool,
}

impl OptionalRounds {
    /// β and γ are only needed if some argument compresses tuples
    pub fn needs_parameters(&self) -> bool {
        self.lookups || self.permutations
    }
}

/// First relation violation found by a row-by-row check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFailure {
    pub relation: String,
    pub subrelation: usize,
    /// `None` for a linearly dependent subrelation, whose sum over all rows
    /// is what must vanish
    pub row: Option<usize>,
}

pub struct RelationSet<F: Field> {
    relations: Vec<Box<dyn Relation<F>>>,
    permutations: Vec<PermutationArgument>,
    lookups: Vec<LookupArgument>,
}

impl<F: Field> Default for RelationSet<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Field> RelationSet<F> {
    pub fn new() -> Self {
        Self { relations: Vec::new(), permutations: Vec::new(), lookups: Vec::new() }
    }

    pub fn with_relation(mut self, relation: impl Relation<F> + 'static) -> Self {
        self.relations.push(Box::new(relation));
        self
    }

    pub fn with_permutation(mut self, argument: PermutationArgument) -> Self {
        self.relations.push(Box::new(PermutationRelation::new(argument.clone())));
        self.permutations.push(argument);
        self
    }

    pub fn with_lookup(mut self, argument: LookupArgument) -> Self {
        self.relations.push(Box::new(LookupRelation::new(argument.clone())));
        self.lookups.push(argument);
        self
    }

    pub fn relations(&self) -> &[Box<dyn Relation<F>>] {
        &self.relations
    }

    pub fn permutations(&self) -> &[PermutationArgument] {
        &self.permutations
    }

    pub fn lookups(&self) -> &[LookupArgument] {
        &self.lookups
    }

    pub fn rounds(&self) -> OptionalRounds {
        OptionalRounds { lookups: !self.lookups.is_empty(), permutations: !self.permutations.is_empty() }
    }

    /// Every subrelation, in the order their α powers are assigned
    pub fn subrelations(&self) -> Vec<SubrelationSpec> {
        self.relations.iter().flat_map(|r| r.schema().subrelations).collect()
    }

    pub fn num_subrelations(&self) -> usize {
        self.subrelations().len()
    }

    pub fn max_degree(&self) -> usize {
        self.subrelations().iter().map(|s| s.degree).max().unwrap_or(0)
    }

    /// Arity and column-kind checks of the permutation and lookup arguments
    ///
    /// Every derived column of the schema must be the grand product or the
    /// inverse column of a registered argument, since nothing else assigns
    /// or commits it.
    pub fn validate(&self, trace: &Trace<F>) -> Result<(), ConfigError> {
        for argument in &self.permutations {
            argument.validate(trace)?;
        }
        for argument in &self.lookups {
            argument.validate(trace)?;
        }

        for name in trace.schema().names_of(ColumnKind::Derived) {
            let owned = self.permutations.iter().any(|a| a.grand_product == name)
                || self.lookups.iter().any(|a| a.inverses == name);
            if !owned {
                return Err(ConfigError::UnownedDerivedColumn(name.to_string()));
            }
        }
        Ok(())
    }

    /// Evaluate every relation on every row of `trace`
    ///
    /// Derived columns must already hold their values. Returns the first
    /// violation, or `None` if the trace satisfies the whole set.
    #[tracing::instrument(skip_all, name = "RelationSet::first_failure")]
    pub fn first_failure(
        &self,
        trace: &Trace<F>,
        params: &RelationParameters<F>,
    ) -> Result<Option<RowFailure>, ConfigError> {
        let mut buffer = Vec::new();
        for relation in &self.relations {
            let view = TraceView::bind(trace, relation.as_ref())?;
            let specs = relation.schema().subrelations;
            let mut sums = vec![F::zero(); specs.len()];

            for row in 0..trace.circuit_size() {
                view.load_row(row, &mut buffer);
                let mut evals = vec![F::zero(); specs.len()];
                relation.accumulate(&view.view(&buffer), params, &mut evals);

                for (i, (spec, value)) in specs.iter().zip(&evals).enumerate() {
                    if spec.linearly_independent && !value.is_zero() {
                        return Ok(Some(RowFailure {
                            relation: relation.name().to_string(),
                            subrelation: i,
                            row: Some(row),
                        }));
                    }
                    sums[i] += value;
                }
            }

            let dependent = specs
                .iter()
                .zip(&sums)
                .position(|(spec, sum)| !spec.linearly_independent && !sum.is_zero());
            if let Some(i) = dependent {
                return Ok(Some(RowFailure { relation: relation.name().to_string(), subrelation: i, row: None }));
            }
        }
        Ok(None)
    }
}
