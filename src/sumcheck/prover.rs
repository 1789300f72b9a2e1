use ark_ff::Zero;

use super::round::RelationBatch;
use super::{challenge_label, univariate_label, ClaimedEvaluations, SumcheckOutput, EVALUATIONS_LABEL};
use crate::errors::TranscriptError;
use crate::field::Fr;
use crate::polynomial::multilinear::fold_evaluations;
use crate::polynomial::{MultilinearPolynomial, PowPolynomial};
use crate::relations::RelationParameters;
use crate::transcript::ProverTranscript;

/// Sum-check prover over the full entity set
pub struct SumcheckProver<'r> {
    num_vars: usize,
    num_unshifted: usize,
    batch: RelationBatch<'r, Fr>,
}

impl<'r> SumcheckProver<'r> {
    pub fn new(num_vars: usize, num_unshifted: usize, batch: RelationBatch<'r, Fr>) -> Self {
        Self { num_vars, num_unshifted, batch }
    }

    /// Run all d rounds against `transcript`
    ///
    /// `entities` is every prover polynomial in registry order. They are
    /// borrowed for round 0 and folded into working copies afterwards.
    ///
    /// # Panics
    /// If two consecutive rounds disagree, which only a prover bug can cause.
    #[tracing::instrument(skip_all, name = "SumcheckProver::prove", fields(num_vars = self.num_vars, entities = entities.len()))]
    pub fn prove(
        &self,
        transcript: &mut ProverTranscript,
        entities: &[MultilinearPolynomial<Fr>],
        params: &RelationParameters<Fr>,
        zeta: Fr,
    ) -> Result<SumcheckOutput<Fr>, TranscriptError> {
        let mut pow = PowPolynomial::new(zeta);
        let mut folded: Vec<Vec<Fr>> = Vec::new();
        let mut challenge = Vec::with_capacity(self.num_vars);
        let mut round_univariates = Vec::with_capacity(self.num_vars);
        let mut target: Option<Fr> = None;

        for round in 0..self.num_vars {
            let tables: Vec<&[Fr]> = if round == 0 {
                entities.iter().map(|p| p.evaluations.as_slice()).collect()
            } else {
                folded.iter().map(Vec::as_slice).collect()
            };

            let univariate = self.batch.compute_univariate(&tables, &pow, params);
            let sum = univariate.sum_over_boolean();
            match target {
                None if !sum.is_zero() => {
                    tracing::warn!("relation sum is non-zero: the trace does not satisfy the relations");
                }
                None => {}
                Some(expected) => assert_eq!(
                    sum,
                    expected,
                    "sum-check round {} is inconsistent with round {}",
                    round,
                    round - 1
                ),
            }

            transcript.send_to_verifier(&univariate_label(round), &univariate)?;
            let u = transcript.get_challenge(&challenge_label(round))?;

            target = Some(univariate.evaluate(u));
            let next: Vec<Vec<Fr>> = tables.iter().map(|t| fold_evaluations(t, u)).collect();
            drop(tables);
            folded = next;
            pow.partially_evaluate(u);
            challenge.push(u);
            round_univariates.push(univariate);
            tracing::debug!(round, "sum-check round done");
        }

        let evaluations: Vec<Fr> = if self.num_vars == 0 {
            entities.iter().map(|p| p.evaluations[0]).collect()
        } else {
            folded.iter().map(|t| t[0]).collect()
        };

        if let Some(expected) = target {
            let (independent, dependent) = self.batch.evaluate(&evaluations, params, &mut Vec::new());
            assert_eq!(
                pow.partial_evaluation() * independent + dependent,
                expected,
                "sum-check final evaluation disagrees with the last round"
            );
        }

        transcript.send_to_verifier(EVALUATIONS_LABEL, &evaluations)?;

        Ok(SumcheckOutput {
            challenge,
            claimed_evaluations: ClaimedEvaluations::from_entities(evaluations, self.num_unshifted),
            round_univariates,
        })
    }
}
