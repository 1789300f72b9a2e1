//! Test-only verifier and circuit fixtures
//!
//! The verifier replays the transcript against a proof, checks every
//! sum-check round and folds the ZeroMorph claim into a single pairing.

#![allow(dead_code)]

use std::collections::HashMap;

use ark_ec::AffineRepr;
use ark_ff::Zero;
use ark_std::test_rng;

use honk_prover::field::{Fr, G1Affine, G1Projective};
use honk_prover::polynomial::multilinear::last_row_indicator;
use honk_prover::polynomial::{PowPolynomial, Univariate};
use honk_prover::prover::{ALPHA_LABEL, BETA_LABEL, CIRCUIT_SIZE_LABEL, GAMMA_LABEL, VK_DIGEST_LABEL, ZETA_LABEL};
use honk_prover::relations::ColumnRegistry;
use honk_prover::sumcheck::{challenge_label, univariate_label, RelationBatch, EVALUATIONS_LABEL};
use honk_prover::utils::batching::{batch_values, powers_of_alpha};
use honk_prover::zeromorph::{
    lift_scalars, phi, quotient_label, quotient_scalars, BATCHED_QUOTIENT_LABEL, PROOF_LABEL, RHO_LABEL, X_LABEL,
    Y_LABEL, Z_LABEL,
};
use honk_prover::{
    Boundary, ColumnKind, ColumnRef, ColumnSpec, KzgCommitmentKey, KzgVerifierKey, LookupArgument, PermutationArgument, Proof,
    ProvingKey, Relation, RelationParameters, RelationSchema, RelationSet, RelationView, Srs, SubrelationSpec, Trace,
    TraceSchema, TranscriptError, VerificationKey, VerifierTranscript,
};

/// Why a proof was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Transcript(TranscriptError),
    Preamble,
    SumcheckRound(usize),
    SumcheckFinal,
    Opening,
}

impl From<TranscriptError> for Rejection {
    fn from(e: TranscriptError) -> Self {
        Rejection::Transcript(e)
    }
}

pub struct Verifier<'a> {
    pub domain_separator: &'a [u8],
    pub schema: &'a TraceSchema<Fr>,
    pub relations: &'a RelationSet<Fr>,
    pub vk: &'a VerificationKey<G1Affine>,
    pub kzg: &'a KzgVerifierKey,
}

impl<'a> Verifier<'a> {
    pub fn verify(&self, proof: &Proof) -> Result<(), Rejection> {
        let mut transcript = VerifierTranscript::new(self.domain_separator, proof);
        let registry = ColumnRegistry::build(self.schema, self.relations.relations())
            .map_err(|_| Rejection::Preamble)?;

        let circuit_size: u64 = transcript.receive_from_prover(CIRCUIT_SIZE_LABEL)?;
        let digest: [u8; 32] = transcript.receive_from_prover(VK_DIGEST_LABEL)?;
        if circuit_size as usize != self.vk.circuit_size || digest != self.vk.digest {
            return Err(Rejection::Preamble);
        }
        let num_vars = self.vk.num_vars;

        let mut commitments: HashMap<String, G1Affine> =
            self.vk.precomputed.iter().cloned().collect();
        for spec in self.schema.columns().iter().filter(|c| c.kind == ColumnKind::Witness) {
            commitments.insert(spec.name.clone(), transcript.receive_from_prover(&spec.name)?);
        }

        let rounds = self.relations.rounds();
        let mut params = RelationParameters::default();
        if rounds.needs_parameters() {
            let [beta, gamma] = transcript.get_challenges([BETA_LABEL, GAMMA_LABEL])?;
            params = RelationParameters { beta, gamma };
        }
        for lookup in self.relations.lookups() {
            commitments.insert(lookup.inverses.clone(), transcript.receive_from_prover(&lookup.inverses)?);
        }
        for permutation in self.relations.permutations() {
            commitments
                .insert(permutation.grand_product.clone(), transcript.receive_from_prover(&permutation.grand_product)?);
        }

        // sum-check
        let [alpha, zeta] = transcript.get_challenges([ALPHA_LABEL, ZETA_LABEL])?;
        let bound = self
            .relations
            .relations()
            .iter()
            .map(|r| registry.bind(r.as_ref()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| Rejection::Preamble)?;
        let batch = RelationBatch::new(bound, alpha);

        let mut target = Fr::zero();
        let mut challenge = Vec::with_capacity(num_vars);
        for round in 0..num_vars {
            let univariate: Univariate<Fr> = transcript.receive_from_prover(&univariate_label(round))?;
            if univariate.len() != batch.univariate_length() || univariate.sum_over_boolean() != target {
                return Err(Rejection::SumcheckRound(round));
            }
            let u = transcript.get_challenge(&challenge_label(round))?;
            target = univariate.evaluate(u);
            challenge.push(u);
        }

        let evaluations: Vec<Fr> = transcript.receive_from_prover(EVALUATIONS_LABEL)?;
        if evaluations.len() != registry.len() {
            return Err(Rejection::SumcheckFinal);
        }
        let (independent, dependent) = batch.evaluate(&evaluations, &params, &mut Vec::new());
        if PowPolynomial::evaluate(zeta, &challenge) * independent + dependent != target {
            return Err(Rejection::SumcheckFinal);
        }

        // ZeroMorph
        let m = registry.num_unshifted();
        let rho = transcript.get_challenge(RHO_LABEL)?;
        let rho_powers = powers_of_alpha(&rho, registry.len());
        let mut quotients: Vec<G1Affine> = Vec::with_capacity(num_vars);
        for k in 0..num_vars {
            quotients.push(transcript.receive_from_prover(&quotient_label(k))?);
        }
        let y = transcript.get_challenge(Y_LABEL)?;
        let batched_quotient: G1Affine = transcript.receive_from_prover(BATCHED_QUOTIENT_LABEL)?;
        let [x, z] = transcript.get_challenges([X_LABEL, Z_LABEL])?;
        let pi: G1Affine = transcript.receive_from_prover(PROOF_LABEL)?;
        transcript.finish()?;

        let columns = self.schema.columns();
        let indicator = last_row_indicator(&challenge);
        let shifted: Vec<Fr> = evaluations[m..]
            .iter()
            .zip(registry.shifted_bases())
            .map(|(w, &base)| *w - columns[base].boundary.value() * indicator)
            .collect();
        let v = batch_values(&evaluations[..m], &rho_powers[..m]) + batch_values(&shifted, &rho_powers[m..]);

        let commitment_of = |idx: usize| -> Result<G1Projective, Rejection> {
            commitments.get(&columns[idx].name).map(|c| c.into_group()).ok_or(Rejection::Opening)
        };

        let mut c_zeta = batched_quotient.into_group();
        for (q, s) in quotients.iter().zip(lift_scalars(x, y, num_vars)) {
            c_zeta -= *q * s;
        }

        let mut c_z = G1Projective::zero();
        for idx in 0..m {
            c_z += commitment_of(idx)? * (rho_powers[idx] * x);
        }
        for (j, &base) in registry.shifted_bases().iter().enumerate() {
            c_z += commitment_of(base)? * rho_powers[m + j];
        }
        c_z -= self.kzg.g1_generator * (v * x * phi(x, num_vars));
        for (q, s) in quotients.iter().zip(quotient_scalars(x, &challenge)) {
            c_z -= *q * (x * s);
        }

        let folded = c_zeta + c_z * z + pi * x;
        if !self.kzg.verify_folded(&folded, &pi) {
            return Err(Rejection::Opening);
        }
        Ok(())
    }
}

pub fn setup(size: usize) -> (KzgCommitmentKey, KzgVerifierKey) {
    let srs = Srs::unsafe_setup(size, &mut test_rng()).expect("setup");
    (srs.commitment_key(), srs.verifier_key())
}

pub fn column(values: &[u64]) -> Vec<Fr> {
    values.iter().map(|v| Fr::from(*v)).collect()
}

/// q·(a + b - c) = 0
pub struct Add;

impl Relation<Fr> for Add {
    fn name(&self) -> &str {
        "add"
    }

    fn schema(&self) -> RelationSchema {
        RelationSchema::new(
            vec![ColumnRef::current("q"), ColumnRef::current("a"), ColumnRef::current("b"), ColumnRef::current("c")],
            vec![SubrelationSpec::independent(2)],
        )
    }

    fn accumulate(&self, view: &RelationView<'_, Fr>, _: &RelationParameters<Fr>, evals: &mut [Fr]) {
        evals[0] += view[0] * (view[1] + view[2] - view[3]);
    }
}

/// q·(x_shift - x - 1) = 0 with x read at the next row
pub struct Counter;

impl Relation<Fr> for Counter {
    fn name(&self) -> &str {
        "counter"
    }

    fn schema(&self) -> RelationSchema {
        RelationSchema::new(
            vec![ColumnRef::current("q"), ColumnRef::current("x"), ColumnRef::shifted("x")],
            vec![SubrelationSpec::independent(2)],
        )
    }

    fn accumulate(&self, view: &RelationView<'_, Fr>, _: &RelationParameters<Fr>, evals: &mut [Fr]) {
        evals[0] += view[0] * (view[2] - view[1] - Fr::from(1u64));
    }
}

/// sel·(a + b - c) over `size` rows with c = a + b
pub fn add_circuit(size: usize) -> (ProvingKey, RelationSet<Fr>) {
    let schema = TraceSchema::new(vec![
        ColumnSpec::precomputed("q"),
        ColumnSpec::witness("a"),
        ColumnSpec::witness("b"),
        ColumnSpec::witness("c"),
    ])
    .expect("schema");
    let mut trace = Trace::new(schema, size).expect("trace");
    let a: Vec<Fr> = (0..size as u64).map(|i| Fr::from(i + 1)).collect();
    let b: Vec<Fr> = (0..size as u64).map(|i| Fr::from(3 * i + 2)).collect();
    let c: Vec<Fr> = a.iter().zip(&b).map(|(x, y)| *x + y).collect();
    trace.assign("q", vec![Fr::from(1u64); size]).expect("q");
    trace.assign("a", a).expect("a");
    trace.assign("b", b).expect("b");
    trace.assign("c", c).expect("c");
    (ProvingKey::new(trace), RelationSet::new().with_relation(Add))
}

/// x counts 0, 1, ..., size-1 and the row past the end reads `size`
pub fn counter_circuit(size: usize) -> (ProvingKey, RelationSet<Fr>) {
    let schema = TraceSchema::new(vec![
        ColumnSpec::precomputed("q"),
        ColumnSpec::witness("x").with_boundary(Boundary::Constant(Fr::from(size as u64))),
    ])
    .expect("schema");
    let mut trace = Trace::new(schema, size).expect("trace");
    trace.assign("q", vec![Fr::from(1u64); size]).expect("q");
    trace.assign("x", (0..size as u64).map(Fr::from).collect()).expect("x");
    (ProvingKey::new(trace), RelationSet::new().with_relation(Counter))
}

/// (a, b) is a permutation of (c, d) row-wise as tuples
pub fn permutation_circuit(rhs_b: &[u64]) -> (ProvingKey, RelationSet<Fr>) {
    let schema = TraceSchema::new(vec![
        ColumnSpec::precomputed("first"),
        ColumnSpec::precomputed("last"),
        ColumnSpec::witness("a"),
        ColumnSpec::witness("b"),
        ColumnSpec::witness("c"),
        ColumnSpec::witness("d"),
        ColumnSpec::derived("z_perm"),
    ])
    .expect("schema");
    let mut trace = Trace::new(schema, 8).expect("trace");
    trace.assign("first", column(&[1, 0, 0, 0, 0, 0, 0, 0])).expect("first");
    trace.assign("last", column(&[0, 0, 0, 0, 0, 0, 0, 1])).expect("last");
    trace.assign("a", column(&[1, 2, 3, 4, 5, 6, 7, 8])).expect("a");
    trace.assign("b", column(&[10, 20, 30, 40, 50, 60, 70, 80])).expect("b");
    trace.assign("c", column(&[8, 7, 6, 5, 4, 3, 2, 1])).expect("c");
    trace.assign("d", column(rhs_b)).expect("d");

    let argument = PermutationArgument::new(
        "copy",
        vec!["a".into(), "b".into()],
        vec!["c".into(), "d".into()],
        "z_perm",
        "first",
        "last",
    );
    (ProvingKey::new(trace), RelationSet::new().with_permutation(argument))
}

/// Reads of `value` are looked up in the 2-bit range table
pub fn lookup_circuit(values: &[u64]) -> (ProvingKey, RelationSet<Fr>) {
    let schema = TraceSchema::new(vec![
        ColumnSpec::precomputed("q_read"),
        ColumnSpec::precomputed("q_table"),
        ColumnSpec::precomputed("table"),
        ColumnSpec::witness("value"),
        ColumnSpec::witness("counts"),
        ColumnSpec::derived("inverses"),
    ])
    .expect("schema");
    let mut trace = Trace::new(schema, 8).expect("trace");
    trace.assign("q_read", column(&[1, 1, 1, 1, 1, 1, 0, 0])).expect("q_read");
    trace.assign("q_table", column(&[1, 1, 1, 1, 0, 0, 0, 0])).expect("q_table");
    trace.assign("table", column(&[0, 1, 2, 3, 0, 0, 0, 0])).expect("table");
    trace.assign("value", column(values)).expect("value");

    let argument = LookupArgument::new(
        "range",
        "q_read",
        vec!["value".into()],
        "q_table",
        vec!["table".into()],
        "counts",
        "inverses",
    );
    let counts = argument.compute_counts(&trace).expect("counts");
    trace.assign("counts", counts).expect("counts");
    (ProvingKey::new(trace), RelationSet::new().with_lookup(argument))
}
