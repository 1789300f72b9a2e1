//! End-to-end proving runs checked by the test verifier

mod common;

use common::{
    add_circuit, column, counter_circuit, lookup_circuit, permutation_circuit, setup, Add, Rejection, Verifier,
};
use honk_prover::field::Fr;
use honk_prover::prover::DEFAULT_DOMAIN_SEPARATOR;
use honk_prover::{
    ColumnSpec, ConfigError, Proof, Prover, ProverConfig, ProverError, ProverState, ProvingKey, RelationSet, Trace,
    TraceSchema,
};

fn prove(key: ProvingKey, relations: &RelationSet<Fr>, size: usize) -> Result<(), Rejection> {
    let (ck, kzg) = setup(size);
    let schema = key.trace().schema().clone();
    let mut prover = Prover::new(key, relations, &ck, ProverConfig::default()).expect("prover");
    let proof = prover.construct_proof().expect("proof");
    assert_eq!(prover.state(), ProverState::Exported);

    Verifier {
        domain_separator: DEFAULT_DOMAIN_SEPARATOR,
        schema: &schema,
        relations,
        vk: prover.verification_key(),
        kzg: &kzg,
    }
    .verify(&proof)
}

#[test]
fn add_gate_verifies() {
    for size in [2, 4, 64] {
        let (key, relations) = add_circuit(size);
        assert_eq!(prove(key, &relations, size), Ok(()), "size {}", size);
    }
}

#[test]
fn flipped_output_fails_the_sumcheck() {
    let (key, relations) = add_circuit(4);
    let mut trace = key.trace().clone();
    let mut c = trace.column("c").expect("c").to_vec();
    c[2] += Fr::from(1u64);
    trace.assign("c", c).expect("c");

    let result = prove(ProvingKey::new(trace), &relations, 4);
    assert!(
        matches!(result, Err(Rejection::SumcheckRound(0)) | Err(Rejection::SumcheckFinal)),
        "{:?}",
        result
    );
}

#[test]
fn identical_inputs_give_identical_proofs() {
    let (ck, _) = setup(16);
    let run = || -> Proof {
        let (key, relations) = add_circuit(16);
        Prover::new(key, &relations, &ck, ProverConfig::default())
            .and_then(|mut p| p.construct_proof())
            .expect("proof")
    };
    let first = run();
    assert_eq!(first.as_bytes(), run().as_bytes());

    let (key, relations) = add_circuit(16);
    let separated = Prover::new(key, &relations, &ck, ProverConfig::default().with_domain_separator("other"))
        .and_then(|mut p| p.construct_proof())
        .expect("proof");
    assert_eq!(first.len(), separated.len());
    assert_ne!(first, separated);
}

#[test]
fn missing_column_is_reported_before_proving() {
    let schema = TraceSchema::new(vec![
        ColumnSpec::precomputed("q"),
        ColumnSpec::witness("a"),
        ColumnSpec::witness("b"),
    ])
    .expect("schema");
    let key = ProvingKey::new(Trace::new(schema, 4).expect("trace"));
    let relations = RelationSet::new().with_relation(Add);
    let (ck, _) = setup(4);

    let result = Prover::new(key, &relations, &ck, ProverConfig::default());
    assert!(matches!(
        result,
        Err(ProverError::Config(ConfigError::MissingColumn { ref relation, ref column }))
            if relation == "add" && column == "c"
    ));
}

#[test]
fn shifted_column_with_constant_boundary_verifies() {
    let (key, relations) = counter_circuit(8);
    assert_eq!(prove(key, &relations, 8), Ok(()));
}

#[test]
fn shifted_column_must_start_at_zero() {
    let (key, relations) = counter_circuit(8);
    let mut trace = key.trace().clone();
    trace.assign("x", (1..9u64).map(Fr::from).collect()).expect("x");
    let (ck, _) = setup(8);
    assert!(matches!(
        Prover::new(ProvingKey::new(trace), &relations, &ck, ProverConfig::default()),
        Err(ProverError::Config(ConfigError::ShiftedColumnNonZeroStart(_)))
    ));
}

#[test]
fn permutation_argument_verifies() {
    let (key, relations) = permutation_circuit(&[80, 70, 60, 50, 40, 30, 20, 10]);
    assert_eq!(prove(key, &relations, 8), Ok(()));
}

#[test]
fn broken_permutation_is_rejected() {
    let (key, relations) = permutation_circuit(&[80, 70, 60, 50, 40, 30, 20, 11]);
    assert!(prove(key, &relations, 8).is_err());
}

#[test]
fn lookup_argument_verifies() {
    let (key, relations) = lookup_circuit(&[3, 0, 2, 2, 1, 3, 17, 42]);
    assert_eq!(prove(key, &relations, 8), Ok(()));
}

#[test]
fn edited_lookup_counts_are_rejected() {
    let (key, relations) = lookup_circuit(&[3, 0, 2, 2, 1, 3, 17, 42]);
    let mut trace = key.trace().clone();
    // honest multiplicities are [1, 1, 2, 2]; move one hit from 3 to 0
    trace.assign("counts", column(&[2, 1, 2, 1, 0, 0, 0, 0])).expect("counts");
    assert_eq!(prove(ProvingKey::new(trace), &relations, 8), Err(Rejection::SumcheckRound(0)));
}

#[test]
fn unowned_derived_column_is_a_configuration_error() {
    let schema = TraceSchema::new(vec![
        ColumnSpec::precomputed("q"),
        ColumnSpec::witness("a"),
        ColumnSpec::witness("b"),
        ColumnSpec::witness("c"),
        ColumnSpec::derived("h"),
    ])
    .expect("schema");
    let key = ProvingKey::new(Trace::new(schema, 4).expect("trace"));
    let relations = RelationSet::new().with_relation(Add);
    let (ck, _) = setup(4);

    assert!(matches!(
        Prover::new(key, &relations, &ck, ProverConfig::default()),
        Err(ProverError::Config(ConfigError::UnownedDerivedColumn(ref name))) if name == "h"
    ));
}

#[test]
fn manifest_includes_the_optional_rounds() {
    let (ck, _) = setup(8);
    let (key, relations) = permutation_circuit(&[80, 70, 60, 50, 40, 30, 20, 10]);
    let mut prover = Prover::new(key, &relations, &ck, ProverConfig::default()).expect("prover");
    prover.construct_proof().expect("proof");
    let labels: Vec<&str> = prover.manifest().labels().collect();
    assert_eq!(&labels[..10], ["circuit_size", "vk_digest", "a", "b", "c", "d", "beta", "gamma", "z_perm", "alpha"]);

    let (key, relations) = lookup_circuit(&[3, 0, 2, 2, 1, 3, 0, 0]);
    let mut prover = Prover::new(key, &relations, &ck, ProverConfig::default()).expect("prover");
    prover.construct_proof().expect("proof");
    let labels: Vec<&str> = prover.manifest().labels().collect();
    assert_eq!(&labels[..7], ["circuit_size", "vk_digest", "value", "counts", "beta", "gamma", "inverses"]);
}

#[test]
fn rounds_out_of_order_are_rejected() {
    let (key, relations) = lookup_circuit(&[3, 0, 2, 2, 1, 3, 0, 0]);
    let (ck, _) = setup(8);
    let mut prover = Prover::new(key, &relations, &ck, ProverConfig::default()).expect("prover");

    prover.execute_preamble_round().expect("preamble");
    assert_eq!(
        prover.execute_grand_product_round(),
        Err(ProverError::OutOfOrder { requested: "execute_grand_product_round", state: "WireCommitments" })
    );
    prover.execute_wire_commitments_round().expect("wires");
    assert_eq!(prover.state(), ProverState::LogDerivative);
    assert!(prover.execute_relation_check_rounds().is_err());
    prover.execute_log_derivative_round().expect("lookup");
    assert_eq!(prover.state(), ProverState::RelationCheck);
}

#[test]
fn tampered_proof_is_rejected() {
    let (key, relations) = add_circuit(8);
    let (ck, kzg) = setup(8);
    let schema = key.trace().schema().clone();
    let mut prover = Prover::new(key, &relations, &ck, ProverConfig::default()).expect("prover");
    let proof = prover.construct_proof().expect("proof");
    let verifier = Verifier {
        domain_separator: DEFAULT_DOMAIN_SEPARATOR,
        schema: &schema,
        relations: &relations,
        vk: prover.verification_key(),
        kzg: &kzg,
    };
    assert_eq!(verifier.verify(&proof), Ok(()));

    let len = proof.len();
    for position in [len / 3, len / 2, len - 1] {
        let mut bytes = proof.as_bytes().to_vec();
        bytes[position] ^= 0x01;
        assert!(verifier.verify(&Proof::from(bytes)).is_err(), "flip at {}", position);
    }

    let mut truncated = proof.as_bytes().to_vec();
    truncated.pop();
    assert!(matches!(verifier.verify(&Proof::from(truncated)), Err(Rejection::Transcript(_))));

    let wrong_domain = Verifier { domain_separator: b"other", ..verifier };
    assert!(wrong_domain.verify(&proof).is_err());
}

#[test]
fn trace_check_does_not_change_the_proof() {
    let (ck, _) = setup(4);
    let (key, relations) = add_circuit(4);
    let mut trace = key.trace().clone();
    trace.assign("a", column(&[9, 9, 9, 9])).expect("a");

    let plain = Prover::new(ProvingKey::new(trace.clone()), &relations, &ck, ProverConfig::default())
        .and_then(|mut p| p.construct_proof())
        .expect("proof");
    let checked = Prover::new(ProvingKey::new(trace), &relations, &ck, ProverConfig::default().with_trace_check(true))
        .and_then(|mut p| p.construct_proof())
        .expect("proof");
    assert_eq!(plain, checked);
}
