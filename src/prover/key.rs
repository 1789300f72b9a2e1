//! Proving and verification keys

use ark_ff::{BigInteger, PrimeField, Zero};
use ark_serialize::CanonicalSerialize;
use sha3::{Digest, Sha3_256};

use crate::commitment::CommitmentKey;
use crate::errors::{ConfigError, ProverError, TranscriptError};
use crate::field::Fr;
use crate::polynomial::MultilinearPolynomial;
use crate::relations::{ColumnRegistry, RelationSet};
use crate::trace::{ColumnKind, Trace};
use crate::utils::num_vars_for_size;

/// Trace data of one circuit instance
///
/// Derived columns start zeroed; the prover fills them in the round that
/// commits them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvingKey {
    trace: Trace<Fr>,
}

impl ProvingKey {
    pub fn new(trace: Trace<Fr>) -> Self {
        Self { trace }
    }

    pub fn circuit_size(&self) -> usize {
        self.trace.circuit_size()
    }

    pub fn num_vars(&self) -> usize {
        num_vars_for_size(self.circuit_size())
    }

    pub fn trace(&self) -> &Trace<Fr> {
        &self.trace
    }

    pub(crate) fn trace_mut(&mut self) -> &mut Trace<Fr> {
        &mut self.trace
    }
}

/// Commitments to the precomputed columns plus a digest binding the circuit
/// shape, shared by prover and verifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationKey<C> {
    pub circuit_size: usize,
    pub num_vars: usize,
    pub precomputed: Vec<(String, C)>,
    pub digest: [u8; 32],
}

impl<C: Clone + CanonicalSerialize> VerificationKey<C> {
    #[tracing::instrument(skip_all, name = "VerificationKey::from_proving_key", fields(circuit_size = key.circuit_size()))]
    pub fn from_proving_key<CK>(key: &ProvingKey, relations: &RelationSet<Fr>, ck: &CK) -> Result<Self, ProverError>
    where
        CK: CommitmentKey<Fr, Commitment = C>,
    {
        let trace = key.trace();
        let mut precomputed = Vec::new();
        for (spec, values) in trace.columns() {
            if spec.kind == ColumnKind::Precomputed {
                precomputed.push((spec.name.clone(), ck.commit(values)?));
            }
        }

        let mut hasher = Sha3_256::new();
        hasher.update((key.circuit_size() as u64).to_le_bytes());
        for spec in trace.schema().columns() {
            update_str(&mut hasher, &spec.name);
            update_str(&mut hasher, spec.kind.as_str());
            hasher.update(spec.boundary.value().into_bigint().to_bytes_le());
        }
        for relation in relations.relations() {
            let schema = relation.schema();
            update_str(&mut hasher, relation.name());
            for column in &schema.columns {
                update_str(&mut hasher, &column.name);
                hasher.update([column.shifted as u8]);
            }
            for sub in &schema.subrelations {
                hasher.update((sub.degree as u64).to_le_bytes());
                hasher.update([sub.linearly_independent as u8]);
            }
        }
        for (name, commitment) in &precomputed {
            let mut bytes = Vec::new();
            commitment
                .serialize_compressed(&mut bytes)
                .map_err(|_| TranscriptError::Serialization(name.clone()))?;
            hasher.update(&bytes);
        }

        Ok(Self {
            circuit_size: key.circuit_size(),
            num_vars: key.num_vars(),
            precomputed,
            digest: hasher.finalize().into(),
        })
    }

    pub fn commitment(&self, name: &str) -> Option<&C> {
        self.precomputed.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }
}

fn update_str(hasher: &mut Sha3_256, s: &str) {
    hasher.update((s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}

/// Every entity as a multilinear table: trace columns in schema order, then
/// one next-row table per shifted column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProverPolynomials {
    entities: Vec<MultilinearPolynomial<Fr>>,
}

impl ProverPolynomials {
    #[tracing::instrument(skip_all, name = "ProverPolynomials::new", fields(entities = registry.len()))]
    pub fn new(trace: &Trace<Fr>, registry: &ColumnRegistry) -> Self {
        let num_vars = num_vars_for_size(trace.circuit_size());
        let mut entities: Vec<MultilinearPolynomial<Fr>> = (0..registry.num_unshifted())
            .map(|idx| MultilinearPolynomial::from_evaluations(trace.column_at(idx).to_vec(), num_vars))
            .collect();
        for &base in registry.shifted_bases() {
            let boundary = trace.schema().columns()[base].boundary.value();
            let shifted = entities[base].shifted(boundary);
            entities.push(shifted);
        }
        Self { entities }
    }

    pub fn entities(&self) -> &[MultilinearPolynomial<Fr>] {
        &self.entities
    }

    pub fn get(&self, registry: &ColumnRegistry, name: &str) -> Option<&MultilinearPolynomial<Fr>> {
        registry.names().iter().position(|n| n == name).map(|idx| &self.entities[idx])
    }
}

/// Every column read shifted must start with zero
///
/// Derived columns are still zero-filled here; the prover checks them again
/// as each one is assigned.
pub(crate) fn check_shifted_columns(trace: &Trace<Fr>, registry: &ColumnRegistry) -> Result<(), ConfigError> {
    for &base in registry.shifted_bases() {
        let spec = &trace.schema().columns()[base];
        if !trace.column_at(base)[0].is_zero() {
            return Err(ConfigError::ShiftedColumnNonZeroStart(spec.name.clone()));
        }
    }
    Ok(())
}
