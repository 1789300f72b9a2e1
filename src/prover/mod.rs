//! Proving run orchestration
//!
//! A `Prover` owns one proving run and advances through its rounds in a
//! fixed order:
//!
//! Preamble → WireCommitments → [LogDerivative] → [GrandProduct] →
//! RelationCheck → OpeningProof → ReadyToExport → Exported
//!
//! The two bracketed rounds only run when the relation set contains lookup
//! or permutation arguments. Calling a round out of order is an error, so a
//! misordered integration fails before touching the transcript. A round
//! that fails after it started moves the prover to `Failed`, and every later
//! call is refused.

mod config;
mod key;

pub use config::{ProverConfig, DEFAULT_DOMAIN_SEPARATOR};
pub use key::{ProverPolynomials, ProvingKey, VerificationKey};

use ark_ff::Zero;

use crate::commitment::CommitmentKey;
use crate::errors::{ConfigError, ProverError, Result};
use crate::field::Fr;
use crate::relations::{ColumnRegistry, OptionalRounds, RelationParameters, RelationSet};
use crate::sumcheck::{RelationBatch, SumcheckOutput, SumcheckProver};
use crate::trace::ColumnKind;
use crate::transcript::{Manifest, ProverTranscript, Proof};
use crate::zeromorph::{OpeningClaims, ZeroMorphProver};

pub const CIRCUIT_SIZE_LABEL: &str = "circuit_size";
pub const VK_DIGEST_LABEL: &str = "vk_digest";
pub const BETA_LABEL: &str = "beta";
pub const GAMMA_LABEL: &str = "gamma";
pub const ALPHA_LABEL: &str = "alpha";
pub const ZETA_LABEL: &str = "Sumcheck:zeta";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProverState {
    Preamble,
    WireCommitments,
    LogDerivative,
    GrandProduct,
    RelationCheck,
    OpeningProof,
    ReadyToExport,
    Exported,
    Failed,
}

impl ProverState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProverState::Preamble => "Preamble",
            ProverState::WireCommitments => "WireCommitments",
            ProverState::LogDerivative => "LogDerivative",
            ProverState::GrandProduct => "GrandProduct",
            ProverState::RelationCheck => "RelationCheck",
            ProverState::OpeningProof => "OpeningProof",
            ProverState::ReadyToExport => "ReadyToExport",
            ProverState::Exported => "Exported",
            ProverState::Failed => "Failed",
        }
    }
}

pub struct Prover<'a, CK: CommitmentKey<Fr>> {
    key: ProvingKey,
    relations: &'a RelationSet<Fr>,
    registry: ColumnRegistry,
    rounds: OptionalRounds,
    ck: &'a CK,
    config: ProverConfig,
    vk: VerificationKey<CK::Commitment>,
    transcript: ProverTranscript,
    state: ProverState,
    params: RelationParameters<Fr>,
    sumcheck_output: Option<SumcheckOutput<Fr>>,
    proof: Option<Proof>,
}

impl<'a, CK: CommitmentKey<Fr>> Prover<'a, CK> {
    /// Check the key against the relations and the commitment key, then
    /// derive the verification key
    ///
    /// Every configuration error surfaces here, before any transcript
    /// interaction.
    #[tracing::instrument(skip_all, name = "Prover::new", fields(circuit_size = key.circuit_size()))]
    pub fn new(key: ProvingKey, relations: &'a RelationSet<Fr>, ck: &'a CK, config: ProverConfig) -> Result<Self> {
        let circuit_size = key.circuit_size();
        if key.num_vars() == 0 {
            return Err(ConfigError::CircuitTooSmall { circuit_size }.into());
        }
        if circuit_size > ck.max_size() {
            return Err(ConfigError::CommitmentKeyTooSmall { circuit_size, capacity: ck.max_size() }.into());
        }

        let registry = ColumnRegistry::build(key.trace().schema(), relations.relations())?;
        relations.validate(key.trace())?;
        key::check_shifted_columns(key.trace(), &registry)?;

        let vk = VerificationKey::from_proving_key(&key, relations, ck)?;
        let rounds = relations.rounds();
        tracing::debug!(
            entities = registry.len(),
            shifted = registry.num_shifted(),
            lookups = rounds.lookups,
            permutations = rounds.permutations,
            "prover configured"
        );

        Ok(Self {
            key,
            relations,
            registry,
            rounds,
            ck,
            transcript: ProverTranscript::new(config.domain_separator()),
            config,
            vk,
            state: ProverState::Preamble,
            params: RelationParameters::default(),
            sumcheck_output: None,
            proof: None,
        })
    }

    pub fn state(&self) -> ProverState {
        self.state
    }

    pub fn verification_key(&self) -> &VerificationKey<CK::Commitment> {
        &self.vk
    }

    pub fn registry(&self) -> &ColumnRegistry {
        &self.registry
    }

    pub fn proving_key(&self) -> &ProvingKey {
        &self.key
    }

    pub fn manifest(&self) -> &Manifest {
        self.transcript.manifest()
    }

    pub fn relation_parameters(&self) -> &RelationParameters<Fr> {
        &self.params
    }

    pub fn sumcheck_output(&self) -> Option<&SumcheckOutput<Fr>> {
        self.sumcheck_output.as_ref()
    }

    fn expect_state(&self, expected: ProverState, requested: &'static str) -> Result<()> {
        if self.state != expected {
            return Err(ProverError::OutOfOrder { requested, state: self.state.as_str() });
        }
        Ok(())
    }

    /// Move to `next` once a round body succeeded, or abort the run
    fn finish_round(&mut self, next: Result<ProverState>) -> Result<()> {
        match next {
            Ok(state) => {
                self.state = state;
                Ok(())
            }
            Err(err) => {
                tracing::error!(state = self.state.as_str(), error = %err, "proving run aborted");
                self.state = ProverState::Failed;
                Err(err)
            }
        }
    }

    fn commit_column(&mut self, name: &str) -> Result<()> {
        let values = self.key.trace().column(name).ok_or_else(|| ConfigError::MissingColumn {
            relation: "<prover>".to_string(),
            column: name.to_string(),
        })?;
        let commitment = self.ck.commit(values)?;
        self.transcript.send_to_verifier(name, &commitment)?;
        Ok(())
    }

    fn after_wires(&self) -> ProverState {
        if self.rounds.lookups {
            ProverState::LogDerivative
        } else {
            self.after_lookups()
        }
    }

    fn after_lookups(&self) -> ProverState {
        if self.rounds.permutations {
            ProverState::GrandProduct
        } else {
            ProverState::RelationCheck
        }
    }

    /// Bind the circuit shape: size and verification key digest
    pub fn execute_preamble_round(&mut self) -> Result<()> {
        self.expect_state(ProverState::Preamble, "execute_preamble_round")?;
        let next = self.preamble();
        self.finish_round(next)
    }

    fn preamble(&mut self) -> Result<ProverState> {
        self.transcript.send_to_verifier(CIRCUIT_SIZE_LABEL, &(self.key.circuit_size() as u64))?;
        self.transcript.send_to_verifier(VK_DIGEST_LABEL, &self.vk.digest)?;
        Ok(ProverState::WireCommitments)
    }

    /// Commit to every witness column, then draw β and γ if an argument
    /// needs them
    #[tracing::instrument(skip_all, name = "Prover::wire_commitments")]
    pub fn execute_wire_commitments_round(&mut self) -> Result<()> {
        self.expect_state(ProverState::WireCommitments, "execute_wire_commitments_round")?;
        let next = self.wire_commitments();
        self.finish_round(next)
    }

    fn wire_commitments(&mut self) -> Result<ProverState> {
        let witnesses: Vec<String> =
            self.key.trace().schema().names_of(ColumnKind::Witness).map(str::to_string).collect();
        for name in &witnesses {
            self.commit_column(name)?;
        }

        if self.rounds.needs_parameters() {
            let [beta, gamma] = self.transcript.get_challenges([BETA_LABEL, GAMMA_LABEL])?;
            self.params = RelationParameters { beta, gamma };
        }
        Ok(self.after_wires())
    }

    /// Derive and commit the lookup inverse columns
    #[tracing::instrument(skip_all, name = "Prover::log_derivative")]
    pub fn execute_log_derivative_round(&mut self) -> Result<()> {
        self.expect_state(ProverState::LogDerivative, "execute_log_derivative_round")?;
        let next = self.log_derivative();
        self.finish_round(next)
    }

    fn log_derivative(&mut self) -> Result<ProverState> {
        let relations = self.relations;
        for argument in relations.lookups() {
            let inverses = argument.compute_inverses(self.key.trace(), &self.params)?;
            self.assign_derived(&argument.inverses, inverses)?;
            self.commit_column(&argument.inverses)?;
        }
        Ok(self.after_lookups())
    }

    /// Derive and commit the permutation grand products
    #[tracing::instrument(skip_all, name = "Prover::grand_product")]
    pub fn execute_grand_product_round(&mut self) -> Result<()> {
        self.expect_state(ProverState::GrandProduct, "execute_grand_product_round")?;
        let next = self.grand_product();
        self.finish_round(next)
    }

    fn grand_product(&mut self) -> Result<ProverState> {
        let relations = self.relations;
        for argument in relations.permutations() {
            let grand_product = argument.compute_grand_product(self.key.trace(), &self.params)?;
            self.assign_derived(&argument.grand_product, grand_product)?;
            self.commit_column(&argument.grand_product)?;
        }
        Ok(ProverState::RelationCheck)
    }

    /// Store a derived column; one that is also read shifted must still
    /// start with zero
    fn assign_derived(&mut self, name: &str, values: Vec<Fr>) -> Result<()> {
        let idx = self.key.trace().schema().position(name).ok_or_else(|| ConfigError::MissingColumn {
            relation: "<prover>".to_string(),
            column: name.to_string(),
        })?;
        if self.registry.shifted_bases().contains(&idx) && values.first().is_some_and(|v| !v.is_zero()) {
            return Err(ConfigError::ShiftedColumnNonZeroStart(name.to_string()).into());
        }
        self.key.trace_mut().assign_derived(idx, values);
        Ok(())
    }

    /// Draw α and ζ, then run the sum-check over every entity
    #[tracing::instrument(skip_all, name = "Prover::relation_check")]
    pub fn execute_relation_check_rounds(&mut self) -> Result<()> {
        self.expect_state(ProverState::RelationCheck, "execute_relation_check_rounds")?;
        let next = self.relation_check();
        self.finish_round(next)
    }

    fn relation_check(&mut self) -> Result<ProverState> {
        if self.config.check_trace() {
            if let Some(failure) = self.relations.first_failure(self.key.trace(), &self.params)? {
                tracing::warn!(
                    relation = %failure.relation,
                    subrelation = failure.subrelation,
                    row = ?failure.row,
                    "trace does not satisfy the relations"
                );
            }
        }

        let [alpha, zeta] = self.transcript.get_challenges([ALPHA_LABEL, ZETA_LABEL])?;

        let polynomials = ProverPolynomials::new(self.key.trace(), &self.registry);
        let bound = self
            .relations
            .relations()
            .iter()
            .map(|relation| self.registry.bind(relation.as_ref()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let sumcheck = SumcheckProver::new(
            self.key.num_vars(),
            self.registry.num_unshifted(),
            RelationBatch::new(bound, alpha),
        );
        let output = sumcheck.prove(&mut self.transcript, polynomials.entities(), &self.params, zeta)?;

        self.sumcheck_output = Some(output);
        Ok(ProverState::OpeningProof)
    }

    /// Open every entity at the sum-check challenge
    #[tracing::instrument(skip_all, name = "Prover::zeromorph")]
    pub fn execute_zeromorph_rounds(&mut self) -> Result<()> {
        self.expect_state(ProverState::OpeningProof, "execute_zeromorph_rounds")?;
        let next = self.zeromorph();
        self.finish_round(next)
    }

    fn zeromorph(&mut self) -> Result<ProverState> {
        let output = self.sumcheck_output.as_ref().ok_or(ProverError::OutOfOrder {
            requested: "execute_zeromorph_rounds",
            state: self.state.as_str(),
        })?;

        let trace = self.key.trace();
        let claims = OpeningClaims {
            unshifted: (0..self.registry.num_unshifted()).map(|idx| trace.column_at(idx)).collect(),
            to_be_shifted: self.registry.shifted_bases().iter().map(|&base| trace.column_at(base)).collect(),
            boundaries: self
                .registry
                .shifted_bases()
                .iter()
                .map(|&base| trace.schema().columns()[base].boundary.value())
                .collect(),
            evaluations: &output.claimed_evaluations,
            challenge: &output.challenge,
        };
        ZeroMorphProver::new(self.ck).prove(&mut self.transcript, &claims)?;
        Ok(ProverState::ReadyToExport)
    }

    /// Freeze the transcript; idempotent once exported
    pub fn export_proof(&mut self) -> Result<Proof> {
        match self.state {
            ProverState::Exported => {}
            ProverState::ReadyToExport => {
                self.proof = Some(self.transcript.export_proof());
                self.state = ProverState::Exported;
                tracing::debug!(bytes = self.transcript.proof_size(), "proof exported");
            }
            state => {
                return Err(ProverError::OutOfOrder { requested: "export_proof", state: state.as_str() });
            }
        }
        self.proof.clone().ok_or(ProverError::OutOfOrder { requested: "export_proof", state: self.state.as_str() })
    }

    /// Run every remaining round in order and export
    #[tracing::instrument(skip_all, name = "Prover::construct_proof")]
    pub fn construct_proof(&mut self) -> Result<Proof> {
        match self.config.num_threads() {
            Some(num_threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(num_threads)
                    .build()
                    .map_err(|e| ConfigError::ThreadPool(e.to_string()))?;
                pool.install(|| self.run_rounds())
            }
            None => self.run_rounds(),
        }
    }

    fn run_rounds(&mut self) -> Result<Proof> {
        self.execute_preamble_round()?;
        self.execute_wire_commitments_round()?;
        if self.rounds.lookups {
            self.execute_log_derivative_round()?;
        }
        if self.rounds.permutations {
            self.execute_grand_product_round()?;
        }
        self.execute_relation_check_rounds()?;
        self.execute_zeromorph_rounds()?;
        self.export_proof()
    }
}
