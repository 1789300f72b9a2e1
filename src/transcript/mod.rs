//! Blake2b Fiat-Shamir transcript
//!
//! Every message is absorbed as `label ‖ len (u64 le) ‖ bytes`, where the
//! bytes are the canonical compressed serialization of the value. The same
//! bytes are appended to the proof, without labels. A challenge absorbs its
//! label, hashes a copy of the running state, reduces the 64-byte digest mod
//! r and absorbs the digest back, so later challenges depend on it.
//!
//! Challenges are drawn in batches, and a batch is only allowed once at
//! least one message has been sent since the previous batch: a challenge that
//! binds nothing new is always a protocol-ordering bug.

use ark_ff::{PrimeField, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use blake2::Blake2b512;
use digest::{Digest, Output};

use crate::errors::TranscriptError;
use crate::field::Fr;

/// Ordered proof bytes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Proof {
    bytes: Vec<u8>,
}

impl Proof {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl From<Vec<u8>> for Proof {
    fn from(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Message of this many bytes
    ToVerifier(usize),
    Challenge,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Index of the challenge batch that closes this entry's round
    pub round: usize,
    pub label: String,
    pub direction: Direction,
}

/// Labels of everything sent and drawn, in order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.label.as_str())
    }

    /// Labels of the messages only, which is the layout of the proof bytes
    pub fn message_labels(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| matches!(e.direction, Direction::ToVerifier(_)))
            .map(|e| e.label.as_str())
    }

    fn push(&mut self, round: usize, label: &str, direction: Direction) {
        self.entries.push(ManifestEntry { round, label: label.to_string(), direction });
    }
}

/// Running Blake2b-512 state shared by both sides
#[derive(Clone)]
struct Sponge {
    hasher: Blake2b512,
}

impl Sponge {
    fn new(domain_separator: &[u8]) -> Self {
        let mut hasher = Blake2b512::default();
        hasher.update(domain_separator);
        Self { hasher }
    }

    fn absorb(&mut self, label: &str, bytes: &[u8]) {
        self.hasher.update(label.as_bytes());
        self.hasher.update((bytes.len() as u64).to_le_bytes());
        self.hasher.update(bytes);
    }

    fn squeeze(&mut self, label: &str) -> Fr {
        self.hasher.update(label.as_bytes());
        loop {
            let digest: Output<Blake2b512> = self.hasher.clone().finalize();
            self.hasher.update(digest);
            let challenge = Fr::from_le_bytes_mod_order(&digest);
            // probability 2^-255; squeeze again from the extended state
            if !challenge.is_zero() {
                return challenge;
            }
        }
    }
}

/// Tracks the "something was sent since the last batch" rule
#[derive(Debug, Clone, Copy, Default)]
struct RoundState {
    round: usize,
    pending: bool,
}

impl RoundState {
    fn message(&mut self) {
        self.pending = true;
    }

    fn close(&mut self, first_label: &str) -> Result<usize, TranscriptError> {
        if !self.pending {
            return Err(TranscriptError::UnboundChallenge(first_label.to_string()));
        }
        self.pending = false;
        self.round += 1;
        Ok(self.round - 1)
    }
}

pub struct ProverTranscript {
    sponge: Sponge,
    proof: Vec<u8>,
    manifest: Manifest,
    state: RoundState,
    exported: bool,
}

impl ProverTranscript {
    pub fn new(domain_separator: &[u8]) -> Self {
        Self {
            sponge: Sponge::new(domain_separator),
            proof: Vec::new(),
            manifest: Manifest::default(),
            state: RoundState::default(),
            exported: false,
        }
    }

    pub fn send_to_verifier<T: CanonicalSerialize>(
        &mut self,
        label: &str,
        value: &T,
    ) -> Result<(), TranscriptError> {
        if self.exported {
            return Err(TranscriptError::Exported(label.to_string()));
        }
        let mut bytes = Vec::with_capacity(value.compressed_size());
        value
            .serialize_compressed(&mut bytes)
            .map_err(|_| TranscriptError::Serialization(label.to_string()))?;

        self.sponge.absorb(label, &bytes);
        self.proof.extend_from_slice(&bytes);
        self.manifest.push(self.state.round, label, Direction::ToVerifier(bytes.len()));
        self.state.message();
        Ok(())
    }

    pub fn get_challenges<const N: usize>(&mut self, labels: [&str; N]) -> Result<[Fr; N], TranscriptError> {
        let first = labels.first().copied().unwrap_or("<empty batch>");
        if self.exported {
            return Err(TranscriptError::Exported(first.to_string()));
        }
        let round = self.state.close(first)?;
        Ok(labels.map(|label| {
            self.manifest.push(round, label, Direction::Challenge);
            self.sponge.squeeze(label)
        }))
    }

    pub fn get_challenge(&mut self, label: &str) -> Result<Fr, TranscriptError> {
        let [challenge] = self.get_challenges([label])?;
        Ok(challenge)
    }

    /// Freeze the transcript and return the proof
    ///
    /// Calling it again returns the same proof.
    pub fn export_proof(&mut self) -> Proof {
        self.exported = true;
        Proof { bytes: self.proof.clone() }
    }

    pub fn is_exported(&self) -> bool {
        self.exported
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn proof_size(&self) -> usize {
        self.proof.len()
    }
}

/// Replays a `Proof` and recomputes the prover's challenges
pub struct VerifierTranscript<'p> {
    sponge: Sponge,
    data: &'p [u8],
    cursor: usize,
    manifest: Manifest,
    state: RoundState,
}

impl<'p> VerifierTranscript<'p> {
    pub fn new(domain_separator: &[u8], proof: &'p Proof) -> Self {
        Self {
            sponge: Sponge::new(domain_separator),
            data: &proof.bytes,
            cursor: 0,
            manifest: Manifest::default(),
            state: RoundState::default(),
        }
    }

    pub fn receive_from_prover<T: CanonicalDeserialize>(&mut self, label: &str) -> Result<T, TranscriptError> {
        let mut reader = &self.data[self.cursor..];
        let value = T::deserialize_compressed(&mut reader)
            .map_err(|_| TranscriptError::MalformedProof(label.to_string()))?;
        let consumed = self.data.len() - self.cursor - reader.len();
        let bytes = &self.data[self.cursor..self.cursor + consumed];

        self.sponge.absorb(label, bytes);
        self.cursor += consumed;
        self.manifest.push(self.state.round, label, Direction::ToVerifier(consumed));
        self.state.message();
        Ok(value)
    }

    pub fn get_challenges<const N: usize>(&mut self, labels: [&str; N]) -> Result<[Fr; N], TranscriptError> {
        let first = labels.first().copied().unwrap_or("<empty batch>");
        let round = self.state.close(first)?;
        Ok(labels.map(|label| {
            self.manifest.push(round, label, Direction::Challenge);
            self.sponge.squeeze(label)
        }))
    }

    pub fn get_challenge(&mut self, label: &str) -> Result<Fr, TranscriptError> {
        let [challenge] = self.get_challenges([label])?;
        Ok(challenge)
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// All proof bytes must have been consumed
    pub fn finish(self) -> Result<(), TranscriptError> {
        match self.data.len() - self.cursor {
            0 => Ok(()),
            rest => Err(TranscriptError::TrailingBytes(rest)),
        }
    }
}
