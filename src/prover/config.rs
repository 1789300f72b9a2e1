//! Prover configuration

/// Domain separator absorbed before anything else
pub const DEFAULT_DOMAIN_SEPARATOR: &[u8] = b"honk-prover/v1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProverConfig {
    domain_separator: Vec<u8>,
    /// Evaluate every relation on every row before the relation check and
    /// log the first violation
    check_trace: bool,
    /// Size of a dedicated rayon pool for `construct_proof`; `None` runs on
    /// the global pool
    num_threads: Option<usize>,
}

impl Default for ProverConfig {
    fn default() -> Self {
        Self { domain_separator: DEFAULT_DOMAIN_SEPARATOR.to_vec(), check_trace: false, num_threads: None }
    }
}

impl ProverConfig {
    pub fn with_domain_separator(mut self, domain_separator: impl Into<Vec<u8>>) -> Self {
        self.domain_separator = domain_separator.into();
        self
    }

    pub fn with_trace_check(mut self, check_trace: bool) -> Self {
        self.check_trace = check_trace;
        self
    }

    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    pub fn domain_separator(&self) -> &[u8] {
        &self.domain_separator
    }

    pub fn check_trace(&self) -> bool {
        self.check_trace
    }

    pub fn num_threads(&self) -> Option<usize> {
        self.num_threads
    }
}
