//! Size helpers shared by the trace and the prover

pub mod batching;

use ark_std::log2;

use crate::errors::ConfigError;

/// n such that 2^n = size (size must already be a power of two)
pub fn num_vars_for_size(size: usize) -> usize {
    log2(size) as usize
}

/// Variable count of a trace with `circuit_size` rows, or an error if the
/// size is zero or not a power of two
pub fn checked_num_vars(circuit_size: usize) -> Result<usize, ConfigError> {
    if !circuit_size.is_power_of_two() {
        return Err(ConfigError::CircuitSizeNotPowerOfTwo(circuit_size));
    }
    Ok(num_vars_for_size(circuit_size))
}
