//! Field and group primitives
//!
//! The prover is instantiated over BLS12-381: trace columns live in the
//! scalar field `Fr`, commitments in `G1`. Arithmetic comes from arkworks.

pub use ark_bls12_381::{Bls12_381, Fr, G1Affine, G1Projective, G2Affine, G2Projective};
pub use ark_ff::{Field, PrimeField};
