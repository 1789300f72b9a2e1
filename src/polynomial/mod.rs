//! Polynomial representations used by the prover
//!
//! - `MultilinearPolynomial`: evaluations over {0,1}^d, variables bound
//!   little-endian (variable k is bit k of the row index)
//! - `UnivariatePolynomial`: coefficient form, used when a column is read as
//!   a univariate polynomial by the opening argument
//! - `Univariate`: evaluations on {0, 1, ..., D}, the sum-check round message
//! - `PowPolynomial`: the ζ-power gate separator of the relation check

pub mod multilinear;
pub mod univariate;
pub mod pow;

pub use multilinear::MultilinearPolynomial;
pub use univariate::{Univariate, UnivariatePolynomial};
pub use pow::PowPolynomial;
