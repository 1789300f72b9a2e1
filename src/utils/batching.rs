//! Random linear combinations of polynomials and claims
//!
//! Many claims p_i(r) = v_i at one point collapse into
//!   Σ ρ^i·p_i(r) = Σ ρ^i·v_i
//! and a single opening. If any p_i(r) ≠ v_i the batched claim fails except
//! with probability ≤ N/|F| over ρ.

use ark_ff::Field;
use rayon::prelude::*;

use crate::polynomial::multilinear::PARALLEL_THRESHOLD;

/// Compute powers of α: [1, α, α^2, ..., α^(n-1)]
pub fn powers_of_alpha<F: Field>(alpha: &F, n: usize) -> Vec<F> {
    let mut powers = Vec::with_capacity(n);
    let mut current = F::one();

    for _ in 0..n {
        powers.push(current);
        current *= alpha;
    }

    powers
}

/// Compute batched evaluation: Σ scalars[i] · values[i]
pub fn batch_values<F: Field>(values: &[F], scalars: &[F]) -> F {
    assert_eq!(values.len(), scalars.len(), "one scalar per value");
    values.iter().zip(scalars).map(|(v, s)| *v * s).sum()
}

/// Accumulate Σ scalars[i] · polynomials[i] into `acc`
pub fn batch_polynomials_into<F: Field>(acc: &mut [F], polynomials: &[&[F]], scalars: &[F]) {
    assert_eq!(polynomials.len(), scalars.len(), "one scalar per polynomial");
    for (poly, scalar) in polynomials.iter().zip(scalars) {
        assert_eq!(poly.len(), acc.len(), "All polynomials must have same size");
        if acc.len() >= PARALLEL_THRESHOLD {
            acc.par_iter_mut().zip(poly.par_iter()).for_each(|(a, p)| *a += *scalar * p);
        } else {
            acc.iter_mut().zip(poly.iter()).for_each(|(a, p)| *a += *scalar * p);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Fr;
    use ark_ff::{One, Zero};

    #[test]
    fn test_batch_values() {
        let values = vec![Fr::from(5u64), Fr::from(10u64), Fr::from(15u64)];
        let scalars = powers_of_alpha(&Fr::from(2u64), 3);

        // Expected: 5·1 + 10·2 + 15·4 = 85
        assert_eq!(batch_values(&values, &scalars), Fr::from(85u64));
    }

    #[test]
    fn test_powers_of_alpha() {
        let powers = powers_of_alpha(&Fr::from(3u64), 5);

        assert_eq!(powers.len(), 5);
        assert_eq!(powers[0], Fr::one());
        assert_eq!(powers[1], Fr::from(3u64));
        assert_eq!(powers[2], Fr::from(9u64));
        assert_eq!(powers[3], Fr::from(27u64));
        assert_eq!(powers[4], Fr::from(81u64));
    }

    #[test]
    fn test_batch_polynomials() {
        // p1 = [1, 2], p2 = [3, 4], p3 = [5, 6], α = 10
        let poly1 = vec![Fr::from(1u64), Fr::from(2u64)];
        let poly2 = vec![Fr::from(3u64), Fr::from(4u64)];
        let poly3 = vec![Fr::from(5u64), Fr::from(6u64)];
        let scalars = powers_of_alpha(&Fr::from(10u64), 3);

        let mut batched = vec![Fr::zero(); 2];
        batch_polynomials_into(&mut batched, &[&poly1, &poly2, &poly3], &scalars);

        assert_eq!(batched, vec![Fr::from(531u64), Fr::from(642u64)]);
    }
}
