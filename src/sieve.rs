//! # Sieve — Small-Prime Generation
//!
//! Prime tables feed three consumers: the CFRAC factor base (candidate odd
//! primes to filter by Legendre symbol), the p−1 and p+1 smoothness loops
//! (prime powers up to the stage bound), and the driver's trial-division
//! screen. Provides:
//!
//! 1. **Prime generation** (`generate_primes`) via an odd-only bitmap sieve
//!    of Eratosthenes — one bit per odd number, composites marked from p²
//!    in strides of 2p.
//! 2. **Windowed generation** (`primes_in_range`) — a segmented sieve over
//!    [lo, hi] driven by the base primes up to √hi. The factor-base builder
//!    grows its candidate window with this instead of re-sieving from
//!    scratch every time the Legendre filter comes up short.
//! 3. **Modular exponentiation** (`pow_mod`) on u64, MSB-first over the
//!    exponent bits with u128 intermediates — the same ladder shape as the
//!    crate's arbitrary-precision exponentiation.
//! 4. **Trial-division factorization** (`factor_u64`): powers of two peeled
//!    off by `trailing_zeros`, then odd divisors only. Used for small
//!    cofactors and for refactoring CFRAC residues in tests.

use crate::error::FactorError;

/// Largest accepted sieve bound. One bit covers each odd number, so this
/// keeps the bitmap (~600 MB here) inside addressable memory.
pub const MAX_SIEVE_BOUND: u64 = 10_000_000_000;

/// Index of the odd number v ≥ 3 in the bitmap.
#[inline]
fn odd_index(v: usize) -> usize {
    (v - 3) / 2
}

/// Generate all primes up to `limit` (inclusive) with an odd-only bitmap.
///
/// Bit i stands for the odd number 2i + 3; a set bit marks a composite.
/// Memory is one bit per odd number, 1/16 of a naive byte sieve.
pub fn generate_primes(limit: u64) -> Vec<u64> {
    if limit < 2 {
        return vec![];
    }
    let limit = limit as usize;
    let odds = if limit >= 3 { (limit - 1) / 2 } else { 0 };
    let mut composite = vec![0u64; odds.div_ceil(64).max(1)];

    let mut d = 3usize;
    while d * d <= limit {
        let di = odd_index(d);
        if composite[di / 64] >> (di % 64) & 1 == 0 {
            // First unmarked multiple is d²; smaller ones carry a smaller
            // prime factor and are already marked.
            let mut m = d * d;
            while m <= limit {
                let mi = odd_index(m);
                composite[mi / 64] |= 1 << (mi % 64);
                m += 2 * d;
            }
        }
        d += 2;
    }

    let mut primes = Vec::with_capacity(prime_count_hint(limit));
    primes.push(2);
    for i in 0..odds {
        if composite[i / 64] >> (i % 64) & 1 == 0 {
            primes.push((2 * i + 3) as u64);
        }
    }
    primes
}

/// Primes in [lo, hi], sieved as one segment.
///
/// Composites in the window are struck out by the base primes ≤ √hi; the
/// CFRAC factor-base builder calls this repeatedly with adjacent windows,
/// so already-scanned candidates are never re-sieved.
pub fn primes_in_range(lo: u64, hi: u64) -> Vec<u64> {
    if hi < lo || hi < 2 {
        return vec![];
    }
    let mut out = Vec::new();
    if lo <= 2 {
        out.push(2);
    }

    // The odd window [start, hi].
    let mut start = lo.max(3);
    if start % 2 == 0 {
        start += 1;
    }
    if start > hi {
        return out;
    }
    let odds = ((hi - start) / 2 + 1) as usize;
    let mut composite = vec![0u64; odds.div_ceil(64).max(1)];

    let root = (hi as f64).sqrt() as u64 + 1;
    for &p in generate_primes(root).iter().skip(1) {
        if p * p > hi {
            break;
        }
        // First odd multiple of p inside the window, never below p².
        let mut m = p * p;
        if m < start {
            m = start.div_ceil(p) * p;
            if m % 2 == 0 {
                m += p;
            }
        }
        while m <= hi {
            let idx = ((m - start) / 2) as usize;
            composite[idx / 64] |= 1 << (idx % 64);
            m += 2 * p;
        }
    }

    for i in 0..odds {
        if composite[i / 64] >> (i % 64) & 1 == 0 {
            out.push(start + 2 * i as u64);
        }
    }
    out
}

/// Like [`generate_primes`], but rejects bounds that would not fit in memory.
///
/// The p−1 reference variant computes its stage bound from n and clamps it to
/// 10^15; a caller-supplied bound is not clamped, so it is validated here.
pub fn generate_primes_checked(limit: u64) -> Result<Vec<u64>, FactorError> {
    if limit > MAX_SIEVE_BOUND {
        return Err(FactorError::CapacityExceeded(limit));
    }
    Ok(generate_primes(limit))
}

/// Capacity hint from the prime counting function, n/(ln n − 1).
fn prime_count_hint(n: usize) -> usize {
    if n < 17 {
        return 8;
    }
    let nf = n as f64;
    (nf / (nf.ln() - 1.0)) as usize + 8
}

/// a·b mod m without overflow, via u128 widening.
#[inline]
fn mul_mod(a: u64, b: u64, m: u64) -> u64 {
    (a as u128 * b as u128 % m as u128) as u64
}

/// base^exp mod modulus, scanning the exponent from its most significant
/// bit — square always, multiply on set bits.
pub fn pow_mod(base: u64, exp: u64, modulus: u64) -> u64 {
    if modulus == 1 {
        return 0;
    }
    let base = base % modulus;
    let mut acc = 1u64;
    for i in (0..64 - exp.leading_zeros()).rev() {
        acc = mul_mod(acc, acc, modulus);
        if exp >> i & 1 == 1 {
            acc = mul_mod(acc, base, modulus);
        }
    }
    acc
}

/// Trial-division factorization of a u64 into ascending (prime, exponent)
/// pairs. Powers of two come off in one step; only odd divisors are tried
/// after that.
pub fn factor_u64(mut n: u64) -> Vec<(u64, u32)> {
    let mut factors = Vec::new();
    if n == 0 {
        return factors;
    }
    let twos = n.trailing_zeros();
    if twos > 0 {
        factors.push((2, twos));
        n >>= twos;
    }
    let mut d = 3u64;
    while d * d <= n {
        if n % d == 0 {
            let mut exp = 0u32;
            while n % d == 0 {
                n /= d;
                exp += 1;
            }
            factors.push((d, exp));
        }
        d += 2;
    }
    if n > 1 {
        factors.push((n, 1));
    }
    factors
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The sieve must agree with a hand-checked prefix of the primes.
    #[test]
    fn generate_primes_small_prefix() {
        assert_eq!(
            generate_primes(30),
            vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]
        );
    }

    /// Degenerate limits: below 2 there are no primes; 2 itself sits
    /// outside the odd bitmap and must still be emitted.
    #[test]
    fn generate_primes_degenerate_limits() {
        assert!(generate_primes(0).is_empty());
        assert!(generate_primes(1).is_empty());
        assert_eq!(generate_primes(2), vec![2]);
        assert_eq!(generate_primes(5), vec![2, 3, 5]);
        assert_eq!(generate_primes(6), vec![2, 3, 5]);
    }

    /// pi(10^6) = 78498 — a classic checksum for sieve correctness.
    #[test]
    fn generate_primes_count_to_one_million() {
        assert_eq!(generate_primes(1_000_000).len(), 78_498);
    }

    /// A prime limit must be included; its successor must not introduce
    /// anything new until the next prime.
    #[test]
    fn generate_primes_inclusive_bound() {
        let upto_97 = generate_primes(97);
        assert_eq!(*upto_97.last().unwrap(), 97);
        assert_eq!(generate_primes(100), upto_97);
    }

    /// A segment starting at 2 reproduces the plain sieve, and adjacent
    /// windows concatenate to it — the property the factor-base builder
    /// depends on.
    #[test]
    fn primes_in_range_matches_plain_sieve() {
        assert_eq!(primes_in_range(2, 500), generate_primes(500));
        let mut stitched = primes_in_range(2, 100);
        stitched.extend(primes_in_range(101, 350));
        stitched.extend(primes_in_range(351, 500));
        assert_eq!(stitched, generate_primes(500));
    }

    /// Interior windows: exact contents, inclusive bounds on both ends,
    /// and the empty cases.
    #[test]
    fn primes_in_range_windows() {
        assert_eq!(primes_in_range(10, 30), vec![11, 13, 17, 19, 23, 29]);
        assert_eq!(primes_in_range(23, 29), vec![23, 29]);
        assert_eq!(primes_in_range(90, 96), vec![]);
        assert_eq!(primes_in_range(30, 10), vec![]);
        assert_eq!(primes_in_range(0, 1), vec![]);
        // A window consisting of one prime square
        assert_eq!(primes_in_range(49, 49), vec![]);
    }

    /// Bounds above `MAX_SIEVE_BOUND` are rejected rather than attempted.
    #[test]
    fn generate_primes_checked_rejects_huge_bound() {
        let err = generate_primes_checked(MAX_SIEVE_BOUND + 1).unwrap_err();
        assert_eq!(err, FactorError::CapacityExceeded(MAX_SIEVE_BOUND + 1));
        assert!(generate_primes_checked(1000).is_ok());
    }

    /// pow_mod against independently computed values, including the
    /// modulus-1 convention and exponent 0.
    #[test]
    fn pow_mod_known_values() {
        assert_eq!(pow_mod(2, 10, 1000), 24);
        assert_eq!(pow_mod(3, 0, 17), 1);
        assert_eq!(pow_mod(5, 3, 1), 0);
        // Fermat: a^(p-1) ≡ 1 (mod p)
        assert_eq!(pow_mod(7, 1_000_002, 1_000_003), 1);
        // Widening check: squaring near 2^63 must not overflow
        assert_eq!(pow_mod(u64::MAX - 1, 2, u64::MAX), 1);
    }

    /// factor_u64 must recover known factorizations with exponents.
    #[test]
    fn factor_u64_known_values() {
        assert_eq!(factor_u64(360), vec![(2, 3), (3, 2), (5, 1)]);
        assert_eq!(factor_u64(97), vec![(97, 1)]);
        assert_eq!(factor_u64(1), vec![]);
        assert_eq!(factor_u64(0), vec![]);
        assert_eq!(factor_u64(1 << 20), vec![(2, 20)]);
        assert_eq!(factor_u64(2047), vec![(23, 1), (89, 1)]);
    }
}
