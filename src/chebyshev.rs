//! # Chebyshev Polynomials mod n
//!
//! Evaluates T_k(x) mod n with a binary ladder over k's bits, maintaining
//! the pair (T_m, T_{m+1}) under the identities
//!
//! - T_{2m}(x)   = 2·T_m(x)² − 1
//! - T_{2m+1}(x) = 2·T_m(x)·T_{m+1}(x) − x
//! - T_{2m+2}(x) = 2·T_{m+1}(x)² − 1
//!
//! The Pollard ρ combined variant uses T₂ as one of its iteration maps;
//! T_k's composition law T_j(T_k) = T_{jk} is what makes the family act
//! like exponentiation on group orders.
//!
//! Two ladders are provided: the branching one, and a variant that computes
//! both successor pairs every step and picks by bit index, so the sequence
//! of arithmetic operations does not depend on the exponent's bit pattern.

use rug::ops::RemRounding;
use rug::Integer;

/// T_k(x) mod n via the branching pair ladder.
pub fn chebyshev_mod(k: &Integer, x: &Integer, n: &Integer) -> Integer {
    debug_assert!(*k >= 0);
    debug_assert!(*n >= 1);
    if *n == 1 {
        return Integer::new();
    }
    let x = x.clone().rem_euc(n);
    if *k == 0 {
        return Integer::from(1u32);
    }

    // (a, b) = (T_m, T_{m+1}), m = 0 before the scan; each bit doubles m
    // and the set bit shifts the pair up by one.
    let mut a = Integer::from(1u32);
    let mut b = x.clone();
    let bits = k.significant_bits();
    for i in (0..bits).rev() {
        if k.get_bit(i) {
            let mid = step_mid(&a, &b, &x, n);
            b = step_high(&b, n);
            a = mid;
        } else {
            let mid = step_mid(&a, &b, &x, n);
            a = step_low(&a, n);
            b = mid;
        }
    }
    a
}

/// T_k(x) mod n computing both branch outcomes per step and selecting by
/// bit, so the operation sequence is independent of k's bit pattern.
///
/// Agrees bit-for-bit with [`chebyshev_mod`].
pub fn chebyshev_mod_ct(k: &Integer, x: &Integer, n: &Integer) -> Integer {
    debug_assert!(*k >= 0);
    debug_assert!(*n >= 1);
    if *n == 1 {
        return Integer::new();
    }
    let x = x.clone().rem_euc(n);
    if *k == 0 {
        return Integer::from(1u32);
    }

    let mut a = Integer::from(1u32);
    let mut b = x.clone();
    let bits = k.significant_bits();
    for i in (0..bits).rev() {
        let low = step_low(&a, n);
        let mid = step_mid(&a, &b, &x, n);
        let high = step_high(&b, n);
        let pair = [(low, mid.clone()), (mid, high)];
        let (na, nb) = pair[k.get_bit(i) as usize].clone();
        a = na;
        b = nb;
    }
    a
}

/// 2a² − 1 mod n  (T_{2m} from T_m).
fn step_low(a: &Integer, n: &Integer) -> Integer {
    let mut v = Integer::from(a * a);
    v *= 2u32;
    v -= 1u32;
    v.rem_euc(n)
}

/// 2ab − x mod n  (T_{2m+1} from T_m, T_{m+1}).
fn step_mid(a: &Integer, b: &Integer, x: &Integer, n: &Integer) -> Integer {
    let mut v = Integer::from(a * b);
    v *= 2u32;
    v -= x;
    v.rem_euc(n)
}

/// 2b² − 1 mod n  (T_{2m+2} from T_{m+1}).
fn step_high(b: &Integer, n: &Integer) -> Integer {
    let mut v = Integer::from(b * b);
    v *= 2u32;
    v -= 1u32;
    v.rem_euc(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reference evaluation through the three-term recurrence
    /// T_{m+1} = 2x·T_m − T_{m−1}.
    fn chebyshev_naive(k: u32, x: &Integer, n: &Integer) -> Integer {
        let x = x.clone().rem_euc(n);
        let mut prev = Integer::from(1u32).rem_euc(n);
        let mut curr = x.clone();
        if k == 0 {
            return prev;
        }
        for _ in 1..k {
            let next = (Integer::from(2u32) * &x * &curr - &prev).rem_euc(n);
            prev = curr;
            curr = next;
        }
        curr
    }

    /// Ladder vs. the three-term recurrence for every k up to 40.
    #[test]
    fn ladder_matches_recurrence() {
        let n = Integer::from(1_000_003u32);
        for x in [0u32, 1, 2, 7, 123_456] {
            let x = Integer::from(x);
            for k in 0u32..=40 {
                assert_eq!(
                    chebyshev_mod(&Integer::from(k), &x, &n),
                    chebyshev_naive(k, &x, &n),
                    "k = {k}, x = {x}"
                );
            }
        }
    }

    /// Composition law T_j(T_k(x)) = T_{jk}(x) mod n.
    #[test]
    fn composition_law() {
        let n = Integer::from(10_000_019u32);
        let x = Integer::from(42u32);
        for (j, k) in [(2u32, 3u32), (5, 7), (11, 13)] {
            let inner = chebyshev_mod(&Integer::from(k), &x, &n);
            let composed = chebyshev_mod(&Integer::from(j), &inner, &n);
            let direct = chebyshev_mod(&Integer::from(j * k), &x, &n);
            assert_eq!(composed, direct, "T_{j}(T_{k})");
        }
    }

    /// The branch-free variant agrees bit-for-bit with the branching
    /// ladder, including large k.
    #[test]
    fn branch_free_agrees() {
        let n = Integer::from(1_000_003u32);
        let ks = [
            Integer::from(1u32),
            Integer::from(2u32),
            Integer::from(1023u32),
            Integer::from(u64::MAX),
            Integer::from(u64::MAX) * 12_345u32 + 678u32,
        ];
        for x in [2u32, 3, 999_999] {
            let x = Integer::from(x);
            for k in &ks {
                assert_eq!(chebyshev_mod_ct(k, &x, &n), chebyshev_mod(k, &x, &n), "k = {k}");
            }
        }
    }

    /// Degenerate parameters: modulus 1 collapses to 0, k = 0 is the
    /// constant polynomial 1.
    #[test]
    fn degenerate_parameters() {
        assert_eq!(
            chebyshev_mod(&Integer::from(5u32), &Integer::from(3u32), &Integer::from(1u32)),
            0
        );
        assert_eq!(
            chebyshev_mod(&Integer::new(), &Integer::from(3u32), &Integer::from(7u32)),
            1
        );
    }
}
