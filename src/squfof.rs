//! # SQUFOF — Shanks' Square-Forms Factorization
//!
//! Iterates the principal cycle of binary quadratic forms of discriminant
//! 4kn. The forward phase walks the cycle until an odd-indexed step lands on
//! a perfect-square form Q = s²; the reverse phase restarts from its square
//! root and walks until the cycle's symmetry point, where gcd(n, P) exposes
//! a factor. Multipliers k from the Shanks–Riesel set are tried in turn
//! because a single cycle can fail for perfectly good n.
//!
//! The loop state is the continued-fraction triple (P, Q_prev, Q_curr) over
//! k·n with the invariant Q_curr·Q_prev = k·n − P², all O(1) memory.
//!
//! ## References
//!
//! - Daniel Shanks, "Analysis and Improvement of the Continued Fraction
//!   Method of Factorization" (as presented by Gower & Wagstaff,
//!   Mathematics of Computation, 77(261):551–588, 2008).
//! - Hans Riesel, "Prime Numbers and Computer Methods for Factorization",
//!   2nd ed., §8.7 (multiplier selection).

use rug::Integer;
use tracing::{debug, trace};

use crate::nt;

/// Shanks–Riesel multipliers: squarefree products of {3, 5, 7, 11}.
pub const MULTIPLIERS: [u32; 16] =
    [1, 3, 5, 7, 11, 15, 21, 33, 35, 55, 77, 105, 165, 231, 385, 1155];

/// Hard ceiling on forward-phase iterations, regardless of the L estimate.
const MAX_FORWARD_STEPS: u64 = 1 << 24;

/// Run SQUFOF on n with the full multiplier schedule. Returns a nontrivial
/// factor or `None` once every multiplier is exhausted.
pub fn squfof(n: &Integer) -> Option<Integer> {
    if *n < 4 {
        return None;
    }
    if n.is_even() {
        return Some(Integer::from(2u32));
    }
    if nt::is_perfect_square(n) {
        return Some(Integer::from(n.sqrt_ref()));
    }
    for &k in &MULTIPLIERS {
        if let Some(d) = squfof_with_multiplier(n, k) {
            debug!(multiplier = k, factor = %d, "squfof split");
            return Some(d);
        }
    }
    None
}

/// One SQUFOF attempt over k·n.
pub fn squfof_with_multiplier(n: &Integer, k: u32) -> Option<Integer> {
    let kn = Integer::from(n * k);
    let sqrt_kn = Integer::from(kn.sqrt_ref());

    // kn a perfect square short-circuits the cycle entirely.
    if Integer::from(&sqrt_kn * &sqrt_kn) == kn {
        let g = sqrt_kn.gcd(n);
        if g > 1 && g < *n {
            return Some(g);
        }
        return None;
    }

    // L ≈ 3·(kn)^(1/4) + 100, under the hard ceiling.
    let limit = {
        let fourth_root = Integer::from(sqrt_kn.sqrt_ref());
        (3 * fourth_root.to_u64().unwrap_or(u64::MAX / 4) + 100).min(MAX_FORWARD_STEPS)
    };

    // Forward phase: P₀ = ⌊√(kn)⌋, Q₀ = 1, Q₁ = kn − P₀².
    let mut p_prev = sqrt_kn.clone();
    let mut q_prev = Integer::from(1u32);
    let mut q_curr = Integer::from(&kn) - Integer::from(&p_prev * &p_prev);

    // Square forms whose reverse walk already came back trivial (improper
    // squares, multiplier artifacts). The cycle repeats within L, so they
    // would otherwise be retried verbatim.
    let mut rejected_roots: Vec<Integer> = Vec::new();

    for step in 1..=limit {
        let b = Integer::from(&sqrt_kn + &p_prev) / &q_curr;
        let p_next = Integer::from(&b * &q_curr) - &p_prev;
        let q_next = q_prev + b * (Integer::from(&p_prev - &p_next));
        q_prev = std::mem::replace(&mut q_curr, q_next);
        p_prev = p_next;

        // After the shift, q_curr sits at an even position of the form
        // cycle exactly on odd step indices — the only places a square
        // form can be reversed.
        if step % 2 == 1 && nt::is_perfect_square(&q_curr) {
            let s = Integer::from(q_curr.sqrt_ref());
            if s > 1 && !rejected_roots.contains(&s) {
                trace!(multiplier = k, step, s = %s, "square form found");
                match reverse_phase(n, &kn, &sqrt_kn, &s, &p_prev) {
                    Some(d) => return Some(d),
                    // Trivial symmetry point; keep scanning the cycle.
                    None => rejected_roots.push(s),
                }
            }
        }
    }
    None
}

/// Walk the reversed cycle from the square form (s, P) to its symmetry
/// point, where P stops changing; gcd(n, P) is the factor candidate.
fn reverse_phase(
    n: &Integer,
    kn: &Integer,
    sqrt_kn: &Integer,
    s: &Integer,
    p: &Integer,
) -> Option<Integer> {
    let b0 = Integer::from(sqrt_kn - p) / s;
    let mut p_inv = Integer::from(&b0 * s) + p;
    let mut q_inv_prev = s.clone();
    let mut q_inv_curr = (Integer::from(kn) - Integer::from(&p_inv * &p_inv)) / s;

    let mut steps = 0u64;
    loop {
        let b = Integer::from(sqrt_kn + &p_inv) / &q_inv_curr;
        let p_next = Integer::from(&b * &q_inv_curr) - &p_inv;
        if p_next == p_inv {
            break;
        }
        let q_next = q_inv_prev + b * (Integer::from(&p_inv - &p_next));
        q_inv_prev = std::mem::replace(&mut q_inv_curr, q_next);
        p_inv = p_next;
        steps += 1;
        if steps > MAX_FORWARD_STEPS {
            return None;
        }
    }

    let g = p_inv.gcd(n);
    if g > 1 && g < *n {
        Some(g)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2041 = 13 × 157 is the classic worked example; an early multiplier
    /// must crack it.
    #[test]
    fn splits_textbook_example() {
        let n = Integer::from(2041u32);
        let d = squfof(&n).expect("factor of 2041");
        assert!(d == 13 || d == 157);
    }

    /// 1000007 = 29 × 34483.
    #[test]
    fn splits_seven_digit_semiprime() {
        let n = Integer::from(1_000_007u32);
        let d = squfof(&n).expect("factor of 1000007");
        assert!(d == 29 || d == 34_483);
    }

    /// Products of two close primes and of two distant primes, up to 12
    /// digits — comfortably inside SQUFOF's range.
    #[test]
    fn splits_mixed_semiprimes() {
        let cases: [(u64, u64); 4] = [
            (104_729, 104_743),
            (65_537, 257),
            (1_000_003, 1_000_033),
            (9973, 99_991),
        ];
        for (p, q) in cases {
            let n = Integer::from(p) * Integer::from(q);
            let d = squfof(&n).unwrap_or_else(|| panic!("no factor of {p}*{q}"));
            assert!(d == p || d == q, "{d} should be {p} or {q}");
            assert!(n.is_divisible(&d));
        }
    }

    /// Degenerate screens: evens, perfect squares, and tiny n.
    #[test]
    fn degenerate_inputs() {
        assert_eq!(squfof(&Integer::from(3u32)), None);
        assert_eq!(squfof(&Integer::from(1_000_006u32)), Some(Integer::from(2u32)));
        let sq = Integer::from(10_007u32) * 10_007u32;
        assert_eq!(squfof(&sq), Some(Integer::from(10_007u32)));
    }

    /// The failure sentinel: a prime has no nontrivial factor, and every
    /// multiplier must come back empty rather than loop.
    #[test]
    fn prime_input_exhausts_multipliers() {
        assert_eq!(squfof(&Integer::from(104_729u32)), None);
    }

    /// A single-multiplier run either fails or returns a proper divisor —
    /// never n or 1.
    #[test]
    fn single_multiplier_result_is_proper() {
        let n = Integer::from(10_403u32);
        for &k in &MULTIPLIERS {
            if let Some(d) = squfof_with_multiplier(&n, k) {
                assert!(d > 1 && d < n);
                assert!(n.is_divisible(&d));
            }
        }
    }
}
