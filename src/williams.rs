//! # Williams p+1
//!
//! The p−1 idea transplanted into the Lucas-sequence torus: V_k(P, 1) mod n
//! lives in a group of order p − (Δ|p) for each prime factor p, where
//! Δ = P² − 4. When the chosen P gives (Δ|p) = −1, the group order is
//! p + 1, and an exponent schedule covering lcm(1..B) exposes p through
//! gcd(V − 2, n) whenever p + 1 is B-smooth.
//!
//! Whether (Δ|p) is −1 for a useful p is unknowable in advance, so a few
//! seeds P are tried; composition V_{jk}(x) = V_j(V_k(x)) lets each prime
//! power fold into the running value with a Montgomery ladder over
//! V_{2m} = V_m² − 2 and V_{2m+1} = V_m·V_{m+1} − x.
//!
//! ## References
//!
//! - H.C. Williams, "A p+1 Method of Factoring", Mathematics of
//!   Computation, 39(159):225–234, 1982.

use rug::ops::RemRounding;
use rug::Integer;
use tracing::{debug, trace};

use crate::sieve;

/// Seeds tried for the Lucas parameter P, starting from 3.
const SEEDS: [u32; 6] = [3, 5, 7, 9, 11, 13];

/// V_k(x, 1) mod n by a Montgomery ladder over k's bits, carrying the pair
/// (V_m, V_{m+1}).
pub fn lucas_v_pow(x: &Integer, k: u64, n: &Integer) -> Integer {
    if k == 0 {
        return Integer::from(2u32).rem_euc(n);
    }
    let x = x.clone().rem_euc(n);
    let mut v0 = Integer::from(2u32);
    let mut v1 = x.clone();
    let bits = 64 - k.leading_zeros();
    for i in (0..bits).rev() {
        if k >> i & 1 == 1 {
            v0 = (Integer::from(&v0 * &v1) - &x).rem_euc(n);
            v1 = (Integer::from(&v1 * &v1) - 2u32).rem_euc(n);
        } else {
            v1 = (Integer::from(&v0 * &v1) - &x).rem_euc(n);
            v0 = (Integer::from(&v0 * &v0) - 2u32).rem_euc(n);
        }
    }
    v0
}

/// Williams p+1 with stage bound `b1`, testing gcd(V − 2, n) every
/// `gcd_interval` primes. Returns a proper factor or the sentinel.
pub fn pplus1(n: &Integer, b1: u64, gcd_interval: usize) -> Option<Integer> {
    if *n < 4 || n.is_even() {
        return None;
    }
    let primes = sieve::generate_primes(b1);
    let interval = gcd_interval.max(1);

    for &seed in &SEEDS {
        trace!(seed, b1, "p+1 attempt");
        let mut v = Integer::from(seed);
        let mut collapsed = false;
        let mut found = None;

        'schedule: for (i, &q) in primes.iter().enumerate() {
            let mut qe = q;
            while qe <= b1 / q {
                qe *= q;
            }
            v = lucas_v_pow(&v, qe, n);
            if (i + 1) % interval == 0 {
                match vm2_gcd(&v, n) {
                    Gcd::Proper(d) => {
                        found = Some(d);
                        break 'schedule;
                    }
                    Gcd::Collapsed => {
                        collapsed = true;
                        break 'schedule;
                    }
                    Gcd::Trivial => {}
                }
            }
        }

        if found.is_none() && !collapsed {
            if let Gcd::Proper(d) = vm2_gcd(&v, n) {
                found = Some(d);
            }
        }
        if let Some(d) = found {
            debug!(seed, factor = %d, "p+1 split");
            return Some(d);
        }
        // Collapse or a barren seed: next P.
    }
    None
}

enum Gcd {
    Proper(Integer),
    Collapsed,
    Trivial,
}

fn vm2_gcd(v: &Integer, n: &Integer) -> Gcd {
    let g = Integer::from(v - 2u32).rem_euc(n).gcd(n);
    if g == *n {
        Gcd::Collapsed
    } else if g > 1 {
        Gcd::Proper(g)
    } else {
        Gcd::Trivial
    }
}
