//! # Pollard p−1 Family
//!
//! Finds a factor p of n whenever p − 1 is smooth enough for the chosen
//! exponent schedule: a ← a^e mod n keeps a ≡ a₀^E (mod p) cycling in the
//! order-(p−1) group, and once E is a multiple of p − 1, gcd(a − 1, n)
//! exposes p. Four exponent schedules are provided:
//!
//! - **standard**: a ← a^b with b = 2, 3, 4, …, so E = b! — the simplest
//!   schedule, effective when p − 1 is very smooth.
//! - **self-referential**: a ← a^a — the exponent stream is the iterate
//!   itself; wildly non-smooth E, but cheap to drive and a useful fallback
//!   map.
//! - **power-mod**: one square-and-multiply step per outer iteration,
//!   amortizing the exponent update; when the exponent bits run out, the
//!   exponent is reloaded from the running product and the product resets
//!   to 1.
//! - **smooth-bound** (reference): a ← a^(q^e) for every prime q ≤ B with
//!   q^e ≤ B, i.e. E = lcm(1..B), with B = exp(√(ln n · ln ln n)/√2)
//!   clamped to [10³, 10¹⁵] unless overridden.
//!
//! Every variant fails silently (sentinel `None`) when the smoothness
//! assumption does not hold — the driver just moves on. gcd = n means the
//! whole group collapsed at once (every factor smooth); that too is a
//! sentinel, not an error.
//!
//! ## References
//!
//! - J.M. Pollard, "Theorems on Factorization and Primality Testing",
//!   Proc. Cambridge Phil. Soc., 76:521–528, 1974.

use rug::Integer;
use tracing::{debug, trace};

use crate::error::Result;
use crate::modpow;
use crate::sieve;

/// Tuning knobs for the p−1 variants.
#[derive(Clone, Debug)]
pub struct Pm1Params {
    /// Smoothness bound B for the reference variant; `None` applies the
    /// heuristic exp(√(ln n · ln ln n)/√2) clamped to [10³, 10¹⁵].
    pub bound: Option<u64>,
    /// Iterations (or primes) between gcd checks.
    pub gcd_interval: usize,
    /// Starting base a₀.
    pub base: u32,
}

impl Default for Pm1Params {
    fn default() -> Self {
        Pm1Params { bound: None, gcd_interval: 20, base: 2 }
    }
}

/// gcd(a − 1, n) classified: `Some(d)` for a proper factor, `None` while
/// trivial. gcd = n is reported through `collapsed`.
fn gcd_check(a: &Integer, n: &Integer, collapsed: &mut bool) -> Option<Integer> {
    let g = Integer::from(a - 1u32).gcd(n);
    if g == *n {
        *collapsed = true;
        return None;
    }
    if g > 1 {
        return Some(g);
    }
    None
}

/// Standard p−1: a ← a^b mod n with b incrementing from 2, testing
/// gcd(a − 1, n) after every step.
///
/// The per-step gcd matters: the exponent b! sweeps through multiples of
/// each p − 1 in turn, and the window between "one factor captured" and
/// "all factors captured" (gcd = n) can be a handful of rounds wide.
pub fn p1_standard(n: &Integer, params: &Pm1Params, max_rounds: u64) -> Option<Integer> {
    if *n < 4 || n.is_even() {
        return None;
    }
    let mut a = Integer::from(params.base.max(2)) % n;
    let mut collapsed = false;
    for b in 2..=max_rounds {
        a = a.pow_mod(&Integer::from(b), n).expect("n > 0");
        if let Some(d) = gcd_check(&a, n, &mut collapsed) {
            debug!(rounds = b, factor = %d, "p-1 standard split");
            return Some(d);
        }
        if collapsed {
            trace!(rounds = b, "p-1 standard collapsed");
            return None;
        }
    }
    None
}

/// Self-referential p−1: a ← a^a mod n.
pub fn p1_self_referential(n: &Integer, params: &Pm1Params, max_rounds: u64) -> Option<Integer> {
    if *n < 4 || n.is_even() {
        return None;
    }
    let interval = params.gcd_interval.max(1) as u64;
    let mut a = Integer::from(params.base.max(2)) % n;
    let mut collapsed = false;
    for round in 1..=max_rounds {
        a = modpow::pow_mod(&a, &a, n);
        if round % interval == 0 {
            if let Some(d) = gcd_check(&a, n, &mut collapsed) {
                debug!(round, factor = %d, "p-1 self-referential split");
                return Some(d);
            }
            if collapsed {
                return None;
            }
        }
    }
    gcd_check(&a, n, &mut collapsed)
}

/// Interleaved power-mod p−1: one square-and-multiply step of b^e per outer
/// iteration, carried in the state (b, e, r).
///
/// When the exponent stream e is exhausted, e is reloaded from the running
/// product r and r resets to 1, so the schedule climbs through iterated
/// powers without ever materializing a huge exponent at once.
pub fn p1_power_mod(n: &Integer, params: &Pm1Params, max_steps: u64) -> Option<Integer> {
    if *n < 4 || n.is_even() {
        return None;
    }
    let interval = params.gcd_interval.max(1) as u64;
    let base = params.base.max(2);
    let mut b = Integer::from(base) % n;
    let mut e = Integer::from(base);
    let mut r = Integer::from(1u32);
    let mut collapsed = false;

    for step in 1..=max_steps {
        if e.is_odd() {
            r = r * &b % n;
        }
        e >>= 1;
        b.square_mut();
        b %= n;
        if e == 0 {
            // Exponent stream exhausted: reload it from the product.
            e = r.clone();
            r = Integer::from(1u32);
            if e == 0 {
                return None;
            }
        }
        if step % interval == 0 && r != 1 {
            if let Some(d) = gcd_check(&r, n, &mut collapsed) {
                debug!(step, factor = %d, "p-1 power-mod split");
                return Some(d);
            }
            if collapsed {
                return None;
            }
        }
    }
    None
}

/// Heuristic smoothness bound exp(√(ln n · ln ln n)/√2) ∈ [10³, 10¹⁵].
pub fn smooth_bound(n: &Integer) -> u64 {
    let ln_n = (n.significant_bits().max(2)) as f64 * std::f64::consts::LN_2;
    let b = ((ln_n * ln_n.ln()).sqrt() / std::f64::consts::SQRT_2).exp();
    (b as u64).clamp(1_000, 1_000_000_000_000_000)
}

/// Reference p−1: a ← a^(q^e) over all primes q ≤ B with q^e ≤ B, checking
/// gcd(a − 1, n) every `gcd_interval` primes.
///
/// Errors only when a caller-supplied bound exceeds sieve capacity.
pub fn p1_smooth_bound(n: &Integer, params: &Pm1Params) -> Result<Option<Integer>> {
    if *n < 4 || n.is_even() {
        return Ok(None);
    }
    let b1 = params.bound.unwrap_or_else(|| smooth_bound(n));
    let primes = sieve::generate_primes_checked(b1)?;
    let interval = params.gcd_interval.max(1);

    let mut a = Integer::from(params.base.max(2)) % n;
    let mut collapsed = false;
    for (i, &q) in primes.iter().enumerate() {
        // Largest q^e ≤ B — the exponent of q inside lcm(1..B).
        let mut qe = q;
        while qe <= b1 / q {
            qe *= q;
        }
        a = a.pow_mod(&Integer::from(qe), n).expect("n > 0");
        if (i + 1) % interval == 0 {
            if let Some(d) = gcd_check(&a, n, &mut collapsed) {
                debug!(primes_used = i + 1, b1, factor = %d, "p-1 smooth-bound split");
                return Ok(Some(d));
            }
            if collapsed {
                trace!(primes_used = i + 1, b1, "p-1 smooth-bound collapsed");
                return Ok(None);
            }
        }
    }
    Ok(gcd_check(&a, n, &mut collapsed))
}
