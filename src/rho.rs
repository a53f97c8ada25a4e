//! # Pollard ρ — Cycle-Finding Factorization
//!
//! Iterates a polynomial map over Z/nZ and watches for the iterate sequence
//! to collide modulo an unknown factor p, detected through
//! gcd(|x_i − x_j|, n). Two engines:
//!
//! - [`rho_brent`]: Brent's cycle detection over f(x) = x² + c, batching
//!   |x − y| products between gcds and backtracking when a batch overshoots.
//!   Restarts with the next c when a cycle collapses (gcd = n).
//! - [`rho_combined`]: Floyd's tortoise-and-hare phased through three
//!   iteration maps — Chebyshev T₂, the self-referential x^x, and x² + 1 —
//!   with per-phase budgets 2^(bits/9), 2^(2·bits/9), 2^(2·bits/5) derived
//!   from the bit length of n.
//!
//! The iteration maps are the [`IterationMap`] capability: one operation,
//! `next(x) → x'`, stateless, so Floyd's two cursors are trivially
//! independent copies of the same position.
//!
//! ## References
//!
//! - J.M. Pollard, "A Monte Carlo Method for Factorization", BIT 15, 1975.
//! - R.P. Brent, "An Improved Monte Carlo Factorization Algorithm",
//!   BIT 20, 1980.

use rug::Integer;
use tracing::{debug, trace};

use crate::chebyshev;
use crate::modpow;
use crate::nt;

/// A pluggable ρ iteration step: one operation, next(state) → state.
pub trait IterationMap: Sync {
    fn next(&self, x: &Integer, n: &Integer) -> Integer;
    fn name(&self) -> &'static str;
}

/// f(x) = x² + c mod n.
pub struct SquarePlusC(pub u32);

impl IterationMap for SquarePlusC {
    fn next(&self, x: &Integer, n: &Integer) -> Integer {
        (Integer::from(x * x) + self.0) % n
    }
    fn name(&self) -> &'static str {
        "x^2+c"
    }
}

/// f(x) = T₂(x) = 2x² − 1 mod n.
pub struct ChebyshevDouble;

impl IterationMap for ChebyshevDouble {
    fn next(&self, x: &Integer, n: &Integer) -> Integer {
        chebyshev::chebyshev_mod(&Integer::from(2u32), x, n)
    }
    fn name(&self) -> &'static str {
        "chebyshev-T2"
    }
}

/// f(x) = x^x mod n.
pub struct SelfReferential;

impl IterationMap for SelfReferential {
    fn next(&self, x: &Integer, n: &Integer) -> Integer {
        modpow::pow_mod(x, x, n)
    }
    fn name(&self) -> &'static str {
        "x^x"
    }
}

/// Brent's ρ over x² + c. Tries c = 1, 2, … up to `max_restarts` seeds,
/// each bounded by `max_iters` map applications.
pub fn rho_brent(n: &Integer, max_iters: u64, max_restarts: u32) -> Option<Integer> {
    if *n < 4 {
        return None;
    }
    if n.is_even() {
        return Some(Integer::from(2u32));
    }
    for c in 1..=max_restarts {
        match brent_cycle(n, c, max_iters) {
            g if g > 1 && g < *n => {
                debug!(c, factor = %g, "rho-brent split");
                return Some(g);
            }
            g if g == *n => {
                trace!(c, "rho-brent cycle collapsed, reseeding");
            }
            _ => {}
        }
    }
    None
}

/// One Brent run with f(x) = x² + c. Returns gcd(n, ·) — possibly 1
/// (budget exhausted) or n (collision swallowed the whole sequence).
fn brent_cycle(n: &Integer, c: u32, max_iters: u64) -> Integer {
    // Batch this many |x − y| factors into one product per gcd.
    const BATCH: u64 = 128;

    let f = |x: &Integer| (Integer::from(x * x) + c) % n;

    let mut y = Integer::from(2u32);
    let mut g = Integer::from(1u32);
    let mut q = Integer::from(1u32);
    let mut x = y.clone();
    let mut ys = y.clone();
    let mut r = 1u64;
    let mut spent = 0u64;

    while g == 1 && spent < max_iters {
        x = y.clone();
        for _ in 0..r {
            y = f(&y);
        }
        spent += r;
        let mut k = 0u64;
        while k < r && g == 1 {
            ys = y.clone();
            let count = BATCH.min(r - k);
            for _ in 0..count {
                y = f(&y);
                q = q * Integer::from(&x - &y).abs() % n;
            }
            spent += count;
            g = q.clone().gcd(n);
            k += BATCH;
        }
        r *= 2;
    }

    if g == *n {
        // The batch overshot the collision; replay it one step at a time.
        loop {
            ys = f(&ys);
            g = Integer::from(&x - &ys).abs().gcd(n);
            if g > 1 {
                break;
            }
        }
    }
    g
}

/// Floyd's cycle detection under an arbitrary map, bounded by `budget`
/// applications of the slow cursor. Collision (gcd = n) ends the attempt.
pub fn rho_with_map(
    n: &Integer,
    map: &dyn IterationMap,
    x0: u32,
    budget: u64,
) -> Option<Integer> {
    let mut tortoise = Integer::from(x0);
    let mut hare = tortoise.clone();
    for _ in 0..budget {
        tortoise = map.next(&tortoise, n);
        hare = map.next(&map.next(&hare, n), n);
        let g = Integer::from(&tortoise - &hare).abs().gcd(n);
        if g == *n {
            trace!(map = map.name(), "rho map collapsed");
            return None;
        }
        if g > 1 {
            debug!(map = map.name(), factor = %g, "rho-combined split");
            return Some(g);
        }
    }
    None
}

/// Per-phase iteration budget 2^(num·bits/den), clamped to a sane window.
fn phase_budget(bits: u64, num: u64, den: u64) -> u64 {
    let exponent = (num * bits / den).min(24);
    (1u64 << exponent).max(1 << 12)
}

/// The combined variant: rotate through Chebyshev T₂, x^x, and x² + 1 at
/// bit-length-derived budgets n^(1/9), n^(2/9), n^(2/5).
pub fn rho_combined(n: &Integer) -> Option<Integer> {
    if *n < 4 {
        return None;
    }
    if n.is_even() {
        return Some(Integer::from(2u32));
    }
    let bits = u64::from(n.significant_bits());
    let phases: [(&dyn IterationMap, u64); 3] = [
        (&ChebyshevDouble, phase_budget(bits, 1, 9)),
        (&SelfReferential, phase_budget(bits, 2, 9)),
        (&SquarePlusC(1), phase_budget(bits, 2, 5)),
    ];
    for (map, budget) in phases {
        trace!(map = map.name(), budget, "rho-combined phase");
        if let Some(d) = rho_with_map(n, map, 2, budget) {
            return Some(d);
        }
    }
    None
}
