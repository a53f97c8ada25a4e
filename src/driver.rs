//! # Driver — Screening, Dispatch, and Recursive Splitting
//!
//! The public face of the engine set. [`factor`] screens the input (parity,
//! perfect squares, small prime divisors, primality) and then walks an
//! engine ladder sized to n; [`factorize`] runs a work queue over `factor`
//! until every part passes Miller–Rabin, emitting the sorted prime
//! multiset. [`choose_algorithm`] pins a single engine — the closed
//! [`Algorithm`] set — for callers (and tests) that want one specific
//! method instead of the ladder.
//!
//! Failure discipline: an engine that finds nothing is a sentinel, never an
//! error. When every engine passes, `factorize` emits the composite
//! unchanged and flags it as presumed prime in the log — the documented
//! fallback for inputs beyond the ~45-digit design range.

use clap::ValueEnum;
use rug::Integer;
use tracing::{debug, info, warn};

use crate::cfrac::{self, CfracParams};
use crate::nt;
use crate::p1::{self, Pm1Params};
use crate::rho;
use crate::sieve;
use crate::squfof;
use crate::williams;

/// Miller–Rabin rounds used by the driver's primality screens.
const MR_ROUNDS: u32 = 40;

/// Trial-division screen covers primes up to this bound.
const TRIAL_BOUND: u64 = 1000;

/// SQUFOF is preferred up to this bit length (its state fits the fast
/// path and the form cycle stays short).
const SQUFOF_MAX_BITS: u32 = 64;

/// The closed set of factorization engines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Algorithm {
    Cfrac,
    Squfof,
    PollardRhoStandard,
    PollardRhoCombined,
    PollardPm1Standard,
    PollardPm1SelfReferential,
    PollardPm1PowerMod,
    PollardPm1Reference,
    WilliamsPplus1,
}

/// A dispatchable factorization attempt for one [`Algorithm`].
#[derive(Clone, Copy, Debug)]
pub struct Engine {
    algorithm: Algorithm,
}

/// Pin a specific engine.
pub fn choose_algorithm(algorithm: Algorithm) -> Engine {
    Engine { algorithm }
}

impl Engine {
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// One factorization attempt on n. `None` is the exhausted sentinel.
    pub fn run(&self, n: &Integer) -> Option<Integer> {
        let bits = n.significant_bits();
        match self.algorithm {
            Algorithm::Cfrac => cfrac::cfrac(n, &CfracParams::default()),
            Algorithm::Squfof => squfof::squfof(n),
            Algorithm::PollardRhoStandard => {
                rho::rho_brent(n, rho_budget(bits), 8)
            }
            Algorithm::PollardRhoCombined => rho::rho_combined(n),
            Algorithm::PollardPm1Standard => {
                p1::p1_standard(n, &Pm1Params::default(), 20_000)
            }
            Algorithm::PollardPm1SelfReferential => {
                p1::p1_self_referential(n, &Pm1Params::default(), 2_000)
            }
            Algorithm::PollardPm1PowerMod => {
                p1::p1_power_mod(n, &Pm1Params::default(), 500_000)
            }
            Algorithm::PollardPm1Reference => {
                p1::p1_smooth_bound(n, &Pm1Params::default()).unwrap_or_else(|e| {
                    warn!(error = %e, "p-1 reference bound rejected");
                    None
                })
            }
            Algorithm::WilliamsPplus1 => williams::pplus1(n, 100_000, 20),
        }
    }
}

/// Brent iteration budget: roughly n^(1/4) map steps, floored for tiny n.
fn rho_budget(bits: u32) -> u64 {
    1u64 << (u64::from(bits) / 4).clamp(18, 26)
}

/// Screen n for the easy exits shared by every engine. `Some` is a proper
/// factor; `None` means "still interesting".
fn screen(n: &Integer) -> Option<Integer> {
    if n.is_even() && *n > 2 {
        return Some(Integer::from(2u32));
    }
    if nt::is_perfect_square(n) && *n > 1 {
        return Some(Integer::from(n.sqrt_ref()));
    }
    for p in sieve::generate_primes(TRIAL_BOUND) {
        if n.is_divisible_u(p as u32) && *n != p {
            return Some(Integer::from(p));
        }
    }
    None
}

/// A nontrivial factor 1 < d < n, or `None` when n < 2, n is (probably)
/// prime, or every engine comes back empty.
pub fn factor(n: &Integer) -> Option<Integer> {
    if *n < 2 {
        return None;
    }
    if let Some(d) = screen(n) {
        return Some(d);
    }
    if nt::is_probable_prime(n, MR_ROUNDS) {
        return None;
    }

    // Engine ladder: cheap cycle-finders first, then the form cycle on
    // small inputs, a quick smoothness pass, and CFRAC as the closer.
    let bits = n.significant_bits();
    debug!(bits, "screening passed, dispatching engines");

    if let Some(d) = rho::rho_brent(n, rho_budget(bits), 4) {
        return Some(d);
    }
    if bits <= SQUFOF_MAX_BITS {
        if let Some(d) = squfof::squfof(n) {
            return Some(d);
        }
    }
    let quick_pm1 = Pm1Params { bound: Some(10_000), ..Pm1Params::default() };
    if let Some(d) = p1::p1_smooth_bound(n, &quick_pm1).ok().flatten() {
        return Some(d);
    }
    if let Some(d) = cfrac::cfrac(n, &CfracParams::default()) {
        return Some(d);
    }
    // One retry with a doubled base before giving up.
    let retry = CfracParams {
        factor_base_size: Some(cfrac::FactorBase::heuristic_size(n) * 2),
        ..CfracParams::default()
    };
    info!(bits, "cfrac retry with doubled factor base");
    cfrac::cfrac(n, &retry)
}

/// The ordered prime multiset of n (empty for n ≤ 1).
///
/// Work-queue recursion over [`factor`]; any part no engine can split is
/// emitted unchanged and logged as presumed prime.
pub fn factorize(n: &Integer) -> Vec<Integer> {
    if *n <= 1 {
        return Vec::new();
    }
    let mut queue = vec![n.clone()];
    let mut out = Vec::new();
    while let Some(x) = queue.pop() {
        if nt::is_probable_prime(&x, MR_ROUNDS) {
            out.push(x);
            continue;
        }
        match factor(&x) {
            Some(d) if d > 1 && d < x => {
                queue.push(Integer::from(&x / &d));
                queue.push(d);
            }
            _ => {
                // Documented fallback: engines exhausted, emit unchanged.
                warn!(n = %x, "no engine split this part; emitting as presumed prime");
                out.push(x);
            }
        }
    }
    out.sort();
    out
}
