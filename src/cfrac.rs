//! # CFRAC — Continued-Fraction Factorization (Morrison–Brillhart)
//!
//! The workhorse for 20–45 digit composites. Three stages:
//!
//! 1. **Factor base**: the sign marker −1, the prime 2, then ascending odd
//!    primes p with Legendre (n | p) = 1 — exactly the primes that can
//!    divide a residue p_k² − n·q_k². Base size follows
//!    max(200, exp(0.4·√(ln n · ln ln n))) unless overridden.
//! 2. **Sieving**: walk the convergents of √n (serial recurrence), fold each
//!    residue p_k² mod n into (−n/2, n/2], and trial-divide it over the base
//!    in parallel batches. Complete factorizations become smooth relations
//!    (x, q, parity) with x² ≡ q (mod n).
//! 3. **Elimination**: once the relations outnumber the base by the
//!    oversampling margin, Gauss–Jordan over GF(2) finds subsets whose
//!    residues multiply to a square Y². Each dependency yields the
//!    congruence X² ≡ Y² (mod n) and a gcd(X ± Y, n) attempt.
//!
//! Exhausting every dependency without a proper split is the failure
//! sentinel, not an error; the driver may retry with a larger base.
//!
//! ## References
//!
//! - Morrison & Brillhart, "A Method of Factoring and the Factorization of
//!   F₇", Mathematics of Computation, 29(129):183–205, 1975.

use rayon::prelude::*;
use rug::Integer;
use tracing::{debug, info, warn};

use crate::contfrac::Convergents;
use crate::gf2::Gf2Matrix;
use crate::nt;
use crate::sieve;

/// Smallest accepted factor-base override.
pub const MIN_FACTOR_BASE: usize = 50;

/// Tuning knobs recognised by the CFRAC engine.
#[derive(Clone, Debug)]
pub struct CfracParams {
    /// Override for the factor-base size (≥ 50); `None` applies the
    /// heuristic.
    pub factor_base_size: Option<usize>,
    /// How many relations beyond the base width to oversample.
    pub relation_margin: usize,
    /// Convergents generated per sieve batch.
    pub batch_size: usize,
    /// Evaluate batch smoothness and the elimination sweep on rayon.
    pub parallel: bool,
}

impl Default for CfracParams {
    fn default() -> Self {
        CfracParams {
            factor_base_size: None,
            relation_margin: 20,
            batch_size: 2000,
            parallel: true,
        }
    }
}

/// The quadratic-residue factor base. Index 0 of every parity vector is the
/// sign of the residue; primes occupy columns 1.. in ascending order.
#[derive(Clone, Debug)]
pub struct FactorBase {
    /// 2 first, then odd primes with (n | p) = 1, ascending.
    pub primes: Vec<u32>,
}

impl FactorBase {
    /// max(200, exp(0.4·√(ln n · ln ln n))), with ln n taken from the bit
    /// length — precise enough for a sizing heuristic.
    pub fn heuristic_size(n: &Integer) -> usize {
        let ln_n = (n.significant_bits().max(2)) as f64 * std::f64::consts::LN_2;
        let size = (0.4 * (ln_n * ln_n.ln()).sqrt()).exp();
        size.max(200.0) as usize
    }

    /// Materialize `size` primes for n. Candidates come from the segmented
    /// sieve one window at a time (roughly half of each window survives the
    /// Euler criterion, so shortfalls cost only the next window, not a
    /// re-sieve); the filter runs on rayon when allowed, and the result is
    /// ascending either way.
    pub fn build(n: &Integer, size: usize, parallel: bool) -> FactorBase {
        let mut primes: Vec<u32> = Vec::with_capacity(size);
        primes.push(2);
        let mut lo = 3u64;
        let mut window = 4_000u64.max(size as u64 * 32);
        while primes.len() < size {
            let hi = lo + window - 1;
            let candidates = sieve::primes_in_range(lo, hi);
            let qualifies = |&&p: &&u64| -> bool {
                let a = u64::from(n.mod_u(p as u32));
                // (n | p) = 0 marks a prime divisor of n; keep it — residue
                // trial division still applies.
                a == 0 || sieve::pow_mod(a, (p - 1) / 2, p) == 1
            };
            if parallel {
                primes.extend(
                    candidates.par_iter().filter(qualifies).map(|&p| p as u32).collect::<Vec<_>>(),
                );
            } else {
                primes.extend(candidates.iter().filter(qualifies).map(|&p| p as u32));
            }
            lo = hi + 1;
            window *= 2;
        }
        primes.truncate(size);
        FactorBase { primes }
    }
}

/// A fully factored residue: x² ≡ q (mod n), with q's exponent parities
/// (sign at bit 0) packed over the base columns.
#[derive(Clone, Debug)]
pub struct SmoothRelation {
    pub x: Integer,
    pub q: Integer,
    pub parity: Vec<u64>,
}

/// p² mod n folded into (−n/2, n/2]. For a convergent numerator this equals
/// the exact p_full² − n·q_full², whose magnitude stays below 2√n.
fn fold_residue(p: &Integer, n: &Integer) -> Integer {
    let mut r = Integer::from(p * p) % n;
    if Integer::from(&r * 2u32) > *n {
        r -= n;
    }
    r
}

/// Trial-divide |r| over the base. Returns the packed exponent-parity
/// vector when the cofactor reaches 1, `None` otherwise.
fn smooth_parity(r: &Integer, prime_ints: &[Integer], ncols: usize) -> Option<Vec<u64>> {
    let mut words = vec![0u64; ncols.div_ceil(64)];
    if *r < 0 {
        words[0] |= 1;
    }
    let mut rem = Integer::from(r.abs_ref());
    for (idx, p) in prime_ints.iter().enumerate() {
        let count = rem.remove_factor_mut(p);
        if count % 2 == 1 {
            let col = idx + 1;
            words[col / 64] |= 1 << (col % 64);
        }
        if rem == 1 {
            break;
        }
    }
    (rem == 1).then_some(words)
}

/// Combine a dependency into the congruence of squares and try both gcds.
fn extract_factor(n: &Integer, relations: &[SmoothRelation], dep: &[usize]) -> Option<Integer> {
    let mut x = Integer::from(1u32);
    let mut y_sq = Integer::from(1u32);
    for &i in dep {
        x = x * &relations[i].x % n;
        y_sq *= &relations[i].q;
    }
    // Sign parities cancel inside a dependency, so the product is positive.
    if y_sq < 0 {
        return None;
    }
    let y = Integer::from(y_sq.sqrt_ref());
    if Integer::from(&y * &y) != y_sq {
        return None;
    }
    let y = y % n;

    let g = Integer::from(&x - &y).abs().gcd(n);
    if g > 1 && g < *n {
        return Some(g);
    }
    let g = (Integer::from(&x + &y) % n).gcd(n);
    if g > 1 && g < *n {
        return Some(g);
    }
    None
}

/// Run CFRAC on n. Returns a nontrivial factor, or `None` when every
/// dependency of the collected relation set fails to split n.
pub fn cfrac(n: &Integer, params: &CfracParams) -> Option<Integer> {
    if *n < 4 {
        return None;
    }
    if n.is_even() {
        return Some(Integer::from(2u32));
    }
    if nt::is_perfect_square(n) {
        return Some(Integer::from(n.sqrt_ref()));
    }

    let margin = params.relation_margin.max(1);
    let batch_size = params.batch_size.max(1);
    let size = params
        .factor_base_size
        .unwrap_or_else(|| FactorBase::heuristic_size(n))
        .max(MIN_FACTOR_BASE);
    let base = FactorBase::build(n, size, params.parallel);
    let ncols = base.primes.len() + 1;
    let needed = ncols + margin;
    info!(
        base_size = base.primes.len(),
        largest_prime = base.primes.last().copied().unwrap_or(2),
        needed,
        "cfrac factor base ready"
    );

    let prime_ints: Vec<Integer> = base.primes.iter().map(|&p| Integer::from(p)).collect();
    let test = |p: &Integer| -> Option<SmoothRelation> {
        let r = fold_residue(p, n);
        if r == 0 {
            return None;
        }
        let parity = smooth_parity(&r, &prime_ints, ncols)?;
        Some(SmoothRelation { x: p.clone(), q: r, parity })
    };

    let mut relations: Vec<SmoothRelation> = Vec::with_capacity(needed);
    let mut convergents = Convergents::new(n);
    let mut scanned = 0usize;
    let max_batches = 512 * base.primes.len() / batch_size + 64;
    for _ in 0..max_batches {
        if relations.len() >= needed {
            break;
        }
        // The recurrence is inherently serial; only smoothness fans out.
        let chunk: Vec<Integer> = convergents.by_ref().take(batch_size).map(|c| c.p).collect();
        if chunk.is_empty() {
            break;
        }
        scanned += chunk.len();
        if params.parallel {
            relations.extend(chunk.par_iter().filter_map(&test).collect::<Vec<_>>());
        } else {
            relations.extend(chunk.iter().filter_map(&test));
        }
        debug!(scanned, smooth = relations.len(), needed, "cfrac sieve batch");
    }

    if relations.len() <= ncols {
        warn!(
            scanned,
            smooth = relations.len(),
            "cfrac sieve exhausted without enough relations"
        );
        return None;
    }
    relations.truncate(needed);

    let rows: Vec<Vec<u64>> = relations.iter().map(|rel| rel.parity.clone()).collect();
    let dependencies = Gf2Matrix::new(rows, ncols).eliminate(params.parallel);
    debug!(count = dependencies.len(), "cfrac dependencies");

    for dep in &dependencies {
        if let Some(d) = extract_factor(n, &relations, dep) {
            info!(factor = %d, relations = dep.len(), "cfrac split");
            return Some(d);
        }
    }
    warn!(dependencies = dependencies.len(), "cfrac found no proper split");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rug::ops::RemRounding;

    /// The heuristic never sizes below 200 and grows with n.
    #[test]
    fn heuristic_size_floor_and_growth() {
        assert_eq!(FactorBase::heuristic_size(&Integer::from(10_403u32)), 200);
        let big: Integer = "56772286057224175134407894536228864081".parse().unwrap();
        let s = FactorBase::heuristic_size(&big);
        assert!(s >= 200, "38-digit inputs stay above the floor, got {s}");
    }

    /// For n = 10403: (n|7) = (n|13) = 1 while 3, 5, 11 are non-residues.
    /// The base must start at 2, keep ascending order, and admit only
    /// quadratic residues of n (or divisors of n).
    #[test]
    fn factor_base_respects_legendre() {
        let n = Integer::from(10_403u32);
        let base = FactorBase::build(&n, 50, false);
        assert_eq!(base.primes.len(), 50);
        assert_eq!(base.primes[0], 2);
        assert!(base.primes.windows(2).all(|w| w[0] < w[1]));
        assert!(base.primes.contains(&7));
        assert!(base.primes.contains(&13));
        for bad in [3u32, 5, 11] {
            assert!(!base.primes.contains(&bad), "{bad} is a non-residue");
        }
        for &p in &base.primes[1..] {
            let sym = crate::nt::legendre_symbol(&n, &Integer::from(p)).unwrap();
            assert!(sym == 1 || sym == 0, "(n|{p}) = {sym}");
        }
    }

    /// Parallel and serial base construction agree exactly (ordering
    /// guarantee of the parallel prime filter).
    #[test]
    fn factor_base_parallel_deterministic() {
        let n = Integer::from(1_000_037u32) * Integer::from(1_000_039u32);
        let serial = FactorBase::build(&n, 120, false);
        let parallel = FactorBase::build(&n, 120, true);
        assert_eq!(serial.primes, parallel.primes);
    }

    /// Every emitted relation satisfies x² ≡ q (mod n), |q| ≤ n/2, and its
    /// parity vector matches an independent refactorization of q.
    #[test]
    fn smooth_relations_satisfy_invariant() {
        let n = Integer::from(1_000_003u32) * Integer::from(1_000_033u32);
        let base = FactorBase::build(&n, 60, false);
        let ncols = base.primes.len() + 1;
        let prime_ints: Vec<Integer> = base.primes.iter().map(|&p| Integer::from(p)).collect();

        let mut checked = 0;
        for c in Convergents::new(&n).take(4000) {
            let r = fold_residue(&c.p, &n);
            if r == 0 {
                continue;
            }
            let Some(parity) = smooth_parity(&r, &prime_ints, ncols) else {
                continue;
            };
            checked += 1;
            // x² ≡ q (mod n)
            let lhs = Integer::from(&c.p * &c.p).rem_euc(&n);
            let rhs = r.clone().rem_euc(&n);
            assert_eq!(lhs, rhs);
            assert!(Integer::from(r.abs_ref()) * 2u32 <= n);
            // parity bit 0 is the sign; bits 1.. match the refactorization
            assert_eq!(parity[0] & 1 == 1, r < 0);
            let refactored = crate::sieve::factor_u64(Integer::from(r.abs_ref()).to_u64().unwrap());
            for (idx, &p) in base.primes.iter().enumerate() {
                let exp = refactored
                    .iter()
                    .find(|&&(q, _)| q == u64::from(p))
                    .map_or(0, |&(_, e)| e);
                let col = idx + 1;
                let bit = parity[col / 64] >> (col % 64) & 1;
                assert_eq!(bit, u64::from(exp) % 2, "prime {p}");
            }
        }
        assert!(checked > 0, "sieve must emit at least one smooth relation");
    }

    /// End-to-end splits of small semiprimes, serial and parallel.
    #[test]
    fn cfrac_splits_semiprimes() {
        for (n, p, q) in [(10_403u64, 101u64, 103u64), (2_041, 13, 157), (1_000_007, 29, 34_483)] {
            let n = Integer::from(n);
            let params = CfracParams { parallel: false, ..CfracParams::default() };
            let d = cfrac(&n, &params).unwrap_or_else(|| panic!("no factor of {n}"));
            assert!(d == p || d == q, "{d} splits {n}");
        }
        let n = Integer::from(1_000_003u32) * Integer::from(1_000_033u32);
        let d = cfrac(&n, &CfracParams::default()).expect("parallel split");
        assert!(d == 1_000_003u32 || d == 1_000_033u32);
    }

    /// Degenerate inputs: evens split off 2, perfect squares return their
    /// root, and n < 4 is a sentinel.
    #[test]
    fn cfrac_degenerate_inputs() {
        let params = CfracParams::default();
        assert_eq!(cfrac(&Integer::from(1_000_006u32), &params), Some(Integer::from(2u32)));
        assert_eq!(
            cfrac(&(Integer::from(1_009u32) * 1_009u32), &params),
            Some(Integer::from(1_009u32))
        );
        assert_eq!(cfrac(&Integer::from(3u32), &params), None);
    }
}
