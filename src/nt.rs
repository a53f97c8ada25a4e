//! # Number-Theory Kit
//!
//! The shared primitives every engine leans on: validated integer roots,
//! Miller–Rabin primality, the Legendre symbol, Tonelli–Shanks modular square
//! roots, and the extended Euclidean algorithm with its modular-inverse
//! wrapper.
//!
//! GMP (via `rug`) supplies the Newton iterations behind `sqrt` and `root`;
//! the wrappers here own the domain checks. Miller–Rabin is implemented
//! explicitly rather than delegated to GMP because the witness set is pinned:
//! the twelve primes 2..37 decide primality deterministically for all
//! n < 3.317·10²⁴ (Sorenson & Webster), and larger inputs fall back to
//! random-base rounds.
//!
//! ## References
//!
//! - Sorenson & Webster, "Strong Pseudoprimes to Twelve Prime Bases",
//!   Mathematics of Computation, 86(304):985–1003, 2017.
//! - Crandall & Pomerance, "Prime Numbers: A Computational Perspective",
//!   §2.3 (Tonelli–Shanks), §9.4 (roots).

use rand::RngCore;
use rug::integer::Order;
use rug::ops::RemRounding;
use rug::Integer;

use crate::error::{FactorError, Result};

/// Witness set deciding Miller–Rabin deterministically below
/// [`MR_DETERMINISTIC_BOUND`].
pub const MR_WITNESSES: [u32; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

/// 3.317·10²⁴ — below this, the fixed witness set is exact.
pub const MR_DETERMINISTIC_BOUND: &str = "3317044064679887385961981";

/// ⌊√n⌋ for n ≥ 0.
///
/// Satisfies `isqrt(n)² ≤ n < (isqrt(n)+1)²`.
pub fn isqrt(n: &Integer) -> Result<Integer> {
    if *n < 0 {
        return Err(FactorError::InvalidInput("square root of negative value"));
    }
    Ok(Integer::from(n.sqrt_ref()))
}

/// ⌊n^(1/k)⌋ for k ≥ 1, truncated toward zero for negative n with odd k.
///
/// Rejects k = 0 and even roots of negative values.
pub fn iroot(n: &Integer, k: u32) -> Result<Integer> {
    if k == 0 {
        return Err(FactorError::InvalidInput("root degree must be positive"));
    }
    if *n < 0 && k % 2 == 0 {
        return Err(FactorError::InvalidInput("even root of negative value"));
    }
    Ok(Integer::from(n.root_ref(k)))
}

/// True iff n is a perfect square.
pub fn is_perfect_square(n: &Integer) -> bool {
    *n >= 0 && n.is_perfect_square()
}

/// One strong-pseudoprime round: does `a` witness the compositeness of n?
///
/// `d` and `r` satisfy n − 1 = 2^r · d with d odd. Returns `true` when n
/// passes (a is not a witness against n).
fn sprp(n: &Integer, a: &Integer, d: &Integer, r: u32) -> bool {
    let a = Integer::from(a % n);
    if a == 0 {
        // a ≡ 0 carries no information; treat as a pass
        return true;
    }
    let n_minus_1 = Integer::from(n - 1u32);
    let mut x = a.pow_mod(d, n).expect("modulus is positive");
    if x == 1 || x == n_minus_1 {
        return true;
    }
    for _ in 1..r {
        x.square_mut();
        x %= n;
        if x == n_minus_1 {
            return true;
        }
    }
    false
}

/// Miller–Rabin primality test.
///
/// Deterministic (fixed witness set 2..37) for n < 3.317·10²⁴; above that,
/// `rounds` random bases are drawn from [2, n − 2]. Multiples of 2, 3, and 5
/// are rejected up front.
pub fn is_probable_prime(n: &Integer, rounds: u32) -> bool {
    if *n < 2 {
        return false;
    }
    for p in [2u32, 3, 5] {
        if *n == p {
            return true;
        }
        if n.is_divisible_u(p) {
            return false;
        }
    }

    // n − 1 = 2^r · d with d odd
    let n_minus_1 = Integer::from(n - 1u32);
    let r = n_minus_1.find_one(0).expect("n > 2 so n - 1 > 0") as u32;
    let d = Integer::from(&n_minus_1 >> r);

    let det_bound: Integer = MR_DETERMINISTIC_BOUND.parse().expect("literal parses");
    if *n < det_bound {
        return MR_WITNESSES
            .iter()
            .all(|&a| sprp(n, &Integer::from(a), &d, r));
    }

    let mut rng = rand::thread_rng();
    let span = Integer::from(n - 3u32); // bases drawn from [2, n - 2]
    for _ in 0..rounds.max(1) {
        let a = random_below(&mut rng, &span) + 2u32;
        if !sprp(n, &a, &d, r) {
            return false;
        }
    }
    true
}

/// Uniform random integer in [0, bound) by rejection sampling on the bit
/// length of `bound`.
pub(crate) fn random_below<R: RngCore>(rng: &mut R, bound: &Integer) -> Integer {
    debug_assert!(*bound > 0);
    let bits = bound.significant_bits();
    let bytes = bits.div_ceil(8) as usize;
    let mut buf = vec![0u8; bytes];
    loop {
        rng.fill_bytes(&mut buf);
        let mut candidate = Integer::from_digits(&buf, Order::Msf);
        candidate.keep_bits_mut(bits);
        if candidate < *bound {
            return candidate;
        }
    }
}

/// Legendre symbol (a | p) via Euler's criterion: a^((p−1)/2) mod p.
///
/// Requires p an odd prime; returns 1, −1, or 0 (when p | a).
pub fn legendre_symbol(a: &Integer, p: &Integer) -> Result<i32> {
    if p.is_even() || *p < 3 {
        return Err(FactorError::InvalidInput("Legendre modulus must be an odd prime"));
    }
    let a = a.clone().rem_euc(p);
    if a == 0 {
        return Ok(0);
    }
    let exp = Integer::from(p - 1u32) >> 1u32;
    let e = a.pow_mod(&exp, p).expect("p > 0");
    if e == 1 {
        Ok(1)
    } else if e == Integer::from(p - 1u32) {
        Ok(-1)
    } else {
        // Euler's criterion can only land elsewhere when p is composite
        Err(FactorError::InvalidInput("Legendre modulus is not prime"))
    }
}

/// Tonelli–Shanks: a square root of `a` modulo the odd prime `p`.
///
/// Returns x with x² ≡ a (mod p), the smaller of the two roots not being
/// guaranteed. Fails with [`FactorError::NoSquareRoot`] when (a | p) = −1.
/// p ≡ 3 (mod 4) takes the single-exponentiation shortcut a^((p+1)/4).
pub fn tonelli_shanks(a: &Integer, p: &Integer) -> Result<Integer> {
    if *p == 2 {
        return Ok(a.clone().rem_euc(p));
    }
    let a = a.clone().rem_euc(p);
    if a == 0 {
        return Ok(Integer::new());
    }
    match legendre_symbol(&a, p)? {
        -1 => return Err(FactorError::NoSquareRoot),
        0 => return Ok(Integer::new()),
        _ => {}
    }

    if Integer::from(p % 4u32) == 3 {
        let exp = Integer::from(p + 1u32) >> 2u32;
        return Ok(a.pow_mod(&exp, p).expect("p > 0"));
    }

    // p − 1 = q · 2^s with q odd
    let p_minus_1 = Integer::from(p - 1u32);
    let s = p_minus_1.find_one(0).expect("p > 2") as u32;
    let q = Integer::from(&p_minus_1 >> s);

    // Any quadratic non-residue serves as the generator of the 2-Sylow part.
    let mut z = Integer::from(2u32);
    while legendre_symbol(&z, p)? != -1 {
        z += 1u32;
    }

    let mut m = s;
    let mut c = z.pow_mod(&q, p).expect("p > 0");
    let mut t = Integer::from(a.pow_mod_ref(&q, p).expect("p > 0"));
    let r_exp = Integer::from(&q + 1u32) >> 1u32;
    let mut r = Integer::from(a.pow_mod_ref(&r_exp, p).expect("p > 0"));

    while t != 1 {
        // least i in (0, m) with t^(2^i) ≡ 1
        let mut i = 0u32;
        let mut t2 = t.clone();
        while t2 != 1 {
            t2.square_mut();
            t2 %= p;
            i += 1;
        }

        let mut b = c;
        for _ in 0..(m - i - 1) {
            b.square_mut();
            b %= p;
        }
        m = i;
        c = Integer::from(&b * &b) % p;
        t = t * &c % p;
        r = r * &b % p;
    }
    Ok(r)
}

/// Extended Euclid: (g, x, y) with a·x + b·y = g = gcd(a, b), g ≥ 0.
///
/// Iterative two-row update, no recursion.
pub fn ext_gcd(a: &Integer, b: &Integer) -> (Integer, Integer, Integer) {
    let (mut old_r, mut r) = (a.clone(), b.clone());
    let (mut old_s, mut s) = (Integer::from(1u32), Integer::new());
    let (mut old_t, mut t) = (Integer::new(), Integer::from(1u32));

    while r != 0 {
        let q = Integer::from(&old_r / &r);
        let next_r = old_r - Integer::from(&q * &r);
        old_r = std::mem::replace(&mut r, next_r);
        let next_s = old_s - Integer::from(&q * &s);
        old_s = std::mem::replace(&mut s, next_s);
        let next_t = old_t - Integer::from(&q * &t);
        old_t = std::mem::replace(&mut t, next_t);
    }

    if old_r < 0 {
        old_r = -old_r;
        old_s = -old_s;
        old_t = -old_t;
    }
    (old_r, old_s, old_t)
}

/// Modular inverse of a mod m, in [0, m).
///
/// Fails with [`FactorError::NoInverse`] when gcd(a, m) ≠ 1.
pub fn mod_inverse(a: &Integer, m: &Integer) -> Result<Integer> {
    if *m < 2 {
        return Err(FactorError::InvalidInput("inverse modulus must exceed 1"));
    }
    let (g, x, _) = ext_gcd(a, m);
    if g != 1 {
        return Err(FactorError::NoInverse);
    }
    Ok(x.rem_euc(m))
}
