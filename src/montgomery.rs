//! # Montgomery Form for Arbitrary-Precision Odd Moduli
//!
//! Represents a residue x as x̄ = x·R mod n with R = 2^k, k = bitlen(n), so
//! that modular multiplication becomes REDC(x̄·ȳ) — a multiply, a masked
//! low-word multiply, and a shift, with one conditional subtraction and no
//! division by n.
//!
//! The engines treat Montgomery form as an optional fast path: GMP's
//! `pow_mod` is the default everywhere, and the context here serves callers
//! that perform long runs of multiplications against one fixed odd modulus.
//!
//! ## References
//!
//! - Peter L. Montgomery, "Modular Multiplication Without Trial Division",
//!   Mathematics of Computation, 44(170):519–521, 1985.

use rug::ops::RemRounding;
use rug::Integer;

use crate::error::{FactorError, Result};

/// Precomputed constants for a fixed odd modulus n > 1.
#[derive(Clone, Debug)]
pub struct Montgomery {
    n: Integer,
    /// R = 2^k.
    k: u32,
    /// R mod n — the Montgomery form of 1.
    r_mod_n: Integer,
    /// R² mod n, for conversion into Montgomery form.
    r2_mod_n: Integer,
    /// −n⁻¹ mod R.
    n_neg_inv: Integer,
}

impl Montgomery {
    /// Build a context for the odd modulus n > 1.
    pub fn new(n: &Integer) -> Result<Self> {
        if *n < 2 || n.is_even() {
            return Err(FactorError::InvalidInput("Montgomery modulus must be odd and > 1"));
        }
        let k = n.significant_bits();
        let r = Integer::from(1u32) << k;
        // n odd and R a power of two, so the inverse always exists.
        let inv = n.clone().invert(&r).expect("gcd(n, 2^k) = 1");
        let n_neg_inv = Integer::from(&r - &inv);
        let r_mod_n = Integer::from(&r % n);
        let r2_mod_n = Integer::from(&r_mod_n * &r_mod_n) % n;
        Ok(Montgomery {
            n: n.clone(),
            k,
            r_mod_n,
            r2_mod_n,
            n_neg_inv,
        })
    }

    /// The modulus this context reduces by.
    pub fn modulus(&self) -> &Integer {
        &self.n
    }

    /// Montgomery reduction: t·R⁻¹ mod n for 0 ≤ t < R·n.
    ///
    /// m = (t mod R)·(−n⁻¹) mod R makes t + m·n divisible by R exactly,
    /// and the quotient lies below 2n, so one subtraction suffices.
    pub fn redc(&self, t: Integer) -> Integer {
        let mut m = Integer::from(&t * &self.n_neg_inv);
        m.keep_bits_mut(self.k);
        let mut u = (t + m * &self.n) >> self.k;
        if u >= self.n {
            u -= &self.n;
        }
        u
    }

    /// x → x̄ = x·R mod n.
    pub fn to_mont(&self, x: &Integer) -> Integer {
        let folded = x.clone().rem_euc(&self.n);
        self.redc(folded * &self.r2_mod_n)
    }

    /// x̄ → x.
    pub fn from_mont(&self, x: &Integer) -> Integer {
        self.redc(x.clone())
    }

    /// Product of two Montgomery-form values, in Montgomery form.
    pub fn mul(&self, a: &Integer, b: &Integer) -> Integer {
        self.redc(Integer::from(a * b))
    }

    /// Square of a Montgomery-form value.
    pub fn sqr(&self, a: &Integer) -> Integer {
        self.redc(Integer::from(a * a))
    }

    /// The Montgomery form of 1.
    pub fn one(&self) -> Integer {
        self.r_mod_n.clone()
    }

    /// base^exp for a Montgomery-form base and plain non-negative exponent;
    /// the result stays in Montgomery form.
    pub fn pow(&self, base: &Integer, exp: &Integer) -> Integer {
        debug_assert!(*exp >= 0);
        if *exp == 0 {
            return self.one();
        }
        let bits = exp.significant_bits();
        let mut acc = base.clone();
        for i in (0..bits - 1).rev() {
            acc = self.sqr(&acc);
            if exp.get_bit(i) {
                acc = self.mul(&acc, base);
            }
        }
        acc
    }
}
