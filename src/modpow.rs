//! # Sliding-Window Modular Exponentiation
//!
//! Left-to-right exponentiation that aggregates runs of exponent bits into
//! odd windows, trading a small precomputed table (a¹, a³, …, a^(2^w − 1))
//! for fewer multiplications. Squarings pass through zero runs untouched.
//!
//! Windowing only pays off once the exponent is long; below 256 bits the
//! scan delegates to GMP's exponentiation. The self-referential Pollard maps
//! (x^x mod n) are the main in-crate consumer of the windowed path.

use rug::ops::RemRounding;
use rug::Integer;

/// Exponent bit length at which the sliding window engages.
pub const WINDOW_THRESHOLD: u32 = 256;

/// Window width for a given exponent bit length, within [3, 8].
pub fn window_size(exp_bits: u32) -> u32 {
    match exp_bits {
        0..=511 => 3,
        512..=1023 => 4,
        1024..=2047 => 5,
        2048..=4095 => 6,
        4096..=8191 => 7,
        _ => 8,
    }
}

/// base^exp mod n for exp ≥ 0, n ≥ 1.
///
/// Exponents shorter than [`WINDOW_THRESHOLD`] bits go straight to GMP;
/// longer ones take the sliding-window ladder.
pub fn pow_mod(base: &Integer, exp: &Integer, n: &Integer) -> Integer {
    debug_assert!(*exp >= 0, "negative exponents are not supported");
    debug_assert!(*n >= 1);
    if *n == 1 {
        return Integer::new();
    }
    let bits = exp.significant_bits();
    if bits < WINDOW_THRESHOLD {
        return base
            .clone()
            .rem_euc(n)
            .pow_mod(exp, n)
            .expect("non-negative exponent");
    }

    let w = window_size(bits);
    let base = base.clone().rem_euc(n);

    // Odd powers a^1, a^3, ..., a^(2^w - 1)
    let base_sq = Integer::from(&base * &base) % n;
    let mut table = Vec::with_capacity(1 << (w - 1));
    table.push(base);
    for i in 1..(1usize << (w - 1)) {
        let next = Integer::from(&table[i - 1] * &base_sq) % n;
        table.push(next);
    }

    let mut result = Integer::from(1u32);
    let mut i = bits as i64 - 1;
    while i >= 0 {
        if !exp.get_bit(i as u32) {
            result.square_mut();
            result %= n;
            i -= 1;
            continue;
        }
        // Window [j, i]: at most w bits, beginning and ending with a 1
        let mut j = (i - w as i64 + 1).max(0);
        while !exp.get_bit(j as u32) {
            j += 1;
        }
        let mut value = 0usize;
        for k in (j..=i).rev() {
            value = (value << 1) | exp.get_bit(k as u32) as usize;
        }
        for _ in j..=i {
            result.square_mut();
            result %= n;
        }
        result *= &table[(value - 1) / 2];
        result %= n;
        i = j - 1;
    }
    result
}
