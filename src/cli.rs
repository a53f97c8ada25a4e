//! # CLI Execution Functions
//!
//! Extracted from `main.rs` to keep the entry point slim. Parses the
//! decimal inputs, runs the requested operation, and prints the
//! `n;seconds`-style timing lines the measurement scripts consume.

use std::time::Instant;

use anyhow::{bail, Context, Result};
use rug::Integer;
use tracing::info;

use factorhunt::{choose_algorithm, factor, factorize, generate_semiprime, Algorithm};

fn parse_integer(s: &str) -> Result<Integer> {
    s.trim()
        .parse::<Integer>()
        .with_context(|| format!("not a decimal integer: {s:?}"))
}

/// `factor` subcommand: one nontrivial divisor, optionally via a pinned
/// engine.
pub fn run_factor(n: &str, engine: Option<Algorithm>) -> Result<()> {
    let n = parse_integer(n)?;
    if n < 2 {
        bail!("n must be at least 2");
    }
    info!(digits = factorhunt::estimate_digits(&n), "factoring");
    let start = Instant::now();
    let result = match engine {
        Some(alg) => choose_algorithm(alg).run(&n),
        None => factor(&n),
    };
    let elapsed = start.elapsed().as_secs_f64();
    match result {
        Some(d) => {
            let cofactor = Integer::from(&n / &d);
            println!("{n} = {d} * {cofactor}");
        }
        None => println!("{n}: no factor found (prime or exhausted)"),
    }
    println!("{n};{elapsed:.3}");
    Ok(())
}

/// `factorize` subcommand: the full sorted prime multiset.
pub fn run_factorize(n: &str) -> Result<()> {
    let n = parse_integer(n)?;
    let start = Instant::now();
    let parts = factorize(&n);
    let elapsed = start.elapsed().as_secs_f64();
    let joined = parts
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(" * ");
    println!("{n} = {joined}");
    println!("{n};{elapsed:.3}");
    Ok(())
}

/// `semiprime` subcommand: a reproducible test case, printed as `n;p;q`.
pub fn run_semiprime(digits: u32, seed: Option<u64>) -> Result<()> {
    let (n, p, q) = generate_semiprime(digits, seed)?;
    info!(digits, seed, "semiprime generated");
    println!("{n};{p};{q}");
    Ok(())
}

/// `engines` subcommand: the closed algorithm set with one-line summaries.
pub fn run_engines() -> Result<()> {
    let engines: [(&str, &str); 9] = [
        ("cfrac", "continued-fraction factorization (Morrison-Brillhart)"),
        ("squfof", "Shanks square forms with multiplier schedule"),
        ("pollard-rho-standard", "Brent cycle detection over x^2 + c"),
        ("pollard-rho-combined", "map rotation: Chebyshev T2, x^x, x^2 + 1"),
        ("pollard-pm1-standard", "p-1 with incrementing exponent"),
        ("pollard-pm1-self-referential", "p-1 with a <- a^a"),
        ("pollard-pm1-power-mod", "p-1 with interleaved square-and-multiply"),
        ("pollard-pm1-reference", "p-1 over primes up to the smoothness bound"),
        ("williams-pplus1", "Lucas-sequence p+1 via Montgomery ladder"),
    ];
    for (name, summary) in engines {
        println!("{name:30} {summary}");
    }
    Ok(())
}
