//! Error taxonomy for the factorization engines.
//!
//! Only genuinely invalid requests surface as errors. An engine that runs to
//! completion without finding a factor is *not* an error — every engine
//! returns `Option<Integer>` and the driver moves on to the next strategy.

use thiserror::Error;

/// Errors raised by the number-theory kit and the engines.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FactorError {
    /// The input lies outside the operation's domain (n < 2 where a
    /// composite is required, an even Montgomery modulus, a composite
    /// modulus where a prime is required, a root of non-positive degree,
    /// or a negative radicand with an even root degree).
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    /// Modular inverse requested for an element not coprime to the modulus.
    #[error("no modular inverse: gcd(a, m) != 1")]
    NoInverse,

    /// Tonelli–Shanks called on a quadratic non-residue.
    #[error("no square root: argument is a non-residue modulo p")]
    NoSquareRoot,

    /// A sieve bound would exceed what fits in addressable memory.
    #[error("sieve bound {0} exceeds supported capacity")]
    CapacityExceeded(u64),
}

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, FactorError>;
