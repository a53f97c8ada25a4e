//! # Continued-Fraction Iterators for √n
//!
//! Lazy sequences driving the CFRAC engine: the partial quotients
//! (a₀, a₁, a₂, …) of √n and the convergent numerators/denominators
//! (p_k, q_k) reduced mod n.
//!
//! The quotient recurrence keeps three integers (m, d, a):
//!
//! - m_{k+1} = d_k·a_k − m_k
//! - d_{k+1} = (n − m_{k+1}²) / d_k   (always an exact division)
//! - a_{k+1} = ⌊(a₀ + m_{k+1}) / d_{k+1}⌋
//!
//! starting from m₀ = 0, d₀ = 1, a₀ = ⌊√n⌋. Convergents follow the standard
//! p_k = a_k·p_{k−1} + p_{k−2}, q_k = a_k·q_{k−1} + q_{k−2}, reduced mod n —
//! safe because every downstream consumer needs values only mod n.
//!
//! Both iterators are empty when n is a perfect square (d would hit zero),
//! infinite otherwise, and `Clone` duplicates a cursor at its current
//! position for independent advancement.

use rug::Integer;

use crate::nt;

/// Lazy partial quotients a₀, a₁, a₂, … of √n.
#[derive(Clone, Debug)]
pub struct PartialQuotients {
    n: Integer,
    a0: Integer,
    m: Integer,
    d: Integer,
    a: Integer,
    started: bool,
    exhausted: bool,
}

impl PartialQuotients {
    /// Cursor at the start of the expansion. Empty for perfect squares.
    pub fn new(n: &Integer) -> Self {
        let exhausted = *n < 2 || nt::is_perfect_square(n);
        let a0 = if exhausted {
            Integer::new()
        } else {
            Integer::from(n.sqrt_ref())
        };
        PartialQuotients {
            n: n.clone(),
            a: a0.clone(),
            a0,
            m: Integer::new(),
            d: Integer::from(1u32),
            started: false,
            exhausted,
        }
    }

    /// ⌊√n⌋, the first quotient (zero when the expansion is empty).
    pub fn a0(&self) -> &Integer {
        &self.a0
    }
}

impl Iterator for PartialQuotients {
    type Item = Integer;

    fn next(&mut self) -> Option<Integer> {
        if self.exhausted {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(self.a0.clone());
        }
        self.m = Integer::from(&self.d * &self.a) - &self.m;
        self.d = (Integer::from(&self.n) - Integer::from(&self.m * &self.m)) / &self.d;
        self.a = (Integer::from(&self.a0 + &self.m)) / &self.d;
        Some(self.a.clone())
    }
}

/// One convergent of √n: the quotient that produced it and (p, q) mod n.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Convergent {
    /// Partial quotient a_k.
    pub a: Integer,
    /// Numerator p_k mod n.
    pub p: Integer,
    /// Denominator q_k mod n.
    pub q: Integer,
}

/// Lazy convergents (p_k mod n, q_k mod n) of √n.
#[derive(Clone, Debug)]
pub struct Convergents {
    quotients: PartialQuotients,
    n: Integer,
    p_prev: Integer,
    p_prev2: Integer,
    q_prev: Integer,
    q_prev2: Integer,
}

impl Convergents {
    pub fn new(n: &Integer) -> Self {
        Convergents {
            quotients: PartialQuotients::new(n),
            n: n.clone(),
            // (p_{-1}, p_{-2}) = (1, 0), (q_{-1}, q_{-2}) = (0, 1)
            p_prev: Integer::from(1u32),
            p_prev2: Integer::new(),
            q_prev: Integer::new(),
            q_prev2: Integer::from(1u32),
        }
    }
}

impl Iterator for Convergents {
    type Item = Convergent;

    fn next(&mut self) -> Option<Convergent> {
        let a = self.quotients.next()?;
        let p = (Integer::from(&a * &self.p_prev) + &self.p_prev2) % &self.n;
        let q = (Integer::from(&a * &self.q_prev) + &self.q_prev2) % &self.n;
        self.p_prev2 = std::mem::replace(&mut self.p_prev, p.clone());
        self.q_prev2 = std::mem::replace(&mut self.q_prev, q.clone());
        Some(Convergent { a, p, q })
    }
}
