//! # GF(2) Linear Algebra for Exponent-Parity Vectors
//!
//! Bit-packed Gauss–Jordan elimination over the exponent-parity matrix that
//! CFRAC assembles from its smooth relations. Each row carries a second,
//! equally bit-packed *history* vector over the original relations; the
//! elimination maintains the invariant that row i of the matrix equals the
//! XOR-sum of the original parity vectors its history marks. A row whose
//! exponent columns go to zero therefore hands back a dependency — a subset
//! of relations whose combined factorization is a perfect square.
//!
//! The column sweep may fan out over rayon: the pivot row is cloned (read
//! only) and every other row is owned by exactly one worker, so no locking
//! is needed.

use rayon::prelude::*;

/// Row count below which the parallel sweep is not worth its overhead.
const PAR_SWEEP_MIN_ROWS: usize = 256;

/// One matrix row: exponent-parity bits plus its relation history.
#[derive(Clone, Debug)]
pub struct Gf2Row {
    bits: Vec<u64>,
    history: Vec<u64>,
}

impl Gf2Row {
    fn get(&self, col: usize) -> bool {
        self.bits[col / 64] >> (col % 64) & 1 == 1
    }

    fn is_zero(&self) -> bool {
        self.bits.iter().all(|&w| w == 0)
    }

    fn xor_in(&mut self, other: &Gf2Row) {
        for (dst, src) in self.bits.iter_mut().zip(&other.bits) {
            *dst ^= src;
        }
        for (dst, src) in self.history.iter_mut().zip(&other.history) {
            *dst ^= src;
        }
    }
}

/// Dense GF(2) matrix with per-row history tracking.
#[derive(Clone, Debug)]
pub struct Gf2Matrix {
    ncols: usize,
    rows: Vec<Gf2Row>,
}

impl Gf2Matrix {
    /// Build from bit-packed parity rows of width `ncols`. Row i's history
    /// starts as the singleton {i}.
    pub fn new(parity_rows: Vec<Vec<u64>>, ncols: usize) -> Self {
        let nrows = parity_rows.len();
        let hist_words = nrows.div_ceil(64).max(1);
        let bit_words = ncols.div_ceil(64).max(1);
        let rows = parity_rows
            .into_iter()
            .enumerate()
            .map(|(i, mut bits)| {
                bits.resize(bit_words, 0);
                let mut history = vec![0u64; hist_words];
                history[i / 64] |= 1 << (i % 64);
                Gf2Row { bits, history }
            })
            .collect();
        Gf2Matrix { ncols, rows }
    }

    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    /// Gauss–Jordan column sweep. Consumes the matrix and returns the
    /// dependencies: for each all-zero row, the ascending indices of the
    /// original relations whose parity vectors XOR to zero.
    ///
    /// Pivots are chosen as the first candidate row at or below the current
    /// rank, so identical inputs always produce identical dependencies.
    pub fn eliminate(mut self, parallel: bool) -> Vec<Vec<usize>> {
        let nrows = self.rows.len();
        let mut rank = 0usize;
        for col in 0..self.ncols {
            if rank == nrows {
                break;
            }
            let Some(pivot) = (rank..nrows).find(|&r| self.rows[r].get(col)) else {
                continue;
            };
            self.rows.swap(rank, pivot);
            let pivot_row = self.rows[rank].clone();
            if parallel && nrows >= PAR_SWEEP_MIN_ROWS {
                self.rows.par_iter_mut().enumerate().for_each(|(i, row)| {
                    if i != rank && row.get(col) {
                        row.xor_in(&pivot_row);
                    }
                });
            } else {
                for (i, row) in self.rows.iter_mut().enumerate() {
                    if i != rank && row.get(col) {
                        row.xor_in(&pivot_row);
                    }
                }
            }
            rank += 1;
        }

        self.rows
            .iter()
            .filter(|row| row.is_zero())
            .map(|row| {
                let mut members = Vec::new();
                for (w, &word) in row.history.iter().enumerate() {
                    let mut bits = word;
                    while bits != 0 {
                        let b = bits.trailing_zeros() as usize;
                        members.push(w * 64 + b);
                        bits &= bits - 1;
                    }
                }
                members
            })
            .collect()
    }
}

/// Pack a list of set column indices into row words.
pub fn pack_bits(set: &[usize], ncols: usize) -> Vec<u64> {
    let mut words = vec![0u64; ncols.div_ceil(64).max(1)];
    for &c in set {
        debug_assert!(c < ncols);
        words[c / 64] |= 1 << (c % 64);
    }
    words
}
