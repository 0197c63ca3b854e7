//! Combination Enumerator: every k-element subset of a slice, lazily, in
//! lexicographic index order.

use crate::equity_engine::error::{EngineError, Result};

/// Number of k-subsets of an n-set. Zero when `k > n`, `u64::MAX` when the
/// count does not fit.
pub fn binomial(n: usize, k: usize) -> u64 {
    checked_binomial(n, k).unwrap_or(u64::MAX)
}

/// Exact C(n, k), or `None` on overflow. Each step holds C(n, i + 1), so the
/// division is exact; the widened product only has to fit one extra factor.
fn checked_binomial(n: usize, k: usize) -> Option<u64> {
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 0..k {
        acc = acc.checked_mul((n - i) as u128)? / (i + 1) as u128;
        if acc > u64::MAX as u128 {
            return None;
        }
    }
    Some(acc as u64)
}

/// Allocation-free cursor over k-subsets of `0..n`.
///
/// The hot equity loops walk completions through this directly and index
/// into their own deck, so no `Vec` is built per subset.
#[derive(Debug, Clone)]
pub struct IndexCursor {
    n: usize,
    indices: Vec<usize>,
    started: bool,
}

impl IndexCursor {
    pub fn new(n: usize, k: usize) -> Result<Self> {
        if k > n {
            return Err(EngineError::InvalidArity { k, n });
        }
        Ok(IndexCursor { n, indices: (0..k).collect(), started: false })
    }

    /// Step to the next subset. Returns `None` once every subset was visited.
    pub fn advance(&mut self) -> Option<&[usize]> {
        if !self.started {
            self.started = true;
            return Some(&self.indices);
        }
        let k = self.indices.len();
        let i = (0..k).rev().find(|&i| self.indices[i] < self.n - k + i)?;
        self.indices[i] += 1;
        for j in i + 1..k {
            self.indices[j] = self.indices[j - 1] + 1;
        }
        Some(&self.indices)
    }
}

/// Lazy iterator of subsets, each in the same relative order as the input.
pub struct Combinations<'a, T> {
    pool: &'a [T],
    cursor: IndexCursor,
    /// `None` when the subset count exceeds `u64`.
    remaining: Option<u64>,
}

impl<'a, T: Clone> Iterator for Combinations<'a, T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Vec<T>> {
        let pool = self.pool;
        let subset = self.cursor.advance()?.iter().map(|&i| pool[i].clone()).collect();
        self.remaining = self.remaining.map(|r| r.saturating_sub(1));
        Some(subset)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.remaining.map(usize::try_from) {
            Some(Ok(n)) => (n, Some(n)),
            _           => (usize::MAX, None),
        }
    }
}

/// Every `k`-element subset of `set`. `k == 0` yields one empty subset;
/// `k > set.len()` is an [`EngineError::InvalidArity`].
pub fn combinations<T: Clone>(set: &[T], k: usize) -> Result<Combinations<'_, T>> {
    Ok(Combinations {
        pool: set,
        cursor: IndexCursor::new(set.len(), k)?,
        remaining: checked_binomial(set.len(), k),
    })
}
