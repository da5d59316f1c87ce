//! Choosing between the fixed-precision and the bignum model.

use crate::engine::Val;
use crate::tree::Node;
use std::fmt;

/// Which model a compiled equation uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// One value variable per word, posted as ordinary arithmetic.
    FixedPrecision,
    /// Digit arrays joined by explicit carry chains.
    Bignum,
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::FixedPrecision => write!(f, "fixed-precision"),
            Encoding::Bignum => write!(f, "bignum"),
        }
    }
}

/// Largest `L` such that `base^L - 1 <= bound`.
#[must_use]
pub fn safe_word_length(base: u32, bound: Val) -> usize {
    let base = i128::from(base.max(2));
    let bound = i128::from(bound);
    let mut power: i128 = 1;
    let mut length = 0;
    while power * base - 1 <= bound {
        power *= base;
        length += 1;
    }
    length
}

/// Picks [`Encoding::Bignum`] when the longest leaf exceeds `threshold(base, bound)`,
/// where `bound` is the engine's [`max_int_bound`](crate::engine::ConstraintEngine::max_int_bound).
#[derive(Clone, Copy)]
pub struct AdaptiveSelector<F = fn(u32, Val) -> usize> {
    threshold: F,
}

impl AdaptiveSelector {
    /// Threshold [`safe_word_length`]; against [`MAX_INT_BOUND`](crate::engine::MAX_INT_BOUND)
    /// bases 2, 8, 10 and 16 give 24, 8, 7 and 6.
    #[must_use]
    pub fn new() -> Self {
        Self { threshold: safe_word_length }
    }
}

impl Default for AdaptiveSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Fn(u32, Val) -> usize> AdaptiveSelector<F> {
    /// Use a custom `T(base, bound)`.
    pub fn with_threshold(threshold: F) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self, base: u32, bound: Val) -> usize {
        (self.threshold)(base, bound)
    }

    pub fn select(&self, tree: &Node, base: u32, bound: Val) -> Encoding {
        let longest = tree.max_word_len();
        let threshold = self.threshold(base, bound);
        let encoding = if longest > threshold { Encoding::Bignum } else { Encoding::FixedPrecision };
        log::info!("longest word {longest}, threshold {threshold} for base {base}: {encoding}");
        encoding
    }
}

impl<F> fmt::Debug for AdaptiveSelector<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdaptiveSelector").finish_non_exhaustive()
    }
}
