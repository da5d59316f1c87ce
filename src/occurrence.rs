//! Pigeonhole bounds on how many letters may share one digit.

use crate::engine::{ConstraintEngine, EngineError, Val, VarToken};
use std::fmt;

/// `[min, max]` letters per digit value for `letters` letters in `base` digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccurrenceBounds {
    pub letters: usize,
    pub base: u32,
    pub min: u64,
    pub max: u64,
}

impl OccurrenceBounds {
    /// `min = max(0, n/base - relax_min)`, `max = min(n, ⌈n/base⌉ + relax_max)`.
    #[must_use]
    pub fn compute(letters: usize, base: u32, relax_min: u32, relax_max: u32) -> Self {
        let n = letters as u64;
        let b = u64::from(base);
        let min = (n / b).saturating_sub(u64::from(relax_min));
        let max = n.min(n.div_ceil(b).saturating_add(u64::from(relax_max)));
        Self { letters, base, min, max }
    }

    /// Whether the bound collapses to pairwise-distinct digits.
    #[must_use]
    pub fn is_all_distinct(&self) -> bool {
        self.max == 1
    }

    /// Whether `counts[d]` (letters assigned digit `d`) respects the bounds.
    #[must_use]
    pub fn admits(&self, counts: &[u64]) -> bool {
        counts.iter().all(|&c| c <= self.max && (self.is_all_distinct() || c >= self.min))
    }

    /// Post all-distinct or a global cardinality over every digit value.
    ///
    /// # Errors
    /// Propagates engine failures.
    pub fn post<E: ConstraintEngine + ?Sized>(&self, engine: &mut E, vars: &[VarToken]) -> Result<(), EngineError> {
        if vars.is_empty() {
            return Ok(());
        }
        if self.is_all_distinct() {
            log::debug!("occurrence bound: all {} letters distinct", vars.len());
            return engine.post_all_distinct(vars);
        }
        log::debug!("occurrence bound: each digit used by {}..={} of {} letters", self.min, self.max, vars.len());
        let as_val = |v: u64| Val::try_from(v).unwrap_or(Val::MAX);
        let values: Vec<Val> = (0..Val::from(self.base)).collect();
        let lb = vec![as_val(self.min); values.len()];
        let ub = vec![as_val(self.max); values.len()];
        engine.post_bounded_cardinality(vars, &values, &lb, &ub)
    }
}

impl fmt::Display for OccurrenceBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_all_distinct() {
            write!(f, "all distinct")
        } else {
            write!(f, "{}..={} per digit", self.min, self.max)
        }
    }
}
