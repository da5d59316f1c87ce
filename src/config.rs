use crate::errors::ConfigError;
use std::time::Duration;

/// Largest numeral base accepted by [`SolverConfig::validate`].
pub const MAX_BASE: u32 = 65_536;

/// How a word's value is built from its digits in the fixed-precision model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WordEncoding {
    /// One weighted sum `Σ dᵢ·base^(n-1-i)`.
    #[default]
    Positional,
    /// A chain `accᵢ = accᵢ₋₁·base + dᵢ`.
    Horner,
}

/// Which model the compiler builds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ModelStrategy {
    /// Pick fixed precision or bignum from the longest word.
    #[default]
    Adaptive,
    FixedPrecision,
    Bignum,
}

/// Per-request solver configuration. Read-only once a solve starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverConfig {
    pub base: u32,
    pub allow_leading_zeros: bool,
    pub word_encoding: WordEncoding,
    pub strategy: ModelStrategy,
    pub relax_min_occurrence: u32,
    pub relax_max_occurrence: u32,
    /// 0 means unbounded.
    pub solution_limit: u32,
    /// 0 means unbounded.
    pub time_limit_ms: u32,
    /// Re-check every solution with the independent evaluator.
    pub check_solutions: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            base: 10,
            allow_leading_zeros: false,
            word_encoding: WordEncoding::default(),
            strategy: ModelStrategy::default(),
            relax_min_occurrence: 0,
            relax_max_occurrence: 0,
            solution_limit: 0,
            time_limit_ms: 0,
            check_solutions: true,
        }
    }
}

fn relax_from_i64(parameter: &'static str, value: i64) -> Result<u32, ConfigError> {
    if value < 0 {
        return Err(ConfigError::NegativeRelax { parameter, value });
    }
    u32::try_from(value).map_err(|_| ConfigError::RelaxOutOfRange { parameter, value })
}

impl SolverConfig {
    #[must_use]
    pub fn with_base(mut self, base: u32) -> Self {
        self.base = base;
        self
    }

    #[must_use]
    pub fn with_leading_zeros(mut self, allow: bool) -> Self {
        self.allow_leading_zeros = allow;
        self
    }

    #[must_use]
    pub fn with_word_encoding(mut self, word_encoding: WordEncoding) -> Self {
        self.word_encoding = word_encoding;
        self
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: ModelStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    #[must_use]
    pub fn with_solution_limit(mut self, limit: u32) -> Self {
        self.solution_limit = limit;
        self
    }

    #[must_use]
    pub fn with_time_limit_ms(mut self, limit: u32) -> Self {
        self.time_limit_ms = limit;
        self
    }

    /// Set both occurrence relaxations from signed (user-facing) values.
    ///
    /// # Errors
    /// `NegativeRelax` for values below zero, `RelaxOutOfRange` above `u32::MAX`.
    pub fn with_relax(mut self, relax_min: i64, relax_max: i64) -> Result<Self, ConfigError> {
        self.relax_min_occurrence = relax_from_i64("relax_min_occurrence", relax_min)?;
        self.relax_max_occurrence = relax_from_i64("relax_max_occurrence", relax_max)?;
        Ok(self)
    }

    /// # Errors
    /// Returns a [`ConfigError`] if the base is outside `[2, MAX_BASE]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base < 2 {
            return Err(ConfigError::BaseTooSmall { base: self.base });
        }
        if self.base > MAX_BASE {
            return Err(ConfigError::BaseTooLarge { base: self.base, max: MAX_BASE });
        }
        Ok(())
    }

    #[must_use]
    pub fn time_limit(&self) -> Option<Duration> {
        (self.time_limit_ms > 0).then(|| Duration::from_millis(u64::from(self.time_limit_ms)))
    }

    #[must_use]
    pub fn solution_limit(&self) -> Option<usize> {
        (self.solution_limit > 0).then_some(self.solution_limit as usize)
    }
}
