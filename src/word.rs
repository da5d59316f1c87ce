//! Fixed-precision word encoding.

use crate::config::{SolverConfig, WordEncoding};
use crate::digits::DigitPool;
use crate::engine::{ConstraintEngine, EngineError, IntExpr, LinearRhs, RelOp, Val, VarToken};
use crate::errors::ModelError;
use crate::solver::SolverError;

/// Builds the value of a leaf as an engine expression.
#[derive(Debug, Clone, Copy)]
pub struct WordEncoder {
    base: u32,
    encoding: WordEncoding,
    allow_leading_zeros: bool,
}

/// `base^exp`, or `None` once it passes `bound`.
pub(crate) fn bounded_pow(base: u32, exp: usize, bound: Val) -> Option<Val> {
    let mut acc: Val = 1;
    for _ in 0..exp {
        acc = acc.checked_mul(Val::from(base)).filter(|v| *v - 1 <= bound)?;
    }
    Some(acc)
}

/// Parse a decimal constant leaf; the empty constant is 0.
///
/// # Errors
/// `ConstantOutOfRange` if it does not fit the engine's value type.
pub fn constant_value(digits: &[char]) -> Result<Val, ModelError> {
    if digits.is_empty() {
        return Ok(0);
    }
    let text: String = digits.iter().collect();
    text.parse::<Val>().map_err(|_| ModelError::ConstantOutOfRange { text })
}

/// Post `first > 0`.
///
/// # Errors
/// Propagates engine failures.
pub fn post_leading_guard<E: ConstraintEngine + ?Sized>(engine: &mut E, first: VarToken) -> Result<(), EngineError> {
    engine.post(IntExpr::Var(first).relate(RelOp::Gt, IntExpr::Const(0)))
}

impl WordEncoder {
    #[must_use]
    pub fn new(config: &SolverConfig) -> Self {
        Self {
            base: config.base,
            encoding: config.word_encoding,
            allow_leading_zeros: config.allow_leading_zeros,
        }
    }

    /// Encode one leaf. Constants become literals; words get digit
    /// variables from `pool`, a value variable, and the leading-digit guard.
    ///
    /// # Errors
    /// `WordTooLong` if the value domain would pass the engine's bound,
    /// `ConstantOutOfRange` for oversized constants, or engine failures.
    pub fn encode<E: ConstraintEngine + ?Sized>(
        &self,
        engine: &mut E,
        pool: &mut DigitPool,
        word: &[char],
        is_constant: bool,
    ) -> Result<IntExpr, SolverError> {
        if is_constant {
            return Ok(IntExpr::Const(constant_value(word)?));
        }
        let Some(&first) = word.first() else {
            return Ok(IntExpr::Const(0));
        };

        let bound = engine.max_int_bound();
        if bounded_pow(self.base, word.len(), bound).is_none() {
            return Err(ModelError::WordTooLong {
                length: word.len(),
                base: self.base,
                max_length: crate::strategy::safe_word_length(self.base, bound),
            }
            .into());
        }

        let digits = word
            .iter()
            .map(|&c| pool.get_or_create(engine, c))
            .collect::<Result<Vec<_>, _>>()?;
        if !self.allow_leading_zeros {
            post_leading_guard(engine, digits[0])?;
        }

        let name: String = word.iter().collect();
        log::trace!("encoding '{name}' (leading '{first}') as {:?}", self.encoding);
        let value = match self.encoding {
            WordEncoding::Positional => self.positional(engine, &name, &digits)?,
            WordEncoding::Horner => self.horner(engine, &name, &digits)?,
        };
        Ok(IntExpr::Var(value))
    }

    fn positional<E: ConstraintEngine + ?Sized>(&self, engine: &mut E, name: &str, digits: &[VarToken]) -> Result<VarToken, EngineError> {
        let base = Val::from(self.base);
        let mut coeffs = vec![1; digits.len()];
        for i in (0..digits.len() - 1).rev() {
            coeffs[i] = coeffs[i + 1] * base;
        }
        let value = engine.new_int_var(name, 0, coeffs[0] * base - 1)?;
        engine.post_linear_eq(digits, &coeffs, LinearRhs::Var(value))?;
        Ok(value)
    }

    fn horner<E: ConstraintEngine + ?Sized>(&self, engine: &mut E, name: &str, digits: &[VarToken]) -> Result<VarToken, EngineError> {
        let base = Val::from(self.base);
        let mut acc = digits[0];
        let mut top = base - 1;
        for (i, &digit) in digits.iter().enumerate().skip(1) {
            top = top * base + base - 1;
            let next = engine.new_int_var(&format!("{name}#{i}"), 0, top)?;
            engine.post_linear_eq(&[acc, digit], &[base, 1], LinearRhs::Var(next))?;
            acc = next;
        }
        Ok(acc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Z3Engine;

    fn encode_all(config: &SolverConfig, word: &str) -> Vec<(Vec<u32>, Val)> {
        let mut engine = Z3Engine::new();
        let mut pool = DigitPool::new(config.base);
        let letters: Vec<char> = word.chars().collect();
        let value = WordEncoder::new(config).encode(&mut engine, &mut pool, &letters, false).unwrap();
        let vars = pool.vars();
        let mut out = Vec::new();
        while let Some(a) = engine.solve_next().unwrap() {
            let digits = vars.iter().map(|&v| u32::try_from(a[v]).unwrap()).collect();
            out.push((digits, Val::try_from(value.evaluate(&a).unwrap()).unwrap()));
        }
        out
    }

    #[test]
    fn test_positional_value() {
        let config = SolverConfig::default().with_leading_zeros(true);
        for (digits, value) in encode_all(&config, "ab") {
            assert_eq!(value, Val::from(digits[0] * 10 + digits[1]));
        }
    }

    #[test]
    fn test_horner_matches_positional() {
        let base = SolverConfig::default().with_base(3);
        let mut positional = encode_all(&base, "abca");
        let mut horner = encode_all(&base.clone().with_word_encoding(WordEncoding::Horner), "abca");
        positional.sort();
        horner.sort();
        assert_eq!(positional, horner);
        assert_eq!(positional.len(), 2 * 3 * 3);
        for (digits, value) in positional {
            let (a, b, c) = (Val::from(digits[0]), Val::from(digits[1]), Val::from(digits[2]));
            assert_eq!(value, a * 27 + b * 9 + c * 3 + a);
        }
    }

    #[test]
    fn test_leading_guard() {
        let config = SolverConfig::default().with_base(4);
        let solutions = encode_all(&config, "ab");
        assert_eq!(solutions.len(), 3 * 4);
        assert!(solutions.iter().all(|(digits, _)| digits[0] > 0));

        let relaxed = encode_all(&config.with_leading_zeros(true), "ab");
        assert_eq!(relaxed.len(), 16);
    }

    #[test]
    fn test_repeated_letters_share_a_digit() {
        let config = SolverConfig::default().with_base(2);
        let solutions = encode_all(&config, "aaaaa");
        assert_eq!(solutions, vec![(vec![1], 31)]);
    }

    #[test]
    fn test_constants() {
        let mut engine = Z3Engine::new();
        let mut pool = DigitPool::new(10);
        let encoder = WordEncoder::new(&SolverConfig::default());
        let digits: Vec<char> = "0042".chars().collect();
        assert_eq!(encoder.encode(&mut engine, &mut pool, &digits, true).unwrap(), IntExpr::Const(42));
        assert_eq!(encoder.encode(&mut engine, &mut pool, &[], true).unwrap(), IntExpr::Const(0));
        assert!(pool.is_empty());

        let huge: Vec<char> = "99999999999999999999".chars().collect();
        assert!(matches!(
            encoder.encode(&mut engine, &mut pool, &huge, true),
            Err(SolverError::InvalidModel(ModelError::ConstantOutOfRange { .. }))
        ));
    }

    #[test]
    fn test_word_too_long() {
        let mut engine = Z3Engine::new();
        let mut pool = DigitPool::new(10);
        let encoder = WordEncoder::new(&SolverConfig::default());
        let word: Vec<char> = "ABCDEFGH".chars().collect();
        let err = encoder.encode(&mut engine, &mut pool, &word, false).unwrap_err();
        assert!(matches!(
            err,
            SolverError::InvalidModel(ModelError::WordTooLong { length: 8, base: 10, max_length: 7 })
        ));
    }

    #[test]
    fn test_bounded_pow() {
        assert_eq!(bounded_pow(10, 0, 100), Some(1));
        assert_eq!(bounded_pow(10, 2, 100), Some(100));
        assert_eq!(bounded_pow(10, 3, 100), None);
        assert_eq!(bounded_pow(2, 3, 7), Some(8));
    }
}
