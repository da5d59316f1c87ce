//! One engine variable per distinct letter.

use crate::engine::{Assignment, ConstraintEngine, EngineError, Val, VarToken};
use crate::solution::Solution;
use std::collections::HashMap;

/// Maps each letter to its digit variable, domain `[0, base-1]`.
///
/// Filled lazily while a tree is compiled; the first request for a letter
/// creates its variable and every later request returns the same handle.
#[derive(Debug, Clone)]
pub struct DigitPool {
    base: u32,
    // insertion order = first appearance in the tree
    entries: Vec<(char, VarToken)>,
    index: HashMap<char, usize>,
}

impl DigitPool {
    #[must_use]
    pub fn new(base: u32) -> Self {
        Self { base, entries: Vec::new(), index: HashMap::new() }
    }

    /// # Errors
    /// Propagates the engine's error if the variable cannot be created.
    pub fn get_or_create<E: ConstraintEngine + ?Sized>(&mut self, engine: &mut E, letter: char) -> Result<VarToken, EngineError> {
        if let Some(&i) = self.index.get(&letter) {
            return Ok(self.entries[i].1);
        }
        let var = engine.new_int_var(&letter.to_string(), 0, Val::from(self.base) - 1)?;
        log::trace!("digit variable {var} for '{letter}'");
        self.index.insert(letter, self.entries.len());
        self.entries.push((letter, var));
        Ok(var)
    }

    #[must_use]
    pub fn get(&self, letter: char) -> Option<VarToken> {
        self.index.get(&letter).map(|&i| self.entries[i].1)
    }

    #[must_use]
    pub fn base(&self) -> u32 {
        self.base
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Letters in first-appearance order.
    pub fn letters(&self) -> impl Iterator<Item = char> + '_ {
        self.entries.iter().map(|(c, _)| *c)
    }

    #[must_use]
    pub fn vars(&self) -> Vec<VarToken> {
        self.entries.iter().map(|(_, v)| *v).collect()
    }

    /// Read every letter's digit out of an assignment.
    ///
    /// # Errors
    /// `BoundOutOfRange` if the engine produced a value outside `[0, base-1]`.
    pub fn extract(&self, assignment: &Assignment) -> Result<Solution, EngineError> {
        self.entries
            .iter()
            .map(|&(letter, var)| {
                let value = assignment.value_of(var);
                match u32::try_from(value) {
                    Ok(digit) if digit < self.base => Ok((letter, digit)),
                    _ => Err(EngineError::BoundOutOfRange { name: letter.to_string(), value }),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Z3Engine;

    #[test]
    fn test_same_letter_same_variable() {
        let mut engine = Z3Engine::new();
        let mut pool = DigitPool::new(10);
        let a = pool.get_or_create(&mut engine, 'A').unwrap();
        let b = pool.get_or_create(&mut engine, 'B').unwrap();
        assert_ne!(a, b);
        assert_eq!(pool.get_or_create(&mut engine, 'A').unwrap(), a);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.get('B'), Some(b));
        assert_eq!(pool.get('C'), None);
        assert_eq!(pool.letters().collect::<String>(), "AB");
    }

    #[test]
    fn test_domain_matches_base() {
        let mut engine = Z3Engine::new();
        let mut pool = DigitPool::new(16);
        let a = pool.get_or_create(&mut engine, 'a').unwrap();
        assert_eq!(engine.bounds(a), Some((0, 15)));
        assert_eq!(engine.name_of(a), Some("a"));
    }

    #[test]
    fn test_extract_rejects_out_of_range_digits() {
        let mut engine = Z3Engine::new();
        let mut pool = DigitPool::new(2);
        pool.get_or_create(&mut engine, 'x').unwrap();
        let ok = pool.extract(&Assignment::new(vec![1])).unwrap();
        assert_eq!(ok.get('x'), Some(1));
        assert!(pool.extract(&Assignment::new(vec![2])).is_err());
        assert!(pool.extract(&Assignment::new(vec![-1])).is_err());
    }
}
