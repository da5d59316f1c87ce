use crate::tree::Node;
use std::collections::BTreeMap;
use std::fmt;

/// One assignment of digits to the letters of an equation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Solution {
    digits: BTreeMap<char, u32>,
}

/// Digit `d` as written in `base`: `0-9a-z` up to base 36, `(d)` beyond.
#[must_use]
pub fn digit_to_string(digit: u32, base: u32) -> String {
    match char::from_digit(digit, 36) {
        Some(c) if base <= 36 || digit < 10 => c.to_string(),
        _ => format!("({digit})"),
    }
}

impl Solution {
    #[must_use]
    pub fn get(&self, letter: char) -> Option<u32> {
        self.digits.get(&letter).copied()
    }

    /// Letters and digits in letter order.
    pub fn iter(&self) -> impl Iterator<Item = (char, u32)> + '_ {
        self.digits.iter().map(|(&c, &d)| (c, d))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.digits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    /// The equation with every letter replaced by its digit.
    #[must_use]
    pub fn render(&self, tree: &Node, base: u32) -> String {
        let mut out = String::new();
        for c in tree.to_string().chars() {
            match self.get(c) {
                Some(d) => out.push_str(&digit_to_string(d, base)),
                None => out.push(c),
            }
        }
        out
    }
}

impl FromIterator<(char, u32)> for Solution {
    fn from_iter<I: IntoIterator<Item = (char, u32)>>(iter: I) -> Self {
        Self { digits: iter.into_iter().collect() }
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (c, d)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{c}={d}")?;
        }
        Ok(())
    }
}
