//! Arbitrary-precision evaluation of an equation under a solution.
//!
//! Shares no code with the constraint model, so it can be used to check
//! what the engine returns.

use crate::operator::Operator;
use crate::solution::Solution;
use crate::tree::Node;
use num_bigint::{BigInt, BigUint};
use num_traits::{Pow, Signed, ToPrimitive, Zero};

enum Item {
    /// `None` once undefined (division by zero, negative exponent, missing letter).
    Num(Option<BigInt>),
    Truth(bool),
}

/// Value of a leaf: the word read in `base`, or the decimal constant.
#[must_use]
pub fn leaf_value(word: &[char], is_constant: bool, solution: &Solution, base: u32) -> Option<BigInt> {
    let radix = if is_constant { 10 } else { base };
    let mut value = BigUint::zero();
    for &c in word {
        let digit = if is_constant { c.to_digit(10)? } else { solution.get(c)? };
        value = value * radix + digit;
    }
    Some(BigInt::from(value))
}

fn apply(op: Operator, a: &BigInt, b: &BigInt) -> Option<BigInt> {
    match op {
        Operator::Add => Some(a + b),
        Operator::Sub => Some(a - b),
        Operator::Mul => Some(a * b),
        Operator::Div | Operator::Mod if b.is_zero() => None,
        Operator::Div => Some(a / b),
        Operator::Mod => Some(a % b),
        Operator::Pow if b.is_negative() => None,
        Operator::Pow => {
            if a.is_zero() || a.abs() == BigInt::from(1) {
                // exponent size does not matter
                let even = (b % 2u32).is_zero();
                return Some(match (a.is_zero(), b.is_zero(), a.is_negative() && !even) {
                    (true, true, _) => BigInt::from(1),
                    (true, false, _) => BigInt::zero(),
                    (false, _, true) => BigInt::from(-1),
                    (false, _, false) => BigInt::from(1),
                });
            }
            Some(Pow::pow(a, b.to_u32()?))
        }
        _ => None,
    }
}

fn compare(op: Operator, a: &BigInt, b: &BigInt) -> bool {
    match op {
        Operator::Eq => a == b,
        Operator::Neq => a != b,
        Operator::Lt => a < b,
        Operator::Gt => a > b,
        Operator::Leq => a <= b,
        Operator::Geq => a >= b,
        _ => false,
    }
}

/// Whether every relation in `tree` holds under `solution`.
///
/// Relations over undefined values are false; malformed trees are never satisfied.
#[must_use]
pub fn satisfies(tree: &Node, solution: &Solution, base: u32) -> bool {
    let mut stack: Vec<Item> = Vec::new();
    for node in tree.postorder() {
        let item = match node {
            Node::Leaf { word, is_constant } => Item::Num(leaf_value(word, *is_constant, solution, base)),
            Node::Internal { op, .. } => {
                let (Some(right), Some(left)) = (stack.pop(), stack.pop()) else {
                    return false;
                };
                match (left, right) {
                    (Item::Truth(l), Item::Truth(r)) if *op == Operator::And => Item::Truth(l && r),
                    (Item::Num(l), Item::Num(r)) if op.is_relational() => {
                        Item::Truth(matches!((l, r), (Some(l), Some(r)) if compare(*op, &l, &r)))
                    }
                    (Item::Num(l), Item::Num(r)) if op.is_arithmetic() => {
                        Item::Num(l.zip(r).and_then(|(l, r)| apply(*op, &l, &r)))
                    }
                    _ => return false,
                }
            }
        };
        stack.push(item);
    }
    matches!(stack.as_slice(), [Item::Truth(true)])
}
