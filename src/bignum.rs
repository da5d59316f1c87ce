//! Carry-chain model for addition-only equations of any length.
//!
//! Every operand is a little-endian array of digit expressions. Addition is
//! elementwise and leaves positions un-normalized; each side of an equality
//! is then normalized through its own chain
//!
//! ```text
//! base·c₀ + d₀ = raw₀
//! base·cᵢ + dᵢ = rawᵢ + cᵢ₋₁
//! ```
//!
//! and the two sides are equated digit by digit, final carries included.

use crate::digits::DigitPool;
use crate::engine::{Assignment, ConstraintEngine, EngineError, IntExpr, LinearRhs, Val, VarToken};
use crate::errors::ModelError;
use crate::operator::Operator;
use crate::solver::SolverError;
use crate::tree::Node;
use crate::word::post_leading_guard;
use num_bigint::{BigInt, BigUint};
use num_traits::Zero;

/// Operators the carry-chain model can express.
const SUPPORTED: [Operator; 3] = [Operator::Add, Operator::Eq, Operator::And];

/// The normalized digits and carries of one side of one equality.
#[derive(Debug, Clone)]
pub struct CarryChain {
    pub base: u32,
    /// Un-normalized column sums, least significant first.
    pub raw: Vec<IntExpr>,
    pub digits: Vec<VarToken>,
    pub carries: Vec<VarToken>,
}

impl CarryChain {
    /// Whether the chain's recurrence holds under `assignment`.
    #[must_use]
    pub fn holds(&self, assignment: &Assignment) -> bool {
        let base = Val::from(self.base);
        let mut carry_in = BigInt::zero();
        for ((raw, &d), &c) in self.raw.iter().zip(&self.digits).zip(&self.carries) {
            let (d, c) = (assignment[d], assignment[c]);
            let Some(raw) = raw.evaluate(assignment) else {
                return false;
            };
            if !(0..base).contains(&d) || c < 0 || BigInt::from(base) * c + d != raw + &carry_in {
                return false;
            }
            carry_in = BigInt::from(c);
        }
        true
    }
}

/// Fail unless every operator in `tree` is ADD, EQ or a conjunction.
///
/// # Errors
/// `UnsupportedOperators` listing the offending operators in a stable order.
pub fn check_supported(tree: &Node) -> Result<(), ModelError> {
    let unsupported: Vec<Operator> = tree.operators().into_iter().filter(|op| !SUPPORTED.contains(op)).collect();
    if unsupported.is_empty() {
        Ok(())
    } else {
        Err(ModelError::UnsupportedOperators { operators: unsupported })
    }
}

/// Digits of a decimal constant in `base`, least significant first. Zero has none.
///
/// # Errors
/// `InvalidConstant` for non-decimal text.
pub fn constant_digits(text: &[char], base: u32) -> Result<Vec<Val>, ModelError> {
    let mut value = BigUint::zero();
    for &c in text {
        let digit = c.to_digit(10).ok_or_else(|| ModelError::InvalidConstant { text: text.iter().collect() })?;
        value = value * 10u32 + digit;
    }
    let mut digits = Vec::new();
    let base = BigUint::from(base);
    while !value.is_zero() {
        let digit = &value % &base;
        digits.push(digit.iter_u64_digits().next().map_or(0, |d| Val::try_from(d).unwrap_or(Val::MAX)));
        value /= &base;
    }
    Ok(digits)
}

/// `a + b` column by column; the longer array's tail carries through.
#[must_use]
pub fn add(a: Vec<IntExpr>, b: Vec<IntExpr>) -> Vec<IntExpr> {
    let (mut long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    for (slot, rhs) in long.iter_mut().zip(short) {
        let lhs = std::mem::replace(slot, IntExpr::Const(0));
        *slot = lhs + rhs;
    }
    long
}

/// Builds carry-chain models.
pub struct BignumEncoder {
    base: u32,
    allow_leading_zeros: bool,
    chains: Vec<CarryChain>,
}

enum Value {
    Digits(Vec<IntExpr>),
    Posted,
}

impl BignumEncoder {
    #[must_use]
    pub fn new(base: u32, allow_leading_zeros: bool) -> Self {
        Self { base, allow_leading_zeros, chains: Vec::new() }
    }

    /// Chains built so far, two per equality.
    #[must_use]
    pub fn into_chains(self) -> Vec<CarryChain> {
        self.chains
    }

    /// Little-endian digit array of a leaf.
    ///
    /// # Errors
    /// Invalid constants or engine failures.
    pub fn leaf<E: ConstraintEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        pool: &mut DigitPool,
        word: &[char],
        is_constant: bool,
    ) -> Result<Vec<IntExpr>, SolverError> {
        if is_constant {
            return Ok(constant_digits(word, self.base)?.into_iter().map(IntExpr::Const).collect());
        }
        let vars = word
            .iter()
            .map(|&c| pool.get_or_create(engine, c))
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(&first) = vars.first()
            && !self.allow_leading_zeros
        {
            post_leading_guard(engine, first)?;
        }
        Ok(vars.into_iter().rev().map(IntExpr::Var).collect())
    }

    fn chain<E: ConstraintEngine + ?Sized>(&self, engine: &mut E, label: &str, raw: Vec<IntExpr>) -> Result<CarryChain, EngineError> {
        let base = Val::from(self.base);
        let carry_max = engine.max_int_bound() / base;
        let mut digits = Vec::with_capacity(raw.len());
        let mut carries: Vec<VarToken> = Vec::with_capacity(raw.len());
        for (i, column) in raw.iter().enumerate() {
            let d = engine.new_int_var(&format!("{label}.d{i}"), 0, base - 1)?;
            let c = engine.new_int_var(&format!("{label}.c{i}"), 0, carry_max)?;
            let incoming = match carries.last() {
                Some(&prev) => column.clone() + IntExpr::Var(prev),
                None => column.clone(),
            };
            engine.post_equality(IntExpr::Const(base) * IntExpr::Var(c) + IntExpr::Var(d), incoming)?;
            digits.push(d);
            carries.push(c);
        }
        Ok(CarryChain { base: self.base, raw, digits, carries })
    }

    /// Normalize both sides and equate them. Nothing is posted for two empty sides.
    ///
    /// # Errors
    /// Engine failures.
    pub fn equate<E: ConstraintEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        mut left: Vec<IntExpr>,
        mut right: Vec<IntExpr>,
    ) -> Result<(), EngineError> {
        let n = left.len().max(right.len());
        if n == 0 {
            return Ok(());
        }
        left.resize(n, IntExpr::Const(0));
        right.resize(n, IntExpr::Const(0));

        let label = format!("eq{}", self.chains.len() / 2);
        let lhs = self.chain(engine, &format!("{label}.L"), left)?;
        let rhs = self.chain(engine, &format!("{label}.R"), right)?;
        for (&l, &r) in lhs.digits.iter().zip(&rhs.digits) {
            engine.post_linear_eq(&[l], &[1], LinearRhs::Var(r))?;
        }
        if let (Some(&l), Some(&r)) = (lhs.carries.last(), rhs.carries.last()) {
            engine.post_linear_eq(&[l], &[1], LinearRhs::Var(r))?;
        }
        log::debug!("{label}: carry chains over {n} columns");
        self.chains.push(lhs);
        self.chains.push(rhs);
        Ok(())
    }

    /// Compile the whole tree (one postorder pass with a local stack).
    ///
    /// # Errors
    /// Unsupported operators, stack-shape violations or engine failures.
    pub fn compile<E: ConstraintEngine + ?Sized>(
        &mut self,
        tree: &Node,
        engine: &mut E,
        pool: &mut DigitPool,
    ) -> Result<(), SolverError> {
        check_supported(tree)?;
        let mut stack: Vec<Value> = Vec::new();
        for node in tree.postorder() {
            match node {
                Node::Leaf { word, is_constant } => {
                    let digits = self.leaf(engine, pool, word, *is_constant)?;
                    stack.push(Value::Digits(digits));
                }
                Node::Internal { op, .. } => {
                    let (Some(right), Some(left)) = (stack.pop(), stack.pop()) else {
                        return Err(ModelError::StackShape { expected: 2, actual: stack.len() }.into());
                    };
                    let value = match (op, left, right) {
                        (Operator::Add, Value::Digits(a), Value::Digits(b)) => Value::Digits(add(a, b)),
                        (Operator::Eq, Value::Digits(a), Value::Digits(b)) => {
                            self.equate(engine, a, b)?;
                            Value::Posted
                        }
                        (Operator::And, Value::Posted, Value::Posted) => Value::Posted,
                        (Operator::And, ..) => {
                            return Err(ModelError::OperandKind { operator: *op, expected: "relational" }.into());
                        }
                        (op, ..) if SUPPORTED.contains(op) => {
                            return Err(ModelError::OperandKind { operator: *op, expected: "arithmetic" }.into());
                        }
                        (op, ..) => return Err(ModelError::UnsupportedOperators { operators: vec![*op] }.into()),
                    };
                    stack.push(value);
                }
            }
        }
        match stack.as_slice() {
            [Value::Posted] => Ok(()),
            [Value::Digits(_)] => Err(ModelError::NotAnEquation.into()),
            other => Err(ModelError::StackShape { expected: 1, actual: other.len() }.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Z3Engine;

    fn words(text: &str) -> Vec<char> {
        text.chars().collect()
    }

    #[test]
    fn test_unsupported_operators_are_listed() {
        let tree = Node::binary(
            Operator::Eq,
            Node::binary(Operator::Mul, Node::word("AB"), Node::binary(Operator::Sub, Node::word("C"), Node::word("D"))),
            Node::word("EF"),
        );
        let err = check_supported(&tree).unwrap_err();
        assert_eq!(err, ModelError::UnsupportedOperators { operators: vec![Operator::Sub, Operator::Mul] });
        assert!(err.to_string().contains("MUL"));
    }

    #[test]
    fn test_constant_digits() {
        assert_eq!(constant_digits(&words("1234"), 10).unwrap(), vec![4, 3, 2, 1]);
        assert_eq!(constant_digits(&words("6"), 2).unwrap(), vec![0, 1, 1]);
        assert_eq!(constant_digits(&words("255"), 16).unwrap(), vec![15, 15]);
        assert!(constant_digits(&words("0"), 10).unwrap().is_empty());
        assert!(constant_digits(&[], 10).unwrap().is_empty());
        let long = constant_digits(&words("123456789012345678901234567890"), 10).unwrap();
        assert_eq!(long.len(), 30);
        assert_eq!(long[0], 0);
        assert_eq!(long[29], 1);
    }

    #[test]
    fn test_add_carries_longer_tail() {
        let a = vec![IntExpr::Const(1), IntExpr::Const(2), IntExpr::Const(3)];
        let b = vec![IntExpr::Const(9)];
        let sum = add(a, b);
        let assignment = Assignment::new(vec![]);
        let values: Vec<Val> = sum.iter().map(|e| Val::try_from(e.evaluate(&assignment).unwrap()).unwrap()).collect();
        assert_eq!(values, vec![10, 2, 3]);
    }

    #[test]
    fn test_leaf_is_little_endian() {
        let mut engine = Z3Engine::new();
        let mut pool = DigitPool::new(10);
        let mut encoder = BignumEncoder::new(10, true);
        let digits = encoder.leaf(&mut engine, &mut pool, &words("ABC"), false).unwrap();
        let expected: Vec<IntExpr> = ['C', 'B', 'A'].iter().map(|&c| IntExpr::Var(pool.get(c).unwrap())).collect();
        assert_eq!(digits, expected);
    }

    #[test]
    fn test_compile_send_more_money() {
        let tree = Node::binary(
            Operator::Eq,
            Node::binary(Operator::Add, Node::word("SEND"), Node::word("MORE")),
            Node::word("MONEY"),
        );
        let mut engine = Z3Engine::new();
        let mut pool = DigitPool::new(10);
        let mut encoder = BignumEncoder::new(10, false);
        encoder.compile(&tree, &mut engine, &mut pool).unwrap();
        engine.post_all_distinct(&pool.vars()).unwrap();
        let chains = encoder.into_chains();
        assert_eq!(chains.len(), 2);
        assert!(chains.iter().all(|c| c.digits.len() == 5));

        let mut found = Vec::new();
        while let Some(a) = engine.solve_next().unwrap() {
            for chain in &chains {
                assert!(chain.holds(&a));
            }
            found.push(pool.extract(&a).unwrap());
        }
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].get('M'), Some(1));
        assert_eq!(found[0].get('Y'), Some(2));
    }

    #[test]
    fn test_empty_constants_post_nothing() {
        let tree = Node::binary(Operator::Eq, Node::constant("0"), Node::constant(""));
        let mut engine = Z3Engine::new();
        let mut pool = DigitPool::new(10);
        let mut encoder = BignumEncoder::new(10, false);
        encoder.compile(&tree, &mut engine, &mut pool).unwrap();
        assert!(encoder.into_chains().is_empty());
        assert_eq!(engine.stats().constraints, 0);
    }

    #[test]
    fn test_conjunction_needs_two_equalities() {
        let tree = Node::binary(
            Operator::And,
            Node::binary(Operator::Eq, Node::word("A"), Node::word("B")),
            Node::binary(Operator::Eq, Node::word("B"), Node::word("C")),
        );
        let mut engine = Z3Engine::new();
        let mut pool = DigitPool::new(10);
        let mut encoder = BignumEncoder::new(10, true);
        encoder.compile(&tree, &mut engine, &mut pool).unwrap();
        assert_eq!(encoder.into_chains().len(), 4);
    }

    #[test]
    fn test_bare_word_is_not_an_equation() {
        let mut engine = Z3Engine::new();
        let mut pool = DigitPool::new(10);
        let mut encoder = BignumEncoder::new(10, true);
        let err = encoder.compile(&Node::word("A"), &mut engine, &mut pool).unwrap_err();
        assert!(matches!(err, SolverError::InvalidModel(ModelError::NotAnEquation)));
    }

    #[test]
    fn test_carry_chain_check_detects_violation() {
        let chain = CarryChain {
            base: 10,
            raw: vec![IntExpr::Const(13)],
            digits: vec![VarToken(0)],
            carries: vec![VarToken(1)],
        };
        assert!(chain.holds(&Assignment::new(vec![3, 1])));
        assert!(!chain.holds(&Assignment::new(vec![2, 1])));
        assert!(!chain.holds(&Assignment::new(vec![13, 0])));
    }
}
