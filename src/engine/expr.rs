use super::{Assignment, Val, VarToken};
use num_bigint::BigInt;
use num_traits::{One, Pow, Signed, ToPrimitive, Zero};
use std::fmt;
use std::ops;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

/// Integer expression over engine variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntExpr {
    Var(VarToken),
    Const(Val),
    Binary { op: ArithOp, lhs: Box<IntExpr>, rhs: Box<IntExpr> },
}

/// `lhs op rhs`, the unit of posting for non-linear constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub op: RelOp,
    pub lhs: IntExpr,
    pub rhs: IntExpr,
}

impl ArithOp {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
            ArithOp::Mod => "%",
            ArithOp::Pow => "^",
        }
    }

    /// `None` when the result is undefined (division by zero, negative exponent).
    fn apply(self, a: &BigInt, b: &BigInt) -> Option<BigInt> {
        match self {
            ArithOp::Add => Some(a + b),
            ArithOp::Sub => Some(a - b),
            ArithOp::Mul => Some(a * b),
            ArithOp::Div | ArithOp::Mod if b.is_zero() => None,
            ArithOp::Div => Some(a / b),
            ArithOp::Mod => Some(a % b),
            ArithOp::Pow if b.is_negative() => None,
            ArithOp::Pow if a.is_zero() => Some(if b.is_zero() { BigInt::one() } else { BigInt::zero() }),
            ArithOp::Pow if a.is_one() => Some(BigInt::one()),
            ArithOp::Pow if *a == -BigInt::one() => {
                Some(if (b % 2u32).is_zero() { BigInt::one() } else { -BigInt::one() })
            }
            ArithOp::Pow => Some(Pow::pow(a, b.to_u32()?)),
        }
    }

    /// Interval of `a op b` over operand intervals; `None` when unbounded.
    fn bound(self, (alo, ahi): (i128, i128), (blo, bhi): (i128, i128)) -> Option<(i128, i128)> {
        let magnitude = |lo: i128, hi: i128| lo.checked_abs().zip(hi.checked_abs()).map(|(l, h)| l.max(h));
        match self {
            ArithOp::Add => Some((alo.checked_add(blo)?, ahi.checked_add(bhi)?)),
            ArithOp::Sub => Some((alo.checked_sub(bhi)?, ahi.checked_sub(blo)?)),
            ArithOp::Mul => {
                let corners = [alo.checked_mul(blo)?, alo.checked_mul(bhi)?, ahi.checked_mul(blo)?, ahi.checked_mul(bhi)?];
                Some((*corners.iter().min()?, *corners.iter().max()?))
            }
            ArithOp::Div => {
                let m = magnitude(alo, ahi)?;
                Some((-m, m))
            }
            ArithOp::Mod => {
                let m = magnitude(alo, ahi)?.min(magnitude(blo, bhi)?);
                Some((-m, m))
            }
            ArithOp::Pow => None,
        }
    }
}

impl RelOp {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            RelOp::Eq => "=",
            RelOp::Ne => "!=",
            RelOp::Lt => "<",
            RelOp::Gt => ">",
            RelOp::Le => "<=",
            RelOp::Ge => ">=",
        }
    }

    #[must_use]
    pub fn holds<T: Ord>(self, a: &T, b: &T) -> bool {
        match self {
            RelOp::Eq => a == b,
            RelOp::Ne => a != b,
            RelOp::Lt => a < b,
            RelOp::Gt => a > b,
            RelOp::Le => a <= b,
            RelOp::Ge => a >= b,
        }
    }
}

impl IntExpr {
    #[must_use]
    pub fn var(var: VarToken) -> IntExpr {
        IntExpr::Var(var)
    }

    #[must_use]
    pub fn constant(value: Val) -> IntExpr {
        IntExpr::Const(value)
    }

    #[must_use]
    pub fn combine(self, op: ArithOp, rhs: IntExpr) -> IntExpr {
        IntExpr::Binary { op, lhs: Box::new(self), rhs: Box::new(rhs) }
    }

    #[must_use]
    pub fn pow(self, rhs: IntExpr) -> IntExpr {
        self.combine(ArithOp::Pow, rhs)
    }

    #[must_use]
    pub fn relate(self, op: RelOp, rhs: IntExpr) -> Relation {
        Relation { op, lhs: self, rhs }
    }

    /// Value under a complete assignment; `None` if undefined.
    #[must_use]
    pub fn evaluate(&self, assignment: &Assignment) -> Option<BigInt> {
        match self {
            IntExpr::Var(var) => Some(BigInt::from(assignment.value_of(*var))),
            IntExpr::Const(c) => Some(BigInt::from(*c)),
            IntExpr::Binary { op, lhs, rhs } => op.apply(&lhs.evaluate(assignment)?, &rhs.evaluate(assignment)?),
        }
    }

    /// Range of values the expression can take, given variable bounds.
    pub(crate) fn bounds(&self, var_bounds: &dyn Fn(VarToken) -> Option<(Val, Val)>) -> Option<(i128, i128)> {
        match self {
            IntExpr::Var(var) => var_bounds(*var).map(|(lb, ub)| (i128::from(lb), i128::from(ub))),
            IntExpr::Const(c) => Some((i128::from(*c), i128::from(*c))),
            IntExpr::Binary { op, lhs, rhs } => op.bound(lhs.bounds(var_bounds)?, rhs.bounds(var_bounds)?),
        }
    }

    pub(crate) fn collect_vars(&self, out: &mut Vec<VarToken>) {
        match self {
            IntExpr::Var(var) => out.push(*var),
            IntExpr::Const(_) => {}
            IntExpr::Binary { lhs, rhs, .. } => {
                lhs.collect_vars(out);
                rhs.collect_vars(out);
            }
        }
    }
}

impl Relation {
    /// Distinct variables, sorted.
    #[must_use]
    pub fn vars(&self) -> Vec<VarToken> {
        let mut vars = Vec::new();
        self.lhs.collect_vars(&mut vars);
        self.rhs.collect_vars(&mut vars);
        vars.sort_unstable();
        vars.dedup();
        vars
    }

    /// Undefined operands make the relation false.
    #[must_use]
    pub fn holds(&self, assignment: &Assignment) -> bool {
        match (self.lhs.evaluate(assignment), self.rhs.evaluate(assignment)) {
            (Some(a), Some(b)) => self.op.holds(&a, &b),
            _ => false,
        }
    }
}

impl From<VarToken> for IntExpr {
    fn from(var: VarToken) -> Self {
        IntExpr::Var(var)
    }
}

impl From<Val> for IntExpr {
    fn from(value: Val) -> Self {
        IntExpr::Const(value)
    }
}

macro_rules! arith_impl {
    ($trait:ident, $method:ident, $op:expr) => {
        impl ops::$trait for IntExpr {
            type Output = IntExpr;

            fn $method(self, rhs: IntExpr) -> IntExpr {
                self.combine($op, rhs)
            }
        }
    };
}

arith_impl!(Add, add, ArithOp::Add);
arith_impl!(Sub, sub, ArithOp::Sub);
arith_impl!(Mul, mul, ArithOp::Mul);
arith_impl!(Div, div, ArithOp::Div);
arith_impl!(Rem, rem, ArithOp::Mod);

impl fmt::Display for IntExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntExpr::Var(var) => write!(f, "{var}"),
            IntExpr::Const(c) => write!(f, "{c}"),
            IntExpr::Binary { op, lhs, rhs } => write!(f, "({lhs} {} {rhs})", op.symbol()),
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.op.symbol(), self.rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x(i: usize) -> IntExpr {
        IntExpr::Var(VarToken(i))
    }

    fn c(v: Val) -> IntExpr {
        IntExpr::Const(v)
    }

    fn big(v: i64) -> Option<BigInt> {
        Some(BigInt::from(v))
    }

    #[test]
    fn test_evaluation_semantics() {
        let assignment = Assignment::new(vec![7, 2, 0]);
        assert_eq!((x(0) / x(1)).evaluate(&assignment), big(3));
        assert_eq!((x(0) % x(1)).evaluate(&assignment), big(1));
        assert_eq!((c(-7) / x(1)).evaluate(&assignment), big(-3));
        assert_eq!((c(-7) % x(1)).evaluate(&assignment), big(-1));
        assert_eq!(x(0).pow(x(1)).evaluate(&assignment), big(49));
        assert_eq!((x(0) / x(2)).evaluate(&assignment), None);
        assert_eq!((x(0) % x(2)).evaluate(&assignment), None);
        assert_eq!(x(0).pow(c(-1)).evaluate(&assignment), None);
        assert_eq!(c(0).pow(c(0)).evaluate(&assignment), big(1));
        assert_eq!(c(1).pow(c(i64::MAX)).evaluate(&assignment), big(1));
        assert_eq!(c(-1).pow(c(i64::MAX)).evaluate(&assignment), big(-1));
    }

    #[test]
    fn test_large_values_do_not_overflow() {
        let assignment = Assignment::new(vec![]);
        let expected = "10000000000000000000000000000000000000000".parse::<BigInt>().ok();
        assert_eq!(c(10).pow(c(40)).evaluate(&assignment), expected);
        let rel = c(10).pow(c(40)).relate(RelOp::Gt, c(i64::MAX));
        assert!(rel.holds(&assignment));
    }

    #[test]
    fn test_undefined_relation_is_false() {
        let assignment = Assignment::new(vec![5, 0]);
        assert!(!(x(0) / x(1)).relate(RelOp::Eq, c(0)).holds(&assignment));
        assert!(!(x(0) / x(1)).relate(RelOp::Ne, c(0)).holds(&assignment));
    }

    #[test]
    fn test_bounds_follow_the_operators() {
        let var_bounds = |var: VarToken| [(0, 9), (-3, 2)].get(var.0).copied();
        assert_eq!((x(0) * c(10) + x(0)).bounds(&var_bounds), Some((0, 99)));
        assert_eq!((x(0) - x(1)).bounds(&var_bounds), Some((-2, 12)));
        assert_eq!((x(0) * x(1)).bounds(&var_bounds), Some((-27, 18)));
        assert_eq!((x(0) / x(1)).bounds(&var_bounds), Some((-9, 9)));
        assert_eq!((x(0) % x(1)).bounds(&var_bounds), Some((-3, 3)));
        assert_eq!(x(0).pow(c(2)).bounds(&var_bounds), None);
        assert_eq!(x(5).bounds(&var_bounds), None);
    }

    #[test]
    fn test_relation_vars_are_distinct() {
        let rel = (x(2) + x(0)).relate(RelOp::Lt, x(2) * x(1));
        assert_eq!(rel.vars(), vec![VarToken(0), VarToken(1), VarToken(2)]);
    }
}
