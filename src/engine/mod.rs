//! The constraint-engine seam.
//!
//! The model compiler only talks to a [`ConstraintEngine`]: create integer
//! variables, post constraints, then pull assignments one at a time.
//! [`Z3Engine`] is the implementation shipped with the crate; it hands the
//! model to the Z3 SMT solver and enumerates answers with blocking clauses.

mod expr;
mod z3_engine;

use instant::Instant;
use std::fmt;
use std::ops::Index;

pub use expr::{ArithOp, IntExpr, RelOp, Relation};
pub use z3_engine::Z3Engine;

/// Value type of every engine variable.
pub type Val = i64;

/// Safe magnitude for variable bounds (`i32::MAX / 100`).
///
/// Word-value variables must stay within `[-MAX_INT_BOUND, MAX_INT_BOUND]`;
/// the adaptive strategy selector is calibrated against this bound.
pub const MAX_INT_BOUND: Val = 21_474_836;

/// Handle to an engine variable.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub struct VarToken(pub(crate) usize);

impl fmt::Display for VarToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// Right-hand side of a linear equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinearRhs {
    Var(VarToken),
    Const(Val),
}

/// One satisfying assignment, indexed by [`VarToken`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    values: Vec<Val>,
}

impl Assignment {
    pub(crate) fn new(values: Vec<Val>) -> Self {
        Self { values }
    }

    #[must_use]
    pub fn value_of(&self, var: VarToken) -> Val {
        self.values[var.0]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Index<VarToken> for Assignment {
    type Output = Val;

    fn index(&self, var: VarToken) -> &Val {
        &self.values[var.0]
    }
}

/// Counters reported by an engine after (or during) search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub variables: usize,
    pub constraints: usize,
    /// Satisfiability checks issued to the solver.
    pub checks: u64,
    pub solutions: u64,
}

impl fmt::Display for SearchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} variables, {} constraints, {} checks, {} solutions",
            self.variables, self.constraints, self.checks, self.solutions
        )
    }
}

/// Internal failures reported by an engine ("no solution" is not one of them).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("empty domain [{lb}, {ub}] for variable '{name}'")]
    EmptyDomain { name: String, lb: Val, ub: Val },

    #[error("bound {value} of variable '{name}' is outside [-{max}, {max}]", max = MAX_INT_BOUND)]
    BoundOutOfRange { name: String, value: Val },

    #[error("malformed constraint: {reason}")]
    MalformedConstraint { reason: String },

    #[error("constraint cannot be encoded: {reason}")]
    Unsupported { reason: String },

    #[error("solver gave no answer: {reason}")]
    Incomplete { reason: String },

    #[error("unknown variable {0}")]
    UnknownVariable(VarToken),

    #[error("the model cannot change once search has started")]
    ModelFrozen,
}

/// Primitives an integer constraint engine must offer to the model compiler.
///
/// An engine instance holds exactly one model; it is built by one compile call
/// and searched by one controller.
pub trait ConstraintEngine {
    /// Create an integer variable with domain `[lb, ub]`.
    ///
    /// # Errors
    /// Empty or out-of-range domains.
    fn new_int_var(&mut self, name: &str, lb: Val, ub: Val) -> Result<VarToken, EngineError>;

    /// Post `Σ coeffs[i]·vars[i] = rhs`.
    ///
    /// # Errors
    /// Mismatched lengths or unknown variables.
    fn post_linear_eq(&mut self, vars: &[VarToken], coeffs: &[Val], rhs: LinearRhs) -> Result<(), EngineError>;

    /// Post pairwise difference of `vars`.
    ///
    /// # Errors
    /// Unknown variables.
    fn post_all_distinct(&mut self, vars: &[VarToken]) -> Result<(), EngineError>;

    /// Post, for every `values[k]`, `occ_lb[k] ≤ |{v ∈ vars : v = values[k]}| ≤ occ_ub[k]`.
    ///
    /// # Errors
    /// Mismatched lengths or unknown variables.
    fn post_bounded_cardinality(
        &mut self,
        vars: &[VarToken],
        values: &[Val],
        occ_lb: &[Val],
        occ_ub: &[Val],
    ) -> Result<(), EngineError>;

    /// Post an arbitrary relation between two expressions.
    ///
    /// # Errors
    /// Unknown variables, or operators the engine cannot encode.
    fn post(&mut self, relation: Relation) -> Result<(), EngineError>;

    /// Post `lhs = rhs`.
    ///
    /// # Errors
    /// Unknown variables.
    fn post_equality(&mut self, lhs: IntExpr, rhs: IntExpr) -> Result<(), EngineError> {
        self.post(lhs.relate(RelOp::Eq, rhs))
    }

    /// Largest magnitude this engine accepts for variable bounds.
    fn max_int_bound(&self) -> Val {
        MAX_INT_BOUND
    }

    /// Stop searching (returning `Ok(None)`) once `deadline` has passed.
    fn set_deadline(&mut self, deadline: Option<Instant>);

    /// Next satisfying assignment, or `None` when exhausted or past the deadline.
    ///
    /// # Errors
    /// Internal failures, such as the solver giving up without a deadline.
    fn solve_next(&mut self) -> Result<Option<Assignment>, EngineError>;

    /// Whether the last `None` from [`ConstraintEngine::solve_next`] was caused by the deadline.
    fn deadline_reached(&self) -> bool;

    fn stats(&self) -> SearchStats;
}
