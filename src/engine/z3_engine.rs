use super::{
    ArithOp, Assignment, ConstraintEngine, EngineError, IntExpr, LinearRhs, MAX_INT_BOUND, RelOp, Relation, SearchStats, Val,
    VarToken,
};
use instant::Instant;
use z3::ast::{Bool, Int};
use z3::{Params, SatResult, Solver};

/// Largest exponent a power is expanded up to.
const MAX_EXPANDED_EXPONENT: i128 = 1024;

/// Powers whose base and exponent ranges multiply to at most this many
/// pairs become a table of constants instead of a product chain.
const POW_TABLE_LIMIT: i128 = 4096;

/// An encoded expression, with the condition under which it is defined.
struct Term {
    value: Int,
    /// `None` when always defined.
    defined: Option<Bool>,
}

impl Term {
    fn total(value: Int) -> Self {
        Self { value, defined: None }
    }
}

fn both(a: Option<Bool>, b: Option<Bool>) -> Option<Bool> {
    match (a, b) {
        (Some(a), Some(b)) => Some(Bool::and(&[a, b])),
        (a, b) => a.or(b),
    }
}

fn zero() -> Int {
    Int::from_i64(0)
}

fn negate(x: &Int) -> Int {
    Int::sub(&[zero(), x.clone()])
}

fn abs(x: &Int) -> Int {
    x.lt(&zero()).ite(&negate(x), x)
}

/// Quotient rounded toward zero and the matching remainder (sign of the dividend).
fn truncated_div_rem(a: &Int, b: &Int) -> (Int, Int) {
    let magnitude = abs(a).div(&abs(b));
    let same_sign = a.lt(&zero()).eq(&b.lt(&zero()));
    let quotient = same_sign.ite(&magnitude, &negate(&magnitude));
    let remainder = Int::sub(&[a.clone(), Int::mul(&[b.clone(), quotient.clone()])]);
    (quotient, remainder)
}

/// `base^k` for `k` in `0..=max_exponent`, sharing subterms.
fn power_chain(base: &Int, max_exponent: i128) -> Vec<Int> {
    let mut powers = vec![Int::from_i64(1)];
    for _ in 0..max_exponent {
        let next = match powers.last() {
            Some(last) => Int::mul(&[last.clone(), base.clone()]),
            None => Int::from_i64(1),
        };
        powers.push(next);
    }
    powers
}

/// `value^k` for `k` in `0..=max_exponent` as constants; products once past `i64`.
fn constant_powers(value: Val, max_exponent: i128) -> Vec<Int> {
    let mut powers = vec![Int::from_i64(1)];
    let mut exact = Some(1_i64);
    for _ in 0..max_exponent {
        exact = exact.and_then(|p| p.checked_mul(value));
        let next = match (exact, powers.last()) {
            (Some(p), _) => Int::from_i64(p),
            (None, Some(last)) => Int::mul(&[last.clone(), Int::from_i64(value)]),
            (None, None) => Int::from_i64(1),
        };
        powers.push(next);
    }
    powers
}

/// `exponent == k ? powers[k] : …` over `lo..=hi`.
fn select_power(exponent: &Int, powers: &[Int], lo: i128, hi: i128) -> Int {
    let mut value = zero();
    for k in (lo..=hi).rev() {
        let (Ok(index), Ok(k)) = (usize::try_from(k), i64::try_from(k)) else {
            continue;
        };
        if let Some(power) = powers.get(index) {
            value = exponent.eq(&Int::from_i64(k)).ite(power, &value);
        }
    }
    value
}

/// [`ConstraintEngine`] backed by the Z3 SMT solver over unbounded integers.
///
/// Every constraint becomes an assertion on one Z3 solver. Each call to
/// [`ConstraintEngine::solve_next`] checks satisfiability, reads the model and
/// then blocks that exact assignment, so enumeration resumes where it stopped.
pub struct Z3Engine {
    solver: Solver,
    vars: Vec<Int>,
    names: Vec<String>,
    bounds: Vec<(Val, Val)>,
    constraints: usize,
    started: bool,
    exhausted: bool,
    deadline: Option<Instant>,
    deadline_hit: bool,
    checks: u64,
    solutions: u64,
}

impl Default for Z3Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Z3Engine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            solver: Solver::new(),
            vars: Vec::new(),
            names: Vec::new(),
            bounds: Vec::new(),
            constraints: 0,
            started: false,
            exhausted: false,
            deadline: None,
            deadline_hit: false,
            checks: 0,
            solutions: 0,
        }
    }

    /// Name given to `var` at creation.
    #[must_use]
    pub fn name_of(&self, var: VarToken) -> Option<&str> {
        self.names.get(var.0).map(String::as_str)
    }

    /// Declared `[lb, ub]` of `var`.
    #[must_use]
    pub fn bounds(&self, var: VarToken) -> Option<(Val, Val)> {
        self.bounds.get(var.0).copied()
    }

    fn check_open(&self) -> Result<(), EngineError> {
        if self.started { Err(EngineError::ModelFrozen) } else { Ok(()) }
    }

    fn var(&self, var: VarToken) -> Result<&Int, EngineError> {
        self.vars.get(var.0).ok_or(EngineError::UnknownVariable(var))
    }

    fn assert(&mut self, constraint: &Bool) {
        self.solver.assert(constraint);
        self.constraints += 1;
    }

    fn sum(terms: Vec<Int>) -> Int {
        if terms.is_empty() { zero() } else { Int::add(&terms) }
    }

    fn encode(&self, expr: &IntExpr) -> Result<Term, EngineError> {
        match expr {
            IntExpr::Var(var) => Ok(Term::total(self.var(*var)?.clone())),
            IntExpr::Const(c) => Ok(Term::total(Int::from_i64(*c))),
            IntExpr::Binary { op, lhs, rhs } => {
                let a = self.encode(lhs)?;
                let b = self.encode(rhs)?;
                let defined = both(a.defined, b.defined);
                let (value, defined) = match op {
                    ArithOp::Add => (Int::add(&[a.value, b.value]), defined),
                    ArithOp::Sub => (Int::sub(&[a.value, b.value]), defined),
                    ArithOp::Mul => (Int::mul(&[a.value, b.value]), defined),
                    ArithOp::Div | ArithOp::Mod => {
                        let nonzero = b.value.eq(&zero()).not();
                        let (quotient, remainder) = truncated_div_rem(&a.value, &b.value);
                        let value = if *op == ArithOp::Div { quotient } else { remainder };
                        (value, both(defined, Some(nonzero)))
                    }
                    ArithOp::Pow => {
                        let value = self.power(lhs, rhs, &a.value, &b.value)?;
                        let nonnegative = b.value.ge(&zero());
                        (value, both(defined, Some(nonnegative)))
                    }
                };
                Ok(Term { value, defined })
            }
        }
    }

    /// Expands `base^exponent` over the exponent's finite range.
    fn power(&self, base_expr: &IntExpr, exponent_expr: &IntExpr, base: &Int, exponent: &Int) -> Result<Int, EngineError> {
        let var_bounds = |var: VarToken| self.bounds(var);
        let (lo, hi) = exponent_expr.bounds(&var_bounds).ok_or_else(|| EngineError::Unsupported {
            reason: format!("exponent {exponent_expr} has no finite range"),
        })?;
        if hi < 0 {
            return Ok(zero());
        }
        if hi > MAX_EXPANDED_EXPONENT {
            return Err(EngineError::Unsupported {
                reason: format!("exponent {exponent_expr} may reach {hi} (at most {MAX_EXPANDED_EXPONENT} is expanded)"),
            });
        }
        let lo = lo.max(0);

        let pairs = |(blo, bhi): (i128, i128)| bhi.checked_sub(blo)?.checked_add(1)?.checked_mul(hi + 1);
        match base_expr.bounds(&var_bounds) {
            Some(range @ (blo, bhi)) if pairs(range).is_some_and(|n| n <= POW_TABLE_LIMIT) => {
                let mut value = zero();
                for b in (blo..=bhi).rev() {
                    let Ok(b) = Val::try_from(b) else {
                        continue;
                    };
                    let row = select_power(exponent, &constant_powers(b, hi), lo, hi);
                    value = base.eq(&Int::from_i64(b)).ite(&row, &value);
                }
                Ok(value)
            }
            _ => Ok(select_power(exponent, &power_chain(base, hi), lo, hi)),
        }
    }

    fn encode_relation(&self, relation: &Relation) -> Result<Bool, EngineError> {
        let lhs = self.encode(&relation.lhs)?;
        let rhs = self.encode(&relation.rhs)?;
        let holds = match relation.op {
            RelOp::Eq => lhs.value.eq(&rhs.value),
            RelOp::Ne => lhs.value.eq(&rhs.value).not(),
            RelOp::Lt => lhs.value.lt(&rhs.value),
            RelOp::Gt => lhs.value.gt(&rhs.value),
            RelOp::Le => lhs.value.le(&rhs.value),
            RelOp::Ge => lhs.value.ge(&rhs.value),
        };
        // undefined operands make the relation false
        Ok(match both(lhs.defined, rhs.defined) {
            Some(defined) => Bool::and(&[defined, holds]),
            None => holds,
        })
    }

    fn past_deadline(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Remaining budget for one solver call, in milliseconds.
    fn timeout_ms(&self) -> u32 {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()).as_millis())
            .map_or(u32::MAX, |ms| u32::try_from(ms.max(1)).unwrap_or(u32::MAX))
    }

    fn read_model(&self) -> Result<Assignment, EngineError> {
        let model = self.solver.get_model().ok_or_else(|| EngineError::Incomplete {
            reason: "satisfiable, but no model was produced".to_string(),
        })?;
        let values = self
            .vars
            .iter()
            .zip(&self.names)
            .map(|(var, name)| {
                model
                    .eval(var, true)
                    .and_then(|value| value.as_i64())
                    .ok_or_else(|| EngineError::Incomplete { reason: format!("no value for '{name}' in the model") })
            })
            .collect::<Result<Vec<Val>, EngineError>>()?;
        Ok(Assignment::new(values))
    }

    /// Exclude `assignment` from later answers.
    fn block(&mut self, assignment: &Assignment) {
        if self.vars.is_empty() {
            self.exhausted = true;
            return;
        }
        let differs: Vec<Bool> = self
            .vars
            .iter()
            .enumerate()
            .map(|(i, var)| var.eq(&Int::from_i64(assignment.value_of(VarToken(i)))).not())
            .collect();
        self.solver.assert(&Bool::or(&differs));
    }
}

impl ConstraintEngine for Z3Engine {
    fn new_int_var(&mut self, name: &str, lb: Val, ub: Val) -> Result<VarToken, EngineError> {
        self.check_open()?;
        if lb > ub {
            return Err(EngineError::EmptyDomain { name: name.to_string(), lb, ub });
        }
        for value in [lb, ub] {
            if value.abs() > MAX_INT_BOUND {
                return Err(EngineError::BoundOutOfRange { name: name.to_string(), value });
            }
        }
        let var = VarToken(self.vars.len());
        // Z3 constants with equal names are the same constant
        let int = Int::new_const(format!("{name}#{}", var.0));
        self.solver.assert(&int.ge(&Int::from_i64(lb)));
        self.solver.assert(&int.le(&Int::from_i64(ub)));
        self.vars.push(int);
        self.names.push(name.to_string());
        self.bounds.push((lb, ub));
        Ok(var)
    }

    fn post_linear_eq(&mut self, vars: &[VarToken], coeffs: &[Val], rhs: LinearRhs) -> Result<(), EngineError> {
        self.check_open()?;
        if vars.len() != coeffs.len() {
            return Err(EngineError::MalformedConstraint {
                reason: format!("{} variables but {} coefficients", vars.len(), coeffs.len()),
            });
        }
        let terms = vars
            .iter()
            .zip(coeffs)
            .map(|(&var, &coeff)| Ok(Int::mul(&[Int::from_i64(coeff), self.var(var)?.clone()])))
            .collect::<Result<Vec<Int>, EngineError>>()?;
        let rhs = match rhs {
            LinearRhs::Var(var) => self.var(var)?.clone(),
            LinearRhs::Const(c) => Int::from_i64(c),
        };
        let constraint = Self::sum(terms).eq(&rhs);
        self.assert(&constraint);
        Ok(())
    }

    fn post_all_distinct(&mut self, vars: &[VarToken]) -> Result<(), EngineError> {
        self.check_open()?;
        let ints = vars.iter().map(|&var| self.var(var).cloned()).collect::<Result<Vec<Int>, EngineError>>()?;
        if ints.len() < 2 {
            return Ok(());
        }
        let mut differ = Vec::new();
        for (i, a) in ints.iter().enumerate() {
            for b in &ints[i + 1..] {
                differ.push(a.eq(b).not());
            }
        }
        self.assert(&Bool::and(&differ));
        Ok(())
    }

    fn post_bounded_cardinality(
        &mut self,
        vars: &[VarToken],
        values: &[Val],
        occ_lb: &[Val],
        occ_ub: &[Val],
    ) -> Result<(), EngineError> {
        self.check_open()?;
        if values.len() != occ_lb.len() || values.len() != occ_ub.len() {
            return Err(EngineError::MalformedConstraint {
                reason: format!(
                    "{} values but {} lower and {} upper bounds",
                    values.len(),
                    occ_lb.len(),
                    occ_ub.len()
                ),
            });
        }
        let ints = vars.iter().map(|&var| self.var(var).cloned()).collect::<Result<Vec<Int>, EngineError>>()?;
        let (one, none) = (Int::from_i64(1), zero());
        for ((&value, &lb), &ub) in values.iter().zip(occ_lb).zip(occ_ub) {
            let target = Int::from_i64(value);
            let hits: Vec<Int> = ints.iter().map(|int| int.eq(&target).ite(&one, &none)).collect();
            let count = Self::sum(hits);
            let constraint = Bool::and(&[count.ge(&Int::from_i64(lb)), count.le(&Int::from_i64(ub))]);
            self.assert(&constraint);
        }
        Ok(())
    }

    fn post(&mut self, relation: Relation) -> Result<(), EngineError> {
        self.check_open()?;
        let constraint = self.encode_relation(&relation)?;
        log::trace!("posted constraint #{}: {relation}", self.constraints);
        self.assert(&constraint);
        Ok(())
    }

    fn set_deadline(&mut self, deadline: Option<Instant>) {
        self.deadline = deadline;
    }

    fn solve_next(&mut self) -> Result<Option<Assignment>, EngineError> {
        self.deadline_hit = false;
        if self.exhausted {
            return Ok(None);
        }
        if !self.started {
            log::debug!("search starts over {} variables and {} constraints", self.vars.len(), self.constraints);
            self.started = true;
        }
        if self.past_deadline() {
            self.deadline_hit = true;
            return Ok(None);
        }

        let mut params = Params::new();
        params.set_u32("timeout", self.timeout_ms());
        self.solver.set_params(&params);
        self.checks += 1;

        match self.solver.check() {
            SatResult::Sat => {
                let assignment = self.read_model()?;
                self.block(&assignment);
                self.solutions += 1;
                Ok(Some(assignment))
            }
            SatResult::Unsat => {
                self.exhausted = true;
                Ok(None)
            }
            SatResult::Unknown if self.deadline.is_some() => {
                self.deadline_hit = true;
                Ok(None)
            }
            SatResult::Unknown => Err(EngineError::Incomplete { reason: "solver returned unknown".to_string() }),
        }
    }

    fn deadline_reached(&self) -> bool {
        self.deadline_hit
    }

    fn stats(&self) -> SearchStats {
        SearchStats {
            variables: self.vars.len(),
            constraints: self.constraints,
            checks: self.checks,
            solutions: self.solutions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::time::Duration;

    fn all_solutions(engine: &mut Z3Engine) -> Vec<Assignment> {
        let mut out = Vec::new();
        while let Some(a) = engine.solve_next().unwrap() {
            out.push(a);
        }
        out
    }

    fn pairs(engine: &mut Z3Engine, a: VarToken, b: VarToken) -> BTreeSet<(Val, Val)> {
        all_solutions(engine).iter().map(|s| (s[a], s[b])).collect()
    }

    #[test]
    fn test_enumerates_every_solution_once() {
        let mut engine = Z3Engine::new();
        let a = engine.new_int_var("a", 0, 3).unwrap();
        let b = engine.new_int_var("b", 0, 3).unwrap();
        engine.post_linear_eq(&[a, b], &[1, 1], LinearRhs::Const(3)).unwrap();
        assert_eq!(pairs(&mut engine, a, b), BTreeSet::from([(0, 3), (1, 2), (2, 1), (3, 0)]));
        assert_eq!(engine.solve_next().unwrap(), None);
    }

    #[test]
    fn test_send_more_money() {
        let mut engine = Z3Engine::new();
        let letters: Vec<VarToken> = "SENDMORY".chars().map(|c| engine.new_int_var(&c.to_string(), 0, 9).unwrap()).collect();
        let [s, e, n, d, m, o, r, y] = letters[..] else { unreachable!() };
        engine.post_all_distinct(&letters).unwrap();
        engine.post(IntExpr::from(s).relate(RelOp::Gt, IntExpr::Const(0))).unwrap();
        engine.post(IntExpr::from(m).relate(RelOp::Gt, IntExpr::Const(0))).unwrap();
        let word = |ds: &[VarToken]| {
            ds.iter().fold(IntExpr::Const(0), |acc, &d| acc * IntExpr::Const(10) + IntExpr::from(d))
        };
        engine.post_equality(word(&[s, e, n, d]) + word(&[m, o, r, e]), word(&[m, o, n, e, y])).unwrap();

        let solutions = all_solutions(&mut engine);
        assert_eq!(solutions.len(), 1);
        let digits: Vec<Val> = letters.iter().map(|&v| solutions[0][v]).collect();
        assert_eq!(digits, vec![9, 5, 6, 7, 1, 0, 8, 2]);
    }

    #[test]
    fn test_repeated_variables() {
        let mut engine = Z3Engine::new();
        let a = engine.new_int_var("a", 0, 9).unwrap();
        engine.post_linear_eq(&[a, a, a], &[1, 1, 1], LinearRhs::Const(9)).unwrap();
        let found = all_solutions(&mut engine);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0][a], 3);
    }

    #[test]
    fn test_equal_names_stay_distinct_variables() {
        let mut engine = Z3Engine::new();
        let a = engine.new_int_var("c0", 0, 1).unwrap();
        let b = engine.new_int_var("c0", 0, 1).unwrap();
        engine.post(IntExpr::from(a).relate(RelOp::Ne, IntExpr::from(b))).unwrap();
        assert_eq!(pairs(&mut engine, a, b), BTreeSet::from([(0, 1), (1, 0)]));
    }

    #[test]
    fn test_non_linear_relation() {
        let mut engine = Z3Engine::new();
        let a = engine.new_int_var("a", 1, 9).unwrap();
        let b = engine.new_int_var("b", 1, 9).unwrap();
        engine.post_equality(IntExpr::from(a) * IntExpr::from(b), IntExpr::Const(12)).unwrap();
        engine.post(IntExpr::from(a).relate(RelOp::Lt, IntExpr::from(b))).unwrap();
        assert_eq!(pairs(&mut engine, a, b), BTreeSet::from([(2, 6), (3, 4)]));
    }

    #[test]
    fn test_division_truncates_toward_zero() {
        let mut engine = Z3Engine::new();
        let a = engine.new_int_var("a", -7, 7).unwrap();
        let b = engine.new_int_var("b", -2, 2).unwrap();
        engine.post_equality(IntExpr::from(a), IntExpr::Const(-7)).unwrap();
        engine.post_equality(IntExpr::from(a) / IntExpr::from(b), IntExpr::Const(-3)).unwrap();
        assert_eq!(pairs(&mut engine, a, b), BTreeSet::from([(-7, 2)]));

        let mut engine = Z3Engine::new();
        let a = engine.new_int_var("a", -7, 7).unwrap();
        let b = engine.new_int_var("b", 2, 2).unwrap();
        engine.post_equality(IntExpr::from(a) % IntExpr::from(b), IntExpr::Const(-1)).unwrap();
        let found: BTreeSet<Val> = all_solutions(&mut engine).iter().map(|s| s[a]).collect();
        assert_eq!(found, BTreeSet::from([-7, -5, -3, -1]));
    }

    #[test]
    fn test_undefined_operands_make_relations_false() {
        let mut engine = Z3Engine::new();
        let a = engine.new_int_var("a", 0, 3).unwrap();
        let b = engine.new_int_var("b", 0, 1).unwrap();
        // a/0 is undefined, so even `!=` fails when b = 0
        engine.post((IntExpr::from(a) / IntExpr::from(b)).relate(RelOp::Ne, IntExpr::Const(-1))).unwrap();
        assert!(all_solutions(&mut engine).iter().all(|s| s[b] == 1));

        let mut engine = Z3Engine::new();
        let e = engine.new_int_var("e", -2, 1).unwrap();
        engine.post(IntExpr::Const(2).pow(IntExpr::from(e)).relate(RelOp::Ge, IntExpr::Const(0))).unwrap();
        let found: BTreeSet<Val> = all_solutions(&mut engine).iter().map(|s| s[e]).collect();
        assert_eq!(found, BTreeSet::from([0, 1]));
    }

    #[test]
    fn test_power_beyond_i64_compares_correctly() {
        let mut engine = Z3Engine::new();
        let a = engine.new_int_var("a", 2, 3).unwrap();
        let b = engine.new_int_var("b", 62, 101).unwrap();
        // 2^62 still fits, everything else leaves the i64 range
        engine.post(IntExpr::from(a).pow(IntExpr::from(b)).relate(RelOp::Le, IntExpr::Const(i64::MAX))).unwrap();
        assert_eq!(pairs(&mut engine, a, b), BTreeSet::from([(2, 62)]));
    }

    #[test]
    fn test_power_with_variable_base_and_exponent() {
        let mut engine = Z3Engine::new();
        let a = engine.new_int_var("a", 0, 9).unwrap();
        let b = engine.new_int_var("b", 0, 99).unwrap();
        engine.post_equality(IntExpr::from(a).pow(IntExpr::from(b)), IntExpr::Const(81)).unwrap();
        assert_eq!(pairs(&mut engine, a, b), BTreeSet::from([(3, 4), (9, 2)]));
    }

    #[test]
    fn test_zero_to_the_zero_is_one() {
        let mut engine = Z3Engine::new();
        let a = engine.new_int_var("a", 0, 0).unwrap();
        engine.post_equality(IntExpr::from(a).pow(IntExpr::from(a)), IntExpr::Const(1)).unwrap();
        assert_eq!(all_solutions(&mut engine).len(), 1);
    }

    #[test]
    fn test_unbounded_exponent_is_unsupported() {
        let mut engine = Z3Engine::new();
        let a = engine.new_int_var("a", 0, 9).unwrap();
        let b = engine.new_int_var("b", 0, 9999).unwrap();
        let err = engine.post(IntExpr::from(a).pow(IntExpr::from(b)).relate(RelOp::Eq, IntExpr::Const(1))).unwrap_err();
        assert!(matches!(err, EngineError::Unsupported { .. }));
    }

    #[test]
    fn test_cardinality() {
        let mut engine = Z3Engine::new();
        let vars: Vec<VarToken> = (0..3).map(|i| engine.new_int_var(&format!("v{i}"), 0, 1).unwrap()).collect();
        engine.post_bounded_cardinality(&vars, &[0, 1], &[1, 1], &[2, 2]).unwrap();
        assert_eq!(all_solutions(&mut engine).len(), 6);
    }

    #[test]
    fn test_infeasible_model() {
        let mut engine = Z3Engine::new();
        let a = engine.new_int_var("a", 0, 1).unwrap();
        let b = engine.new_int_var("b", 0, 1).unwrap();
        let c = engine.new_int_var("c", 0, 1).unwrap();
        engine.post_all_distinct(&[a, b, c]).unwrap();
        assert!(all_solutions(&mut engine).is_empty());
        assert!(!engine.deadline_reached());
    }

    #[test]
    fn test_model_without_variables_has_one_solution() {
        let mut engine = Z3Engine::new();
        assert_eq!(all_solutions(&mut engine).len(), 1);
    }

    #[test]
    fn test_variable_errors() {
        let mut engine = Z3Engine::new();
        assert!(matches!(engine.new_int_var("a", 3, 2), Err(EngineError::EmptyDomain { .. })));
        assert!(matches!(
            engine.new_int_var("a", 0, MAX_INT_BOUND + 1),
            Err(EngineError::BoundOutOfRange { .. })
        ));
        assert_eq!(
            engine.post_all_distinct(&[VarToken(7)]),
            Err(EngineError::UnknownVariable(VarToken(7)))
        );
        let a = engine.new_int_var("a", 0, 1).unwrap();
        assert!(matches!(
            engine.post_linear_eq(&[a], &[1, 2], LinearRhs::Const(0)),
            Err(EngineError::MalformedConstraint { .. })
        ));
        assert_eq!(engine.name_of(a), Some("a"));
        assert_eq!(engine.bounds(a), Some((0, 1)));
    }

    #[test]
    fn test_model_frozen_after_search_starts() {
        let mut engine = Z3Engine::new();
        engine.new_int_var("a", 0, 1).unwrap();
        engine.solve_next().unwrap();
        assert_eq!(engine.new_int_var("b", 0, 1), Err(EngineError::ModelFrozen));
    }

    #[test]
    fn test_expired_deadline_stops_search() {
        let mut engine = Z3Engine::new();
        let vars: Vec<VarToken> = (0..6).map(|i| engine.new_int_var(&format!("v{i}"), 0, 9).unwrap()).collect();
        engine.post_all_distinct(&vars).unwrap();
        engine.set_deadline(Instant::now().checked_sub(Duration::from_millis(1)));
        assert_eq!(engine.solve_next().unwrap(), None);
        assert!(engine.deadline_reached());
        engine.set_deadline(None);
        assert!(engine.solve_next().unwrap().is_some());
        assert!(!engine.deadline_reached());
    }

    #[test]
    fn test_stats_count_search() {
        let mut engine = Z3Engine::new();
        let a = engine.new_int_var("a", 0, 2).unwrap();
        let b = engine.new_int_var("b", 0, 2).unwrap();
        engine.post_all_distinct(&[a, b]).unwrap();
        all_solutions(&mut engine);
        let stats = engine.stats();
        assert_eq!(stats.variables, 2);
        assert_eq!(stats.constraints, 1);
        assert_eq!(stats.solutions, 6);
        // one call per solution plus the final unsat
        assert_eq!(stats.checks, 7);
    }
}
