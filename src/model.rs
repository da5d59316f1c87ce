//! Compiling an equation tree into a constraint model.

use crate::bignum::{self, BignumEncoder, CarryChain};
use crate::config::{ModelStrategy, SolverConfig};
use crate::digits::DigitPool;
use crate::engine::{ArithOp, ConstraintEngine, IntExpr, RelOp, Relation, Val};
use crate::errors::ModelError;
use crate::occurrence::OccurrenceBounds;
use crate::operator::Operator;
use crate::solver::SolverError;
use crate::strategy::{AdaptiveSelector, Encoding, safe_word_length};
use crate::tree::Node;
use crate::word::{WordEncoder, constant_value};
use log::{debug, info, warn};

/// What one compile call left behind, beside the constraints posted to the engine.
#[derive(Debug, Clone)]
pub struct EquationModel {
    pub encoding: Encoding,
    pub pool: DigitPool,
    pub occurrence: OccurrenceBounds,
    /// Empty for fixed-precision models.
    pub carry_chains: Vec<CarryChain>,
    pub sub_equations: usize,
}

/// Stack entries of the fixed-precision pass.
enum Value {
    Int(IntExpr),
    Rel(Relation),
}

fn arith_op(op: Operator) -> Option<ArithOp> {
    Some(match op {
        Operator::Add => ArithOp::Add,
        Operator::Sub => ArithOp::Sub,
        Operator::Mul => ArithOp::Mul,
        Operator::Div => ArithOp::Div,
        Operator::Mod => ArithOp::Mod,
        Operator::Pow => ArithOp::Pow,
        _ => return None,
    })
}

fn rel_op(op: Operator) -> Option<RelOp> {
    Some(match op {
        Operator::Eq => RelOp::Eq,
        Operator::Neq => RelOp::Ne,
        Operator::Lt => RelOp::Lt,
        Operator::Gt => RelOp::Gt,
        Operator::Leq => RelOp::Le,
        Operator::Geq => RelOp::Ge,
        _ => return None,
    })
}

/// Turns trees into models under one configuration.
///
/// Holds no per-call state: every [`ModelCompiler::compile`] builds a fresh
/// pool and a fresh traversal stack, so one compiler can serve many calls.
#[derive(Debug, Clone)]
pub struct ModelCompiler<F = fn(u32, Val) -> usize> {
    config: SolverConfig,
    selector: AdaptiveSelector<F>,
}

impl ModelCompiler {
    #[must_use]
    pub fn new(config: &SolverConfig) -> Self {
        Self { config: config.clone(), selector: AdaptiveSelector::new() }
    }
}

impl<F: Fn(u32, Val) -> usize> ModelCompiler<F> {
    pub fn with_selector(config: &SolverConfig, selector: AdaptiveSelector<F>) -> Self {
        Self { config: config.clone(), selector }
    }

    #[must_use]
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// The encoding this compiler would use for `tree` on an engine
    /// whose bounds stop at `bound`.
    pub fn choose_encoding(&self, tree: &Node, bound: Val) -> Encoding {
        match self.config.strategy {
            ModelStrategy::Adaptive => self.selector.select(tree, self.config.base, bound),
            ModelStrategy::FixedPrecision => Encoding::FixedPrecision,
            ModelStrategy::Bignum => Encoding::Bignum,
        }
    }

    /// Post the whole model for `tree` into `engine`.
    ///
    /// Configuration and model errors are all raised before search starts.
    ///
    /// # Errors
    /// [`SolverError::InvalidConfig`], [`SolverError::InvalidModel`] or
    /// [`SolverError::EngineFailure`].
    pub fn compile<E: ConstraintEngine + ?Sized>(&self, tree: &Node, engine: &mut E) -> Result<EquationModel, SolverError> {
        self.config.validate()?;
        let sub_equations = tree.validate()?;
        let encoding = self.choose_encoding(tree, engine.max_int_bound());
        let mut pool = DigitPool::new(self.config.base);

        let carry_chains = match encoding {
            Encoding::Bignum => {
                if let Err(err) = bignum::check_supported(tree) {
                    if self.config.strategy == ModelStrategy::Adaptive {
                        warn!("words too long for fixed precision, but the bignum model cannot express this equation");
                    }
                    return Err(err.into());
                }
                let mut encoder = BignumEncoder::new(self.config.base, self.config.allow_leading_zeros);
                encoder.compile(tree, engine, &mut pool)?;
                encoder.into_chains()
            }
            Encoding::FixedPrecision => {
                self.precheck_fixed(tree, engine)?;
                self.compile_fixed(tree, engine, &mut pool, sub_equations)?;
                Vec::new()
            }
        };

        let occurrence = OccurrenceBounds::compute(
            pool.len(),
            self.config.base,
            self.config.relax_min_occurrence,
            self.config.relax_max_occurrence,
        );
        occurrence.post(engine, &pool.vars())?;

        info!(
            "compiled {encoding} model: {} letters, {} sub-equation(s), occurrence {occurrence}",
            pool.len(),
            sub_equations
        );
        Ok(EquationModel { encoding, pool, occurrence, carry_chains, sub_equations })
    }

    /// Reject words and constants that cannot be represented before anything is posted.
    fn precheck_fixed<E: ConstraintEngine + ?Sized>(&self, tree: &Node, engine: &E) -> Result<(), ModelError> {
        let base = self.config.base;
        let max_length = safe_word_length(base, engine.max_int_bound());
        for node in tree.postorder() {
            if let Node::Leaf { word, is_constant } = node {
                if *is_constant {
                    constant_value(word)?;
                } else if word.len() > max_length {
                    return Err(ModelError::WordTooLong { length: word.len(), base, max_length });
                }
            }
        }
        Ok(())
    }

    fn compile_fixed<E: ConstraintEngine + ?Sized>(
        &self,
        tree: &Node,
        engine: &mut E,
        pool: &mut DigitPool,
        sub_equations: usize,
    ) -> Result<(), SolverError> {
        let encoder = WordEncoder::new(&self.config);
        let mut stack: Vec<Value> = Vec::new();

        for node in tree.postorder() {
            let op = match node {
                Node::Leaf { word, is_constant } => {
                    let value = encoder.encode(engine, pool, word, *is_constant)?;
                    debug!("leaf {node} -> {value}");
                    stack.push(Value::Int(value));
                    continue;
                }
                Node::Internal { op, .. } => *op,
            };

            if op == Operator::And {
                // both sub-equations stay on the stack and are posted separately
                match stack.as_slice() {
                    [.., Value::Rel(_), Value::Rel(_)] => continue,
                    [.., _, _] => return Err(ModelError::OperandKind { operator: op, expected: "relational" }.into()),
                    _ => return Err(ModelError::StackShape { expected: 2, actual: stack.len() }.into()),
                }
            }

            let (Some(right), Some(left)) = (stack.pop(), stack.pop()) else {
                return Err(ModelError::StackShape { expected: 2, actual: stack.len() }.into());
            };
            let (Value::Int(left), Value::Int(right)) = (left, right) else {
                return Err(ModelError::OperandKind { operator: op, expected: "arithmetic" }.into());
            };
            let value = if let Some(arith) = arith_op(op) {
                Value::Int(left.combine(arith, right))
            } else if let Some(rel) = rel_op(op) {
                Value::Rel(left.relate(rel, right))
            } else {
                return Err(ModelError::MisplacedIdentity.into());
            };
            stack.push(value);
        }

        if stack.len() != sub_equations {
            return Err(ModelError::StackShape { expected: sub_equations, actual: stack.len() }.into());
        }
        for value in stack {
            let Value::Rel(relation) = value else {
                return Err(ModelError::NotAnEquation.into());
            };
            debug!("posting {relation}");
            engine.post(relation)?;
        }
        Ok(())
    }
}
