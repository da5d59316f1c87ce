//! Compiling and enumerating cryptarithm solutions.
//!
//! # Error Handling
//!
//! The solver uses [`SolverError`] with five variants:
//!
//! - S001: `ParseFailure` (Equation parsing failed (wraps [`ParseError`]))
//! - S002: `InvalidConfig` (Configuration rejected (wraps [`ConfigError`]))
//! - S003: `InvalidModel` (Tree cannot be compiled (wraps [`ModelError`]))
//! - S004: `EngineFailure` (Constraint engine failed (wraps [`EngineError`]))
//! - S005: `InvalidSolution` (Engine returned an assignment the evaluator rejects)
//!
//! Each error has a `code()`, optional `help()`, and `display_detailed()` method.
//!
//! # Examples
//!
//! ## Basic Usage
//!
//! ```
//! use cryptarith::config::SolverConfig;
//! use cryptarith::solver;
//!
//! let result = solver::solve_equation("SEND+MORE=MONEY", &SolverConfig::default())?;
//!
//! assert_eq!(result.solutions.len(), 1);
//! println!("{}", result.solutions[0]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Handling Errors with Detailed Messages
//!
//! ```
//! use cryptarith::config::SolverConfig;
//! use cryptarith::solver;
//!
//! match solver::solve_equation("", &SolverConfig::default()) {
//!     Ok(result) => println!("Success: {} solutions", result.solutions.len()),
//!     Err(e) => {
//!         // Show detailed error with code and help
//!         eprintln!("{}", e.display_detailed());
//!     }
//! }
//! ```
//!
//! ## Streaming Solutions
//!
//! ```
//! use cryptarith::config::SolverConfig;
//! use cryptarith::solver::{self, SolveStatus};
//! use std::ops::ControlFlow;
//!
//! let tree = "AB+BA=CC".parse()?;
//! let config = SolverConfig::default();
//! let summary = solver::solve_tree_with(&tree, &config, |solution| {
//!     println!("{solution}");
//!     ControlFlow::Continue(())
//! })?;
//!
//! match summary.status {
//!     SolveStatus::SearchExhausted => println!("all {} solutions found", summary.found),
//!     SolveStatus::FoundEnough => println!("stopped at the solution limit"),
//!     SolveStatus::TimedOut { elapsed } => println!("timed out after {elapsed:?}"),
//!     SolveStatus::Cancelled => println!("cancelled"),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::config::SolverConfig;
use crate::engine::{ConstraintEngine, EngineError, SearchStats, Z3Engine};
use crate::errors::{ConfigError, ModelError, ParseError};
use crate::evaluate;
use crate::model::{EquationModel, ModelCompiler};
use crate::solution::Solution;
use crate::strategy::Encoding;
use crate::tree::Node;
use instant::Instant;
use log::{debug, info, warn};
use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Why enumeration stopped.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveStatus {
    /// The engine proved there are no further solutions.
    SearchExhausted,

    /// Solver stopped early because the requested number of results was found.
    FoundEnough,

    /// Solver stopped because the time budget expired. Contains the elapsed time.
    TimedOut { elapsed: Duration },

    /// The caller cancelled the search (token or consumer).
    Cancelled,
}

impl SolveStatus {
    /// Whether solutions may exist beyond the ones reported.
    ///
    /// A timed-out or cancelled search with no solutions says nothing about
    /// satisfiability.
    #[must_use]
    pub fn possibly_incomplete(&self) -> bool {
        matches!(self, SolveStatus::TimedOut { .. } | SolveStatus::Cancelled)
    }
}

/// Successful solver run (even if it stopped early).
#[derive(Debug, Clone)]
pub struct SolveResult {
    /// Solutions discovered, in engine order.
    pub solutions: Vec<Solution>,
    /// Status indicating whether we finished or stopped early.
    pub status: SolveStatus,
    pub encoding: Encoding,
    pub stats: SearchStats,
    /// The equation as it was understood, re-printed from the tree
    pub readable_equation: String,
}

impl IntoIterator for SolveResult {
    type Item = Solution;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.solutions.into_iter()
    }
}

/// Outcome of a streaming solve; the solutions went to the consumer.
#[derive(Debug, Clone)]
pub struct SolveSummary {
    pub found: usize,
    pub status: SolveStatus,
    pub encoding: Encoding,
    pub stats: SearchStats,
    pub elapsed: Duration,
}

/// Unified error type for the solver pipeline.
///
/// This consolidates the different error sources we encounter when parsing
/// equations, compiling models and searching, so that callers only need to
/// handle a single `Result<_, SolverError>`.
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    /// Failure during parsing of the equation string.
    ///
    /// These originate from the parser (`ParseError`), which we box to keep the
    /// error type size stable.
    #[error("parse failure: {0}")]
    ParseFailure(#[from] Box<ParseError>),

    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// The compiler refused the tree or found itself in an inconsistent state.
    #[error("model error: {0}")]
    InvalidModel(#[from] ModelError),

    /// The engine failed internally ("no solution" is not a failure).
    #[error("engine failure: {0}")]
    EngineFailure(#[from] EngineError),

    #[error("engine returned {solution}, which does not satisfy {equation}")]
    InvalidSolution { solution: String, equation: String },
}

impl SolverError {
    /// Returns the error code for this error variant
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            SolverError::ParseFailure(_) => "S001",
            SolverError::InvalidConfig(_) => "S002",
            SolverError::InvalidModel(_) => "S003",
            SolverError::EngineFailure(_) => "S004",
            SolverError::InvalidSolution { .. } => "S005",
        }
    }

    /// Returns a short description of this error type (for documentation)
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            SolverError::ParseFailure(_) => "Equation parsing failed",
            SolverError::InvalidConfig(_) => "Configuration rejected",
            SolverError::InvalidModel(_) => "Tree cannot be compiled",
            SolverError::EngineFailure(_) => "Constraint engine failed",
            SolverError::InvalidSolution { .. } => "Engine returned an assignment the evaluator rejects",
        }
    }

    /// Returns detailed explanation of this error type (for documentation)
    #[must_use]
    pub fn details(&self) -> &'static str {
        match self {
            SolverError::ParseFailure(_) => "The equation text could not be parsed. This wraps an underlying ParseError (see Parse Errors section for specific error codes).",
            SolverError::InvalidConfig(_) => "The solver configuration was rejected before any model was built. This wraps an underlying ConfigError (see Configuration Errors section).",
            SolverError::InvalidModel(_) => "The equation tree could not be turned into a constraint model. This wraps an underlying ModelError (see Model Errors section).",
            SolverError::EngineFailure(_) => "The constraint engine reported an internal failure, such as a power whose exponent range is too wide to expand. Solutions reported before the failure remain valid.",
            SolverError::InvalidSolution { .. } => "Solution checking is on and the independent evaluator found a relation that the returned digits do not satisfy. This is a bug in the model compiler or the engine.",
        }
    }

    /// Returns a helpful suggestion for this error
    #[must_use]
    pub fn help(&self) -> Option<&'static str> {
        match self {
            SolverError::EngineFailure(_) => Some("Shorter words or fewer multiplications and powers keep intermediate values in range"),
            SolverError::InvalidSolution { .. } => Some("This is an internal error. Please report the equation and configuration."),
            // the wrapped errors carry their own help
            SolverError::ParseFailure(_) | SolverError::InvalidConfig(_) | SolverError::InvalidModel(_) => None,
        }
    }

    /// Formats the error with code and optional help text
    #[must_use]
    pub fn display_detailed(&self) -> String {
        match self {
            SolverError::ParseFailure(e) => format!("{}\n  caused by: {}", self.code(), e.display_detailed()),
            SolverError::InvalidConfig(e) => format!("{}\n  caused by: {}", self.code(), e.display_detailed()),
            SolverError::InvalidModel(e) => format!("{}\n  caused by: {}", self.code(), e.display_detailed()),
            _ => crate::errors::format_error_with_code_and_help(&self.to_string(), self.code(), self.help()),
        }
    }
}

/// Shared flag a caller sets to stop an enumeration between solutions.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Simple helper to enforce a wall-clock time limit.
///
/// A budget without a limit never expires.
struct TimeBudget {
    start: Instant,           // when the budget began
    limit: Option<Duration>,  // maximum allowed elapsed time
}

impl TimeBudget {
    fn new(limit: Option<Duration>) -> Self {
        Self { start: Instant::now(), limit }
    }

    /// How long this budget has been running.
    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Returns true if the allowed time has fully elapsed.
    fn expired(&self) -> bool {
        self.limit.is_some_and(|limit| self.start.elapsed() >= limit)
    }

    fn deadline(&self) -> Option<Instant> {
        self.limit.map(|limit| self.start + limit)
    }
}

/// Lazily enumerated solutions of one compiled equation.
///
/// Each call to `next` resumes the engine's search. After `None`, the reason is
/// available from [`Solutions::status`]. An `Err` item ends the enumeration.
pub struct Solutions<'t, E: ConstraintEngine = Z3Engine> {
    tree: &'t Node,
    config: SolverConfig,
    engine: E,
    model: EquationModel,
    budget: TimeBudget,
    cancel: Option<CancelToken>,
    found: usize,
    status: Option<SolveStatus>,
    failed: bool,
}

/// Compile `tree` into a fresh [`Z3Engine`] and enumerate lazily.
///
/// # Errors
/// Config and model errors, raised before any search.
pub fn solutions<'t>(tree: &'t Node, config: &SolverConfig) -> Result<Solutions<'t, Z3Engine>, SolverError> {
    solutions_with_engine(tree, config, Z3Engine::new())
}

/// Compile `tree` into a caller-supplied (empty) engine and enumerate lazily.
///
/// # Errors
/// Config and model errors, raised before any search.
pub fn solutions_with_engine<'t, E: ConstraintEngine>(
    tree: &'t Node,
    config: &SolverConfig,
    mut engine: E,
) -> Result<Solutions<'t, E>, SolverError> {
    let budget = TimeBudget::new(config.time_limit());
    let model = ModelCompiler::new(config).compile(tree, &mut engine)?;
    engine.set_deadline(budget.deadline());
    Ok(Solutions {
        tree,
        config: config.clone(),
        engine,
        model,
        budget,
        cancel: None,
        found: 0,
        status: None,
        failed: false,
    })
}

impl<'t, E: ConstraintEngine> Solutions<'t, E> {
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Why enumeration ended; `None` while it is still running or after an error.
    #[must_use]
    pub fn status(&self) -> Option<&SolveStatus> {
        self.status.as_ref()
    }

    #[must_use]
    pub fn found(&self) -> usize {
        self.found
    }

    #[must_use]
    pub fn encoding(&self) -> Encoding {
        self.model.encoding
    }

    #[must_use]
    pub fn model(&self) -> &EquationModel {
        &self.model
    }

    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    #[must_use]
    pub fn stats(&self) -> SearchStats {
        self.engine.stats()
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.budget.elapsed()
    }

    fn finish(&mut self, status: SolveStatus) -> Option<Result<Solution, SolverError>> {
        match &status {
            SolveStatus::TimedOut { elapsed } => {
                warn!("time limit reached after {elapsed:?} with {} solution(s); results may be incomplete", self.found);
            }
            SolveStatus::Cancelled => info!("search cancelled after {} solution(s)", self.found),
            _ => info!("search finished ({status:?}) with {} solution(s)", self.found),
        }
        debug!("{}", self.engine.stats());
        self.status = Some(status);
        None
    }
}

impl<E: ConstraintEngine> Iterator for Solutions<'_, E> {
    type Item = Result<Solution, SolverError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.status.is_some() || self.failed {
            return None;
        }
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return self.finish(SolveStatus::Cancelled);
        }
        if self.config.solution_limit().is_some_and(|limit| self.found >= limit) {
            return self.finish(SolveStatus::FoundEnough);
        }
        if self.budget.expired() {
            let elapsed = self.budget.elapsed();
            return self.finish(SolveStatus::TimedOut { elapsed });
        }

        let assignment = match self.engine.solve_next() {
            Ok(Some(assignment)) => assignment,
            Ok(None) if self.engine.deadline_reached() => {
                let elapsed = self.budget.elapsed();
                return self.finish(SolveStatus::TimedOut { elapsed });
            }
            Ok(None) => return self.finish(SolveStatus::SearchExhausted),
            Err(err) => {
                self.failed = true;
                return Some(Err(err.into()));
            }
        };

        let solution = match self.model.pool.extract(&assignment) {
            Ok(solution) => solution,
            Err(err) => {
                self.failed = true;
                return Some(Err(err.into()));
            }
        };
        if self.config.check_solutions && !evaluate::satisfies(self.tree, &solution, self.config.base) {
            self.failed = true;
            return Some(Err(SolverError::InvalidSolution {
                solution: solution.to_string(),
                equation: self.tree.to_string(),
            }));
        }
        self.found += 1;
        debug!("solution #{}: {solution}", self.found);
        Some(Ok(solution))
    }
}

/// Stream solutions of `tree` to `consumer` until a limit, exhaustion, or `Break`.
///
/// # Errors
/// Config and model errors before the search; engine failures (or rejected
/// solutions) abort it, after the earlier solutions were already consumed.
pub fn solve_tree_with<F>(tree: &Node, config: &SolverConfig, mut consumer: F) -> Result<SolveSummary, SolverError>
where
    F: FnMut(&Solution) -> ControlFlow<()>,
{
    let mut stream = solutions(tree, config)?;
    let mut stopped = false;
    while let Some(solution) = stream.next() {
        if consumer(&solution?).is_break() {
            stopped = true;
            break;
        }
    }
    let status = match stream.status() {
        Some(status) => status.clone(),
        None if stopped => {
            info!("consumer stopped the search after {} solution(s)", stream.found());
            SolveStatus::Cancelled
        }
        None => SolveStatus::SearchExhausted,
    };
    Ok(SolveSummary {
        found: stream.found(),
        status,
        encoding: stream.encoding(),
        stats: stream.stats(),
        elapsed: stream.elapsed(),
    })
}

/// Collect every solution of `tree` (up to the configured limits).
///
/// # Errors
/// See [`solve_tree_with`].
pub fn solve_tree(tree: &Node, config: &SolverConfig) -> Result<SolveResult, SolverError> {
    let mut solutions = Vec::new();
    let summary = solve_tree_with(tree, config, |solution| {
        solutions.push(solution.clone());
        ControlFlow::Continue(())
    })?;
    Ok(SolveResult {
        solutions,
        status: summary.status,
        encoding: summary.encoding,
        stats: summary.stats,
        readable_equation: tree.to_string(),
    })
}

/// Parse `input` and collect its solutions.
///
/// # Errors
/// Parse errors in addition to those of [`solve_tree`].
pub fn solve_equation(input: &str, config: &SolverConfig) -> Result<SolveResult, SolverError> {
    let tree: Node = input.parse()?;
    solve_tree(&tree, config)
}
