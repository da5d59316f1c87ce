use clap::{Parser, ValueEnum};
use std::ops::ControlFlow;
use std::process::ExitCode;
use std::time::Instant;

use cryptarith::config::{ModelStrategy, SolverConfig, WordEncoding};
use cryptarith::solver;
use cryptarith::solver::SolveStatus;
use cryptarith::tree::Node;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    Adaptive,
    Fixed,
    Bignum,
}

impl From<StrategyArg> for ModelStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Adaptive => ModelStrategy::Adaptive,
            StrategyArg::Fixed => ModelStrategy::FixedPrecision,
            StrategyArg::Bignum => ModelStrategy::Bignum,
        }
    }
}

/// Cryptarithm solver
#[derive(Parser, Debug)]
#[command(author, version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")"), about, long_about = None)]
struct Cli {
    /// The equation to solve (e.g., "SEND+MORE=MONEY" or "A+B=C && A<B")
    equation: String,

    /// Numeral base of the words
    #[arg(short, long, default_value_t = 10)]
    base: u32,

    /// Allow a word (even a single letter) to start with the digit 0
    #[arg(short = 'z', long)]
    allow_leading_zeros: bool,

    /// Build word values as a Horner chain instead of one weighted sum
    #[arg(long)]
    horner: bool,

    /// Which constraint model to build
    #[arg(short, long, value_enum, default_value_t = StrategyArg::Adaptive)]
    strategy: StrategyArg,

    /// Lower the minimum number of letters per digit by this much
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    relax_min: i64,

    /// Raise the maximum number of letters per digit by this much
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    relax_max: i64,

    /// Maximum number of solutions to print (0 = all)
    #[arg(short = 'n', long, default_value_t = 0)]
    num_solutions: u32,

    /// Time limit in milliseconds (0 = none)
    #[arg(short = 't', long, default_value_t = 0)]
    time_limit_ms: u32,

    /// Skip re-checking solutions with the arbitrary-precision evaluator
    #[arg(long)]
    no_check: bool,

    /// Enable debug logging (same as setting CRYPTARITH_DEBUG)
    #[arg(long)]
    debug: bool,
}

impl Cli {
    fn config(&self) -> Result<SolverConfig, cryptarith::errors::ConfigError> {
        let word_encoding = if self.horner { WordEncoding::Horner } else { WordEncoding::Positional };
        let config = SolverConfig {
            base: self.base,
            allow_leading_zeros: self.allow_leading_zeros,
            word_encoding,
            strategy: self.strategy.into(),
            solution_limit: self.num_solutions,
            time_limit_ms: self.time_limit_ms,
            check_solutions: !self.no_check,
            ..SolverConfig::default()
        }
        .with_relax(self.relax_min, self.relax_max)?;
        config.validate()?;
        Ok(config)
    }
}

/// Entry point of the cryptarithm CLI.
///
/// Delegates to [`try_main`], catching any errors and printing them
/// in a user-friendly way before exiting with code 1.
fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging
    let debug_enabled = cli.debug || cryptarith::log::debug_requested();
    cryptarith::log::init_logger(debug_enabled);

    if let Err(e) = try_main(&cli) {
        // Print the error message to stderr, with detailed formatting if it's a SolverError
        if let Some(solver_err) = e.downcast_ref::<solver::SolverError>() {
            eprintln!("Error: {}", solver_err.display_detailed());
        } else if let Some(config_err) = e.downcast_ref::<cryptarith::errors::ConfigError>() {
            eprintln!("Error: {}", config_err.display_detailed());
        } else {
            eprintln!("Error: {e}");
        }
        // Exit explicitly with a nonzero code so scripts can detect failure
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Core application logic.
///
/// Steps:
/// 1. Build and validate the configuration from the arguments.
/// 2. Parse the equation.
/// 3. Stream each solution (assignment, then the substituted equation) to stdout.
/// 4. Print the stop reason and search statistics on stderr.
fn try_main(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = cli.config()?;

    let tree: Node = cli.equation.parse().map_err(solver::SolverError::from)?;
    log::debug!("parsed equation: {tree}");

    let t_solve = Instant::now();
    let summary = solver::solve_tree_with(&tree, &config, |solution| {
        println!("{solution}\t{}", solution.render(&tree, config.base));
        ControlFlow::Continue(())
    })?;
    let solve_secs = t_solve.elapsed().as_secs_f64();

    match summary.status {
        SolveStatus::TimedOut { elapsed } => {
            eprintln!("⚠️  Timed out after {:.1}s; some solutions may not have been returned", elapsed.as_secs_f64());
        }
        SolveStatus::FoundEnough => {
            eprintln!("✓ Stopped after finding {}/{} requested solutions", summary.found, cli.num_solutions);
        }
        SolveStatus::SearchExhausted => {
            eprintln!("✓ Search exhausted (no more solutions)");
        }
        SolveStatus::Cancelled => {
            eprintln!("⚠️  Search cancelled; some solutions may not have been returned");
        }
    }

    eprintln!(
        "Solved {} with the {} model in {:.3}s ({} solutions; {}).",
        tree, summary.encoding, solve_secs, summary.found, summary.stats
    );

    Ok(())
}
