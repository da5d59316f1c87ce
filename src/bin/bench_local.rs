//! `bench_local.rs` — quick local timing runner (no Criterion)
//!
//! PURPOSE
//! -------
//! - Fast, ad-hoc timing for a handful of classic cryptarithms on *your* machine.
//! - Runs each equation several times under each model strategy and reports the median.
//! - Checks the solution count against the known answer, so a fast wrong model stands out.
//!
//! HOW TO RUN
//! ----------
//! - Optimized build:                `cargo run --bin bench_local --release`
//! - Multiple repeats:               `cargo run --bin bench_local --release -- -r 5`
//! - Print a few solutions:          `cargo run --bin bench_local --release -- -p 2`
//! - Horner word encoding:           `cargo run --bin bench_local --release -- --horner`
//!
//! NOTES
//! -----
//! - Use the same machine and `--release` for more comparable numbers.
//! - Equations and expected counts live in `get_cases()` below.
//! - One warm-up run per case is done (not included in timing).
//! - We report the *median* over repeats (more robust than mean for small _N_).

use clap::Parser;
use cryptarith::config::{ModelStrategy, SolverConfig, WordEncoding};
use cryptarith::solution::Solution;
use cryptarith::solver;
use std::hint::black_box;
use std::time::Instant;

/// Simple local benchmark runner over a fixed set of cryptarithms.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Number of repeats per case (use >1 to reduce noise; median is reported)
    #[arg(short = 'r', long = "repeats", default_value_t = 1)]
    num_repeats: usize,

    /// Print up to this many solutions per case (0 = print none)
    #[arg(short = 'p', long = "print", default_value_t = 0)]
    print_limit: usize,

    /// Use the Horner word encoding in fixed-precision models
    #[arg(long)]
    horner: bool,
}

#[derive(Clone)]
struct Case {
    equation: &'static str,
    base: u32,
    /// Known number of solutions (without leading zeros), when we have one
    expected: Option<usize>,
    /// Whether the bignum model can encode this equation
    additive: bool,
}

fn get_cases() -> Vec<Case> {
    vec![
        Case { equation: "SEND+MORE=MONEY", base: 10, expected: Some(1), additive: true },
        Case { equation: "CROSS+ROADS=DANGER", base: 10, expected: Some(1), additive: true },
        Case { equation: "DONALD+GERALD=ROBERT", base: 10, expected: Some(1), additive: true },
        Case { equation: "TWO+TWO=FOUR", base: 10, expected: Some(7), additive: true },
        Case { equation: "SO+MANY+MORE+MEN+SEEM+TO+SAY+THAT+THEY+MAY+SOON+TRY+TO+STAY+AT+HOME+SO+AS+TO+SEE+OR+HEAR+THE+SAME+ONE+MAN+TRY+TO+MEET+THE+TEAM+ON+THE+MOON+AS+HE+HAS+AT+THE+OTHER+TEN=TESTS", base: 10, expected: Some(1), additive: true },
        Case { equation: "AB*C=DE && A<C", base: 10, expected: None, additive: false },
        Case { equation: "aaaaa+ab=abbbba", base: 2, expected: Some(1), additive: true },
    ]
}

/// Small helper: robust central tendency for small samples.
fn median(mut xs: Vec<f64>) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.sort_by(f64::total_cmp);
    let n = xs.len();
    if n % 2 == 1 {
        xs[n / 2]
    } else {
        0.5 * (xs[n / 2 - 1] + xs[n / 2])
    }
}

fn pluralizer(count: usize, singular: String, plural: Option<String>) -> String {
    if count == 1 {
        singular
    } else {
        plural.unwrap_or_else(|| singular + "s")
    }
}

const MAX_EQUATION_LEN: usize = 40;

fn strategies(case: &Case) -> Vec<ModelStrategy> {
    let mut out = vec![ModelStrategy::Adaptive, ModelStrategy::FixedPrecision];
    if case.additive {
        out.push(ModelStrategy::Bignum);
    }
    out
}

fn main() -> Result<(), solver::SolverError> {
    /// One row in the benchmark summary: (equation, strategy, median seconds, solutions, matches expected).
    type SummaryRow = (String, String, f64, usize, bool);

    let cli = Cli::parse();
    cryptarith::log::init_logger(false);

    let encoding = if cli.horner { WordEncoding::Horner } else { WordEncoding::Positional };
    let mut summary: Vec<SummaryRow> = Vec::new();

    for (idx, case) in get_cases().iter().enumerate() {
        eprintln!("\n[{:02}] {} (base {})", idx + 1, case.equation, case.base);

        for strategy in strategies(case) {
            let config = SolverConfig::default()
                .with_base(case.base)
                .with_strategy(strategy)
                .with_word_encoding(encoding);

            // warm-up, not timed
            if let Err(e) = solver::solve_equation(case.equation, &config) {
                eprintln!("  ✗ {strategy:?}: warm-up failed: {e}");
                continue;
            }

            let mut times = Vec::with_capacity(cli.num_repeats);
            let mut last_solutions: Vec<Solution> = Vec::new();
            for _ in 0..cli.num_repeats {
                let t_solve = Instant::now();
                let result = solver::solve_equation(black_box(case.equation), &config)?;
                times.push(t_solve.elapsed().as_secs_f64());
                last_solutions = black_box(result.solutions);
            }
            let med = median(times);
            let ok = case.expected.is_none_or(|expected| last_solutions.len() == expected);

            eprintln!(
                "  {:<15} median {:.3}s over {} run(s); {} {}{}",
                format!("{strategy:?}"),
                med,
                cli.num_repeats,
                last_solutions.len(),
                pluralizer(last_solutions.len(), "solution".into(), None),
                match case.expected {
                    Some(expected) if !ok => format!(" (expected {expected})"),
                    _ => String::new(),
                }
            );

            if cli.print_limit > 0 {
                let tree: cryptarith::tree::Node = case.equation.parse()?;
                for solution in last_solutions.iter().take(cli.print_limit) {
                    println!("{}", solution.render(&tree, case.base));
                }
            }

            summary.push((case.equation.to_string(), format!("{strategy:?}"), med, last_solutions.len(), ok));
        }
    }

    eprintln!("\n==== Summary ====");
    eprintln!(
        "{:<MAX_EQUATION_LEN$} | {:<14} | {:>10} | {:>11} | {:>3}",
        "equation", "strategy", "median (s)", "# solutions", "ok"
    );
    eprintln!("{:-<MAX_EQUATION_LEN$}-+-{:-<14}-+-{:-<10}-+-{:-<11}-+-{:-<3}", "", "", "", "", "");
    for (equation, strategy, med, num_solutions, ok) in &summary {
        let display = if equation.len() > MAX_EQUATION_LEN {
            // "- 1" for the "…"
            format!("{}…", equation.chars().take(MAX_EQUATION_LEN - 1).collect::<String>())
        } else {
            equation.clone()
        };
        let ok = if *ok { "✓" } else { "✗" };
        eprintln!("{display:<MAX_EQUATION_LEN$} | {strategy:<14} | {med:>10.3} | {num_solutions:>11} | {ok:>3}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pluralizer() {
        assert_eq!(pluralizer(0, "solution".into(), None), "solutions");
        assert_eq!(pluralizer(1, "solution".into(), None), "solution");
        assert_eq!(pluralizer(2, "radius".into(), Some("radii".into())), "radii");
    }

    #[test]
    fn test_median() {
        assert_eq!(median(vec![]), 0.0);
        assert_eq!(median(vec![3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(vec![4.0, 1.0, 2.0, 3.0]), 2.5);
    }

    #[test]
    fn test_bignum_only_for_additive_cases() {
        for case in get_cases() {
            assert_eq!(strategies(&case).contains(&ModelStrategy::Bignum), case.additive, "{}", case.equation);
        }
    }
}
