//! Generate error code documentation from the source of truth (error enums).
//!
//! This binary reads the error codes, descriptions, details, and help text
//! directly from the `SolverError`, `ParseError`, `ConfigError` and
//! `ModelError` implementations via their `code()`, `description()`,
//! `details()`, and `help()` methods.
//!
//! Run with:
//! ```bash
//! cargo run --bin generate_error_docs > docs/ERROR_CODES.md
//! ```

use cryptarith::engine::EngineError;
use cryptarith::errors::{ConfigError, ModelError, ParseError};
use cryptarith::operator::Operator;
use cryptarith::solver::SolverError;
use std::fmt::Write;

/// Macro to generate error documentation for any error type
/// with `code()`, `description()`, `details()`, `help()`, and `display_detailed()` methods
macro_rules! generate_error_docs {
    ($out:expr, $errors:expr) => {
        for error in $errors {
            let _ = writeln!($out, "### {}: {}\n", error.code(), error.description());
            let _ = writeln!($out, "**Details:** {}\n", error.details());

            if let Some(help_text) = error.help() {
                let _ = writeln!($out, "**How to fix:**\n```\n{help_text}\n```\n");
            }

            let _ = writeln!($out, "**Example error message:**\n```\n{error}\n```\n");
            let _ = writeln!($out, "**Detailed format:**\n```\n{}\n```\n", error.display_detailed());
            let _ = writeln!($out, "---\n");
        }
    };
}

fn all_solver_error_variants() -> Vec<SolverError> {
    vec![
        SolverError::ParseFailure(Box::new(ParseError::EmptyEquation)),
        SolverError::InvalidConfig(ConfigError::BaseTooSmall { base: 1 }),
        SolverError::InvalidModel(ModelError::UnsupportedOperators { operators: vec![Operator::Mul] }),
        SolverError::EngineFailure(EngineError::Unsupported { reason: "exponent x3 may reach 9999 (at most 1024 is expanded)".to_string() }),
        SolverError::InvalidSolution {
            solution: "A=1 B=1 C=1".to_string(),
            equation: "A+B=C".to_string(),
        },
    ]
}

fn all_parse_error_variants() -> Vec<ParseError> {
    vec![
        ParseError::EmptyEquation,
        ParseError::UnexpectedInput { rest: ")".to_string() },
        ParseError::UnknownOperator { op: "**".to_string() },
        ParseError::NomError(nom::error::ErrorKind::Char),
    ]
}

fn all_config_error_variants() -> Vec<ConfigError> {
    vec![
        ConfigError::BaseTooSmall { base: 1 },
        ConfigError::BaseTooLarge { base: 100_000, max: cryptarith::config::MAX_BASE },
        ConfigError::NegativeRelax { parameter: "relax_min_occurrence", value: -1 },
        ConfigError::RelaxOutOfRange { parameter: "relax_max_occurrence", value: 1 << 40 },
    ]
}

fn all_model_error_variants() -> Vec<ModelError> {
    vec![
        ModelError::UnsupportedOperators { operators: vec![Operator::Mul, Operator::Lt] },
        ModelError::StackShape { expected: 2, actual: 1 },
        ModelError::OperandKind { operator: Operator::And, expected: "relational" },
        ModelError::NotAnEquation,
        ModelError::EmptyWord,
        ModelError::InvalidConstant { text: "1x".to_string() },
        ModelError::WordTooLong { length: 9, base: 10, max_length: 7 },
        ModelError::ConstantOutOfRange { text: "99999999999999999999".to_string() },
        ModelError::MisplacedIdentity,
    ]
}

fn render_docs() -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Error Code Reference\n");
    let _ = writeln!(out, "**⚠️ This document is auto-generated from the source code. Do not edit manually.**\n");

    let _ = writeln!(out, "## Table of Contents\n");
    let _ = writeln!(out, "- [Solver Errors (S001–S005)](#solver-errors)");
    let _ = writeln!(out, "- [Parse Errors (E001–E004)](#parse-errors)");
    let _ = writeln!(out, "- [Configuration Errors (C001–C004)](#configuration-errors)");
    let _ = writeln!(out, "- [Model Errors (M001–M009)](#model-errors)");
    let _ = writeln!(out, "- [How to Use Error Codes](#how-to-use-error-codes)\n");

    let _ = writeln!(out, "## Solver Errors\n");
    let _ = writeln!(out, "Top-level errors from the solver. These wrap lower-level errors or indicate search failures.\n");
    generate_error_docs!(out, all_solver_error_variants());

    let _ = writeln!(out, "## Parse Errors\n");
    let _ = writeln!(out, "Errors that occur when parsing equation text.\n");
    generate_error_docs!(out, all_parse_error_variants());

    let _ = writeln!(out, "## Configuration Errors\n");
    let _ = writeln!(out, "Errors raised by configuration validation, before any model is built.\n");
    generate_error_docs!(out, all_config_error_variants());

    let _ = writeln!(out, "## Model Errors\n");
    let _ = writeln!(out, "Errors raised while compiling an equation tree into a constraint model.\n");
    generate_error_docs!(out, all_model_error_variants());

    let _ = writeln!(out, "\n## How to Use Error Codes\n");
    let _ = writeln!(out, "When you see an error like:\n");
    let _ = writeln!(out, "```\nError: S002\n  caused by: base 1 is too small (minimum is 2) (C001)\nUse a base of at least 2 (e.g. --base 10)\n```\n");
    let _ = writeln!(out, "1. Note the innermost error code (e.g., `C001`)");
    let _ = writeln!(out, "2. Look it up in this document for detailed explanation");
    let _ = writeln!(out, "3. Follow the suggested resolution steps\n");

    let _ = writeln!(out, "## Error Display Formats\n");
    let _ = writeln!(out, "### Simple Format\n```\nError: <message>\n```\n");
    let _ = writeln!(out, "### Detailed Format (via `display_detailed()`)\n```\n<message> (<code>)\n<help text if available>\n```");
    out
}

fn main() {
    print!("{}", render_docs());
}
