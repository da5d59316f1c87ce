//! Error types for parsing, configuration and model compilation, with error codes
//! and helpful messages.
//!
//! # Error Codes
//!
//! Each error variant has a unique code for documentation lookup:
//!
//! - E001: `EmptyEquation` (Empty equation string)
//! - E002: `UnexpectedInput` (Input left over after the equation)
//! - E003: `UnknownOperator` (Unknown operator symbol)
//! - E004: `NomError` (Low-level nom parser error)
//! - C001: `BaseTooSmall` (Base below 2)
//! - C002: `BaseTooLarge` (Base above `MAX_BASE`)
//! - C003: `NegativeRelax` (Negative occurrence relaxation)
//! - C004: `RelaxOutOfRange` (Occurrence relaxation does not fit in 32 bits)
//! - M001: `UnsupportedOperators` (Operator not supported by the bignum model)
//! - M002: `StackShape` (Wrong number of values left after traversal)
//! - M003: `OperandKind` (Operator applied to the wrong kind of operand)
//! - M004: `NotAnEquation` (Sub-equation is not a relation)
//! - M005: `EmptyWord` (Non-constant leaf without letters)
//! - M006: `InvalidConstant` (Constant leaf that is not a decimal number)
//! - M007: `WordTooLong` (Word too long for fixed-precision arithmetic)
//! - M008: `ConstantOutOfRange` (Constant too large for fixed-precision arithmetic)
//! - M009: `MisplacedIdentity` (Internal node labelled with the identity operator)
//!
//! # Examples
//!
//! ```
//! use cryptarith::errors::ConfigError;
//!
//! let err = ConfigError::BaseTooSmall { base: 1 };
//! assert_eq!(err.code(), "C001");
//! println!("{}", err.display_detailed());
//! ```

use crate::operator::Operator;
use nom::error::{ErrorKind, FromExternalError, ParseError as NomParseError};

/// Errors raised while turning equation text into a tree.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Empty equation string")]
    EmptyEquation,

    #[error("Unexpected input at \"{rest}\"")]
    UnexpectedInput { rest: String },

    #[error("Unknown operator '{op}'")]
    UnknownOperator { op: String },

    // nom parser error (lowest level)
    #[error("nom parser error: {0:?}")]
    NomError(ErrorKind),
}

impl<'a> NomParseError<&'a str> for Box<ParseError> {
    fn from_error_kind(_input: &'a str, kind: ErrorKind) -> Self {
        Box::new(ParseError::NomError(kind))
    }

    fn append(_input: &'a str, _kind: ErrorKind, other: Self) -> Self {
        other
    }
}

impl<'a> FromExternalError<&'a str, ParseError> for Box<ParseError> {
    fn from_external_error(_input: &'a str, _kind: ErrorKind, e: ParseError) -> Self {
        Box::new(e)
    }
}

impl ParseError {
    /// Returns the error code for this error variant
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            ParseError::EmptyEquation => "E001",
            ParseError::UnexpectedInput { .. } => "E002",
            ParseError::UnknownOperator { .. } => "E003",
            ParseError::NomError(_) => "E004",
        }
    }

    /// Returns a short description of this error type (for documentation)
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            ParseError::EmptyEquation => "Empty equation string",
            ParseError::UnexpectedInput { .. } => "Input left over after the equation",
            ParseError::UnknownOperator { .. } => "Unknown operator symbol",
            ParseError::NomError(_) => "Low-level nom parser error",
        }
    }

    /// Returns detailed explanation of this error type (for documentation)
    #[must_use]
    pub fn details(&self) -> &'static str {
        match self {
            ParseError::EmptyEquation => "The equation text is empty or only whitespace.",
            ParseError::UnexpectedInput { .. } => "The parser recognized a prefix of the input as an equation but could not make sense of the rest, e.g. an unbalanced parenthesis or a character that is neither a letter, a digit nor an operator.",
            ParseError::UnknownOperator { .. } => "An operator symbol is not one of + - * / % ^ = != <> < > <= >= && ;",
            ParseError::NomError(_) => "The underlying parser combinator library reported an error. This usually accompanies one of the other parse errors.",
        }
    }

    /// Returns a helpful suggestion or example for this error
    #[must_use]
    pub fn help(&self) -> Option<&'static str> {
        match self {
            ParseError::EmptyEquation => Some("Example: SEND+MORE=MONEY"),
            ParseError::UnexpectedInput { .. } => Some("Words are letters only, constants are decimal digits; check parentheses are balanced"),
            ParseError::UnknownOperator { .. } => Some("Supported operators: + - * / % ^ = != <> < > <= >= && ;"),
            ParseError::NomError(_) => None,
        }
    }

    /// Formats the error with code and optional help text
    #[must_use]
    pub fn display_detailed(&self) -> String {
        format_error_with_code_and_help(&self.to_string(), self.code(), self.help())
    }
}

/// Configuration rejected before any model is built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("base {base} is too small (minimum is 2)")]
    BaseTooSmall { base: u32 },

    #[error("base {base} is too large (maximum is {max})")]
    BaseTooLarge { base: u32, max: u32 },

    #[error("{parameter} must not be negative (got {value})")]
    NegativeRelax { parameter: &'static str, value: i64 },

    #[error("{parameter} is out of range (got {value})")]
    RelaxOutOfRange { parameter: &'static str, value: i64 },
}

impl ConfigError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::BaseTooSmall { .. } => "C001",
            ConfigError::BaseTooLarge { .. } => "C002",
            ConfigError::NegativeRelax { .. } => "C003",
            ConfigError::RelaxOutOfRange { .. } => "C004",
        }
    }

    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            ConfigError::BaseTooSmall { .. } => "Base below 2",
            ConfigError::BaseTooLarge { .. } => "Base above the supported maximum",
            ConfigError::NegativeRelax { .. } => "Negative occurrence relaxation",
            ConfigError::RelaxOutOfRange { .. } => "Occurrence relaxation out of range",
        }
    }

    #[must_use]
    pub fn details(&self) -> &'static str {
        match self {
            ConfigError::BaseTooSmall { .. } => "A numeral base needs at least two digits.",
            ConfigError::BaseTooLarge { .. } => "Digits are constraint variables with domain [0, base-1]; very large bases make the occurrence tables and carry domains impractical.",
            ConfigError::NegativeRelax { .. } => "The relaxation parameters widen the derived digit occurrence bounds and cannot narrow them.",
            ConfigError::RelaxOutOfRange { .. } => "The relaxation parameters are stored as unsigned 32-bit integers.",
        }
    }

    #[must_use]
    pub fn help(&self) -> Option<&'static str> {
        match self {
            ConfigError::BaseTooSmall { .. } => Some("Use a base of at least 2 (e.g. --base 10)"),
            ConfigError::BaseTooLarge { .. } => Some("Use a smaller base"),
            ConfigError::NegativeRelax { .. } | ConfigError::RelaxOutOfRange { .. } => {
                Some("Use 0 for the derived bounds, or a small positive number to loosen them")
            }
        }
    }

    #[must_use]
    pub fn display_detailed(&self) -> String {
        format_error_with_code_and_help(&self.to_string(), self.code(), self.help())
    }
}

fn operator_names(operators: &[Operator]) -> String {
    operators.iter().map(|op| op.name()).collect::<Vec<_>>().join(", ")
}

/// The compiler produced, or would produce, an inconsistent model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("bignum model does not support operator(s): {}", operator_names(.operators))]
    UnsupportedOperators { operators: Vec<Operator> },

    #[error("expected {expected} value(s) after traversal, found {actual}")]
    StackShape { expected: usize, actual: usize },

    #[error("operator {} expects {expected} operands", .operator.name())]
    OperandKind { operator: Operator, expected: &'static str },

    #[error("sub-equation is not a relation")]
    NotAnEquation,

    #[error("word leaf has no letters")]
    EmptyWord,

    #[error("constant \"{text}\" is not a decimal number")]
    InvalidConstant { text: String },

    #[error("word of length {length} overflows fixed-precision arithmetic in base {base} (limit {max_length})")]
    WordTooLong { length: usize, base: u32, max_length: usize },

    #[error("constant \"{text}\" overflows fixed-precision arithmetic")]
    ConstantOutOfRange { text: String },

    #[error("internal node labelled with the identity operator")]
    MisplacedIdentity,
}

impl ModelError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            ModelError::UnsupportedOperators { .. } => "M001",
            ModelError::StackShape { .. } => "M002",
            ModelError::OperandKind { .. } => "M003",
            ModelError::NotAnEquation => "M004",
            ModelError::EmptyWord => "M005",
            ModelError::InvalidConstant { .. } => "M006",
            ModelError::WordTooLong { .. } => "M007",
            ModelError::ConstantOutOfRange { .. } => "M008",
            ModelError::MisplacedIdentity => "M009",
        }
    }

    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            ModelError::UnsupportedOperators { .. } => "Operator not supported by the bignum model",
            ModelError::StackShape { .. } => "Wrong number of values left after traversal",
            ModelError::OperandKind { .. } => "Operator applied to the wrong kind of operand",
            ModelError::NotAnEquation => "Sub-equation is not a relation",
            ModelError::EmptyWord => "Word leaf without letters",
            ModelError::InvalidConstant { .. } => "Constant leaf that is not a decimal number",
            ModelError::WordTooLong { .. } => "Word too long for fixed-precision arithmetic",
            ModelError::ConstantOutOfRange { .. } => "Constant too large for fixed-precision arithmetic",
            ModelError::MisplacedIdentity => "Internal node labelled with the identity operator",
        }
    }

    #[must_use]
    pub fn details(&self) -> &'static str {
        match self {
            ModelError::UnsupportedOperators { .. } => "The carry-chain (bignum) model only encodes addition, equality and conjunction. It is selected either explicitly or because a word is too long for fixed-precision arithmetic.",
            ModelError::StackShape { .. } => "After the postorder traversal there must be exactly one value per independent sub-equation. Anything else means the compiler itself is inconsistent.",
            ModelError::OperandKind { .. } => "Arithmetic and relational operators take arithmetic operands; the conjunction takes relations.",
            ModelError::NotAnEquation => "Every sub-equation must be rooted at a relational operator (=, !=, <, >, <=, >=).",
            ModelError::EmptyWord => "Only constant leaves may be empty (they encode 0).",
            ModelError::InvalidConstant { .. } => "Constant leaves hold decimal digits.",
            ModelError::WordTooLong { .. } => "The word value variable would exceed the engine's safe integer range.",
            ModelError::ConstantOutOfRange { .. } => "The constant does not fit the engine's integer type.",
            ModelError::MisplacedIdentity => "The identity operator only labels leaves.",
        }
    }

    #[must_use]
    pub fn help(&self) -> Option<&'static str> {
        match self {
            ModelError::UnsupportedOperators { .. } => Some("Use the adaptive or fixed-precision strategy, or restrict the equation to + and ="),
            ModelError::WordTooLong { .. } | ModelError::ConstantOutOfRange { .. } => Some("Use the adaptive or bignum strategy"),
            ModelError::NotAnEquation => Some("Example: SEND+MORE=MONEY rather than SEND+MORE"),
            _ => None,
        }
    }

    #[must_use]
    pub fn display_detailed(&self) -> String {
        format_error_with_code_and_help(&self.to_string(), self.code(), self.help())
    }
}

/// Helper function to format error messages with code and optional help text
pub(crate) fn format_error_with_code_and_help(base_msg: &str, code: &str, help: Option<&str>) -> String {
    if let Some(help_text) = help {
        format!("{base_msg} ({code})\n{help_text}")
    } else {
        format!("{base_msg} ({code})")
    }
}
