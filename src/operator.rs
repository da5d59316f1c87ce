use crate::errors::ParseError;
use std::fmt;
use std::str::FromStr;

/// The closed set of operators that can label an equation tree node.
///
/// `Id` marks a leaf; every internal node carries one of the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operator {
    Id,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eq,
    Neq,
    Lt,
    Gt,
    Leq,
    Geq,
    And,
}

impl Operator {
    pub const ALL: [Operator; 14] = [
        Operator::Id,
        Operator::Add,
        Operator::Sub,
        Operator::Mul,
        Operator::Div,
        Operator::Mod,
        Operator::Pow,
        Operator::Eq,
        Operator::Neq,
        Operator::Lt,
        Operator::Gt,
        Operator::Leq,
        Operator::Geq,
        Operator::And,
    ];

    /// Upper-case mnemonic used in diagnostics (e.g. `MUL`).
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Operator::Id => "ID",
            Operator::Add => "ADD",
            Operator::Sub => "SUB",
            Operator::Mul => "MUL",
            Operator::Div => "DIV",
            Operator::Mod => "MOD",
            Operator::Pow => "POW",
            Operator::Eq => "EQ",
            Operator::Neq => "NEQ",
            Operator::Lt => "LT",
            Operator::Gt => "GT",
            Operator::Leq => "LEQ",
            Operator::Geq => "GEQ",
            Operator::And => "AND",
        }
    }

    /// Infix symbol, as accepted by the parser and printed by `Display`.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Id => "",
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Mod => "%",
            Operator::Pow => "^",
            Operator::Eq => "=",
            Operator::Neq => "!=",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::Leq => "<=",
            Operator::Geq => ">=",
            Operator::And => "&&",
        }
    }

    #[must_use]
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Operator::Add | Operator::Sub | Operator::Mul | Operator::Div | Operator::Mod | Operator::Pow
        )
    }

    #[must_use]
    pub fn is_relational(self) -> bool {
        matches!(
            self,
            Operator::Eq | Operator::Neq | Operator::Lt | Operator::Gt | Operator::Leq | Operator::Geq
        )
    }

    /// Binding strength used when printing; higher binds tighter.
    pub(crate) fn precedence(self) -> u8 {
        match self {
            Operator::And => 1,
            Operator::Eq | Operator::Neq | Operator::Lt | Operator::Gt | Operator::Leq | Operator::Geq => 2,
            Operator::Add | Operator::Sub => 3,
            Operator::Mul | Operator::Div | Operator::Mod => 4,
            Operator::Pow => 5,
            Operator::Id => 6,
        }
    }
}

impl FromStr for Operator {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Operator::Add),
            "-" => Ok(Operator::Sub),
            "*" => Ok(Operator::Mul),
            "/" => Ok(Operator::Div),
            "%" => Ok(Operator::Mod),
            "^" => Ok(Operator::Pow),
            "=" => Ok(Operator::Eq),
            "!=" | "<>" => Ok(Operator::Neq),
            "<" => Ok(Operator::Lt),
            ">" => Ok(Operator::Gt),
            "<=" => Ok(Operator::Leq),
            ">=" => Ok(Operator::Geq),
            "&&" | ";" => Ok(Operator::And),
            _ => Err(ParseError::UnknownOperator { op: s.to_string() }),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbols_parse_back() {
        for op in Operator::ALL.into_iter().filter(|op| *op != Operator::Id) {
            let parsed = op.symbol().parse::<Operator>().unwrap();
            assert_eq!(op, parsed, "symbol '{}' did not parse back", op.symbol());
        }
    }

    #[test]
    fn test_aliases() {
        assert_eq!("<>".parse::<Operator>().unwrap(), Operator::Neq);
        assert_eq!(";".parse::<Operator>().unwrap(), Operator::And);
    }

    #[test]
    fn test_from_str_invalid_operators() {
        for input in ["==", "**", "", " + ", "!", "=>", "and"] {
            assert!(input.parse::<Operator>().is_err(), "should reject '{input}'");
        }
    }

    #[test]
    fn test_classification_is_a_partition() {
        for op in Operator::ALL {
            let classes = [op.is_arithmetic(), op.is_relational(), op == Operator::And, op == Operator::Id];
            assert_eq!(classes.iter().filter(|&&c| c).count(), 1, "{op:?}");
        }
    }

    #[test]
    fn test_names() {
        assert_eq!(Operator::Mul.name(), "MUL");
        assert_eq!(Operator::Leq.name(), "LEQ");
    }
}
