//! Infix equation text to [`Node`] trees.
//!
//! Precedence, loosest first: conjunction (`&&`, `;`), relations
//! (`=`, `!=`, `<>`, `<`, `>`, `<=`, `>=`), `+ -`, `* / %`, and `^`
//! (right-associative). Atoms are words (ASCII letters), decimal constants
//! and parenthesized sub-expressions. Whitespace is insignificant.

use crate::errors::ParseError;
use crate::operator::Operator;
use crate::tree::Node;
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{alpha1, char, digit1, multispace0};
use nom::combinator::{map, map_res, opt};
use nom::error::ErrorKind;
use nom::sequence::{delimited, preceded};
use nom::{IResult, Parser};
use std::str::FromStr;

/// Parser result type: input, output, with our custom `ParseError`
pub type PResult<'a, O> = IResult<&'a str, O, Box<ParseError>>;

fn ws<'a, O, P>(inner: P) -> impl Parser<&'a str, Output = O, Error = Box<ParseError>>
where
    P: Parser<&'a str, Output = O, Error = Box<ParseError>>,
{
    delimited(multispace0, inner, multispace0)
}

fn to_operator(symbol: &str) -> Result<Operator, ParseError> {
    symbol.parse()
}

fn conjunction_op(input: &str) -> PResult<'_, Operator> {
    ws(map_res(alt((tag("&&"), tag(";"))), to_operator)).parse(input)
}

fn relational_op(input: &str) -> PResult<'_, Operator> {
    // longest symbols first
    ws(map_res(
        alt((tag("!="), tag("<>"), tag("<="), tag(">="), tag("="), tag("<"), tag(">"))),
        to_operator,
    ))
    .parse(input)
}

fn additive_op(input: &str) -> PResult<'_, Operator> {
    ws(map_res(alt((tag("+"), tag("-"))), to_operator)).parse(input)
}

fn multiplicative_op(input: &str) -> PResult<'_, Operator> {
    ws(map_res(alt((tag("*"), tag("/"), tag("%"))), to_operator)).parse(input)
}

fn word(input: &str) -> PResult<'_, Node> {
    map(alpha1, Node::word).parse(input)
}

fn constant(input: &str) -> PResult<'_, Node> {
    map(digit1, Node::constant).parse(input)
}

fn parenthesized(input: &str) -> PResult<'_, Node> {
    delimited(char('('), conjunction, char(')')).parse(input)
}

fn atom(input: &str) -> PResult<'_, Node> {
    ws(alt((word, constant, parenthesized))).parse(input)
}

/// `operand (op operand)*`, folded to the left.
fn left_assoc<'a>(
    input: &'a str,
    operand: fn(&'a str) -> PResult<'a, Node>,
    operator: fn(&'a str) -> PResult<'a, Operator>,
) -> PResult<'a, Node> {
    let (mut input, mut acc) = operand(input)?;
    loop {
        match (operator, operand).parse(input) {
            Ok((rest, (op, rhs))) => {
                acc = Node::binary(op, acc, rhs);
                input = rest;
            }
            Err(nom::Err::Error(_)) => return Ok((input, acc)),
            Err(e) => return Err(e),
        }
    }
}

fn power(input: &str) -> PResult<'_, Node> {
    let (input, base) = atom(input)?;
    let (input, exponent) = opt(preceded(ws(char('^')), power)).parse(input)?;
    Ok((input, match exponent {
        Some(exponent) => Node::binary(Operator::Pow, base, exponent),
        None => base,
    }))
}

fn product(input: &str) -> PResult<'_, Node> {
    left_assoc(input, power, multiplicative_op)
}

fn sum(input: &str) -> PResult<'_, Node> {
    left_assoc(input, product, additive_op)
}

fn relation(input: &str) -> PResult<'_, Node> {
    left_assoc(input, sum, relational_op)
}

fn conjunction(input: &str) -> PResult<'_, Node> {
    left_assoc(input, relation, conjunction_op)
}

/// Parse a whole equation.
///
/// # Errors
/// `EmptyEquation` for blank input, `UnexpectedInput` for trailing text, and
/// the underlying nom error kind otherwise.
pub fn parse_equation(input: &str) -> Result<Node, Box<ParseError>> {
    if input.trim().is_empty() {
        return Err(Box::new(ParseError::EmptyEquation));
    }
    match ws(conjunction).parse(input) {
        Ok(("", tree)) => Ok(tree),
        Ok((rest, _)) => Err(Box::new(ParseError::UnexpectedInput { rest: rest.to_string() })),
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => Err(e),
        Err(nom::Err::Incomplete(_)) => Err(Box::new(ParseError::NomError(ErrorKind::Complete))),
    }
}

impl FromStr for Node {
    type Err = Box<ParseError>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_equation(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Node {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_send_more_money() {
        let expected = Node::binary(
            Operator::Eq,
            Node::binary(Operator::Add, Node::word("SEND"), Node::word("MORE")),
            Node::word("MONEY"),
        );
        assert_eq!(parse("SEND+MORE=MONEY"), expected);
        assert_eq!(parse("  SEND +  MORE\t= MONEY \n"), expected);
    }

    #[test]
    fn test_precedence() {
        let tree = parse("A+B*C^D^E=F");
        let expected = Node::binary(
            Operator::Eq,
            Node::binary(
                Operator::Add,
                Node::word("A"),
                Node::binary(
                    Operator::Mul,
                    Node::word("B"),
                    Node::binary(Operator::Pow, Node::word("C"), Node::binary(Operator::Pow, Node::word("D"), Node::word("E"))),
                ),
            ),
            Node::word("F"),
        );
        assert_eq!(tree, expected);
    }

    #[test]
    fn test_left_associative_subtraction() {
        let tree = parse("A-B-C=D");
        let Node::Internal { left, .. } = tree else { panic!("expected relation") };
        assert_eq!(
            *left,
            Node::binary(Operator::Sub, Node::binary(Operator::Sub, Node::word("A"), Node::word("B")), Node::word("C"))
        );
    }

    #[test]
    fn test_relations_and_conjunctions() {
        let tree = parse("A<>B && B<=C; C>=A");
        assert_eq!(tree.operator(), Operator::And);
        let ops: Vec<Operator> = tree.operators().into_iter().collect();
        assert_eq!(ops, vec![Operator::Neq, Operator::Leq, Operator::Geq, Operator::And]);
        assert_eq!(tree.validate(), Ok(3));
    }

    #[test]
    fn test_constants_and_parentheses() {
        let tree = parse("(AB + 12) * 3 = CDE");
        let expected = Node::binary(
            Operator::Eq,
            Node::binary(
                Operator::Mul,
                Node::binary(Operator::Add, Node::word("AB"), Node::constant("12")),
                Node::constant("3"),
            ),
            Node::word("CDE"),
        );
        assert_eq!(tree, expected);
    }

    #[test]
    fn test_display_round_trips() {
        for text in [
            "SEND+MORE=MONEY",
            "A-(B-C)=D",
            "(A+B)*C=D%E",
            "A^B^C>(A^B)^C",
            "A*B/C=D&&A!=B&&B<C",
            "(A=B)&&(C=D)",
            "AB+12=CD",
        ] {
            let tree = parse(text);
            assert_eq!(parse(&tree.to_string()), tree, "{text}");
        }
    }

    #[test]
    fn test_errors() {
        assert!(matches!(*"".parse::<Node>().unwrap_err(), ParseError::EmptyEquation));
        assert!(matches!(*"   ".parse::<Node>().unwrap_err(), ParseError::EmptyEquation));
        match *"A+B=C)".parse::<Node>().unwrap_err() {
            ParseError::UnexpectedInput { rest } => assert_eq!(rest, ")"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(*"A+B=C ?".parse::<Node>().unwrap_err(), ParseError::UnexpectedInput { .. }));
        assert!(matches!(*"+A=B".parse::<Node>().unwrap_err(), ParseError::NomError(_)));
    }

    #[test]
    fn test_words_are_case_sensitive() {
        let tree = parse("ab+AB=Ab");
        assert_eq!(tree.symbols(), vec!['a', 'b', 'A', 'B']);
    }
}
