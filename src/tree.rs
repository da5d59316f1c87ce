//! The equation tree consumed by the model compiler.
//!
//! Leaves are words (or decimal constants); internal nodes are binary
//! operators. Trees are built once (usually by [`crate::parser`]) and only ever
//! borrowed afterwards.

use crate::errors::ModelError;
use crate::operator::Operator;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A word whose letters are solved for, or a literal decimal constant.
    Leaf { word: Vec<char>, is_constant: bool },
    Internal { op: Operator, left: Box<Node>, right: Box<Node> },
}

/// Operand kind tracked while checking the shape of a tree.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Kind {
    Arithmetic,
    Relation,
}

impl Node {
    #[must_use]
    pub fn word(letters: &str) -> Node {
        Node::Leaf { word: letters.chars().collect(), is_constant: false }
    }

    #[must_use]
    pub fn constant(digits: &str) -> Node {
        Node::Leaf { word: digits.chars().collect(), is_constant: true }
    }

    #[must_use]
    pub fn binary(op: Operator, left: Node, right: Node) -> Node {
        Node::Internal { op, left: Box::new(left), right: Box::new(right) }
    }

    /// `Id` for leaves, the node's operator otherwise.
    #[must_use]
    pub fn operator(&self) -> Operator {
        match self {
            Node::Leaf { .. } => Operator::Id,
            Node::Internal { op, .. } => *op,
        }
    }

    /// Iterate over the nodes children-first (left, right, parent).
    #[must_use]
    pub fn postorder(&self) -> PostOrder<'_> {
        PostOrder { stack: vec![(self, false)] }
    }

    /// Distinct letters of the non-constant leaves, in order of first appearance.
    #[must_use]
    pub fn symbols(&self) -> Vec<char> {
        let mut seen = BTreeSet::new();
        let mut symbols = Vec::new();
        for node in self.postorder() {
            if let Node::Leaf { word, is_constant: false } = node {
                for &c in word {
                    if seen.insert(c) {
                        symbols.push(c);
                    }
                }
            }
        }
        symbols
    }

    /// Length of the longest leaf (words and constants alike).
    #[must_use]
    pub fn max_word_len(&self) -> usize {
        self.postorder()
            .filter_map(|node| match node {
                Node::Leaf { word, .. } => Some(word.len()),
                Node::Internal { .. } => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// Operators labelling internal nodes.
    #[must_use]
    pub fn operators(&self) -> BTreeSet<Operator> {
        self.postorder()
            .filter(|node| matches!(node, Node::Internal { .. }))
            .map(Node::operator)
            .collect()
    }

    /// Check leaf contents and operand kinds.
    ///
    /// Returns the number of independent sub-equations joined by conjunctions.
    ///
    /// # Errors
    /// Returns a [`ModelError`] describing the first inconsistency found.
    pub fn validate(&self) -> Result<usize, ModelError> {
        let mut stack: Vec<Kind> = Vec::new();
        let mut sub_equations = 1;

        for node in self.postorder() {
            match node {
                Node::Leaf { word, is_constant } => {
                    if *is_constant {
                        if !word.iter().all(char::is_ascii_digit) {
                            return Err(ModelError::InvalidConstant { text: word.iter().collect() });
                        }
                    } else if word.is_empty() {
                        return Err(ModelError::EmptyWord);
                    }
                    stack.push(Kind::Arithmetic);
                }
                Node::Internal { op, .. } => {
                    let (expected_kind, expected, result) = match op {
                        Operator::Id => return Err(ModelError::MisplacedIdentity),
                        Operator::And => (Kind::Relation, "relational", Kind::Relation),
                        op if op.is_relational() => (Kind::Arithmetic, "arithmetic", Kind::Relation),
                        _ => (Kind::Arithmetic, "arithmetic", Kind::Arithmetic),
                    };
                    let (Some(right), Some(left)) = (stack.pop(), stack.pop()) else {
                        return Err(ModelError::StackShape { expected: 2, actual: stack.len() });
                    };
                    if left != expected_kind || right != expected_kind {
                        return Err(ModelError::OperandKind { operator: *op, expected });
                    }
                    if *op == Operator::And {
                        sub_equations += 1;
                    }
                    stack.push(result);
                }
            }
        }

        match stack.as_slice() {
            [Kind::Relation] => Ok(sub_equations),
            [Kind::Arithmetic] => Err(ModelError::NotAnEquation),
            other => Err(ModelError::StackShape { expected: 1, actual: other.len() }),
        }
    }

    fn fmt_child(&self, f: &mut fmt::Formatter<'_>, parent: Operator, is_right: bool) -> fmt::Result {
        let op = self.operator();
        let needs_parens = match op.precedence().cmp(&parent.precedence()) {
            std::cmp::Ordering::Less => true,
            std::cmp::Ordering::Greater => false,
            std::cmp::Ordering::Equal => match parent {
                Operator::Pow => !is_right,
                Operator::Add | Operator::And => is_right && op != parent,
                p if p.is_relational() => true,
                _ => is_right,
            },
        };
        if needs_parens {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Leaf { word, .. } => word.iter().try_for_each(|c| write!(f, "{c}")),
            Node::Internal { op, left, right } => {
                left.fmt_child(f, *op, false)?;
                write!(f, "{op}")?;
                right.fmt_child(f, *op, true)
            }
        }
    }
}

/// Postorder iterator driven by an explicit stack, so deep trees never recurse.
pub struct PostOrder<'a> {
    // (node, children already pushed)
    stack: Vec<(&'a Node, bool)>,
}

impl<'a> Iterator for PostOrder<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((node, expanded)) = self.stack.pop() {
            match node {
                Node::Leaf { .. } => return Some(node),
                Node::Internal { left, right, .. } => {
                    if expanded {
                        return Some(node);
                    }
                    self.stack.push((node, true));
                    self.stack.push((right, false));
                    self.stack.push((left, false));
                }
            }
        }
        None
    }
}
