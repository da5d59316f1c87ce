//! Property-based tests: the solver against a brute-force enumerator
//!
//! Checks, on small random equations, that:
//! - every model returns exactly the assignments the brute force accepts
//! - the fixed-precision and bignum models agree on additive equations

use std::collections::BTreeSet;

use cryptarith::config::{ModelStrategy, SolverConfig, WordEncoding};
use cryptarith::evaluate;
use cryptarith::occurrence::OccurrenceBounds;
use cryptarith::operator::Operator;
use cryptarith::solution::Solution;
use cryptarith::solver;
use cryptarith::tree::Node;
use proptest::prelude::*;

const LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];

/// Every assignment of the tree's letters that satisfies it under the
/// configured occurrence and leading-zero rules.
fn brute_force(tree: &Node, config: &SolverConfig) -> BTreeSet<Solution> {
    let letters = tree.symbols();
    let bounds = OccurrenceBounds::compute(letters.len(), config.base, config.relax_min_occurrence, config.relax_max_occurrence);
    let leading: Vec<char> = tree
        .postorder()
        .filter_map(|node| match node {
            Node::Leaf { word, is_constant: false } => word.first().copied(),
            _ => None,
        })
        .collect();

    let mut found = BTreeSet::new();
    let mut digits = vec![0u32; letters.len()];
    loop {
        let mut counts = vec![0u64; config.base as usize];
        for &d in &digits {
            counts[d as usize] += 1;
        }
        let solution: Solution = letters.iter().copied().zip(digits.iter().copied()).collect();
        let leading_ok = config.allow_leading_zeros || leading.iter().all(|&c| solution.get(c) != Some(0));
        if bounds.admits(&counts) && leading_ok && evaluate::satisfies(tree, &solution, config.base) {
            found.insert(solution);
        }

        // odometer step
        let mut i = 0;
        while i < digits.len() {
            digits[i] += 1;
            if digits[i] < config.base {
                break;
            }
            digits[i] = 0;
            i += 1;
        }
        if i == digits.len() {
            return found;
        }
    }
}

fn solved(tree: &Node, config: &SolverConfig) -> BTreeSet<Solution> {
    let result = solver::solve_tree(tree, config).unwrap();
    assert_eq!(result.status, solver::SolveStatus::SearchExhausted);
    result.solutions.into_iter().collect()
}

fn word() -> impl Strategy<Value = Node> {
    prop::collection::vec(prop::sample::select(LETTERS.to_vec()), 1..=2)
        .prop_map(|letters| Node::word(&letters.into_iter().collect::<String>()))
}

fn sum_word() -> impl Strategy<Value = Node> {
    prop::collection::vec(prop::sample::select(LETTERS.to_vec()), 1..=3)
        .prop_map(|letters| Node::word(&letters.into_iter().collect::<String>()))
}

/// Words stay at two letters and bases at five, so powers have small exponents.
fn arith_op() -> impl Strategy<Value = Operator> {
    prop::sample::select(vec![Operator::Add, Operator::Sub, Operator::Mul, Operator::Div, Operator::Mod, Operator::Pow])
}

fn rel_op() -> impl Strategy<Value = Operator> {
    prop::sample::select(vec![Operator::Eq, Operator::Neq, Operator::Lt, Operator::Gt, Operator::Leq, Operator::Geq])
}

/// `(w op w) rel w`
fn relation() -> impl Strategy<Value = Node> {
    (word(), arith_op(), word(), rel_op(), word())
        .prop_map(|(a, op, b, rel, c)| Node::binary(rel, Node::binary(op, a, b), c))
}

/// One or two relations joined by a conjunction
fn equation() -> impl Strategy<Value = Node> {
    prop_oneof![
        relation(),
        (relation(), relation()).prop_map(|(l, r)| Node::binary(Operator::And, l, r)),
    ]
}

/// `w + w = w`, optionally conjoined with a second sum
fn additive_equation() -> impl Strategy<Value = Node> {
    let sum = (sum_word(), sum_word(), sum_word())
        .prop_map(|(a, b, c)| Node::binary(Operator::Eq, Node::binary(Operator::Add, a, b), c))
        .boxed();
    prop_oneof![
        sum.clone(),
        (sum.clone(), sum).prop_map(|(l, r)| Node::binary(Operator::And, l, r)),
    ]
}

fn config() -> impl Strategy<Value = SolverConfig> {
    (2u32..=5, any::<bool>(), 0i64..=1, 0i64..=1).prop_map(|(base, zeros, relax_min, relax_max)| {
        SolverConfig::default()
            .with_base(base)
            .with_leading_zeros(zeros)
            .with_relax(relax_min, relax_max)
            .unwrap()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn fixed_precision_matches_brute_force(tree in equation(), config in config(), horner in any::<bool>()) {
        let encoding = if horner { WordEncoding::Horner } else { WordEncoding::Positional };
        let config = config.with_strategy(ModelStrategy::FixedPrecision).with_word_encoding(encoding);
        prop_assert_eq!(solved(&tree, &config), brute_force(&tree, &config), "{}", tree);
    }

    #[test]
    fn bignum_matches_fixed_precision(tree in additive_equation(), config in config()) {
        let expected = brute_force(&tree, &config);
        let fixed = solved(&tree, &config.clone().with_strategy(ModelStrategy::FixedPrecision));
        let bignum = solved(&tree, &config.with_strategy(ModelStrategy::Bignum));
        prop_assert_eq!(&fixed, &expected, "{}", tree);
        prop_assert_eq!(&bignum, &expected, "{}", tree);
    }

    #[test]
    fn display_round_trips_through_parser(tree in equation()) {
        let reparsed: Node = tree.to_string().parse().unwrap();
        prop_assert_eq!(reparsed, tree);
    }
}
