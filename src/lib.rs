// Reusable library API for the CLI and the bench runner
pub mod bignum;
pub mod config;
pub mod digits;
pub mod engine;
pub mod errors;
pub mod evaluate;
pub mod log;
pub mod model;
pub mod occurrence;
pub mod operator;
pub mod parser;
pub mod solution;
pub mod solver;
pub mod strategy;
pub mod tree;
pub mod word;
