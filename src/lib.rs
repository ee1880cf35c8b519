// Pedantic lint configuration for the crate.
// Most of these are reasonable but too strict for this codebase:
// - cast_possible_truncation: Row counts and line numbers fit u32/u64 limits
// - cast_sign_loss: SQLite COUNT() is never negative in our schema
// - missing_errors_doc: Error handling is self-evident from Result types
// - missing_panics_doc: Panics are rare and documented inline
// - items_after_statements: Result structs are clearer near their usage
// - similar_names: Variable naming is contextually clear
// - option_if_let_else: if-let is often clearer
// - match_same_arms: Combined arms can reduce readability
// - single_match_else: match is clearer than if-let for pattern matching
// - unnecessary_wraps: Some functions always return Ok for API consistency
// - manual_let_else: if-let with early return is often clearer in context
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::items_after_statements,
    clippy::similar_names,
    clippy::option_if_let_else,
    clippy::match_same_arms,
    clippy::single_match_else,
    clippy::unnecessary_wraps,
    clippy::manual_let_else
)]

pub mod cli;
pub mod config;
pub mod db;
pub mod deadcode;
pub mod error;
pub mod models;
pub mod operations;
