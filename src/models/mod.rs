//! Typed result shapes shared across query operations.

pub mod symbol;

pub use symbol::{CallSite, Dependency, Symbol};
