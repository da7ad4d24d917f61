//! A compiler for dependent pattern matches.
//!
//! Lists of clauses over a sequence of targets are compiled into
//! applications of the eliminators of inductive types, decision trees over
//! literal values, and splits on array sizes. Along the way the compiler
//! reports the values that no clause covers and the clauses that are never
//! used.

// Supporting modules
pub mod env;
pub mod source;
pub mod symbol;

// Intermediate languages
pub mod core;
pub mod surface;

// Compilation
pub mod matcher;
pub mod meta;
pub mod tactic;

// Top level API
mod driver;

pub use crate::driver::{CompiledMatch, Driver, Status};

pub const BUG_REPORT_URL: &str = concat!(env!("CARGO_PKG_REPOSITORY"), "/issues/new");
