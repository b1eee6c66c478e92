//! Shared utilities.
//!
//! Lexical path handling and loose boolean parsing used by the resolver and
//! the output writers.

pub mod boolean;
pub mod paths;

#[cfg(test)]
pub mod testutil;
