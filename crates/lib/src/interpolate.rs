//! `${name}` expansion against a flat string dictionary.
//!
//! Grammar:
//!
//! ```text
//! str := (literal | "${" name "}" | "$$")*
//! ```
//!
//! - `${name}` expands to the dictionary value of `name`. Values may contain
//!   further references, which are expanded depth-first, left to right.
//! - `$$` produces a literal `$`.
//! - A trailing lone `$` is kept as is.
//! - Any other `$x` is passed through by [`interpolate`] (so ninja-style
//!   tokens like `$out` survive) and rejected by [`strict_interpolate`].
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeMap;
//! use cbuild_lib::interpolate::interpolate;
//!
//! let mut vars = BTreeMap::new();
//! vars.insert("cc".to_string(), "clang".to_string());
//! vars.insert("cxx".to_string(), "${cc}++".to_string());
//!
//! assert_eq!(interpolate("${cxx} -o $out", &vars).unwrap(), "clang++ -o $out");
//! ```

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use thiserror::Error;

use crate::consts::RECURSION_LIMIT;

/// Errors produced while expanding references.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterpolateError {
  /// `${` without a closing `}`. Carries the unterminated fragment.
  #[error("unmatched '{{' found after \"{0}\"")]
  UnmatchedBrace(String),

  /// Strict mode only: the name is not in the dictionary.
  #[error("unknown reference ${{{0}}} found")]
  UnknownReference(String),

  /// Strict mode only: a `$` that starts neither `${` nor `$$`.
  #[error("invalid '$' sequence \"{0}\" found")]
  InvalidDollarSequence(String),

  /// A reference needs its own value, or nesting got too deep.
  #[error("recursion limit exceeded")]
  RecursionLimitExceeded,
}

/// Source of values for `${name}` references.
pub trait Dictionary {
  fn lookup(&self, name: &str) -> Option<&str>;
}

impl<S: BuildHasher> Dictionary for HashMap<String, String, S> {
  fn lookup(&self, name: &str) -> Option<&str> {
    self.get(name).map(String::as_str)
  }
}

impl Dictionary for BTreeMap<String, String> {
  fn lookup(&self, name: &str) -> Option<&str> {
    self.get(name).map(String::as_str)
  }
}

/// Expand `input`, treating unknown references as empty strings.
pub fn interpolate<D: Dictionary + ?Sized>(input: &str, dict: &D) -> Result<String, InterpolateError> {
  Expander::new(dict, false).run(input)
}

/// Expand `input`, failing on unknown references and stray `$`.
pub fn strict_interpolate<D: Dictionary + ?Sized>(input: &str, dict: &D) -> Result<String, InterpolateError> {
  Expander::new(dict, true).run(input)
}

struct Expander<'a, D: ?Sized> {
  dict: &'a D,
  strict: bool,
  // names currently being expanded, outermost first
  stack: Vec<String>,
}

impl<'a, D: Dictionary + ?Sized> Expander<'a, D> {
  fn new(dict: &'a D, strict: bool) -> Self {
    Self {
      dict,
      strict,
      stack: Vec::new(),
    }
  }

  fn run(mut self, input: &str) -> Result<String, InterpolateError> {
    let mut out = String::with_capacity(input.len());
    self.expand(input, &mut out)?;
    Ok(out)
  }

  fn expand(&mut self, input: &str, out: &mut String) -> Result<(), InterpolateError> {
    if self.stack.len() >= RECURSION_LIMIT {
      return Err(InterpolateError::RecursionLimitExceeded);
    }

    let mut rest = input;
    while let Some(idx) = rest.find('$') {
      out.push_str(&rest[..idx]);
      let after = &rest[idx + 1..];

      match after.chars().next() {
        None => {
          out.push('$');
          return Ok(());
        }
        Some('$') => {
          out.push('$');
          rest = &after[1..];
        }
        Some('{') => {
          let close = after
            .find('}')
            .ok_or_else(|| InterpolateError::UnmatchedBrace(after.to_string()))?;
          let name = &after[1..close];
          self.reference(name, out)?;
          rest = &after[close + 1..];
        }
        Some(_) if self.strict => {
          return Err(InterpolateError::InvalidDollarSequence(rest[idx..].to_string()));
        }
        Some(_) => {
          out.push('$');
          rest = after;
        }
      }
    }

    out.push_str(rest);
    Ok(())
  }

  fn reference(&mut self, name: &str, out: &mut String) -> Result<(), InterpolateError> {
    let dict = self.dict;
    let Some(value) = dict.lookup(name) else {
      if self.strict {
        return Err(InterpolateError::UnknownReference(name.to_string()));
      }
      return Ok(());
    };

    if self.stack.iter().any(|n| n == name) {
      return Err(InterpolateError::RecursionLimitExceeded);
    }
    self.stack.push(name.to_string());
    self.expand(value, out)?;
    self.stack.pop();
    Ok(())
  }
}
