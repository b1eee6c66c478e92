//! Loose boolean parsing for descriptor variables.

use tracing::warn;

const TRUTHY: &[&str] = &["t", "true", "y", "yes", "on", "1"];
const FALSY: &[&str] = &["f", "false", "n", "no", "off", "0"];

/// Parse a boolean-ish string.
///
/// Only the first word counts and case is ignored, so `"Yes please"` is
/// `Some(true)`. Returns `None` for anything else.
pub fn parse_boolean(s: &str) -> Option<bool> {
  let word = s.split_whitespace().next()?.to_ascii_lowercase();
  if TRUTHY.contains(&word.as_str()) {
    Some(true)
  } else if FALSY.contains(&word.as_str()) {
    Some(false)
  } else {
    None
  }
}

/// Like [`parse_boolean`], but ambiguous input is `false` (with a warning).
pub fn to_boolean(s: &str) -> bool {
  parse_boolean(s).unwrap_or_else(|| {
    warn!(value = %s, "ambiguous boolean, treating as false");
    false
  })
}
