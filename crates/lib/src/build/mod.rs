//! Build commands and their execution.
//!
//! Resolution produces a [`CommandList`]: concrete [`BuildCommand`]s in the
//! order they must run. The [`execute`] module runs them one after another.

pub mod execute;
mod types;

pub use types::*;
