//! The per-directory `make.yml` descriptor.
//!
//! Every rule collection in a descriptor is conditional: entries carry an
//! optional `target:` and `type:` (platform) selector and only apply when
//! both match the current resolution. [`StringList`] entries additionally key
//! their items by build variant, so a single entry can hold `list:` items
//! (always used) next to `debug:` or `release:` ones.
//!
//! # Submodules
//!
//! - [`load`] - reading and parsing descriptor files

pub mod load;
mod types;

pub use load::{DescriptorError, load_descriptor};
pub use types::*;
