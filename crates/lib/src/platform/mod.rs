//! Platform identifiers and platform filters.
//!
//! A platform here is the build *type* selected on the command line (e.g.
//! `LINUX`, `WIN32`, `PS4`), not the host the tool runs on. Descriptor entries
//! restrict themselves to platforms with a `type:` key holding one id or a
//! list of ids.

mod id;
pub mod launcher;

pub use id::{PlatformId, PlatformIdSet};
