//! cbuild-lib: Core types and logic for cbuild
//!
//! This crate turns a tree of `make.yml` build descriptors into concrete
//! build commands:
//! - `descriptor`: the YAML schema and its conditional lists
//! - `interpolate`: `${name}` expansion over a variable dictionary
//! - `resolve`: the directory walk that emits compile, archive and link steps
//! - `build`: the command model and sequential execution
//! - `outputs`: `build.ninja` and `compile_commands.json` writers

pub mod build;
pub mod consts;
pub mod descriptor;
pub mod interpolate;
pub mod outputs;
pub mod platform;
pub mod resolve;
pub mod util;
