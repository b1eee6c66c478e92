//! Generated files: `build.ninja`, `compile_commands.json` and `.vcxproj`.
//!
//! All are written through [`TransientOutput`] so an interrupted run never
//! leaves a truncated file behind.

pub mod compiledb;
pub mod msbuild;
pub mod ninja;
pub mod transient;

pub use compiledb::{CompileDbError, CompileDbItem, compile_db_items, create_compile_db_file, write_compile_db};
pub use msbuild::{MsBuildError, VcxProject, VcxprojOptions, create_vcxproj_file, vcxproj_from_commands, write_vcxproj};
pub use ninja::{NinjaError, create_ninja_file, write_ninja};
pub use transient::{TransientError, TransientOutput};
