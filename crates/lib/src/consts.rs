//! Names and limits shared across the crate.

/// Descriptor file read from every directory of the tree.
pub const DESCRIPTOR_FILENAME: &str = "make.yml";

/// Directory (under each output directory) holding object and dependency files.
pub const OBJECT_DIR: &str = ".objs";

/// Header that, when present in a source directory, is precompiled for that directory.
pub const PCH_SOURCE: &str = "00-common-prefix.hpp";

/// Maximum nesting depth while expanding `${name}` references.
pub const RECURSION_LIMIT: usize = 100;

/// Default command-line option prefix (overridden by the `option_prefix` variable).
pub const DEFAULT_OPTION_PREFIX: &str = "-";

/// Platform type meaning "use the root descriptor's `default_type`".
pub const DEFAULT_PLATFORM: &str = "default";

/// Well-known descriptor variables.
pub mod vars {
  pub const OPTION_PREFIX: &str = "option_prefix";
  pub const COMPILER: &str = "compiler";
  pub const ARCHIVER: &str = "archiver";
  pub const LINKER: &str = "linker";
  pub const CONVERTER: &str = "converter";
  pub const PACKAGER: &str = "packager";
  pub const EXECUTE_SUFFIX: &str = "execute_suffix";
  pub const DEFAULT_TYPE: &str = "default_type";
  pub const ENABLE_RESPONSE: &str = "enable_response";
  pub const RESPONSE_NEWLINE: &str = "response_newline";
  pub const GROUP_ARCHIVES: &str = "group_archives";
}
