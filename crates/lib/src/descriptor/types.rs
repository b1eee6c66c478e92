use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use thiserror::Error;

use crate::platform::{PlatformId, PlatformIdSet};

/// Build variant keys recognized inside a [`StringList`].
///
/// `List` is the unconditional bucket; the others are the selectable variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildType {
  List,
  #[default]
  Debug,
  Release,
  Develop,
  DevelopRelease,
  Product,
}

impl BuildType {
  pub const ALL: [BuildType; 6] = [
    BuildType::List,
    BuildType::Debug,
    BuildType::Release,
    BuildType::Develop,
    BuildType::DevelopRelease,
    BuildType::Product,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      BuildType::List => "list",
      BuildType::Debug => "debug",
      BuildType::Release => "release",
      BuildType::Develop => "develop",
      BuildType::DevelopRelease => "develop-release",
      BuildType::Product => "product",
    }
  }

  /// Directory component used under `<output>/<platform>/`.
  pub fn dir_name(&self) -> &'static str {
    match self {
      BuildType::List | BuildType::Debug => "Debug",
      BuildType::Release => "Release",
      BuildType::Develop => "Develop",
      BuildType::DevelopRelease => "DevelopRelease",
      BuildType::Product => "Product",
    }
  }
}

impl AsRef<str> for BuildType {
  fn as_ref(&self) -> &str {
    self.as_str()
  }
}

impl fmt::Display for BuildType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown build type \"{0}\"")]
pub struct ParseBuildTypeError(pub String);

impl FromStr for BuildType {
  type Err = ParseBuildTypeError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let normalized = s.to_ascii_lowercase().replace('_', "-");
    BuildType::ALL
      .into_iter()
      .find(|t| t.as_str() == normalized)
      .ok_or_else(|| ParseBuildTypeError(s.to_string()))
  }
}

/// A conditional bag of item lists.
///
/// In YAML, `type:` and `target:` are the selectors and every other key is an
/// item list, normally one of the [`BuildType`] keys:
///
/// ```yaml
/// - type: [LINUX, Mac]
///   target: foo
///   list: [common.cpp]
///   debug: [debug_only.cpp]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StringList {
  pub target: Option<String>,
  pub platforms: Option<PlatformIdSet>,
  pub items: BTreeMap<String, Vec<String>>,
}

impl StringList {
  /// True when the target selector is empty or equal to `target` and the
  /// platform selector is empty or contains `platform`.
  pub fn matches(&self, target: &str, platform: &str) -> bool {
    let target_ok = match self.target.as_deref() {
      None | Some("") => true,
      Some(t) => t == target,
    };
    target_ok && self.matches_platform(platform)
  }

  pub fn matches_platform(&self, platform: &str) -> bool {
    self.platforms.as_ref().is_none_or(|p| p.contains(platform))
  }

  /// Items stored under `key`. `BuildType::Debug` and `"debug"` are the same key.
  pub fn items(&self, key: impl AsRef<str>) -> Option<&[String]> {
    self.items.get(key.as_ref()).map(Vec::as_slice)
  }

  pub fn items_mut(&mut self, key: impl AsRef<str>) -> Option<&mut Vec<String>> {
    self.items.get_mut(key.as_ref())
  }

  /// `list` items followed by the `variant` items, or nothing when the
  /// selectors don't match.
  pub fn matched_items(&self, target: &str, platform: &str, variant: BuildType) -> Vec<String> {
    if !self.matches(target, platform) {
      return Vec::new();
    }
    let mut result: Vec<String> = self.items(BuildType::List).map(<[String]>::to_vec).unwrap_or_default();
    if variant != BuildType::List {
      if let Some(extra) = self.items(variant) {
        result.extend_from_slice(extra);
      }
    }
    result
  }
}

/// Matched items of every entry in `lists`, in document order.
pub fn select_items(lists: &[StringList], target: &str, platform: &str, variant: BuildType) -> Vec<String> {
  lists
    .iter()
    .flat_map(|l| l.matched_items(target, platform, variant))
    .collect()
}

impl<'de> Deserialize<'de> for StringList {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
    let mut list = StringList::default();

    for (key, value) in raw {
      match key.as_str() {
        "type" => {
          if !value.is_null() {
            list.platforms = Some(PlatformIdSet::deserialize(value).map_err(de::Error::custom)?);
          }
        }
        "target" => list.target = scalar_to_string(&value),
        _ => {
          let items = value_to_items(&key, value).map_err(de::Error::custom)?;
          list.items.insert(key, items);
        }
      }
    }
    Ok(list)
  }
}

fn scalar_to_string(value: &Value) -> Option<String> {
  match value {
    Value::String(s) => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    Value::Bool(b) => Some(b.to_string()),
    Value::Tagged(t) => scalar_to_string(&t.value),
    _ => None,
  }
}

fn value_to_items(key: &str, value: Value) -> Result<Vec<String>, String> {
  match value {
    Value::Null => Ok(Vec::new()),
    Value::Sequence(seq) => seq
      .iter()
      .map(|v| scalar_to_string(v).ok_or_else(|| format!("`{key}` items must be scalars")))
      .collect(),
    Value::Tagged(t) => value_to_items(key, t.value),
    other => scalar_to_string(&other)
      .map(|s| vec![s])
      .ok_or_else(|| format!("`{key}` must be a scalar or a sequence")),
  }
}

/// Accepts any YAML scalar as a string (`value: 1` and `value: "1"` are equal).
fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
  let value = Value::deserialize(deserializer)?;
  if value.is_null() {
    return Ok(String::new());
  }
  scalar_to_string(&value).ok_or_else(|| de::Error::custom("expected a scalar value"))
}

/// A named value, applied when its selectors match.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct Variable {
  pub name: String,
  #[serde(deserialize_with = "scalar_string")]
  pub value: String,
  #[serde(rename = "type")]
  pub platforms: Option<PlatformIdSet>,
  pub target: String,
  pub build: String,
}

impl Variable {
  pub fn matches_platform(&self, platform: &str) -> bool {
    self.platforms.as_ref().is_none_or(|p| p.contains(platform))
  }

  /// The value when the platform, target and build filters all accept.
  ///
  /// The build filter is case-insensitive and spells `develop-release` with
  /// either separator.
  pub fn value_for(&self, target: &str, platform: &str, variant: BuildType) -> Option<&str> {
    if !self.matches_platform(platform) {
      return None;
    }
    if !self.target.is_empty() && self.target != target {
      return None;
    }
    if !self.build.is_empty() && variant != BuildType::List {
      let build = self.build.to_ascii_lowercase().replace('_', "-");
      if build != variant.as_str() {
        return None;
      }
    }
    Some(&self.value)
  }
}

/// What a directory's active target produces.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetKind {
  Library,
  Execute,
  Convert,
  Passthrough,
  Test,
  /// Anything else, including an empty type. Contributes no terminal step.
  Other(String),
}

impl Default for TargetKind {
  fn default() -> Self {
    TargetKind::Other(String::new())
  }
}

impl From<String> for TargetKind {
  fn from(s: String) -> Self {
    match s.as_str() {
      "library" => TargetKind::Library,
      "execute" => TargetKind::Execute,
      "convert" => TargetKind::Convert,
      "passthrough" => TargetKind::Passthrough,
      "test" => TargetKind::Test,
      _ => TargetKind::Other(s),
    }
  }
}

impl<'de> Deserialize<'de> for TargetKind {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    scalar_string(deserializer).map(TargetKind::from)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct Packager {
  pub target: String,
  pub option: String,
}

/// One buildable artifact of a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct Target {
  pub name: String,
  #[serde(rename = "type")]
  pub kind: TargetKind,
  pub by_target: String,
  pub packager: Packager,
}

/// A `prebuild` or `postbuild` rule.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct Build {
  pub name: String,
  pub command: String,
  pub target: String,
  #[serde(rename = "type")]
  pub platform: Option<PlatformId>,
  #[serde(deserialize_with = "scalar_string")]
  pub deps: String,
  pub source: Vec<StringList>,
}

impl Build {
  pub fn matches(&self, target: &str, platform: &str) -> bool {
    (self.target.is_empty() || self.target == target) && self.matches_platform(platform)
  }

  pub fn matches_platform(&self, platform: &str) -> bool {
    self
      .platform
      .as_ref()
      .is_none_or(|p| p.is_empty() || p.as_str() == platform)
  }
}

/// A per-extension compile rule for non-default source kinds.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct Other {
  pub ext: String,
  pub command: String,
  pub description: String,
  pub need_depend: bool,
  #[serde(rename = "type")]
  pub platforms: Option<PlatformIdSet>,
  pub option: Vec<StringList>,
}

impl Other {
  pub fn matches_platform(&self, platform: &str) -> bool {
    self.platforms.as_ref().is_none_or(|p| p.contains(platform))
  }
}

/// A parsed `make.yml`. Every collection defaults to empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct Descriptor {
  pub target: Vec<Target>,
  pub include: Vec<StringList>,
  pub variable: Vec<Variable>,
  pub define: Vec<StringList>,
  pub option: Vec<StringList>,
  pub archive_option: Vec<StringList>,
  pub convert_option: Vec<StringList>,
  pub link_option: Vec<StringList>,
  pub link_depend: Vec<StringList>,
  pub libraries: Vec<StringList>,
  pub prebuild: Vec<Build>,
  pub postbuild: Vec<Build>,
  pub source: Vec<StringList>,
  #[serde(rename = "header")]
  pub headers: Vec<StringList>,
  pub convert_list: Vec<StringList>,
  #[serde(rename = "subdir")]
  pub subdirs: Vec<StringList>,
  pub tests: Vec<StringList>,
  pub other: Vec<Other>,
  pub subninja: Vec<StringList>,
}

impl Descriptor {
  /// Value of the first `default_type` variable, ignoring its selectors.
  pub fn default_type(&self) -> Option<&str> {
    self
      .variable
      .iter()
      .find(|v| v.name == crate::consts::vars::DEFAULT_TYPE)
      .map(|v| v.value.as_str())
  }
}
