use std::collections::BTreeSet;
use std::fmt;

use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An opaque platform-type token such as `LINUX` or `WIN32`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlatformId(pub String);

impl PlatformId {
  pub fn new(id: impl Into<String>) -> Self {
    Self(id.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  /// Returns true for the Windows-like family (`WIN32`, `WIN64`, `windows`, ...).
  ///
  /// Archives on these platforms are named `<name>.lib` instead of `lib<name>.a`.
  pub fn is_windows_family(&self) -> bool {
    let upper = self.0.to_ascii_uppercase();
    upper.starts_with("WIN")
  }
}

impl fmt::Display for PlatformId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl AsRef<str> for PlatformId {
  fn as_ref(&self) -> &str {
    &self.0
  }
}

impl From<&str> for PlatformId {
  fn from(s: &str) -> Self {
    Self(s.to_string())
  }
}

impl From<String> for PlatformId {
  fn from(s: String) -> Self {
    Self(s)
  }
}

/// A set of [`PlatformId`]s.
///
/// Equality is set equality. Serialization is always the ascending sorted
/// sequence of members (`[]` when empty); deserialization accepts a single
/// scalar, a sequence of scalars, or null.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlatformIdSet(BTreeSet<PlatformId>);

impl PlatformIdSet {
  pub fn new() -> Self {
    Self::default()
  }

  /// Insert `id`. Inserting an existing member is a no-op.
  pub fn add(&mut self, id: impl Into<PlatformId>) -> &mut Self {
    self.0.insert(id.into());
    self
  }

  pub fn contains(&self, id: impl AsRef<str>) -> bool {
    // BTreeSet<PlatformId> can't be queried with &str directly
    self.0.iter().any(|p| p.as_str() == id.as_ref())
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &PlatformId> {
    self.0.iter()
  }

  /// Members in ascending order.
  pub fn to_vec(&self) -> Vec<PlatformId> {
    self.0.iter().cloned().collect()
  }
}

impl<T: Into<PlatformId>> FromIterator<T> for PlatformIdSet {
  fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
    Self(iter.into_iter().map(Into::into).collect())
  }
}

impl Serialize for PlatformIdSet {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(self.0.iter().map(PlatformId::as_str))
  }
}

impl<'de> Deserialize<'de> for PlatformIdSet {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    deserializer.deserialize_any(PlatformIdSetVisitor)
  }
}

struct PlatformIdSetVisitor;

impl<'de> Visitor<'de> for PlatformIdSetVisitor {
  type Value = PlatformIdSet;

  fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("a platform id or a sequence of platform ids")
  }

  fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
    let mut set = PlatformIdSet::new();
    set.add(v);
    Ok(set)
  }

  fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
    let mut set = PlatformIdSet::new();
    set.add(v);
    Ok(set)
  }

  fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
    self.visit_string(v.to_string())
  }

  fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
    self.visit_string(v.to_string())
  }

  fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
    Ok(PlatformIdSet::new())
  }

  fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
    Ok(PlatformIdSet::new())
  }

  fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
    let mut set = PlatformIdSet::new();
    while let Some(PlatformToken(id)) = seq.next_element()? {
      set.add(id);
    }
    Ok(set)
  }
}

/// One sequence element. Numeric ids such as `3` are kept as their text.
struct PlatformToken(String);

impl<'de> Deserialize<'de> for PlatformToken {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    deserializer.deserialize_any(PlatformTokenVisitor)
  }
}

struct PlatformTokenVisitor;

impl<'de> Visitor<'de> for PlatformTokenVisitor {
  type Value = PlatformToken;

  fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("a platform id")
  }

  fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
    Ok(PlatformToken(v.to_string()))
  }

  fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
    Ok(PlatformToken(v))
  }

  fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
    Ok(PlatformToken(v.to_string()))
  }

  fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
    Ok(PlatformToken(v.to_string()))
  }
}
