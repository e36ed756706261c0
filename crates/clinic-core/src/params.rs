//! Named string parameters of one write request.
//!
//! The transport layer hands every write operation a flat bag of
//! `name → value` strings; validation of individual records reads from it
//! through the accessors here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, String>);

impl Params {
  pub fn new() -> Self { Self::default() }

  /// Builder-style insert.
  pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.0.insert(name.into(), value.into());
    self
  }

  pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
    self.0.insert(name.into(), value.into());
  }

  /// A parameter that must be present and non-empty.
  pub fn required(&self, name: &'static str) -> Result<&str> {
    self.optional(name).ok_or(Error::missing(name))
  }

  /// `None` when the parameter is absent or empty.
  pub fn optional(&self, name: &str) -> Option<&str> {
    self.0.get(name).map(String::as_str).filter(|v| !v.is_empty())
  }

  /// Free text; absent reads as the empty string.
  pub fn text(&self, name: &str) -> &str {
    self.0.get(name).map(String::as_str).unwrap_or_default()
  }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
  }
}

impl Extend<(String, String)> for Params {
  fn extend<I: IntoIterator<Item = (String, String)>>(&mut self, iter: I) {
    self.0.extend(iter);
  }
}

impl IntoIterator for Params {
  type Item = (String, String);
  type IntoIter = std::collections::btree_map::IntoIter<String, String>;

  fn into_iter(self) -> Self::IntoIter { self.0.into_iter() }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_values_count_as_missing() {
    let p = Params::new().with("name", "").with("address", "Main street");
    assert!(p.optional("name").is_none());
    assert!(matches!(
      p.required("name"),
      Err(Error::Validation { field: "name", .. })
    ));
    assert_eq!(p.required("address").unwrap(), "Main street");
    assert_eq!(p.text("phone"), "");
  }

  #[test]
  fn later_values_override() {
    let mut p: Params = [("a", "1")].into_iter().collect();
    p.extend([("a".to_owned(), "2".to_owned())]);
    assert_eq!(p.text("a"), "2");
  }
}
