/* src/pipeline/src/entry.rs */

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::errors::PipelineError;

/// One independently compiled crate, emitted as `<name>.js` + `<name>_bg.wasm`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
  pub name: String,
  pub manifest: PathBuf,
}

impl Entry {
  pub fn new(name: impl Into<String>, manifest: impl Into<PathBuf>) -> Self {
    Self { name: name.into(), manifest: manifest.into() }
  }

  /// Directory holding the crate's `Cargo.toml`.
  pub fn crate_dir(&self) -> &Path {
    match self.manifest.parent() {
      Some(p) if !p.as_os_str().is_empty() => p,
      _ => Path::new("."),
    }
  }
}

/// Ordered, read-only bundle name -> crate manifest mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EntryMap {
  entries: Vec<Entry>,
}

impl EntryMap {
  pub fn new(entries: Vec<Entry>) -> Result<Self, PipelineError> {
    if entries.is_empty() {
      return Err(PipelineError::configuration("at least one entry is required"));
    }

    for entry in &entries {
      validate_name(&entry.name)?;
    }

    let mut seen = HashSet::new();
    let mut duplicates: Vec<&str> = Vec::new();
    for entry in &entries {
      if !seen.insert(entry.name.as_str()) && !duplicates.contains(&entry.name.as_str()) {
        duplicates.push(&entry.name);
      }
    }
    if !duplicates.is_empty() {
      return Err(PipelineError::configuration(format!(
        "duplicate entry name(s): {}",
        duplicates.join(", ")
      )));
    }

    Ok(Self { entries })
  }

  /// Root crate plus two worker crates.
  pub fn default_layout() -> Self {
    Self {
      entries: vec![
        Entry::new("index", "./Cargo.toml"),
        Entry::new("thread1", "./src/thread1/Cargo.toml"),
        Entry::new("thread2", "./src/thread2/Cargo.toml"),
      ],
    }
  }

  pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
    self.entries.iter()
  }

  pub fn get(&self, name: &str) -> Option<&Entry> {
    self.entries.iter().find(|e| e.name == name)
  }

  pub fn names(&self) -> Vec<&str> {
    self.entries.iter().map(|e| e.name.as_str()).collect()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

impl<'a> IntoIterator for &'a EntryMap {
  type Item = &'a Entry;
  type IntoIter = std::slice::Iter<'a, Entry>;

  fn into_iter(self) -> Self::IntoIter {
    self.entries.iter()
  }
}

// Names become file stems in the shared output directory.
fn validate_name(name: &str) -> Result<(), PipelineError> {
  if name.is_empty() {
    return Err(PipelineError::configuration("entry name must not be empty"));
  }
  if name.starts_with('.') || name.contains(['/', '\\']) {
    return Err(PipelineError::configuration(format!(
      "entry name \"{name}\" must not contain path separators or start with '.'"
    )));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn preserves_insertion_order() {
    let map = EntryMap::new(vec![
      Entry::new("b", "b/Cargo.toml"),
      Entry::new("a", "a/Cargo.toml"),
    ])
    .unwrap();
    assert_eq!(map.names(), vec!["b", "a"]);
    assert_eq!(map.get("a").unwrap().manifest, PathBuf::from("a/Cargo.toml"));
  }

  #[test]
  fn rejects_duplicate_names() {
    let err = EntryMap::new(vec![
      Entry::new("index", "./Cargo.toml"),
      Entry::new("worker", "./worker/Cargo.toml"),
      Entry::new("index", "./other/Cargo.toml"),
    ])
    .unwrap_err();
    assert!(matches!(err, PipelineError::Configuration(_)));
    assert!(err.to_string().contains("duplicate entry name(s): index"));
  }

  #[test]
  fn lists_each_duplicate_once() {
    let err = EntryMap::new(vec![
      Entry::new("a", "1"),
      Entry::new("a", "2"),
      Entry::new("a", "3"),
      Entry::new("b", "4"),
      Entry::new("b", "5"),
    ])
    .unwrap_err();
    assert!(err.to_string().ends_with("duplicate entry name(s): a, b"));
  }

  #[test]
  fn rejects_empty_map() {
    assert!(EntryMap::new(vec![]).is_err());
  }

  #[test]
  fn rejects_path_like_names() {
    assert!(EntryMap::new(vec![Entry::new("../x", "Cargo.toml")]).is_err());
    assert!(EntryMap::new(vec![Entry::new("a/b", "Cargo.toml")]).is_err());
    assert!(EntryMap::new(vec![Entry::new("", "Cargo.toml")]).is_err());
  }

  #[test]
  fn default_layout_has_three_entries() {
    let map = EntryMap::default_layout();
    assert_eq!(map.names(), vec!["index", "thread1", "thread2"]);
    assert_eq!(map.get("thread2").unwrap().crate_dir(), Path::new("./src/thread2"));
  }

  #[test]
  fn crate_dir_of_bare_manifest() {
    assert_eq!(Entry::new("index", "Cargo.toml").crate_dir(), Path::new("."));
  }
}
