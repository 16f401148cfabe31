use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{AssetError, Result};

/// One built asset as recorded in the Vite manifest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
  /// Emitted, fingerprinted file path.
  pub file: String,
  /// Original source path.
  pub src: String,
  /// Whether the asset is a top-level application entry point.
  pub is_entry: bool,
  /// Direct CSS dependencies.
  #[serde(default)]
  pub css: Vec<String>,
  /// Direct imports, each a key of the same manifest.
  #[serde(default)]
  pub imports: Vec<String>,
}

/// Parsed manifest keyed by logical source path, in document order.
#[derive(Debug, Clone)]
pub struct ManifestGraph {
  source: PathBuf,
  entries: Vec<(String, ManifestEntry)>,
  index: HashMap<String, usize>,
}

impl ManifestGraph {
  /// Parse and validate a manifest document read from `source`.
  pub fn parse(source: &Path, content: &str) -> Result<Self> {
    let parse_error = |message: String| AssetError::ManifestParse {
      path: source.to_path_buf(),
      message,
    };

    let document: serde_json::Map<String, serde_json::Value> =
      serde_json::from_str(content).map_err(|err| parse_error(err.to_string()))?;

    let mut entries = Vec::with_capacity(document.len());
    for (key, value) in document {
      let entry: ManifestEntry = serde_json::from_value(value)
        .map_err(|err| parse_error(format!("entry \"{key}\": {err}")))?;
      entries.push((key, entry));
    }

    Self::from_entries(source, entries)
  }

  /// Build a graph from already parsed entries, checking every import resolves.
  pub fn from_entries(
    source: &Path,
    entries: impl IntoIterator<Item = (String, ManifestEntry)>,
  ) -> Result<Self> {
    let entries: Vec<(String, ManifestEntry)> = entries.into_iter().collect();
    let index: HashMap<String, usize> = entries
      .iter()
      .enumerate()
      .map(|(position, (key, _))| (key.clone(), position))
      .collect();

    for (key, entry) in &entries {
      if let Some(missing) = entry.imports.iter().find(|import| !index.contains_key(*import)) {
        return Err(AssetError::ManifestParse {
          path: source.to_path_buf(),
          message: format!("entry \"{key}\" imports unknown entry \"{missing}\""),
        });
      }
    }

    Ok(Self {
      source: source.to_path_buf(),
      entries,
      index,
    })
  }

  /// Location the manifest was read from.
  pub fn source(&self) -> &Path {
    &self.source
  }

  /// Entry stored under `key`, if any.
  pub fn get(&self, key: &str) -> Option<&ManifestEntry> {
    self.index.get(key).map(|&position| &self.entries[position].1)
  }

  /// Look up `key`, failing with [`AssetError::AssetNotFound`].
  pub fn entry(&self, key: &str) -> Result<&ManifestEntry> {
    self.lookup(key).map(|(_, entry)| entry)
  }

  /// Stored key and entry for `key`.
  pub fn lookup(&self, key: &str) -> Result<(&str, &ManifestEntry)> {
    self
      .index
      .get(key)
      .map(|&position| {
        let (stored, entry) = &self.entries[position];
        (stored.as_str(), entry)
      })
      .ok_or_else(|| AssetError::AssetNotFound {
        asset: key.to_string(),
        manifest: self.source.clone(),
      })
  }

  /// Whether `key` is in the manifest.
  pub fn contains(&self, key: &str) -> bool {
    self.index.contains_key(key)
  }

  /// Entries in manifest document order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &ManifestEntry)> {
    self
      .entries
      .iter()
      .map(|(key, entry)| (key.as_str(), entry))
  }

  /// First entry, in document order, whose key contains `motif`.
  pub fn find_by_motif(&self, motif: &str) -> Option<(&str, &ManifestEntry)> {
    self.iter().find(|(key, _)| key.contains(motif))
  }

  /// Number of entries.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Whether the manifest has no entries.
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse(content: &str) -> Result<ManifestGraph> {
    ManifestGraph::parse(Path::new("manifest.json"), content)
  }

  #[test]
  fn parses_entries_with_defaults() {
    let graph = parse(
      r#"{
        "main.js": {"file": "main.abc123.js", "src": "main.js", "isEntry": true, "css": ["main.css"]},
        "logo.svg": {"file": "logo.1f2e.svg", "src": "logo.svg", "isEntry": false}
      }"#,
    )
    .unwrap();

    let main = graph.get("main.js").unwrap();
    assert!(main.is_entry);
    assert_eq!(main.css, vec!["main.css".to_string()]);
    assert!(main.imports.is_empty());
    assert!(graph.get("logo.svg").unwrap().css.is_empty());
  }

  #[test]
  fn preserves_document_order() {
    let graph = parse(
      r#"{
        "z.js": {"file": "z.js", "src": "z.js", "isEntry": true},
        "a.js": {"file": "a.js", "src": "a.js", "isEntry": true},
        "m.js": {"file": "m.js", "src": "m.js", "isEntry": true}
      }"#,
    )
    .unwrap();

    let keys: Vec<&str> = graph.iter().map(|(key, _)| key).collect();
    assert_eq!(keys, vec!["z.js", "a.js", "m.js"]);
  }

  #[test]
  fn rejects_entries_missing_required_fields() {
    let err = parse(r#"{"main.js": {"file": "main.js", "isEntry": true}}"#).unwrap_err();
    assert!(matches!(err, AssetError::ManifestParse { .. }));
    assert!(err.to_string().contains("main.js"));
  }

  #[test]
  fn rejects_malformed_json() {
    assert!(matches!(
      parse("[1, 2"),
      Err(AssetError::ManifestParse { .. })
    ));
  }

  #[test]
  fn rejects_non_object_documents() {
    assert!(parse("[]").is_err());
  }

  #[test]
  fn rejects_dangling_imports() {
    let err = parse(
      r#"{"main.js": {"file": "main.js", "src": "main.js", "isEntry": true, "imports": ["gone.js"]}}"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("gone.js"));
  }

  #[test]
  fn missing_key_names_the_manifest() {
    let graph = parse("{}").unwrap();
    let err = graph.entry("nonexistent.js").unwrap_err();

    assert!(matches!(err, AssetError::AssetNotFound { .. }));
    assert!(err.to_string().contains("manifest.json"));
  }

  #[test]
  fn motif_lookup_returns_first_match() {
    let graph = parse(
      r#"{
        "vite/legacy-polyfills-a": {"file": "polyfills-a.js", "src": "a", "isEntry": true},
        "vite/legacy-polyfills-b": {"file": "polyfills-b.js", "src": "b", "isEntry": true}
      }"#,
    )
    .unwrap();

    let (key, entry) = graph.find_by_motif("legacy-polyfills").unwrap();
    assert_eq!(key, "vite/legacy-polyfills-a");
    assert_eq!(entry.file, "polyfills-a.js");
    assert!(graph.find_by_motif("nothing").is_none());
  }
}
