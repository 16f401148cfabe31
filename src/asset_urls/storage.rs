use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use super::join_url;
use crate::error::{AssetError, Result};

/// Collaborator computing the final public URL of a collected static file.
pub trait StaticStorage: Send + Sync {
  /// Public URL for the stored file `name`.
  fn url(&self, name: &str) -> String;
}

/// Static files served under a base URL, optionally renamed through a hashed-name manifest.
#[derive(Debug, Clone, Default)]
pub struct StaticFilesStorage {
  base_url: String,
  hashed_names: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct HashedNamesFile {
  #[serde(default)]
  paths: HashMap<String, String>,
}

impl StaticFilesStorage {
  /// Storage serving every file under `base_url` with its name unchanged.
  pub fn new(base_url: impl Into<String>) -> Self {
    Self {
      base_url: base_url.into(),
      hashed_names: HashMap::new(),
    }
  }

  /// Load `{"paths": {"name": "hashed-name"}}` from `manifest`.
  pub fn with_manifest(base_url: impl Into<String>, manifest: &Path) -> Result<Self> {
    let content = fs::read_to_string(manifest).map_err(|source| AssetError::SettingsRead {
      path: manifest.to_path_buf(),
      source,
    })?;
    let file: HashedNamesFile =
      serde_json::from_str(&content).map_err(|err| AssetError::SettingsParse {
        path: manifest.to_path_buf(),
        message: err.to_string(),
      })?;

    debug!(
      path = %manifest.display(),
      names = file.paths.len(),
      "loaded static files manifest"
    );
    Ok(Self {
      base_url: base_url.into(),
      hashed_names: file.paths,
    })
  }

  /// Serve `name` as `hashed` instead.
  pub fn with_hashed_name(mut self, name: impl Into<String>, hashed: impl Into<String>) -> Self {
    self.hashed_names.insert(name.into(), hashed.into());
    self
  }

  /// Base URL prepended to every stored name.
  pub fn base_url(&self) -> &str {
    &self.base_url
  }
}

impl StaticStorage for StaticFilesStorage {
  fn url(&self, name: &str) -> String {
    let name = name.trim_start_matches('/');
    let stored = self
      .hashed_names
      .get(name)
      .map(String::as_str)
      .unwrap_or(name);

    let mut base = self.base_url.clone();
    if !base.is_empty() && !base.ends_with('/') {
      base.push('/');
    }
    join_url(&base, stored)
  }
}
