use std::collections::HashMap;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use tracing::debug;

use super::ManifestGraph;
use crate::config::ViteConfig;
use crate::error::{AssetError, Result};

/// Per-configuration cache slot. `init` serialises the first load.
#[derive(Debug, Default)]
struct Slot {
  graph: OnceLock<Arc<ManifestGraph>>,
  init: Mutex<()>,
}

/// Lazily loaded manifests, parsed at most once per configuration name.
///
/// Concurrent first accesses for the same name block on a single load; a failed load is
/// not cached, so the next call tries again.
#[derive(Debug, Default)]
pub struct ManifestStore {
  slots: Mutex<HashMap<String, Arc<Slot>>>,
  loads: AtomicUsize,
}

impl ManifestStore {
  /// Empty store; nothing is read until the first `get`.
  pub fn new() -> Self {
    Self::default()
  }

  /// Cached graph for `config`, loading it on first access.
  pub fn get(&self, config: &ViteConfig) -> Result<Arc<ManifestGraph>> {
    let slot = self.slot(config.name());
    if let Some(graph) = slot.graph.get() {
      return Ok(Arc::clone(graph));
    }

    let _guard = slot.init.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(graph) = slot.graph.get() {
      return Ok(Arc::clone(graph));
    }

    let graph = Arc::new(self.load(config)?);
    Ok(Arc::clone(slot.graph.get_or_init(|| graph)))
  }

  /// Read and parse the manifest at the configuration's computed path.
  pub fn load(&self, config: &ViteConfig) -> Result<ManifestGraph> {
    let path = config.computed_manifest_path();
    debug!(config = config.name(), path = %path.display(), "loading Vite manifest");
    self.loads.fetch_add(1, Ordering::Relaxed);

    let content = fs::read_to_string(path).map_err(|source| AssetError::ManifestRead {
      path: path.to_path_buf(),
      source,
    })?;
    let graph = ManifestGraph::parse(path, &content)?;

    debug!(config = config.name(), entries = graph.len(), "parsed Vite manifest");
    Ok(graph)
  }

  /// Whether a manifest has been cached for `name`.
  pub fn is_loaded(&self, name: &str) -> bool {
    self
      .slots
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .get(name)
      .is_some_and(|slot| slot.graph.get().is_some())
  }

  /// Number of manifest reads attempted so far.
  pub fn load_count(&self) -> usize {
    self.loads.load(Ordering::Relaxed)
  }

  fn slot(&self, name: &str) -> Arc<Slot> {
    let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(slots.entry(name.to_string()).or_default())
  }
}
