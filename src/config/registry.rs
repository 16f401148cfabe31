use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use super::ViteConfig;
use crate::error::{AssetError, Result};

/// Configuration name used when callers do not pick one.
pub const DEFAULT_CONFIG_KEY: &str = "default";

/// Named configurations populated once at startup.
#[derive(Debug, Clone, Default)]
pub struct ConfigRegistry {
  configs: BTreeMap<String, Arc<ViteConfig>>,
}

impl ConfigRegistry {
  /// Empty registry.
  pub fn new() -> Self {
    Self::default()
  }

  /// Store `config` under its own name, replacing any previous registration.
  pub fn register(&mut self, config: ViteConfig) {
    let name = config.name().to_string();
    if self.configs.insert(name.clone(), Arc::new(config)).is_some() {
      debug!(config = %name, "replaced existing Vite configuration");
    }
  }

  /// Store `config`, failing when the name is already taken.
  pub fn register_unique(&mut self, config: ViteConfig) -> Result<()> {
    if self.configs.contains_key(config.name()) {
      return Err(AssetError::DuplicateConfig {
        name: config.name().to_string(),
      });
    }
    self.register(config);
    Ok(())
  }

  /// Look up a configuration, failing with [`AssetError::ConfigNotFound`].
  pub fn get(&self, name: &str) -> Result<Arc<ViteConfig>> {
    self
      .configs
      .get(name)
      .cloned()
      .ok_or_else(|| AssetError::ConfigNotFound {
        name: name.to_string(),
      })
  }

  /// Registered configuration names in sorted order.
  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.configs.keys().map(String::as_str)
  }

  /// Number of registered configurations.
  pub fn len(&self) -> usize {
    self.configs.len()
  }

  /// Whether nothing has been registered yet.
  pub fn is_empty(&self) -> bool {
    self.configs.is_empty()
  }
}
