//! Asset resolution engine turning logical source paths into HTML tags.
//!
//! In dev mode every operation talks to the Vite dev server and never reads the manifest.
//! In production the manifest graph is loaded once per configuration and walked to find
//! the stylesheets and module preloads each entry needs.

use std::sync::Arc;

use crate::asset_urls::{StaticStorage, dev_server_url, production_url};
use crate::config::{ConfigRegistry, ViteConfig};
use crate::error::{AssetError, Result};
use crate::manifest::{ManifestGraph, ManifestStore, css_chain};
use crate::tags::{
  Attributes, legacy_script_attrs, module_script_attrs, modulepreload_attrs, preload_tag,
  react_refresh_script, script_tag, stylesheet_preload_tag, stylesheet_tag,
};

/// Resolver owning the configuration registry and the manifest cache.
pub struct AssetEngine {
  registry: ConfigRegistry,
  manifests: ManifestStore,
  storage: Option<Arc<dyn StaticStorage>>,
}

impl std::fmt::Debug for AssetEngine {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AssetEngine")
      .field("registry", &self.registry)
      .field("manifests", &self.manifests)
      .field("storage", &self.storage.is_some())
      .finish()
  }
}

impl AssetEngine {
  /// Engine over `registry` with an empty manifest cache and no static storage.
  pub fn new(registry: ConfigRegistry) -> Self {
    Self {
      registry,
      manifests: ManifestStore::new(),
      storage: None,
    }
  }

  /// Route production URLs through a static files collaborator.
  pub fn with_static_storage(mut self, storage: impl StaticStorage + 'static) -> Self {
    self.storage = Some(Arc::new(storage));
    self
  }

  /// Configurations the engine resolves against.
  pub fn registry(&self) -> &ConfigRegistry {
    &self.registry
  }

  /// Manifest cache shared by every resolution.
  pub fn manifests(&self) -> &ManifestStore {
    &self.manifests
  }

  /// `<script>` for the Vite HMR client in dev mode, nothing in production.
  pub fn resolve_hmr_client(&self, config_key: &str, extra: &Attributes) -> Result<String> {
    let config = self.registry.get(config_key)?;
    if !config.dev_mode() {
      return Ok(String::new());
    }

    let attrs = Attributes::from([("type", "module")]).merged(extra);
    Ok(script_tag(
      &dev_server_url(config.ws_client_url(), &config),
      &attrs,
    ))
  }

  /// Every tag needed to load `path`: dependency stylesheets, the module script itself and
  /// a modulepreload link per direct import.
  pub fn resolve_asset(&self, path: &str, config_key: &str, extra: &Attributes) -> Result<String> {
    let config = self.registry.get(config_key)?;
    if config.dev_mode() {
      let attrs = Attributes::from([("type", "module")]).merged(extra);
      return Ok(script_tag(&dev_server_url(path, &config), &attrs));
    }

    let manifest = self.manifests.get(&config)?;
    let entry = manifest.entry(path)?;

    let mut tags = self.css_tags(&manifest, path, &config, stylesheet_tag)?;
    tags.push(script_tag(
      &self.production_url(&entry.file, &config),
      &module_script_attrs().merged(extra),
    ));
    tags.extend(self.import_preload_tags(&manifest, &entry.imports, &config)?);

    Ok(tags.join("\n"))
  }

  /// Preload hints for `path` and its dependencies. Empty in dev mode.
  pub fn resolve_preload_asset(&self, path: &str, config_key: &str) -> Result<String> {
    let config = self.registry.get(config_key)?;
    if config.dev_mode() {
      return Ok(String::new());
    }

    let manifest = self.manifests.get(&config)?;
    let entry = manifest.entry(path)?;

    let mut tags = vec![preload_tag(
      &self.production_url(&entry.file, &config),
      &modulepreload_attrs(),
    )];
    tags.extend(self.css_tags(&manifest, path, &config, stylesheet_preload_tag)?);
    tags.extend(self.import_preload_tags(&manifest, &entry.imports, &config)?);

    Ok(tags.join("\n"))
  }

  /// URL of `path` alone, without any of its dependencies.
  pub fn resolve_asset_url(&self, path: &str, config_key: &str) -> Result<String> {
    let config = self.registry.get(config_key)?;
    if config.dev_mode() {
      return Ok(dev_server_url(path, &config));
    }

    let manifest = self.manifests.get(&config)?;
    let entry = manifest.entry(path)?;
    Ok(self.production_url(&entry.file, &config))
  }

  /// `<script nomodule>` for the legacy polyfills bundle. Empty in dev mode.
  pub fn resolve_legacy_polyfills(&self, config_key: &str, extra: &Attributes) -> Result<String> {
    let config = self.registry.get(config_key)?;
    if config.dev_mode() {
      return Ok(String::new());
    }

    let manifest = self.manifests.get(&config)?;
    let motif = config.legacy_polyfills_motif();
    let Some((_, entry)) = manifest.find_by_motif(motif) else {
      return Err(AssetError::LegacyPolyfillsNotFound {
        motif: motif.to_string(),
        manifest: manifest.source().to_path_buf(),
      });
    };

    Ok(script_tag(
      &self.production_url(&entry.file, &config),
      &legacy_script_attrs().merged(extra),
    ))
  }

  /// `<script nomodule>` for a self-contained legacy bundle. Empty in dev mode.
  pub fn resolve_legacy_asset(
    &self,
    path: &str,
    config_key: &str,
    extra: &Attributes,
  ) -> Result<String> {
    let config = self.registry.get(config_key)?;
    if config.dev_mode() {
      return Ok(String::new());
    }

    let manifest = self.manifests.get(&config)?;
    let entry = manifest.entry(path)?;
    Ok(script_tag(
      &self.production_url(&entry.file, &config),
      &legacy_script_attrs().merged(extra),
    ))
  }

  /// React refresh preamble in dev mode, nothing in production.
  pub fn resolve_react_refresh(&self, config_key: &str) -> Result<String> {
    let config = self.registry.get(config_key)?;
    if !config.dev_mode() {
      return Ok(String::new());
    }

    Ok(react_refresh_script(&dev_server_url(
      config.react_refresh_url(),
      &config,
    )))
  }

  fn production_url(&self, file: &str, config: &ViteConfig) -> String {
    production_url(file, config.static_url_prefix(), self.storage.as_deref())
  }

  fn css_tags(
    &self,
    manifest: &ManifestGraph,
    path: &str,
    config: &ViteConfig,
    render: fn(&str) -> String,
  ) -> Result<Vec<String>> {
    Ok(
      css_chain(manifest, path, config.cycle_policy())?
        .into_iter()
        .map(|css| render(&self.production_url(css, config)))
        .collect(),
    )
  }

  fn import_preload_tags(
    &self,
    manifest: &ManifestGraph,
    imports: &[String],
    config: &ViteConfig,
  ) -> Result<Vec<String>> {
    let attrs = modulepreload_attrs();
    imports
      .iter()
      .map(|import| {
        let dependency = manifest.entry(import)?;
        Ok(preload_tag(
          &self.production_url(&dependency.file, config),
          &attrs,
        ))
      })
      .collect()
  }
}
