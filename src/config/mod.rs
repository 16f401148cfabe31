//! Named Vite configurations and the settings they are loaded from.

mod registry;
mod settings;

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::asset_urls::join_url;
use crate::error::{AssetError, Result};

pub use registry::{ConfigRegistry, DEFAULT_CONFIG_KEY};
pub use settings::{DEFAULT_SETTINGS_FILE, LegacySettings, Settings, StaticFilesSettings};

/// File name looked up inside the static root when no manifest path is configured.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// How the dependency walk reacts to an `imports` edge that loops back onto the current path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePolicy {
  /// Ignore the edge and keep walking.
  #[default]
  Skip,
  /// Abort the resolution with [`AssetError::CyclicManifest`].
  Fail,
}

/// Global static file settings shared by every named configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StaticSettings {
  /// Public URL static files are served from.
  pub static_url: String,
  /// Directory static files are collected into.
  pub static_root: PathBuf,
}

impl Default for StaticSettings {
  fn default() -> Self {
    Self {
      static_url: "/static/".into(),
      static_root: PathBuf::from("static"),
    }
  }
}

/// Raw configuration record as it appears in a settings file.
///
/// Only `assets_path` is required; every other field falls back to the defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigValues {
  /// Location of compiled assets, used as the static root in dev mode.
  pub assets_path: PathBuf,
  /// Serve assets from the dev server instead of the manifest.
  #[serde(default)]
  pub dev_mode: bool,
  /// Dev server protocol, `http` or `https`.
  #[serde(default = "default_protocol")]
  pub dev_server_protocol: String,
  /// Dev server host name.
  #[serde(default = "default_host")]
  pub dev_server_host: String,
  /// Dev server port.
  #[serde(default = "default_port")]
  pub dev_server_port: u16,
  /// Dev server path of the HMR client script.
  #[serde(default = "default_ws_client_url")]
  pub ws_client_url: String,
  /// Prefix appended to the static URL and static root.
  #[serde(default)]
  pub static_url_prefix: String,
  /// Substring identifying the legacy polyfills entry in the manifest.
  #[serde(default = "default_legacy_polyfills_motif")]
  pub legacy_polyfills_motif: String,
  /// Explicit manifest location overriding `static_root/manifest.json`.
  #[serde(default)]
  pub manifest_path: Option<PathBuf>,
  /// Dev server path of the React refresh runtime.
  #[serde(default = "default_react_refresh_url")]
  pub react_refresh_url: String,
  /// Reaction to cyclic `imports` in the manifest.
  #[serde(default)]
  pub cycle_policy: CyclePolicy,
}

fn default_protocol() -> String {
  "http".into()
}

fn default_host() -> String {
  "localhost".into()
}

fn default_port() -> u16 {
  3000
}

fn default_ws_client_url() -> String {
  "@vite/client".into()
}

fn default_legacy_polyfills_motif() -> String {
  "legacy-polyfills".into()
}

fn default_react_refresh_url() -> String {
  "@react-refresh".into()
}

impl ConfigValues {
  /// Start a record with defaults for everything but the assets path.
  pub fn new(assets_path: impl Into<PathBuf>) -> Self {
    Self {
      assets_path: assets_path.into(),
      dev_mode: false,
      dev_server_protocol: default_protocol(),
      dev_server_host: default_host(),
      dev_server_port: default_port(),
      ws_client_url: default_ws_client_url(),
      static_url_prefix: String::new(),
      legacy_polyfills_motif: default_legacy_polyfills_motif(),
      manifest_path: None,
      react_refresh_url: default_react_refresh_url(),
      cycle_policy: CyclePolicy::default(),
    }
  }

  /// Toggle dev mode.
  pub fn with_dev_mode(mut self, dev_mode: bool) -> Self {
    self.dev_mode = dev_mode;
    self
  }

  /// Point at a dev server other than `http://localhost:3000`.
  pub fn with_dev_server(
    mut self,
    protocol: impl Into<String>,
    host: impl Into<String>,
    port: u16,
  ) -> Self {
    self.dev_server_protocol = protocol.into();
    self.dev_server_host = host.into();
    self.dev_server_port = port;
    self
  }

  /// Override the HMR client path.
  pub fn with_ws_client_url(mut self, url: impl Into<String>) -> Self {
    self.ws_client_url = url.into();
    self
  }

  /// Set the prefix applied to the static URL and static root.
  pub fn with_static_url_prefix(mut self, prefix: impl Into<String>) -> Self {
    self.static_url_prefix = prefix.into();
    self
  }

  /// Override the substring identifying the legacy polyfills entry.
  pub fn with_legacy_polyfills_motif(mut self, motif: impl Into<String>) -> Self {
    self.legacy_polyfills_motif = motif.into();
    self
  }

  /// Read the manifest from `path` instead of `static_root/manifest.json`.
  pub fn with_manifest_path(mut self, path: impl Into<PathBuf>) -> Self {
    self.manifest_path = Some(path.into());
    self
  }

  /// Override the React refresh runtime path.
  pub fn with_react_refresh_url(mut self, url: impl Into<String>) -> Self {
    self.react_refresh_url = url.into();
    self
  }

  /// Choose how cyclic `imports` are handled.
  pub fn with_cycle_policy(mut self, policy: CyclePolicy) -> Self {
    self.cycle_policy = policy;
    self
  }
}

/// Validated, immutable configuration with its derived paths computed up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViteConfig {
  name: String,
  values: ConfigValues,
  static_url: String,
  static_root: PathBuf,
  manifest_path: PathBuf,
}

impl ViteConfig {
  /// Validate `values` and derive the static URL, static root and manifest location.
  pub fn build(
    name: impl Into<String>,
    values: ConfigValues,
    statics: &StaticSettings,
  ) -> Result<Self> {
    let name = name.into();
    validate(&name, &values)?;

    let mut static_url = join_url(&statics.static_url, &values.static_url_prefix);
    if !static_url.ends_with('/') {
      static_url.push('/');
    }

    let static_root = if values.dev_mode {
      values.assets_path.clone()
    } else {
      statics.static_root.join(&values.static_url_prefix)
    };

    let manifest_path = match &values.manifest_path {
      Some(path) if !path.as_os_str().is_empty() => path.clone(),
      _ => static_root.join(MANIFEST_FILE_NAME),
    };

    Ok(Self {
      name,
      values,
      static_url,
      static_root,
      manifest_path,
    })
  }

  /// Name the configuration was built under.
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Raw values the configuration was built from.
  pub fn values(&self) -> &ConfigValues {
    &self.values
  }

  /// Whether tags point at the dev server.
  pub fn dev_mode(&self) -> bool {
    self.values.dev_mode
  }

  /// Global static URL joined with the prefix, always ending in `/`.
  pub fn static_url(&self) -> &str {
    &self.static_url
  }

  /// Assets path in dev mode, otherwise the global static root joined with the prefix.
  pub fn static_root(&self) -> &Path {
    &self.static_root
  }

  /// Manifest location: the explicit override or `static_root/manifest.json`.
  pub fn computed_manifest_path(&self) -> &Path {
    &self.manifest_path
  }

  /// Base `protocol://host:port` of the dev server.
  pub fn dev_server_origin(&self) -> String {
    format!(
      "{}://{}:{}",
      self.values.dev_server_protocol, self.values.dev_server_host, self.values.dev_server_port
    )
  }

  /// Prefix applied to production URLs.
  pub fn static_url_prefix(&self) -> &str {
    &self.values.static_url_prefix
  }

  /// Dev server path of the HMR client.
  pub fn ws_client_url(&self) -> &str {
    &self.values.ws_client_url
  }

  /// Dev server path of the React refresh runtime.
  pub fn react_refresh_url(&self) -> &str {
    &self.values.react_refresh_url
  }

  /// Substring identifying the legacy polyfills entry.
  pub fn legacy_polyfills_motif(&self) -> &str {
    &self.values.legacy_polyfills_motif
  }

  /// Reaction to cyclic `imports`.
  pub fn cycle_policy(&self) -> CyclePolicy {
    self.values.cycle_policy
  }
}

fn validate(name: &str, values: &ConfigValues) -> Result<()> {
  let invalid = |message: String| AssetError::InvalidConfig {
    name: name.to_string(),
    message,
  };

  if !matches!(values.dev_server_protocol.as_str(), "http" | "https") {
    return Err(invalid(format!(
      "dev_server_protocol must be \"http\" or \"https\", got \"{}\"",
      values.dev_server_protocol
    )));
  }
  if values.dev_server_host.trim().is_empty() {
    return Err(invalid("dev_server_host must not be empty".into()));
  }
  if values.dev_server_port == 0 {
    return Err(invalid("dev_server_port must be non-zero".into()));
  }
  if values.legacy_polyfills_motif.is_empty() {
    return Err(invalid("legacy_polyfills_motif must not be empty".into()));
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn statics() -> StaticSettings {
    StaticSettings {
      static_url: "/static/".into(),
      static_root: PathBuf::from("/srv/static"),
    }
  }

  #[test]
  fn defaults_match_vite_conventions() {
    let values: ConfigValues =
      serde_json::from_str(r#"{"assets_path": "frontend/dist"}"#).expect("minimal record");

    assert_eq!(values, ConfigValues::new("frontend/dist"));
    assert_eq!(values.dev_server_port, 3000);
    assert_eq!(values.ws_client_url, "@vite/client");
    assert_eq!(values.cycle_policy, CyclePolicy::Skip);
  }

  #[test]
  fn missing_assets_path_is_rejected() {
    let parsed = serde_json::from_str::<ConfigValues>(r#"{"dev_mode": true}"#);
    assert!(parsed.is_err());
  }

  #[test]
  fn static_url_is_slash_terminated() {
    let values = ConfigValues::new("dist").with_static_url_prefix("bundler");
    let config = ViteConfig::build("default", values, &statics()).unwrap();

    assert_eq!(config.static_url(), "/static/bundler/");
  }

  #[test]
  fn production_manifest_lives_under_static_root() {
    let values = ConfigValues::new("dist").with_static_url_prefix("bundler");
    let config = ViteConfig::build("default", values, &statics()).unwrap();

    assert_eq!(config.static_root(), Path::new("/srv/static/bundler"));
    assert_eq!(
      config.computed_manifest_path(),
      Path::new("/srv/static/bundler/manifest.json")
    );
  }

  #[test]
  fn dev_mode_uses_assets_path_as_root() {
    let values = ConfigValues::new("frontend/dist").with_dev_mode(true);
    let config = ViteConfig::build("default", values, &statics()).unwrap();

    assert_eq!(config.static_root(), Path::new("frontend/dist"));
    assert_eq!(
      config.computed_manifest_path(),
      Path::new("frontend/dist/manifest.json")
    );
  }

  #[test]
  fn explicit_manifest_path_wins() {
    let values = ConfigValues::new("dist").with_manifest_path("/tmp/vite/manifest.json");
    let config = ViteConfig::build("default", values, &statics()).unwrap();

    assert_eq!(
      config.computed_manifest_path(),
      Path::new("/tmp/vite/manifest.json")
    );
  }

  #[test]
  fn rejects_unknown_protocol() {
    let values = ConfigValues::new("dist").with_dev_server("ftp", "localhost", 3000);
    let err = ViteConfig::build("default", values, &statics()).unwrap_err();

    assert!(matches!(err, AssetError::InvalidConfig { .. }));
    assert!(err.to_string().contains("ftp"));
  }

  #[test]
  fn rejects_zero_port() {
    let values = ConfigValues::new("dist").with_dev_server("http", "localhost", 0);
    assert!(ViteConfig::build("default", values, &statics()).is_err());
  }

  #[test]
  fn dev_server_origin_combines_parts() {
    let values = ConfigValues::new("dist").with_dev_server("https", "vite.local", 5173);
    let config = ViteConfig::build("default", values, &statics()).unwrap();

    assert_eq!(config.dev_server_origin(), "https://vite.local:5173");
  }
}
