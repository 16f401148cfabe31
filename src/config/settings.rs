//! Settings file loader turning structured or flat legacy settings into a registry.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use super::{ConfigRegistry, ConfigValues, DEFAULT_CONFIG_KEY, StaticSettings, ViteConfig};
use crate::asset_urls::StaticFilesStorage;
use crate::engine::AssetEngine;
use crate::error::{AssetError, Result};

/// Settings file name used by the CLI when none is given.
pub const DEFAULT_SETTINGS_FILE: &str = "vite-tags.json";

/// Top-level settings document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
  /// Global static URL and root.
  #[serde(flatten)]
  pub statics: StaticSettings,
  /// Static files collaborator; absent means production URLs are left as computed.
  #[serde(default)]
  pub staticfiles: Option<StaticFilesSettings>,
  /// Named configurations.
  #[serde(default)]
  pub vite: Option<BTreeMap<String, ConfigValues>>,
  /// Flat keys read only when `vite` is absent.
  #[serde(flatten)]
  pub legacy: LegacySettings,
}

/// Options for the static files URL collaborator.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StaticFilesSettings {
  /// Base URL for stored files; defaults to the global static URL.
  pub base_url: Option<String>,
  /// JSON document mapping names to their hashed names.
  pub manifest: Option<PathBuf>,
}

/// Flat settings describing a single `default` configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LegacySettings {
  /// `VITE_DEV_MODE`.
  #[serde(rename = "VITE_DEV_MODE", default)]
  pub dev_mode: Option<bool>,
  /// `VITE_DEV_SERVER_PROTOCOL`.
  #[serde(rename = "VITE_DEV_SERVER_PROTOCOL", default)]
  pub dev_server_protocol: Option<String>,
  /// `VITE_DEV_SERVER_HOST`.
  #[serde(rename = "VITE_DEV_SERVER_HOST", default)]
  pub dev_server_host: Option<String>,
  /// `VITE_DEV_SERVER_PORT`.
  #[serde(rename = "VITE_DEV_SERVER_PORT", default)]
  pub dev_server_port: Option<u16>,
  /// `VITE_WS_CLIENT_URL`.
  #[serde(rename = "VITE_WS_CLIENT_URL", default)]
  pub ws_client_url: Option<String>,
  /// `VITE_ASSETS_PATH`, required when the flat keys are used.
  #[serde(rename = "VITE_ASSETS_PATH", default)]
  pub assets_path: Option<PathBuf>,
  /// `VITE_STATIC_URL_PREFIX`.
  #[serde(rename = "VITE_STATIC_URL_PREFIX", default)]
  pub static_url_prefix: Option<String>,
  /// `VITE_MANIFEST_PATH`.
  #[serde(rename = "VITE_MANIFEST_PATH", default)]
  pub manifest_path: Option<PathBuf>,
  /// `VITE_LEGACY_POLYFILLS_MOTIF`.
  #[serde(rename = "VITE_LEGACY_POLYFILLS_MOTIF", default)]
  pub legacy_polyfills_motif: Option<String>,
}

impl LegacySettings {
  /// Fold the flat keys over the defaults. The assets path stays mandatory.
  pub fn into_values(self) -> Result<ConfigValues> {
    let Some(assets_path) = self.assets_path else {
      return Err(AssetError::InvalidConfig {
        name: DEFAULT_CONFIG_KEY.into(),
        message: "VITE_ASSETS_PATH is required".into(),
      });
    };

    let mut values = ConfigValues::new(assets_path);
    if let Some(dev_mode) = self.dev_mode {
      values.dev_mode = dev_mode;
    }
    if let Some(protocol) = self.dev_server_protocol {
      values.dev_server_protocol = protocol;
    }
    if let Some(host) = self.dev_server_host {
      values.dev_server_host = host;
    }
    if let Some(port) = self.dev_server_port {
      values.dev_server_port = port;
    }
    if let Some(url) = self.ws_client_url {
      values.ws_client_url = url;
    }
    if let Some(prefix) = self.static_url_prefix {
      values.static_url_prefix = prefix;
    }
    values.manifest_path = self.manifest_path;
    if let Some(motif) = self.legacy_polyfills_motif {
      values.legacy_polyfills_motif = motif;
    }
    Ok(values)
  }
}

impl Settings {
  /// Read settings from a JSON or YAML file, picking the format from the extension.
  pub fn from_path(path: &Path) -> Result<Self> {
    let content = fs::read_to_string(path).map_err(|source| AssetError::SettingsRead {
      path: path.to_path_buf(),
      source,
    })?;

    let is_yaml = path
      .extension()
      .and_then(|ext| ext.to_str())
      .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    let parse_error = |message: String| AssetError::SettingsParse {
      path: path.to_path_buf(),
      message,
    };
    let settings: Settings = if is_yaml {
      serde_yaml::from_str(&content).map_err(|err| parse_error(err.to_string()))?
    } else {
      serde_json::from_str(&content).map_err(|err| parse_error(err.to_string()))?
    };

    debug!(path = %path.display(), "loaded Vite settings");
    Ok(settings)
  }

  /// Build and validate every configuration described by the settings.
  pub fn registry(&self) -> Result<ConfigRegistry> {
    let mut registry = ConfigRegistry::new();

    match &self.vite {
      Some(configs) => {
        for (name, values) in configs {
          registry.register(ViteConfig::build(name, values.clone(), &self.statics)?);
        }
      }
      None => {
        let values = self.legacy.clone().into_values()?;
        registry.register(ViteConfig::build(DEFAULT_CONFIG_KEY, values, &self.statics)?);
      }
    }

    Ok(registry)
  }

  /// Static files collaborator described by the `staticfiles` block, if any.
  pub fn static_storage(&self) -> Result<Option<StaticFilesStorage>> {
    let Some(staticfiles) = &self.staticfiles else {
      return Ok(None);
    };

    let base_url = staticfiles
      .base_url
      .clone()
      .unwrap_or_else(|| self.statics.static_url.clone());
    let storage = match &staticfiles.manifest {
      Some(path) => StaticFilesStorage::with_manifest(base_url, path)?,
      None => StaticFilesStorage::new(base_url),
    };
    Ok(Some(storage))
  }

  /// Assemble an engine owning the registry and storage these settings describe.
  pub fn into_engine(self) -> Result<AssetEngine> {
    let registry = self.registry()?;
    let engine = AssetEngine::new(registry);
    Ok(match self.static_storage()? {
      Some(storage) => engine.with_static_storage(storage),
      None => engine,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn reads_named_configurations_from_json() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("vite-tags.json");
    fs::write(
      &path,
      r#"{
        "static_url": "/assets/",
        "static_root": "/srv/assets",
        "vite": {
          "default": {"assets_path": "dist", "static_url_prefix": "app"},
          "admin": {"assets_path": "admin/dist", "dev_mode": true, "dev_server_port": 5174}
        }
      }"#,
    )
    .unwrap();

    let registry = Settings::from_path(&path).unwrap().registry().unwrap();

    assert_eq!(registry.names().collect::<Vec<_>>(), vec!["admin", "default"]);
    let default = registry.get("default").unwrap();
    assert_eq!(default.static_url(), "/assets/app/");
    assert_eq!(
      default.computed_manifest_path(),
      Path::new("/srv/assets/app/manifest.json")
    );
    let admin = registry.get("admin").unwrap();
    assert!(admin.dev_mode());
    assert_eq!(admin.dev_server_origin(), "http://localhost:5174");
  }

  #[test]
  fn reads_legacy_flat_keys_from_yaml() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("vite-tags.yaml");
    fs::write(
      &path,
      "static_url: /static/\n\
       VITE_ASSETS_PATH: frontend/dist\n\
       VITE_DEV_MODE: true\n\
       VITE_DEV_SERVER_PORT: 5173\n\
       VITE_LEGACY_POLYFILLS_MOTIF: polyfills-legacy\n",
    )
    .unwrap();

    let registry = Settings::from_path(&path).unwrap().registry().unwrap();
    let config = registry.get(DEFAULT_CONFIG_KEY).unwrap();

    assert!(config.dev_mode());
    assert_eq!(config.dev_server_origin(), "http://localhost:5173");
    assert_eq!(config.legacy_polyfills_motif(), "polyfills-legacy");
    assert_eq!(config.static_root(), Path::new("frontend/dist"));
  }

  #[test]
  fn legacy_settings_require_assets_path() {
    let settings = Settings::default();
    let err = settings.registry().unwrap_err();
    assert!(matches!(err, AssetError::InvalidConfig { .. }));
  }

  #[test]
  fn invalid_values_fail_at_load() {
    let settings: Settings = serde_json::from_str(
      r#"{"vite": {"default": {"assets_path": "dist", "dev_server_protocol": "ws"}}}"#,
    )
    .unwrap();
    assert!(matches!(
      settings.registry(),
      Err(AssetError::InvalidConfig { .. })
    ));
  }

  #[test]
  fn malformed_file_is_a_parse_error() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("vite-tags.json");
    fs::write(&path, "{ not json").unwrap();

    let err = Settings::from_path(&path).unwrap_err();
    assert!(matches!(err, AssetError::SettingsParse { .. }));
  }

  #[test]
  fn missing_file_is_a_read_error() {
    let temp = tempdir().unwrap();
    let err = Settings::from_path(&temp.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, AssetError::SettingsRead { .. }));
  }

  #[test]
  fn staticfiles_base_url_defaults_to_static_url() {
    let settings: Settings = serde_json::from_str(
      r#"{"static_url": "/s/", "staticfiles": {}, "VITE_ASSETS_PATH": "dist"}"#,
    )
    .unwrap();

    let storage = settings.static_storage().unwrap().expect("storage configured");
    assert_eq!(storage.base_url(), "/s/");
  }

  #[test]
  fn misspelled_config_keys_are_rejected() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("vite-tags.json");
    fs::write(
      &path,
      r#"{"vite": {"default": {"assets_path": "dist", "dev_mod": true, "static_url_prefx": "app"}}}"#,
    )
    .unwrap();

    let err = Settings::from_path(&path).unwrap_err();
    assert!(matches!(err, AssetError::SettingsParse { .. }));
    assert!(err.to_string().contains("dev_mod"));
  }
}
