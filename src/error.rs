//! Error types shared by every resolution operation.

use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced while loading configuration, reading manifests or resolving assets.
///
/// Every variant is fatal to the request that produced it; nothing here is retried.
#[derive(Debug, Error)]
pub enum AssetError {
  /// No configuration was registered under the requested name.
  #[error("cannot find \"{name}\" configuration")]
  ConfigNotFound {
    /// Requested configuration name.
    name: String,
  },

  /// A configuration was registered twice through the strict registration path.
  #[error("configuration \"{name}\" is already registered")]
  DuplicateConfig {
    /// Configuration name registered twice.
    name: String,
  },

  /// Configuration values failed validation.
  #[error("invalid configuration \"{name}\": {message}")]
  InvalidConfig {
    /// Configuration name being built.
    name: String,
    /// Description of the rejected value.
    message: String,
  },

  /// Settings file could not be read.
  #[error("cannot read settings file at {}: {source}", .path.display())]
  SettingsRead {
    /// Settings file location.
    path: PathBuf,
    /// Underlying I/O error.
    source: std::io::Error,
  },

  /// Settings file content is malformed.
  #[error("cannot parse settings file at {}: {message}", .path.display())]
  SettingsParse {
    /// Settings file location.
    path: PathBuf,
    /// Parser message.
    message: String,
  },

  /// Manifest file is missing or unreadable.
  #[error("cannot read Vite manifest file at {}: {source}", .path.display())]
  ManifestRead {
    /// Computed manifest location.
    path: PathBuf,
    /// Underlying I/O error.
    source: std::io::Error,
  },

  /// Manifest content is malformed or an entry is missing required fields.
  #[error("cannot parse Vite manifest file at {}: {message}", .path.display())]
  ManifestParse {
    /// Computed manifest location.
    path: PathBuf,
    /// Parser or validation message.
    message: String,
  },

  /// Requested logical path is absent from the manifest.
  #[error("cannot find {asset} in Vite manifest at {}", .manifest.display())]
  AssetNotFound {
    /// Logical source path that was requested.
    asset: String,
    /// Manifest that was searched.
    manifest: PathBuf,
  },

  /// No manifest key contains the legacy polyfills motif.
  #[error("Vite legacy polyfills (\"{motif}\") not found in manifest at {}", .manifest.display())]
  LegacyPolyfillsNotFound {
    /// Motif searched for in manifest keys.
    motif: String,
    /// Manifest that was searched.
    manifest: PathBuf,
  },

  /// The `imports` graph loops back onto itself.
  #[error("cyclic imports {cycle} in Vite manifest at {}", .manifest.display())]
  CyclicManifest {
    /// Cycle rendered as `a -> b -> a`.
    cycle: String,
    /// Manifest containing the cycle.
    manifest: PathBuf,
  },
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, AssetError>;
