#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![allow(clippy::module_inception)]

pub mod asset_urls;
pub mod config;
pub mod engine;
pub mod error;
pub mod manifest;
pub mod tags;

pub use config::{ConfigRegistry, ConfigValues, CyclePolicy, DEFAULT_CONFIG_KEY, Settings, ViteConfig};
pub use engine::AssetEngine;
pub use error::{AssetError, Result};
pub use tags::Attributes;
