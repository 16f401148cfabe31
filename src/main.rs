//! `vite-tags` command line entry point.

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use vite_asset_tags::config::DEFAULT_SETTINGS_FILE;
use vite_asset_tags::{AssetEngine, Attributes, DEFAULT_CONFIG_KEY, Settings};

/// Print the HTML tags needed to load Vite assets.
#[derive(Debug, Parser)]
#[command(name = "vite-tags", version, about)]
struct Cli {
  /// Settings file (JSON or YAML).
  #[arg(long, global = true, default_value = DEFAULT_SETTINGS_FILE)]
  settings: PathBuf,

  /// Configuration name to resolve against.
  #[arg(long, global = true, default_value = DEFAULT_CONFIG_KEY)]
  config: String,

  /// Enable debug logging.
  #[arg(long, global = true)]
  debug: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
  /// Stylesheets, module script and modulepreload links for an entry.
  Asset(AssetArgs),
  /// Preload links for an entry and its dependencies.
  Preload {
    /// Logical source path from the manifest.
    path: String,
  },
  /// URL of a single asset.
  Url {
    /// Logical source path from the manifest.
    path: String,
  },
  /// `nomodule` script for a legacy bundle.
  LegacyAsset(AssetArgs),
  /// `nomodule` script for the legacy polyfills.
  LegacyPolyfills(AttrArgs),
  /// Dev server HMR client script.
  HmrClient(AttrArgs),
  /// React refresh preamble.
  ReactRefresh,
}

#[derive(Debug, Args)]
struct AssetArgs {
  /// Logical source path from the manifest.
  path: String,
  #[command(flatten)]
  attrs: AttrArgs,
}

#[derive(Debug, Args)]
struct AttrArgs {
  /// Extra attribute as `key=value`; repeat for more. Overrides defaults.
  #[arg(long = "attr", value_parser = parse_attr)]
  attrs: Vec<(String, String)>,
}

impl AttrArgs {
  fn to_attributes(&self) -> Attributes {
    self.attrs.iter().cloned().collect()
  }
}

fn parse_attr(raw: &str) -> Result<(String, String)> {
  match raw.split_once('=') {
    Some((key, _)) if key.trim().is_empty() => Err(anyhow!("attribute name is empty in {raw:?}")),
    Some((key, value)) => Ok((key.trim().to_string(), value.to_string())),
    None => Ok((raw.trim().to_string(), String::new())),
  }
}

fn init_tracing(debug: bool) {
  let filter = if debug {
    EnvFilter::new("vite_asset_tags=debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vite_asset_tags=warn"))
  };

  tracing_subscriber::registry()
    .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
    .with(filter)
    .init();
}

fn run(cli: &Cli) -> Result<String> {
  let settings = Settings::from_path(&cli.settings)
    .with_context(|| format!("failed to load settings from {}", cli.settings.display()))?;
  let engine: AssetEngine = settings
    .into_engine()
    .context("failed to build Vite configurations")?;
  let config = cli.config.as_str();

  let output = match &cli.command {
    Command::Asset(args) => engine.resolve_asset(&args.path, config, &args.attrs.to_attributes()),
    Command::Preload { path } => engine.resolve_preload_asset(path, config),
    Command::Url { path } => engine.resolve_asset_url(path, config),
    Command::LegacyAsset(args) => {
      engine.resolve_legacy_asset(&args.path, config, &args.attrs.to_attributes())
    }
    Command::LegacyPolyfills(args) => engine.resolve_legacy_polyfills(config, &args.to_attributes()),
    Command::HmrClient(args) => engine.resolve_hmr_client(config, &args.to_attributes()),
    Command::ReactRefresh => engine.resolve_react_refresh(config),
  };

  Ok(output?)
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_tracing(cli.debug);
  tracing::debug!("vite-tags starting with args: {:?}", cli);

  let output = run(&cli)?;
  if !output.is_empty() {
    println!("{output}");
  }
  Ok(())
}
