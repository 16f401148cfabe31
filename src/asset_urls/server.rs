use super::{StaticStorage, join_url};
use crate::config::ViteConfig;

/// URL of `path` on the Vite dev server: `protocol://host:port` + static URL + path.
pub fn dev_server_url(path: &str, config: &ViteConfig) -> String {
  join_url(
    &config.dev_server_origin(),
    &join_url(config.static_url(), path),
  )
}

/// URL of a built file in production.
///
/// The static URL prefix is applied with exactly one separator, then the storage
/// collaborator, when present, gets the final say.
pub fn production_url(path: &str, prefix: &str, storage: Option<&dyn StaticStorage>) -> String {
  let prefixed = if prefix.is_empty() {
    path.to_string()
  } else if prefix.ends_with('/') {
    join_url(prefix, path)
  } else {
    join_url(&format!("{prefix}/"), path)
  };

  match storage {
    Some(storage) => storage.url(&prefixed),
    None => prefixed,
  }
}
