//! HTML tag formatting for resolved asset URLs.
//!
//! Values are interpolated verbatim; escaping is left to the template layer that marks the
//! returned markup as trusted.

use std::fmt::Write as _;

/// Ordered HTML attributes. Inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
  /// Empty attribute set.
  pub fn new() -> Self {
    Self::default()
  }

  /// Set `key`, keeping its original position when it already exists.
  pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
    let key = key.into();
    let value = value.into();
    match self.0.iter_mut().find(|(existing, _)| *existing == key) {
      Some((_, slot)) => *slot = value,
      None => self.0.push((key, value)),
    }
  }

  /// Builder form of [`Attributes::insert`].
  pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.insert(key, value);
    self
  }

  /// Overlay `overrides` on top of `self`; keys from `overrides` win.
  pub fn merged(mut self, overrides: &Attributes) -> Self {
    for (key, value) in overrides.iter() {
      self.insert(key, value);
    }
    self
  }

  /// Value of `key`, if set.
  pub fn get(&self, key: &str) -> Option<&str> {
    self
      .0
      .iter()
      .find(|(existing, _)| existing == key)
      .map(|(_, value)| value.as_str())
  }

  /// Pairs in insertion order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
  }

  /// Whether no attribute is set.
  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  /// `key="value"` pairs separated by single spaces.
  pub fn render(&self) -> String {
    let mut rendered = String::new();
    for (position, (key, value)) in self.0.iter().enumerate() {
      if position > 0 {
        rendered.push(' ');
      }
      let _ = write!(rendered, "{key}=\"{value}\"");
    }
    rendered
  }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    let mut attrs = Self::new();
    for (key, value) in iter {
      attrs.insert(key, value);
    }
    attrs
  }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Attributes {
  fn from(pairs: [(K, V); N]) -> Self {
    pairs.into_iter().collect()
  }
}

/// Attributes for `<script type="module" crossorigin>` tags.
pub fn module_script_attrs() -> Attributes {
  Attributes::from([("type", "module"), ("crossorigin", "")])
}

/// Attributes for `<script nomodule crossorigin>` tags.
pub fn legacy_script_attrs() -> Attributes {
  Attributes::from([("nomodule", ""), ("crossorigin", "")])
}

/// Attributes for `<link rel="modulepreload">` tags.
pub fn modulepreload_attrs() -> Attributes {
  Attributes::from([
    ("type", "text/javascript"),
    ("crossorigin", "anonymous"),
    ("rel", "modulepreload"),
    ("as", "script"),
  ])
}

/// `<script>` pointing at `src`.
pub fn script_tag(src: &str, attrs: &Attributes) -> String {
  if attrs.is_empty() {
    format!("<script src=\"{src}\"></script>")
  } else {
    format!("<script {} src=\"{src}\"></script>", attrs.render())
  }
}

/// `<link rel="stylesheet">` for `href`.
pub fn stylesheet_tag(href: &str) -> String {
  format!("<link rel=\"stylesheet\" href=\"{href}\" />")
}

/// `<link rel="preload" as="style">` for `href`.
pub fn stylesheet_preload_tag(href: &str) -> String {
  format!("<link rel=\"preload\" href=\"{href}\" as=\"style\" />")
}

/// `<link>` for `href` carrying `attrs`, typically [`modulepreload_attrs`].
pub fn preload_tag(href: &str, attrs: &Attributes) -> String {
  if attrs.is_empty() {
    format!("<link href=\"{href}\" />")
  } else {
    format!("<link href=\"{href}\" {} />", attrs.render())
  }
}

/// Inline preamble wiring the React refresh runtime served at `runtime_url`.
pub fn react_refresh_script(runtime_url: &str) -> String {
  format!(
    r#"<script type="module">
  import RefreshRuntime from '{runtime_url}'
  RefreshRuntime.injectIntoGlobalHook(window)
  window.$RefreshReg$ = () => {{}}
  window.$RefreshSig$ = () => (type) => type
  window.__vite_plugin_react_preamble_installed__ = true
</script>"#
  )
}
