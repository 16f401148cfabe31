use std::collections::{HashMap, HashSet};

use super::{ManifestEntry, ManifestGraph};
use crate::config::CyclePolicy;
use crate::error::{AssetError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
  Active,
  Done,
}

/// Ordered CSS paths needed to render the entry at `root`.
///
/// Imports are walked depth-first before the entry's own stylesheets, so dependency CSS
/// always precedes the CSS that depends on it. Each path is reported once. Nodes already
/// walked are not revisited; an edge back onto the current path is handled by `policy`.
pub fn css_chain<'g>(
  graph: &'g ManifestGraph,
  root: &str,
  policy: CyclePolicy,
) -> Result<Vec<&'g str>> {
  let mut walker = CssWalker {
    graph,
    policy,
    visits: HashMap::new(),
    stack: Vec::new(),
    seen_css: HashSet::new(),
    chain: Vec::new(),
  };
  let (root, _) = graph.lookup(root)?;
  walker.walk(root)?;
  Ok(walker.chain)
}

/// Node on the active path and the next of its imports to descend into.
struct Frame<'g> {
  key: &'g str,
  entry: &'g ManifestEntry,
  next_import: usize,
}

struct CssWalker<'g> {
  graph: &'g ManifestGraph,
  policy: CyclePolicy,
  visits: HashMap<&'g str, Visit>,
  stack: Vec<Frame<'g>>,
  seen_css: HashSet<&'g str>,
  chain: Vec<&'g str>,
}

impl<'g> CssWalker<'g> {
  /// Iterative depth-first walk; manifest depth is bounded by the heap, not the call stack.
  fn walk(&mut self, root: &'g str) -> Result<()> {
    self.enter(root)?;

    while let Some(frame) = self.stack.last_mut() {
      let entry = frame.entry;
      if let Some(import) = entry.imports.get(frame.next_import) {
        frame.next_import += 1;
        match self.visits.get(import.as_str()).copied() {
          Some(Visit::Done) => {}
          Some(Visit::Active) => self.on_cycle(import)?,
          None => self.enter(import)?,
        }
        continue;
      }

      let key = frame.key;
      self.stack.pop();
      for css in &entry.css {
        if self.seen_css.insert(css) {
          self.chain.push(css);
        }
      }
      self.visits.insert(key, Visit::Done);
    }
    Ok(())
  }

  fn enter(&mut self, key: &'g str) -> Result<()> {
    let graph = self.graph;
    let entry = graph.entry(key)?;
    self.visits.insert(key, Visit::Active);
    self.stack.push(Frame {
      key,
      entry,
      next_import: 0,
    });
    Ok(())
  }

  fn on_cycle(&self, key: &str) -> Result<()> {
    match self.policy {
      CyclePolicy::Skip => Ok(()),
      CyclePolicy::Fail => {
        let start = self
          .stack
          .iter()
          .position(|frame| frame.key == key)
          .unwrap_or_default();
        let mut cycle: Vec<&str> = self.stack[start..].iter().map(|frame| frame.key).collect();
        cycle.push(key);
        Err(AssetError::CyclicManifest {
          cycle: cycle.join(" -> "),
          manifest: self.graph.source().to_path_buf(),
        })
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::path::Path;

  fn graph(content: &str) -> ManifestGraph {
    ManifestGraph::parse(Path::new("manifest.json"), content).expect("valid manifest")
  }

  #[test]
  fn dependency_css_precedes_entry_css() {
    let graph = graph(
      r#"{
        "main.js": {"file": "main.js", "src": "main.js", "isEntry": true,
                    "css": ["main.css"], "imports": ["shared.js"]},
        "shared.js": {"file": "shared.js", "src": "shared.js", "isEntry": false,
                      "css": ["shared.css"], "imports": ["base.js"]},
        "base.js": {"file": "base.js", "src": "base.js", "isEntry": false, "css": ["base.css"]}
      }"#,
    );

    let chain = css_chain(&graph, "main.js", CyclePolicy::Skip).unwrap();
    assert_eq!(chain, vec!["base.css", "shared.css", "main.css"]);
  }

  #[test]
  fn shared_stylesheets_appear_once() {
    let graph = graph(
      r#"{
        "page.js": {"file": "page.js", "src": "page.js", "isEntry": true,
                    "css": ["page.css", "theme.css"], "imports": ["a.js", "b.js"]},
        "a.js": {"file": "a.js", "src": "a.js", "isEntry": false,
                 "css": ["theme.css", "a.css"], "imports": ["common.js"]},
        "b.js": {"file": "b.js", "src": "b.js", "isEntry": false,
                 "css": ["b.css"], "imports": ["common.js"]},
        "common.js": {"file": "common.js", "src": "common.js", "isEntry": false,
                      "css": ["common.css"]}
      }"#,
    );

    let chain = css_chain(&graph, "page.js", CyclePolicy::Skip).unwrap();
    assert_eq!(
      chain,
      vec!["common.css", "theme.css", "a.css", "b.css", "page.css"]
    );
  }

  #[test]
  fn entry_without_dependencies_has_own_css_only() {
    let graph = graph(
      r#"{"solo.js": {"file": "solo.js", "src": "solo.js", "isEntry": true, "css": ["solo.css"]}}"#,
    );
    assert_eq!(
      css_chain(&graph, "solo.js", CyclePolicy::Skip).unwrap(),
      vec!["solo.css"]
    );
  }

  const CYCLIC: &str = r#"{
    "a.js": {"file": "a.js", "src": "a.js", "isEntry": true, "css": ["a.css"], "imports": ["b.js"]},
    "b.js": {"file": "b.js", "src": "b.js", "isEntry": false, "css": ["b.css"], "imports": ["a.js"]}
  }"#;

  #[test]
  fn cycles_are_skipped_by_default() {
    let graph = graph(CYCLIC);
    let chain = css_chain(&graph, "a.js", CyclePolicy::Skip).unwrap();
    assert_eq!(chain, vec!["b.css", "a.css"]);
  }

  #[test]
  fn cycles_fail_when_requested() {
    let graph = graph(CYCLIC);
    let err = css_chain(&graph, "a.js", CyclePolicy::Fail).unwrap_err();

    match err {
      AssetError::CyclicManifest { cycle, .. } => assert_eq!(cycle, "a.js -> b.js -> a.js"),
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn self_import_is_a_cycle() {
    let graph = graph(
      r#"{"loop.js": {"file": "loop.js", "src": "loop.js", "isEntry": true, "imports": ["loop.js"]}}"#,
    );
    assert!(css_chain(&graph, "loop.js", CyclePolicy::Skip).unwrap().is_empty());
    assert!(css_chain(&graph, "loop.js", CyclePolicy::Fail).is_err());
  }

  #[test]
  fn unknown_root_is_not_found() {
    let graph = graph("{}");
    assert!(matches!(
      css_chain(&graph, "missing.js", CyclePolicy::Skip),
      Err(AssetError::AssetNotFound { .. })
    ));
  }

  #[test]
  fn deep_import_chains_do_not_exhaust_the_stack() {
    const DEPTH: usize = 100_000;
    let entries = (0..DEPTH).map(|level| {
      let key = format!("chunk{level}.js");
      let imports = if level + 1 < DEPTH {
        vec![format!("chunk{}.js", level + 1)]
      } else {
        Vec::new()
      };
      let entry = ManifestEntry {
        file: key.clone(),
        src: key.clone(),
        is_entry: level == 0,
        css: vec![format!("chunk{level}.css")],
        imports,
      };
      (key, entry)
    });
    let graph = ManifestGraph::from_entries(Path::new("manifest.json"), entries).unwrap();

    let chain = css_chain(&graph, "chunk0.js", CyclePolicy::Fail).unwrap();
    assert_eq!(chain.len(), DEPTH);
    assert_eq!(chain[0], format!("chunk{}.css", DEPTH - 1));
    assert_eq!(chain[DEPTH - 1], "chunk0.css");
  }
}
