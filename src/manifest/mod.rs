//! Vite build manifest parsing, per-configuration caching and the CSS dependency walk.

mod graph;
mod store;
mod walk;

pub use graph::{ManifestEntry, ManifestGraph};
pub use store::ManifestStore;
pub use walk::css_chain;
