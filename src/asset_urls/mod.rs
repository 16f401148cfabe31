//! URL helpers for assets served by the Vite dev server or from collected static files.
//!
//! URL joining, the static files collaborator and the dev/production resolvers live in
//! separate submodules so each can be tested on its own. Everything here is pure apart from
//! loading the optional hashed-name manifest.

mod join;
mod server;
mod storage;

pub use join::join_url;
pub use server::{dev_server_url, production_url};
pub use storage::{StaticFilesStorage, StaticStorage};
