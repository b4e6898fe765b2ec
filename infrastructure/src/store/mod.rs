//! Idea store adapters
//!
//! - [`JsonFileIdeaStore`]: one directory per idea under the data directory
//! - [`InMemoryIdeaStore`]: process-local, for `storage.ephemeral`

mod json_store;
mod memory;

pub use json_store::JsonFileIdeaStore;
pub use memory::InMemoryIdeaStore;
