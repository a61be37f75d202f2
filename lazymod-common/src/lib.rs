// lazymod-common/src/lib.rs
pub mod config;
pub mod error;
pub mod manifest;
pub mod module_id;

// Re-export key types
pub use config::Config;
pub use error::{LazymodError, ResolutionError, Result};
pub use manifest::{Manifest, ModuleSpec};
