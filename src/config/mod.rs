// Configuration loading and merging

pub mod loader;
pub mod merger;

pub use loader::{ConfigLoader, LeaConfig};
pub use merger::{ConfigMerger, PartialConfig};
