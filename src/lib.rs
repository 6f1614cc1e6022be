//! LEA discovery engine
//!
//! Captures a coach's findings against a fixed discovery questionnaire,
//! tracks coverage and maturity, exchanges sessions as JSON or Markdown
//! documents, keeps named version snapshots, and writes the client summary.

// Clippy allows for reasonable defaults
#![allow(clippy::new_without_default)] // Default not always appropriate for stateful types
#![allow(clippy::derivable_impls)] // Explicit Default impls can be clearer
#![allow(clippy::unnecessary_map_or)] // map_or can be clearer than alternatives

// Module declarations
pub mod analysis;
pub mod catalog;
pub mod codec;
pub mod commands;
pub mod config;
pub mod error;
pub mod file_storage;
pub mod models;
pub mod store;
pub mod summary;
pub mod versions;

pub use catalog::{Catalog, QuestionDefinition};
pub use error::{DiscoveryError, DiscoveryResult};
pub use models::*;
pub use store::{StateStore, SubscriptionId};
pub use versions::{VersionHistory, VersionSnapshot, VersionSummary};
