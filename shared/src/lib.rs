//! Shared error and result types for the kpop-catalog backend

// Re-export common dependencies
pub use anyhow;
pub use chrono;
pub use serde;
pub use serde_json;
pub use thiserror;
pub use tracing;

pub mod types;

pub use types::error::CatalogError;

pub type Result<T> = std::result::Result<T, CatalogError>;
