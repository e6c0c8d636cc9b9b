//! Folio Common Library
//!
//! Shared code for the Folio document service:
//! - Configuration management
//! - Error types and handling
//! - Domain models (documents, selections, metadata)
//! - Database entities, repositories and the document column selector
//! - Metadata generation client
//! - Metrics helpers

pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod metagen;
pub mod metrics;

// Re-export commonly used types
pub use config::AppConfig;
pub use db::{DbPool, DocumentRepository, FieldSelection, MetaRepository, SelectionRepository};
pub use errors::{AppError, Result};
pub use metagen::{HttpMetaGenerator, MetaGenerator};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
