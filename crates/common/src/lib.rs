//! ScholarNet Common Library
//!
//! Shared code for the ScholarNet services including:
//! - Author identity normalization
//! - Bibliographic provider abstraction (OpenAlex, in-memory)
//! - Error types and handling
//! - Configuration management
//! - Metrics and observability

pub mod config;
pub mod errors;
pub mod identity;
pub mod metrics;
pub mod models;
pub mod provider;

// Re-export commonly used types
pub use config::AppConfig;
pub use errors::{AppError, Result};
pub use identity::{normalize, AuthorId};
pub use models::{AuthorProfile, AuthorSummary, CoauthorLink};
pub use provider::BibliographicProvider;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default OpenAlex API base URL
pub const DEFAULT_OPENALEX_BASE: &str = "https://api.openalex.org";

/// Default number of recent works fetched per co-authorship expansion
pub const DEFAULT_WORKS_PAGE_SIZE: usize = 30;
