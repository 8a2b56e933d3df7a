//! Bibliographic provider abstraction
//!
//! The traversal engine only ever talks to a [`BibliographicProvider`]:
//! - OpenAlex (`https://api.openalex.org`)
//! - In-memory fixtures for tests and offline demos

mod memory;
mod openalex;

pub use memory::{InMemoryProvider, ProviderCall};
pub use openalex::OpenAlexProvider;

use crate::config::ProviderConfig;
use crate::errors::{AppError, Result};
use crate::identity::AuthorId;
use crate::models::{AuthorProfile, AuthorSummary, CoauthorLink};
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for bibliographic catalog access
#[async_trait]
pub trait BibliographicProvider: Send + Sync {
    /// Fetch profile details for one author.
    ///
    /// A missing record is reported as [`AppError::AuthorNotFound`], every
    /// other failure as an upstream error.
    async fn author_details(&self, id: &AuthorId) -> Result<AuthorProfile>;

    /// Fetch one page of the author's most recent works and return every
    /// authorship on them, in work order. No completeness promise past the
    /// first page.
    async fn coauthor_links(&self, id: &AuthorId, page_size: usize) -> Result<Vec<CoauthorLink>>;

    /// Free-text author search
    async fn search_authors(&self, query: &str, limit: usize) -> Result<Vec<AuthorSummary>>;

    /// Provider name for logs and metrics
    fn name(&self) -> &str;
}

/// Create a provider based on configuration
pub fn create_provider(config: &ProviderConfig) -> Result<Arc<dyn BibliographicProvider>> {
    match config.kind.as_str() {
        "openalex" => Ok(Arc::new(OpenAlexProvider::new(config)?)),
        "memory" => {
            tracing::warn!("Using in-memory sample provider");
            Ok(Arc::new(InMemoryProvider::sample()))
        }
        other => Err(AppError::Configuration {
            message: format!("Unknown provider kind: {}", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_known_providers() {
        let mut config = ProviderConfig::default();
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.name(), "openalex");

        config.kind = "memory".to_string();
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.name(), "memory");
    }

    #[test]
    fn test_unknown_provider_is_config_error() {
        let config = ProviderConfig {
            kind: "scopus".to_string(),
            ..ProviderConfig::default()
        };
        let err = create_provider(&config).err().unwrap();
        assert!(matches!(err, AppError::Configuration { .. }));
    }
}
