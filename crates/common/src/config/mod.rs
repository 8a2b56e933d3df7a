//! Configuration management for ScholarNet services
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default, config/{APP_ENV}, config/local)
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Bibliographic provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Traversal budgets and defaults
    #[serde(default)]
    pub traversal: TraversalConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Inbound rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory served as the static front-end
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    /// Maximum concurrent requests
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_requests: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// Provider kind: openalex, memory
    #[serde(default = "default_provider_kind")]
    pub kind: String,

    /// API base URL
    #[serde(default = "default_provider_base_url")]
    pub base_url: String,

    /// Per-call timeout in seconds
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,

    /// Contact address sent as the `mailto` parameter
    pub mailto: Option<String>,

    /// User agent for outgoing requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TraversalConfig {
    /// Recent works examined per expanded author
    #[serde(default = "default_works_page_size")]
    pub works_page_size: usize,

    /// Rows returned by the author search passthrough
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,

    /// Default BFS depth when the caller gives none
    #[serde(default = "default_depth")]
    pub default_depth: u32,

    /// Default node budget when the caller gives none
    #[serde(default = "default_max_nodes")]
    pub default_max_nodes: usize,

    /// Details fetches in flight during the resolution pass (1 = sequential)
    #[serde(default = "default_resolve_concurrency")]
    pub resolve_concurrency: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Expose Prometheus metrics at /metrics
    #[serde(default = "default_enabled")]
    pub metrics_enabled: bool,

    /// Service name for logs
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Requests per second (whole gateway)
    #[serde(default = "default_rate_limit")]
    pub requests_per_second: u32,

    /// Burst capacity
    #[serde(default = "default_burst")]
    pub burst: u32,

    /// Enable rate limiting
    #[serde(default = "default_disabled")]
    pub enabled: bool,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8000 }
fn default_static_dir() -> String { "static".to_string() }
fn default_max_concurrent() -> usize { 64 }
fn default_provider_kind() -> String { "openalex".to_string() }
fn default_provider_base_url() -> String { crate::DEFAULT_OPENALEX_BASE.to_string() }
fn default_provider_timeout() -> u64 { 20 }
fn default_user_agent() -> String { format!("scholarnet/{}", crate::VERSION) }
fn default_works_page_size() -> usize { crate::DEFAULT_WORKS_PAGE_SIZE }
fn default_search_limit() -> usize { 10 }
fn default_depth() -> u32 { 1 }
fn default_max_nodes() -> usize { 300 }
fn default_resolve_concurrency() -> usize { 1 }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_service_name() -> String { "scholarnet".to_string() }
fn default_rate_limit() -> u32 { 20 }
fn default_burst() -> u32 { 40 }
fn default_enabled() -> bool { true }
fn default_disabled() -> bool { false }

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))
            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // Load local overrides
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables with APP__ prefix
            // e.g., APP__SERVER__PORT=8081
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

}

impl ProviderConfig {
    /// Per-call timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            max_concurrent_requests: default_max_concurrent(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: default_provider_kind(),
            base_url: default_provider_base_url(),
            timeout_secs: default_provider_timeout(),
            mailto: None,
            user_agent: default_user_agent(),
        }
    }
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            works_page_size: default_works_page_size(),
            search_limit: default_search_limit(),
            default_depth: default_depth(),
            default_max_nodes: default_max_nodes(),
            resolve_concurrency: default_resolve_concurrency(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
            metrics_enabled: default_enabled(),
            service_name: default_service_name(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: default_rate_limit(),
            burst: default_burst(),
            enabled: default_disabled(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            provider: ProviderConfig::default(),
            traversal: TraversalConfig::default(),
            observability: ObservabilityConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.provider.base_url, "https://api.openalex.org");
        assert_eq!(config.traversal.works_page_size, 30);
        assert_eq!(config.traversal.default_max_nodes, 300);
        assert!(!config.rate_limit.enabled);
    }

    #[test]
    fn test_provider_timeout() {
        let config = AppConfig::default();
        assert_eq!(config.provider.timeout(), Duration::from_secs(20));
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let config: AppConfig = Config::builder()
            .set_override("provider.kind", "memory")
            .unwrap()
            .set_override("traversal.resolve_concurrency", 4)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.provider.kind, "memory");
        assert_eq!(config.provider.timeout_secs, 20);
        assert_eq!(config.traversal.resolve_concurrency, 4);
        assert_eq!(config.traversal.search_limit, 10);
        assert_eq!(config.server.static_dir, "static");
    }
}
