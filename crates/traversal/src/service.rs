//! Request-facing network service
//!
//! Validates caller input, normalizes ids and drives the traversals.

use crate::builder::{BuildOptions, GraphBuilder, GraphLimits};
use crate::graph::CoauthorGraph;
use crate::path::{CoauthorPath, PathFinder};
use scholarnet_common::{
    config::TraversalConfig,
    errors::{AppError, Result},
    metrics, normalize, AuthorId, AuthorSummary, BibliographicProvider,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use validator::{Validate, ValidationErrors};

/// Graph request parameters
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GraphParams {
    pub author_id: String,

    #[validate(range(min = 1, max = 3))]
    pub depth: u32,

    #[validate(range(min = 20, max = 1200))]
    pub max_nodes: usize,
}

#[derive(Debug, Validate)]
struct SearchParams {
    #[validate(length(min = 2))]
    query: String,
}

/// Summary of a build
#[derive(Debug, Clone, Serialize)]
pub struct GraphMeta {
    pub root: AuthorId,
    pub depth: u32,
    pub max_nodes: usize,
    pub node_count: usize,
    pub edge_count: usize,
    pub unresolved_count: usize,
}

/// Graph plus build summary, as returned to callers
#[derive(Debug, Clone, Serialize)]
pub struct GraphResponse {
    #[serde(flatten)]
    pub graph: CoauthorGraph,
    pub meta: GraphMeta,
}

/// Entry point for graph, path and search requests
pub struct NetworkService {
    provider: Arc<dyn BibliographicProvider>,
    config: TraversalConfig,
}

impl NetworkService {
    pub fn new(provider: Arc<dyn BibliographicProvider>, config: TraversalConfig) -> Self {
        Self { provider, config }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn config(&self) -> &TraversalConfig {
        &self.config
    }

    /// Build the bounded co-authorship graph around an author.
    ///
    /// An unknown root yields `AuthorNotFound` (404) rather than an upstream
    /// error.
    pub async fn build_graph(&self, params: GraphParams) -> Result<GraphResponse> {
        params.validate().map_err(validation_error)?;
        let root = required_id(&params.author_id, "author_id")?;

        let start = Instant::now();
        let builder = GraphBuilder::new(
            self.provider.clone(),
            BuildOptions {
                works_page_size: self.config.works_page_size,
                resolve_concurrency: self.config.resolve_concurrency,
            },
        );
        let limits = GraphLimits {
            depth: params.depth,
            max_nodes: params.max_nodes,
        };

        let result = builder.build(&root, limits).await;
        let elapsed = start.elapsed();
        metrics::record_traversal("graph", elapsed.as_secs_f64(), result.is_ok());

        let graph = result.map_err(|e| {
            tracing::warn!(root = %root, error = %e, "Graph build failed");
            e
        })?;

        let meta = GraphMeta {
            root: root.clone(),
            depth: params.depth,
            max_nodes: params.max_nodes,
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            unresolved_count: graph.unresolved_count(),
        };
        metrics::record_graph(meta.node_count, meta.edge_count, meta.unresolved_count);

        tracing::info!(
            root = %root,
            depth = meta.depth,
            max_nodes = meta.max_nodes,
            nodes = meta.node_count,
            edges = meta.edge_count,
            unresolved = meta.unresolved_count,
            latency_ms = elapsed.as_millis() as u64,
            "Graph built"
        );

        Ok(GraphResponse { graph, meta })
    }

    /// Shortest co-authorship chain between two authors
    pub async fn find_shortest_path(&self, author_a: &str, author_b: &str) -> Result<CoauthorPath> {
        let start_id = required_id(author_a, "author_a")?;
        let target_id = required_id(author_b, "author_b")?;

        let start = Instant::now();
        let finder = PathFinder::new(self.provider.clone(), self.config.works_page_size);
        let result = finder.shortest_path(&start_id, &target_id).await;
        let elapsed = start.elapsed();
        metrics::record_traversal("path", elapsed.as_secs_f64(), result.is_ok());

        let path = result.map_err(|e| {
            tracing::warn!(from = %start_id, to = %target_id, error = %e, "Path search failed");
            e
        })?;

        tracing::info!(
            from = %start_id,
            to = %target_id,
            hops = ?path.hops(),
            latency_ms = elapsed.as_millis() as u64,
            "Path search completed"
        );

        Ok(path)
    }

    /// Author search passthrough
    pub async fn search_authors(&self, query: &str) -> Result<Vec<AuthorSummary>> {
        let query = query.trim();
        SearchParams {
            query: query.to_string(),
        }
        .validate()
        .map_err(validation_error)?;

        let results = self
            .provider
            .search_authors(query, self.config.search_limit)
            .await?;

        tracing::info!(query = %query, results = results.len(), "Author search completed");
        Ok(results)
    }
}

fn required_id(raw: &str, field: &str) -> Result<AuthorId> {
    let id = normalize(Some(raw)).ok_or_else(|| AppError::MissingField {
        field: field.to_string(),
    })?;

    if !id.is_catalog_key() {
        return Err(AppError::Validation {
            message: format!("{} must be an author id or author URL", field),
            field: Some(field.to_string()),
        });
    }
    Ok(id)
}

fn validation_error(errors: ValidationErrors) -> AppError {
    let field = errors
        .field_errors()
        .keys()
        .next()
        .map(|name| name.to_string());
    AppError::Validation {
        message: errors.to_string(),
        field,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scholarnet_common::provider::InMemoryProvider;

    fn service(provider: InMemoryProvider) -> NetworkService {
        NetworkService::new(Arc::new(provider), TraversalConfig::default())
    }

    fn params(author_id: &str, depth: u32, max_nodes: usize) -> GraphParams {
        GraphParams {
            author_id: author_id.to_string(),
            depth,
            max_nodes,
        }
    }

    #[tokio::test]
    async fn test_build_graph_response() {
        let service = service(InMemoryProvider::sample());
        let response = service
            .build_graph(params("https://openalex.org/A1", 1, 300))
            .await
            .unwrap();

        assert_eq!(response.meta.root.as_str(), "A1");
        assert_eq!(response.meta.node_count, response.graph.node_count());
        assert_eq!(response.meta.node_count, 4);
        assert_eq!(response.meta.unresolved_count, 0);

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["nodes"].as_array().unwrap().len(), 4);
        assert_eq!(value["meta"]["depth"], 1);
        assert_eq!(value["nodes"][0]["label"], "Ada Lovelace");
    }

    #[tokio::test]
    async fn test_graph_params_validation() {
        let service = service(InMemoryProvider::sample());

        let cases = [
            (0, 300, "depth"),
            (4, 300, "depth"),
            (1, 19, "max_nodes"),
            (1, 1201, "max_nodes"),
        ];
        for (depth, max_nodes, field) in cases {
            let err = service
                .build_graph(params("A1", depth, max_nodes))
                .await
                .unwrap_err();
            match err {
                AppError::Validation { field: Some(f), .. } => assert_eq!(f, field),
                other => panic!("unexpected error: {other:?}"),
            }
        }

        let err = service.build_graph(params("", 1, 300)).await.unwrap_err();
        assert!(matches!(err, AppError::MissingField { .. }));
    }

    #[tokio::test]
    async fn test_shortest_path_passthrough() {
        let service = service(InMemoryProvider::sample());
        let path = service.find_shortest_path("A3", "https://openalex.org/A6").await.unwrap();
        let ids: Vec<&str> = path.path.iter().map(AuthorId::as_str).collect();
        assert_eq!(ids, vec!["A3", "A1", "A2", "A5", "A6"]);

        let err = service.find_shortest_path("A1", "").await.unwrap_err();
        assert!(matches!(err, AppError::MissingField { ref field } if field == "author_b"));
    }

    #[tokio::test]
    async fn test_malformed_ids_rejected_before_traversal() {
        let provider = Arc::new(InMemoryProvider::sample());
        let service = NetworkService::new(provider.clone(), TraversalConfig::default());

        let err = service.build_graph(params("A1/works", 1, 300)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { field: Some(ref f), .. } if f == "author_id"));

        let err = service.find_shortest_path("A1", "A2|A5").await.unwrap_err();
        assert!(matches!(err, AppError::Validation { field: Some(ref f), .. } if f == "author_b"));

        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_search_validation() {
        let service = service(InMemoryProvider::sample());

        let err = service.search_authors(" a ").await.unwrap_err();
        assert!(err.is_client_error());

        let rows = service.search_authors("  babbage ").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].short_id.as_deref(), Some("A2"));
    }
}
