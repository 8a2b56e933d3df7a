//! Co-authorship network handlers
//!
//! Thin adapters from query strings to [`NetworkService`] calls.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use scholarnet_common::{errors::{AppError, Result}, AuthorSummary};
use scholarnet_traversal::{CoauthorPath, GraphParams, GraphResponse};
use serde::{Deserialize, Serialize};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct GraphQuery {
    pub author_id: Option<String>,
    pub depth: Option<u32>,
    pub max_nodes: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct PathQuery {
    pub author_a: Option<String>,
    pub author_b: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<AuthorSummary>,
}

/// GET /api/graph
pub async fn graph(
    State(state): State<AppState>,
    query: std::result::Result<Query<GraphQuery>, QueryRejection>,
) -> Result<Json<GraphResponse>> {
    let Query(query) = query.map_err(rejection)?;
    let defaults = state.service.config();

    let params = GraphParams {
        author_id: query.author_id.unwrap_or_default(),
        depth: query.depth.unwrap_or(defaults.default_depth),
        max_nodes: query.max_nodes.unwrap_or(defaults.default_max_nodes),
    };

    let response = state.service.build_graph(params).await?;
    Ok(Json(response))
}

/// GET /api/shortest_path
pub async fn shortest_path(
    State(state): State<AppState>,
    query: std::result::Result<Query<PathQuery>, QueryRejection>,
) -> Result<Json<CoauthorPath>> {
    let Query(query) = query.map_err(rejection)?;

    let path = state
        .service
        .find_shortest_path(
            query.author_a.as_deref().unwrap_or_default(),
            query.author_b.as_deref().unwrap_or_default(),
        )
        .await?;
    Ok(Json(path))
}

/// GET /api/search_authors
pub async fn search_authors(
    State(state): State<AppState>,
    query: std::result::Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<SearchResponse>> {
    let Query(query) = query.map_err(rejection)?;

    let results = state.service.search_authors(&query.query).await?;
    Ok(Json(SearchResponse { results }))
}

fn rejection(err: QueryRejection) -> AppError {
    AppError::Validation {
        message: err.body_text(),
        field: None,
    }
}
