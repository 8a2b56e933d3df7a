//! Bounded co-authorship graph construction
//!
//! Breadth-first expansion from a root author, stopping at a depth limit and
//! a soft node budget, followed by one details fetch per placeholder.

use crate::graph::{CoauthorGraph, Node};
use futures::stream::{self, StreamExt};
use scholarnet_common::{
    errors::Result, normalize, AuthorId, AuthorProfile, BibliographicProvider, CoauthorLink,
};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

/// Depth and size budget for one build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphLimits {
    /// Nodes at this level are recorded but never expanded
    pub depth: u32,
    /// Expansion stops as soon as the graph holds this many nodes
    pub max_nodes: usize,
}

/// Builder tuning
#[derive(Debug, Clone, Copy)]
pub struct BuildOptions {
    /// Recent works requested per expansion
    pub works_page_size: usize,
    /// Details fetches in flight during the resolution pass
    pub resolve_concurrency: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            works_page_size: scholarnet_common::DEFAULT_WORKS_PAGE_SIZE,
            resolve_concurrency: 1,
        }
    }
}

/// Outcome of a placeholder details fetch
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Resolved(AuthorProfile),
    Unresolved { reason: String },
}

impl From<Result<AuthorProfile>> for Resolution {
    fn from(result: Result<AuthorProfile>) -> Self {
        match result {
            Ok(profile) => Resolution::Resolved(profile),
            Err(e) => Resolution::Unresolved {
                reason: e.to_string(),
            },
        }
    }
}

/// Mutable state of one in-flight build
struct TraversalContext {
    graph: CoauthorGraph,
    frontier: VecDeque<(AuthorId, u32)>,
    visited: HashSet<AuthorId>,
    limits: GraphLimits,
}

impl TraversalContext {
    fn new(root: AuthorId, profile: AuthorProfile, limits: GraphLimits) -> Self {
        let mut graph = CoauthorGraph::new();
        graph.insert_node(Node::center(root.clone(), profile));

        let mut frontier = VecDeque::new();
        frontier.push_back((root, 0));

        Self {
            graph,
            frontier,
            visited: HashSet::new(),
            limits,
        }
    }

    fn budget_left(&self) -> bool {
        self.graph.node_count() < self.limits.max_nodes
    }

    /// Next unvisited frontier entry, or `None` once the frontier is empty
    /// or the node budget is spent.
    fn next(&mut self) -> Option<(AuthorId, u32)> {
        while self.budget_left() {
            let (current, level) = self.frontier.pop_front()?;
            if self.visited.insert(current.clone()) {
                return Some((current, level));
            }
        }
        None
    }

    /// Fold one page of co-authorship links of `current` into the graph
    fn absorb(&mut self, current: &AuthorId, level: u32, links: Vec<CoauthorLink>) {
        for link in links {
            let Some(coauthor) = normalize(Some(link.author_id.as_str())) else {
                continue;
            };
            if &coauthor == current {
                continue;
            }

            if !self.graph.contains(&coauthor) {
                // Budget spent: unseen authors are dropped along with their edge
                if !self.budget_left() {
                    continue;
                }
                self.graph
                    .insert_node(Node::placeholder(coauthor.clone(), level + 1));
                if self.budget_left() {
                    self.frontier.push_back((coauthor.clone(), level + 1));
                }
            }

            self.graph.bump_edge(current, &coauthor);
        }
    }
}

/// Bounded BFS over the provider's co-authorship links
pub struct GraphBuilder {
    provider: Arc<dyn BibliographicProvider>,
    options: BuildOptions,
}

impl GraphBuilder {
    pub fn new(provider: Arc<dyn BibliographicProvider>, options: BuildOptions) -> Self {
        Self { provider, options }
    }

    /// Build the co-authorship graph around `root`.
    ///
    /// Fails when the root's details or any expansion's links cannot be
    /// fetched. A root the provider does not know fails with
    /// `AuthorNotFound` (404), any other root failure with an upstream error.
    /// Failed placeholder resolutions are tolerated: those nodes come back
    /// as placeholders.
    pub async fn build(&self, root: &AuthorId, limits: GraphLimits) -> Result<CoauthorGraph> {
        let profile = self.provider.author_details(root).await?;
        let mut ctx = TraversalContext::new(root.clone(), profile, limits);

        while let Some((current, level)) = ctx.next() {
            if level >= limits.depth {
                continue;
            }

            let links = self
                .provider
                .coauthor_links(&current, self.options.works_page_size)
                .await?;

            tracing::debug!(
                author = %current,
                level,
                links = links.len(),
                nodes = ctx.graph.node_count(),
                frontier = ctx.frontier.len(),
                "Expanded author"
            );

            ctx.absorb(&current, level, links);
        }

        let mut graph = ctx.graph;
        let unresolved = self.resolve_placeholders(&mut graph).await;
        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            unresolved,
            "Resolution pass complete"
        );
        Ok(graph)
    }

    /// Fetch details once for every placeholder. Returns how many stayed
    /// unresolved.
    async fn resolve_placeholders(&self, graph: &mut CoauthorGraph) -> usize {
        let pending = graph.placeholder_ids();
        if pending.is_empty() {
            return 0;
        }

        let provider = &self.provider;
        let outcomes: Vec<(AuthorId, Resolution)> = stream::iter(pending)
            .map(|id| async move {
                let resolution = Resolution::from(provider.author_details(&id).await);
                (id, resolution)
            })
            .buffer_unordered(self.options.resolve_concurrency.max(1))
            .collect()
            .await;

        let mut unresolved = 0;
        for (id, resolution) in outcomes {
            match resolution {
                Resolution::Resolved(profile) => {
                    if let Some(node) = graph.node_mut(id.as_str()) {
                        node.resolve(profile);
                    }
                }
                Resolution::Unresolved { reason } => {
                    unresolved += 1;
                    tracing::warn!(author = %id, reason = %reason, "Leaving placeholder unresolved");
                }
            }
        }

        unresolved
    }
}
