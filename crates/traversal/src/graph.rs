//! Co-authorship graph representation
//!
//! Nodes and edges are stored in insertion order with a side index, so the
//! serialized graph lists authors in discovery order and edges in the order
//! they were first observed.

use scholarnet_common::{AuthorId, AuthorProfile};
use serde::Serialize;
use std::collections::HashMap;

/// Whether a node carries provider details yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionState {
    /// Known only by id and level
    Placeholder,
    /// Details fetched
    Resolved,
}

/// One author in the graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: AuthorId,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub works_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// BFS depth of first discovery
    pub level: u32,
    pub is_center: bool,
    pub resolution_state: ResolutionState,
}

impl Node {
    /// Traversal root, always resolved
    pub fn center(id: AuthorId, profile: AuthorProfile) -> Self {
        let mut node = Self::placeholder(id, 0);
        node.is_center = true;
        node.resolve(profile);
        node
    }

    pub fn placeholder(id: AuthorId, level: u32) -> Self {
        Self {
            label: id.to_string(),
            id,
            institution: None,
            works_count: None,
            url: None,
            level,
            is_center: false,
            resolution_state: ResolutionState::Placeholder,
        }
    }

    /// Replace display fields. Level and center flag stay untouched.
    pub fn resolve(&mut self, profile: AuthorProfile) {
        self.label = profile.label;
        self.institution = profile.institution;
        self.works_count = profile.works_count;
        self.url = profile.url;
        self.resolution_state = ResolutionState::Resolved;
    }

    pub fn is_placeholder(&self) -> bool {
        self.resolution_state == ResolutionState::Placeholder
    }
}

/// Unordered author pair, stored sorted so (A,B) and (B,A) collide
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EdgeKey(AuthorId, AuthorId);

impl EdgeKey {
    /// `None` for a self-loop
    pub fn new(a: &AuthorId, b: &AuthorId) -> Option<Self> {
        if a == b {
            None
        } else if a < b {
            Some(Self(a.clone(), b.clone()))
        } else {
            Some(Self(b.clone(), a.clone()))
        }
    }
}

/// Weighted co-authorship edge, `source < target`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub source: AuthorId,
    pub target: AuthorId,
    pub weight: u32,
}

/// In-memory co-authorship graph, scoped to one request
#[derive(Debug, Clone, Default, Serialize)]
pub struct CoauthorGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,

    #[serde(skip)]
    node_index: HashMap<AuthorId, usize>,

    #[serde(skip)]
    edge_index: HashMap<EdgeKey, usize>,
}

impl CoauthorGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node unless its id is already present. Returns whether it
    /// was inserted; an existing node is never overwritten.
    pub fn insert_node(&mut self, node: Node) -> bool {
        if self.node_index.contains_key(&node.id) {
            return false;
        }
        self.node_index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        true
    }

    pub fn contains(&self, id: &AuthorId) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.node_index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        match self.node_index.get(id) {
            Some(&i) => Some(&mut self.nodes[i]),
            None => None,
        }
    }

    /// Nodes in discovery order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Edges in first-observation order
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Add one observation of the pair. Returns the new weight, or `None`
    /// for a self-loop.
    pub fn bump_edge(&mut self, a: &AuthorId, b: &AuthorId) -> Option<u32> {
        let key = EdgeKey::new(a, b)?;

        if let Some(&i) = self.edge_index.get(&key) {
            let edge = &mut self.edges[i];
            edge.weight += 1;
            return Some(edge.weight);
        }

        self.edges.push(Edge {
            source: key.0.clone(),
            target: key.1.clone(),
            weight: 1,
        });
        self.edge_index.insert(key, self.edges.len() - 1);
        Some(1)
    }

    /// Weight of the pair in either order, 0 when never observed
    pub fn edge_weight(&self, a: &AuthorId, b: &AuthorId) -> u32 {
        EdgeKey::new(a, b)
            .and_then(|key| self.edge_index.get(&key))
            .map(|&i| self.edges[i].weight)
            .unwrap_or(0)
    }

    /// Ids of nodes still waiting for details, in discovery order
    pub fn placeholder_ids(&self) -> Vec<AuthorId> {
        self.nodes
            .iter()
            .filter(|n| n.is_placeholder())
            .map(|n| n.id.clone())
            .collect()
    }

    pub fn unresolved_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_placeholder()).count()
    }
}
