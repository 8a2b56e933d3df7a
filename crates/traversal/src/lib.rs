//! ScholarNet traversal engine
//!
//! Breadth-first traversals over a bibliographic provider's co-authorship
//! links:
//! - [`GraphBuilder`]: bounded-depth, bounded-size co-authorship graph
//! - [`PathFinder`]: shortest co-authorship chain between two authors
//! - [`NetworkService`]: validated request-facing entry point

pub mod builder;
pub mod graph;
pub mod path;
pub mod service;

pub use builder::{BuildOptions, GraphBuilder, GraphLimits, Resolution};
pub use graph::{CoauthorGraph, Edge, EdgeKey, Node, ResolutionState};
pub use path::{CoauthorPath, PathFinder};
pub use service::{GraphMeta, GraphParams, GraphResponse, NetworkService};
