//! Undirected simple graph with backtracking-friendly mutators.
//!
//! The search engine never copies a whole graph per recursive step. Instead a
//! branch detaches a vertex with [`Graph::remove_vertex`], recurses, and puts
//! it back with [`Graph::restore_vertex`] on unwind. The two calls must nest
//! in strict LIFO order; adjacency symmetry is an invariant maintained by the
//! mutators, not re-validated at runtime.
//!
//! Ordered maps are used throughout so that iteration order (and therefore
//! first-found-wins tie-breaking in the search) is reproducible run to run.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Vertex identifier. Unique within a graph, no implied contiguity.
pub type VertexId = u32;

/// Errors raised while constructing a graph from external input.
///
/// These are caller contract violations and surface at construction time
/// only; once a [`Graph`] exists its invariants hold for its whole lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The supplied adjacency listed `from -> to` without the mirror entry.
    #[error("asymmetric adjacency: {from} lists {to} but not vice versa")]
    AsymmetricAdjacency {
        /// Vertex whose neighbor set contains `to`.
        from: VertexId,
        /// Vertex whose neighbor set is missing `from`.
        to: VertexId,
    },

    /// An edge endpoint does not belong to the vertex set.
    #[error("unknown vertex {0} referenced by an edge")]
    UnknownVertex(VertexId),

    /// Simple graphs carry no self loops.
    #[error("self loop on vertex {0}")]
    SelfLoop(VertexId),
}

/// An undirected simple graph.
///
/// Adjacency is stored symmetrically (`v ∈ adj(u) ⟺ u ∈ adj(v)`) and the
/// edge count is maintained incrementally, so `edge_count` is always half the
/// degree sum.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Graph {
    adjacency: BTreeMap<VertexId, BTreeSet<VertexId>>,
    edge_count: usize,
}

impl Graph {
    /// Creates an empty graph.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            adjacency: BTreeMap::new(),
            edge_count: 0,
        }
    }

    /// Builds a graph from an explicit vertex set and edge list.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownVertex`] if an edge endpoint is not in
    /// `vertices`, or [`GraphError::SelfLoop`] for a degenerate edge.
    pub fn from_edges(
        vertices: impl IntoIterator<Item = VertexId>,
        edges: impl IntoIterator<Item = (VertexId, VertexId)>,
    ) -> Result<Self, GraphError> {
        let mut graph = Self::new();
        for v in vertices {
            graph.add_vertex(v);
        }
        for (u, v) in edges {
            graph.add_edge(u, v)?;
        }
        Ok(graph)
    }

    /// Builds a graph from a full adjacency description, validating symmetry.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::AsymmetricAdjacency`] when a neighbor entry has
    /// no mirror, [`GraphError::UnknownVertex`] when a neighbor is not a key,
    /// and [`GraphError::SelfLoop`] for self-referential entries.
    pub fn from_adjacency(
        adjacency: BTreeMap<VertexId, BTreeSet<VertexId>>,
    ) -> Result<Self, GraphError> {
        for (&u, neighbors) in &adjacency {
            for &v in neighbors {
                if u == v {
                    return Err(GraphError::SelfLoop(u));
                }
                let Some(back) = adjacency.get(&v) else {
                    return Err(GraphError::UnknownVertex(v));
                };
                if !back.contains(&u) {
                    return Err(GraphError::AsymmetricAdjacency { from: u, to: v });
                }
            }
        }
        let degree_sum: usize = adjacency.values().map(BTreeSet::len).sum();
        Ok(Self {
            adjacency,
            edge_count: degree_sum / 2,
        })
    }

    /// Inserts an isolated vertex. Re-inserting an existing vertex is a no-op.
    pub fn add_vertex(&mut self, v: VertexId) {
        self.adjacency.entry(v).or_default();
    }

    /// Connects two existing vertices. Duplicate edges are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownVertex`] if either endpoint is absent and
    /// [`GraphError::SelfLoop`] when `u == v`.
    pub fn add_edge(&mut self, u: VertexId, v: VertexId) -> Result<(), GraphError> {
        if u == v {
            return Err(GraphError::SelfLoop(u));
        }
        if !self.contains_vertex(u) {
            return Err(GraphError::UnknownVertex(u));
        }
        if !self.contains_vertex(v) {
            return Err(GraphError::UnknownVertex(v));
        }
        let inserted = self
            .adjacency
            .get_mut(&u)
            .is_some_and(|set| set.insert(v));
        if inserted {
            if let Some(set) = self.adjacency.get_mut(&v) {
                set.insert(u);
            }
            self.edge_count += 1;
        }
        Ok(())
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of undirected edges.
    #[must_use]
    pub const fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// True if `v` belongs to the vertex set.
    #[must_use]
    pub fn contains_vertex(&self, v: VertexId) -> bool {
        self.adjacency.contains_key(&v)
    }

    /// Iterates vertices in ascending id order.
    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.adjacency.keys().copied()
    }

    /// Neighbor set of `v`, or `None` when `v` is absent.
    #[must_use]
    pub fn neighbors(&self, v: VertexId) -> Option<&BTreeSet<VertexId>> {
        self.adjacency.get(&v)
    }

    /// Degree of `v` (0 for an absent vertex).
    #[must_use]
    pub fn degree(&self, v: VertexId) -> usize {
        self.adjacency.get(&v).map_or(0, BTreeSet::len)
    }

    /// True when an edge connects `u` and `v`.
    #[must_use]
    pub fn connection_exists(&self, u: VertexId, v: VertexId) -> bool {
        self.adjacency.get(&u).is_some_and(|set| set.contains(&v))
    }

    /// Detaches `v` and all incident edges, returning the removed neighbor
    /// set. The return value is the undo token for [`Self::restore_vertex`].
    #[contracts::debug_requires(self.contains_vertex(v), "removed vertex must be present")]
    #[contracts::debug_ensures(!self.contains_vertex(v))]
    pub fn remove_vertex(&mut self, v: VertexId) -> BTreeSet<VertexId> {
        let neighbors = self.adjacency.remove(&v).unwrap_or_default();
        for &n in &neighbors {
            if let Some(set) = self.adjacency.get_mut(&n) {
                set.remove(&v);
            }
        }
        self.edge_count -= neighbors.len();
        neighbors
    }

    /// Reattaches `v` with exactly the neighbor set a matching
    /// [`Self::remove_vertex`] returned. Calls must nest LIFO with removals;
    /// anything else breaks adjacency symmetry.
    #[contracts::debug_requires(!self.contains_vertex(v), "restored vertex must be absent")]
    #[contracts::debug_requires(
        neighbors.iter().all(|n| self.contains_vertex(*n)),
        "restored neighbors must all be present"
    )]
    #[contracts::debug_ensures(self.contains_vertex(v))]
    pub fn restore_vertex(&mut self, v: VertexId, neighbors: BTreeSet<VertexId>) {
        for &n in &neighbors {
            if let Some(set) = self.adjacency.get_mut(&n) {
                set.insert(v);
            }
        }
        self.edge_count += neighbors.len();
        self.adjacency.insert(v, neighbors);
    }

    /// New graph containing only the vertices in `keep` and the edges between
    /// them. Vertex ids are preserved.
    #[must_use]
    pub fn induced_subgraph(&self, keep: &BTreeSet<VertexId>) -> Self {
        let adjacency: BTreeMap<VertexId, BTreeSet<VertexId>> = self
            .adjacency
            .iter()
            .filter(|(v, _)| keep.contains(v))
            .map(|(&v, neighbors)| (v, neighbors.intersection(keep).copied().collect()))
            .collect();
        let degree_sum: usize = adjacency.values().map(BTreeSet::len).sum();
        Self {
            adjacency,
            edge_count: degree_sum / 2,
        }
    }
}

/// On-disk graph description consumed by the CLI.
///
/// Deserialization goes through [`GraphDoc::into_graph`] so that file input
/// is validated by the same constructor contract as every other source.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphDoc {
    /// Vertex ids. May list isolated vertices.
    pub vertices: Vec<VertexId>,
    /// Undirected edges as unordered pairs.
    pub edges: Vec<(VertexId, VertexId)>,
}

impl GraphDoc {
    /// Validates the description and builds the graph.
    ///
    /// # Errors
    ///
    /// Propagates [`GraphError`] from [`Graph::from_edges`].
    pub fn into_graph(self) -> Result<Graph, GraphError> {
        Graph::from_edges(self.vertices, self.edges)
    }

    /// Snapshot of an existing graph in document form.
    #[must_use]
    pub fn from_graph(graph: &Graph) -> Self {
        let vertices: Vec<VertexId> = graph.vertices().collect();
        let edges: Vec<(VertexId, VertexId)> = graph
            .vertices()
            .flat_map(|u| {
                graph
                    .neighbors(u)
                    .into_iter()
                    .flatten()
                    .filter(move |&&v| u < v)
                    .map(move |&v| (u, v))
            })
            .collect();
        Self { vertices, edges }
    }
}
