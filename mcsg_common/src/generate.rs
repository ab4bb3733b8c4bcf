//! Seeded graph generators for demos, tests, and benchmarks.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::graph::{Graph, VertexId};

/// Erdős–Rényi G(n, p) random graph with a reproducible seed.
#[must_use]
pub fn gnp(n: usize, p: f64, seed: u64) -> Graph {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut graph = Graph::new();
    for v in 0..n {
        graph.add_vertex(v as VertexId);
    }
    for u in 0..n {
        for v in (u + 1)..n {
            if rng.gen_bool(p.clamp(0.0, 1.0)) {
                graph
                    .add_edge(u as VertexId, v as VertexId)
                    .expect("generated endpoints were just inserted");
            }
        }
    }
    graph
}

/// Cycle on `n` vertices (empty for `n < 3`).
#[must_use]
pub fn cycle(n: usize) -> Graph {
    if n < 3 {
        return Graph::new();
    }
    let mut graph = path(n);
    graph
        .add_edge((n - 1) as VertexId, 0)
        .expect("path endpoints exist");
    graph
}

/// Path on `n` vertices.
#[must_use]
pub fn path(n: usize) -> Graph {
    let mut graph = Graph::new();
    for v in 0..n {
        graph.add_vertex(v as VertexId);
    }
    for v in 1..n {
        graph
            .add_edge((v - 1) as VertexId, v as VertexId)
            .expect("generated endpoints were just inserted");
    }
    graph
}

/// Complete graph on `n` vertices.
#[must_use]
pub fn complete(n: usize) -> Graph {
    gnp(n, 1.0, 0)
}
