//! The search objective: a monotone score of matched vertex and edge counts.

/// Scoring function for a partial match.
///
/// Implementations must be non-decreasing in both arguments; the search's
/// admissibility pruning relies on that monotonicity and nothing re-checks it
/// at runtime. The score must also be a pure function of its arguments, since
/// it is re-evaluated freely across branches and workers.
pub trait Valuation: Sync {
    /// Value of a match with `vertices` mapped vertices and `edges` matched
    /// edges.
    fn score(&self, vertices: usize, edges: usize) -> f64;
}

impl<F> Valuation for F
where
    F: Fn(usize, usize) -> f64 + Sync,
{
    fn score(&self, vertices: usize, edges: usize) -> f64 {
        self(vertices, edges)
    }
}

/// A valuation closed over counts accumulated by an enclosing match.
///
/// The disconnected continuation scores a fresh sub-search as if its vertices
/// and edges extended the already-committed match, so the shared best-score
/// comparison stays in one currency.
#[derive(Clone, Copy)]
pub struct OffsetValuation<'a> {
    inner: &'a dyn Valuation,
    base_vertices: usize,
    base_edges: usize,
}

impl<'a> OffsetValuation<'a> {
    /// Wraps `inner`, shifting every evaluation by the accumulated counts.
    #[must_use]
    pub const fn new(inner: &'a dyn Valuation, base_vertices: usize, base_edges: usize) -> Self {
        Self {
            inner,
            base_vertices,
            base_edges,
        }
    }
}

impl Valuation for OffsetValuation<'_> {
    fn score(&self, vertices: usize, edges: usize) -> f64 {
        self.inner
            .score(self.base_vertices + vertices, self.base_edges + edges)
    }
}
