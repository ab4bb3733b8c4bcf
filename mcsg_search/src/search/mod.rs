//! The recursive branch-and-bound matching engine.
//!
//! One [`SearchCtx`] drives one search branch over a mutable, possibly
//! vertex-pruned copy of G, an immutable H, and a [`MatchState`]. Maximal
//! extensions are reported through the context's emit sink; the shared best
//! score feeds the admissibility bound that prunes hopeless branches.

use mcsg_common::{Graph, OffsetValuation, Valuation, VertexId};
use tracing::trace;

use crate::best::SharedBest;
use crate::state::{Mapping, MatchState};

mod heuristics;

pub(crate) use heuristics::{pick_extension, pick_seed};

/// Sink for maximal matches: `(score, mapping, matched_edges)`.
///
/// Implementations must materialize copies lazily; the search hands out a
/// borrow of its live mapping, valid only for the duration of the call.
pub(crate) type EmitSink<'a> = dyn Fn(f64, &Mapping, usize) + 'a;

pub(crate) struct SearchCtx<'a> {
    /// The graph matched into. Never mutated.
    pub h: &'a Graph,
    /// The (monotone) objective.
    pub valuation: &'a dyn Valuation,
    /// Shared best score for the pruning bound.
    pub best: &'a SharedBest,
    /// Extend maximal matches through outsider components.
    pub analyze_disconnected: bool,
    /// Fewest-mapped-connections candidate pick (lookahead mode).
    pub heuristic_pick: bool,
    /// Explore leaving a G vertex unmatched. Off in exact-embedding mode.
    pub allow_omission: bool,
    /// Where improvements are reported.
    pub emit: &'a EmitSink<'a>,
}

/// Local isomorphism check for a candidate pair against every mapped pair.
///
/// Returns the pair's edge contribution (connections into the mapping) when
/// compatible, `None` on any structure mismatch.
pub(crate) fn pair_compatibility(
    g: &Graph,
    h: &Graph,
    mapping: &Mapping,
    g_cand: VertexId,
    h_cand: VertexId,
) -> Option<usize> {
    let mut edge_delta = 0;
    for (g0, h0) in mapping.pairs() {
        let connected_g = g.connection_exists(g_cand, g0);
        let connected_h = h.connection_exists(h_cand, h0);
        if connected_g != connected_h {
            return None;
        }
        if connected_g {
            edge_delta += 1;
        }
    }
    Some(edge_delta)
}

impl SearchCtx<'_> {
    /// Recursively extends the partial match, reporting every locally-maximal
    /// extension and undoing all state mutation before returning.
    pub(crate) fn extend(&self, g: &mut Graph, st: &mut MatchState) {
        if st.envelope_g().is_empty() || st.envelope_h().is_empty() || st.steps_exhausted() {
            self.emit_maximal(g, st);
            return;
        }

        // Optimistic bound: everything still in (pruned) G gets matched.
        let bound = self.valuation.score(g.vertex_count(), g.edge_count());
        if bound <= self.best.score() {
            trace!(bound, best = self.best.score(), "branch pruned");
            return;
        }

        let Some(g_cand) = pick_extension(g, st, self.heuristic_pick) else {
            return;
        };

        let promoted_g = st.discover_g(g_cand, g);

        let h_candidates: Vec<VertexId> = st.envelope_h().iter().copied().collect();
        for h_cand in h_candidates {
            let Some(edge_delta) = pair_compatibility(g, self.h, st.mapping(), g_cand, h_cand)
            else {
                continue;
            };
            st.commit(g_cand, h_cand, edge_delta);
            let promoted_h = st.discover_h(h_cand, self.h);
            self.extend(g, st);
            st.retract_h(&promoted_h);
            st.uncommit(g_cand, h_cand, edge_delta);
        }

        st.retract_g(&promoted_g);

        // Omission branch: the match that never uses g_cand at all.
        if self.allow_omission {
            st.envelope_remove_g(g_cand);
            let removed = g.remove_vertex(g_cand);
            self.extend(g, st);
            g.restore_vertex(g_cand, removed);
            st.envelope_insert_g(g_cand);
        }
    }

    /// Terminal point: report the current maximal match, then (when enabled)
    /// try to grow it through structurally disconnected outsider pieces.
    fn emit_maximal(&self, g: &Graph, st: &MatchState) {
        let score = self
            .valuation
            .score(st.mapped_len(), st.matched_edges());
        (self.emit)(score, st.mapping(), st.matched_edges());

        if !self.analyze_disconnected
            || st.steps_exhausted()
            || st.outsiders_g().is_empty()
            || st.outsiders_h().is_empty()
        {
            return;
        }

        let sub_g_frame = g.induced_subgraph(st.outsiders_g());
        let sub_h = self.h.induced_subgraph(st.outsiders_h());
        let offset = OffsetValuation::new(self.valuation, st.mapped_len(), st.matched_edges());

        // Nothing in the outsider pieces can beat the best: skip the whole
        // continuation.
        if offset.score(sub_g_frame.vertex_count(), sub_g_frame.edge_count()) <= self.best.score()
        {
            return;
        }

        let base_mapping = st.mapping().clone();
        let base_edges = st.matched_edges();
        let outer_emit = self.emit;
        let merge_emit = move |sub_score: f64, sub_mapping: &Mapping, sub_edges: usize| {
            let merged = base_mapping.merged_with(sub_mapping);
            outer_emit(sub_score, &merged, base_edges + sub_edges);
        };

        let sub_ctx = SearchCtx {
            h: &sub_h,
            valuation: &offset,
            best: self.best,
            analyze_disconnected: true,
            heuristic_pick: self.heuristic_pick,
            allow_omission: self.allow_omission,
            emit: &merge_emit,
        };

        // Fresh sub-search: every outsider seed pair roots its own branch.
        let sub_h_vertices: Vec<VertexId> = sub_h.vertices().collect();
        for seed_g in sub_g_frame.vertices().collect::<Vec<_>>() {
            for &seed_h in &sub_h_vertices {
                let mut sub_g = sub_g_frame.clone();
                let mut sub_st =
                    MatchState::seeded(&sub_g, &sub_h, seed_g, seed_h, st.leftover_steps());
                sub_ctx.extend(&mut sub_g, &mut sub_st);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Solution;
    use mcsg_common::generate;

    fn run_seeded(
        g: &Graph,
        h: &Graph,
        valuation: &dyn Valuation,
        analyze_disconnected: bool,
        leftover_steps: Option<u32>,
        seed: (VertexId, VertexId),
    ) -> Solution {
        let best = SharedBest::new();
        let emit = |score: f64, mapping: &Mapping, edges: usize| {
            best.offer(score, || Solution::from_parts(score, edges, mapping, false));
        };
        let ctx = SearchCtx {
            h,
            valuation,
            best: &best,
            analyze_disconnected,
            heuristic_pick: leftover_steps.is_some(),
            allow_omission: true,
            emit: &emit,
        };
        let mut work = g.clone();
        let mut st = MatchState::seeded(&work, h, seed.0, seed.1, leftover_steps);
        ctx.extend(&mut work, &mut st);
        best.into_solution()
    }

    #[test]
    fn square_self_match_is_complete() {
        let g = generate::cycle(4);
        let vertices = |v: usize, _e: usize| v as f64;
        let solution = run_seeded(&g, &g, &vertices, false, None, (0, 0));
        assert_eq!(solution.score, 4.0);
        assert_eq!(solution.matched_edges, 4);
        assert_eq!(solution.forward.len(), 4);
    }

    #[test]
    fn triangle_into_path_caps_at_one_edge() {
        let triangle = generate::cycle(3);
        let path = generate::path(3);
        let objective = |v: usize, e: usize| (v + e) as f64;
        let best = (0..3)
            .flat_map(|sg| (0..3).map(move |sh| (sg, sh)))
            .map(|seed| run_seeded(&triangle, &path, &objective, false, None, seed).score)
            .fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(best, 3.0);
    }

    #[test]
    fn disconnected_continuation_reaches_second_component() {
        let g = Graph::from_edges(0..4, [(0, 1), (2, 3)]).unwrap();
        let vertices = |v: usize, _e: usize| v as f64;
        let connected_only = run_seeded(&g, &g, &vertices, false, None, (0, 0));
        assert_eq!(connected_only.score, 2.0);

        let with_continuation = run_seeded(&g, &g, &vertices, true, None, (0, 0));
        assert_eq!(with_continuation.score, 4.0);
        assert_eq!(with_continuation.forward.len(), 4);
    }

    #[test]
    fn step_budget_bounds_the_extension() {
        let g = generate::cycle(4);
        let vertices = |v: usize, _e: usize| v as f64;
        let solution = run_seeded(&g, &g, &vertices, false, Some(1), (0, 0));
        assert_eq!(solution.score, 2.0);
    }

    #[test]
    fn emitted_mappings_preserve_structure() {
        let g = generate::gnp(8, 0.4, 3);
        let h = generate::gnp(8, 0.5, 4);
        let objective = |v: usize, e: usize| (v + e) as f64;
        let solution = run_seeded(&g, &h, &objective, false, None, (0, 0));
        for (&g1, &h1) in &solution.forward {
            for (&g2, &h2) in &solution.forward {
                if g1 < g2 {
                    assert_eq!(g.connection_exists(g1, g2), h.connection_exists(h1, h2));
                }
            }
        }
    }

    #[test]
    fn compatibility_counts_mapped_connections() {
        let g = generate::cycle(4);
        let mut mapping = Mapping::new();
        mapping.insert(0, 0);
        mapping.insert(1, 1);
        // vertex 3 connects to mapped 0 on both sides
        assert_eq!(pair_compatibility(&g, &g, &mapping, 3, 3), Some(1));
        // mismatched candidate: 3 is adjacent to 0 in G, but H candidate 2
        // is not adjacent to 0's image
        assert_eq!(pair_compatibility(&g, &g, &mapping, 3, 2), None);
    }
}
