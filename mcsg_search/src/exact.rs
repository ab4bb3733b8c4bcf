//! Exhaustive parallel orchestration.
//!
//! The smaller graph becomes the pattern side. Its vertices are peeled off
//! one at a time by the min-degree heuristic, each peel yielding a removal
//! state (the remaining snapshot plus the vertex just chosen as seed); the
//! cross product of removal states and target vertices is the job list, and
//! every job runs one full branch-and-bound search against the shared best.
//! In exact-embedding mode nothing is peeled: every pattern vertex seeds the
//! full snapshot, and only mappings covering the whole pattern are accepted.

use std::collections::BTreeSet;

use itertools::iproduct;
use mcsg_common::{Config, Graph, Valuation, VertexId};
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use tracing::{debug, info};

use crate::Solution;
use crate::best::SharedBest;
use crate::search::{SearchCtx, pick_seed};
use crate::state::{Mapping, MatchState};

struct RemovalState {
    snapshot: Graph,
    seed: VertexId,
}

pub(crate) fn run(g: &Graph, h: &Graph, valuation: &dyn Valuation, config: &Config) -> Solution {
    // Embedding mode pins the pattern to G: the cover requirement is G's.
    let swapped = !config.find_exact_embedding && g.vertex_count() > h.vertex_count();
    let (pat, hay) = if swapped { (h, g) } else { (g, h) };
    info!(
        pattern_vertices = pat.vertex_count(),
        target_vertices = hay.vertex_count(),
        swapped,
        "starting exact search"
    );

    let removal_states = build_removal_states(pat, config.find_exact_embedding);
    let hay_vertices: Vec<VertexId> = hay.vertices().collect();
    let jobs: Vec<(&RemovalState, VertexId)> =
        iproduct!(removal_states.iter(), hay_vertices.iter().copied()).collect();
    debug!(jobs = jobs.len(), "seed pairs enumerated");

    let best = SharedBest::new();
    let required_cover = config.find_exact_embedding.then(|| pat.vertex_count());

    let run_job = |&(state, hay_seed): &(&RemovalState, VertexId)| {
        let emit = |score: f64, mapping: &Mapping, edges: usize| {
            if required_cover.is_some_and(|cover| mapping.len() < cover) {
                return;
            }
            best.offer(score, || Solution::from_parts(score, edges, mapping, swapped));
        };
        let ctx = SearchCtx {
            h: hay,
            valuation,
            best: &best,
            analyze_disconnected: config.analyze_disconnected,
            heuristic_pick: false,
            allow_omission: !config.find_exact_embedding,
            emit: &emit,
        };
        let mut work = state.snapshot.clone();
        let mut st = MatchState::seeded(&work, hay, state.seed, hay_seed, None);
        ctx.extend(&mut work, &mut st);
    };

    #[cfg(feature = "rayon")]
    jobs.par_iter().for_each(run_job);
    #[cfg(not(feature = "rayon"))]
    jobs.iter().for_each(run_job);

    let solution = best.into_solution();
    info!(
        score = solution.score,
        matched_edges = solution.matched_edges,
        mapped = solution.len(),
        "exact search complete"
    );
    solution
}

/// Enumerates the search roots on the pattern side.
///
/// Each peel shrinks the snapshot, so branches rooted at later seeds never
/// revisit matches already covered by earlier roots. With `keep_all` set the
/// pattern must survive whole; every vertex seeds the full graph, in
/// ascending degree order.
fn build_removal_states(pat: &Graph, keep_all: bool) -> Vec<RemovalState> {
    if keep_all {
        let mut order: Vec<VertexId> = pat.vertices().collect();
        order.sort_by_key(|&v| (pat.degree(v), v));
        return order
            .into_iter()
            .map(|seed| RemovalState {
                snapshot: pat.clone(),
                seed,
            })
            .collect();
    }

    let mut work = pat.clone();
    let mut removed: BTreeSet<VertexId> = BTreeSet::new();
    let mut states = Vec::with_capacity(pat.vertex_count());
    while let Some(seed) = pick_seed(&work, pat, &removed) {
        states.push(RemovalState {
            snapshot: work.clone(),
            seed,
        });
        work.remove_vertex(seed);
        removed.insert(seed);
    }
    states
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcsg_common::generate;

    #[test]
    fn removal_states_cover_every_pattern_vertex() {
        let pat = generate::gnp(6, 0.5, 11);
        let states = build_removal_states(&pat, false);
        assert_eq!(states.len(), 6);
        let seeds: BTreeSet<VertexId> = states.iter().map(|s| s.seed).collect();
        assert_eq!(seeds, pat.vertices().collect());
        // snapshots shrink by exactly one vertex per peel
        for (i, state) in states.iter().enumerate() {
            assert_eq!(state.snapshot.vertex_count(), 6 - i);
        }
    }

    #[test]
    fn embedding_states_keep_the_full_pattern() {
        let pat = generate::path(4);
        let states = build_removal_states(&pat, true);
        assert_eq!(states.len(), 4);
        assert!(states.iter().all(|s| s.snapshot.vertex_count() == 4));
        // endpoints (degree 1) come before interior vertices
        assert_eq!(states[0].seed, 0);
        assert_eq!(states[1].seed, 3);
    }

    #[test]
    fn square_against_itself_finds_the_automorphism() {
        let g = generate::cycle(4);
        let vertices = |v: usize, _e: usize| v as f64;
        let solution = run(&g, &g, &vertices, &Config::default());
        assert_eq!(solution.score, 4.0);
        assert_eq!(solution.matched_edges, 4);
    }

    #[test]
    fn swap_reports_in_caller_orientation() {
        // G is the larger side, so the pattern is H internally.
        let g = generate::cycle(5);
        let h = generate::path(3);
        let objective = |v: usize, e: usize| (v + e) as f64;
        let solution = run(&g, &h, &objective, &Config::default());
        assert_eq!(solution.forward.len(), 3);
        for (&gv, &hv) in &solution.forward {
            assert!(g.contains_vertex(gv));
            assert!(h.contains_vertex(hv));
            assert_eq!(solution.reverse.get(&hv), Some(&gv));
        }
    }

    #[test]
    fn infeasible_embedding_yields_no_solution() {
        let triangle = generate::cycle(3);
        let path = generate::path(3);
        let objective = |v: usize, e: usize| (v + e) as f64;
        let config = Config::builder()
            .analyze_disconnected(true)
            .find_exact_embedding(true)
            .build();
        let solution = run(&triangle, &path, &objective, &config);
        assert!(solution.is_empty());
    }

    #[test]
    fn feasible_embedding_covers_the_pattern() {
        let path = generate::path(3);
        let cycle = generate::cycle(5);
        let objective = |v: usize, e: usize| (v + e) as f64;
        let config = Config::builder()
            .analyze_disconnected(true)
            .find_exact_embedding(true)
            .build();
        let solution = run(&path, &cycle, &objective, &config);
        assert_eq!(solution.forward.len(), 3);
        assert_eq!(solution.matched_edges, 2);
    }
}
