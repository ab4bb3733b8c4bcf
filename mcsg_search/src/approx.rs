//! Randomized approximate orchestration.
//!
//! Trials run in parallel batches against the shared best. Each trial seeds
//! its own RNG deterministically from the configured base seed and the trial
//! index, picks a random seed pair, and then either grows greedily (random
//! compatible envelope pairs committed permanently, no backtracking) or runs
//! a grouped trial: a bounded branch-and-bound burst with a lookahead step
//! budget and the fewest-mapped-connections pick. Between batches the driver
//! stops early on the theoretical score ceiling or an expired time budget.

use std::time::Instant;

use mcsg_common::{Config, Graph, Valuation, VertexId};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use tracing::{debug, info};

use crate::Solution;
use crate::best::SharedBest;
use crate::search::{SearchCtx, pair_compatibility};
use crate::state::{Mapping, MatchState};

pub(crate) fn run(g: &Graph, h: &Graph, valuation: &dyn Valuation, config: &Config) -> Solution {
    let best = SharedBest::new();
    let g_vertices: Vec<VertexId> = g.vertices().collect();
    let h_vertices: Vec<VertexId> = h.vertices().collect();
    if g_vertices.is_empty() || h_vertices.is_empty() || config.trials == 0 {
        return best.into_solution();
    }

    // No common subgraph can outscore either input graph scored whole.
    let ceiling = valuation
        .score(g.vertex_count(), g.edge_count())
        .min(valuation.score(h.vertex_count(), h.edge_count()));
    let deadline = config.time_budget.map(|budget| Instant::now() + budget);
    info!(trials = config.trials, ceiling, "starting approximate search");

    let run_trial = |trial: usize| {
        let mut rng = SmallRng::seed_from_u64(
            config.seed ^ (trial as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15),
        );
        let seed_g = g_vertices[rng.gen_range(0..g_vertices.len())];
        let seed_h = h_vertices[rng.gen_range(0..h_vertices.len())];
        match config.lookahead {
            None => greedy_trial(g, h, valuation, &best, seed_g, seed_h, &mut rng, config),
            Some(steps) => grouped_trial(g, h, valuation, &best, seed_g, seed_h, steps, config),
        }
    };

    let batch = batch_size();
    let mut launched = 0usize;
    while launched < config.trials {
        let upper = usize::min(launched + batch, config.trials);

        #[cfg(feature = "rayon")]
        (launched..upper).into_par_iter().for_each(&run_trial);
        #[cfg(not(feature = "rayon"))]
        (launched..upper).for_each(&run_trial);

        launched = upper;
        if best.score() >= ceiling {
            debug!(launched, "score ceiling reached");
            break;
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            debug!(launched, "time budget expired");
            break;
        }
    }

    let solution = best.into_solution();
    info!(
        launched,
        score = solution.score,
        matched_edges = solution.matched_edges,
        "approximate search complete"
    );
    solution
}

/// One greedy growth pass: keep committing a random compatible envelope pair
/// until none is left, then offer the result. Commits are final, so a trial
/// costs one walk down the search tree.
#[allow(clippy::too_many_arguments)]
fn greedy_trial(
    g: &Graph,
    h: &Graph,
    valuation: &dyn Valuation,
    best: &SharedBest,
    seed_g: VertexId,
    seed_h: VertexId,
    rng: &mut SmallRng,
    config: &Config,
) {
    let mut st = MatchState::seeded(g, h, seed_g, seed_h, None);
    loop {
        let mut pairs: Vec<(VertexId, VertexId)> = st
            .envelope_g()
            .iter()
            .flat_map(|&gv| st.envelope_h().iter().map(move |&hv| (gv, hv)))
            .collect();
        pairs.shuffle(rng);
        let chosen = pairs.into_iter().find_map(|(gv, hv)| {
            pair_compatibility(g, h, st.mapping(), gv, hv).map(|delta| (gv, hv, delta))
        });
        let Some((gv, hv, delta)) = chosen else {
            break;
        };
        st.discover_g(gv, g);
        st.discover_h(hv, h);
        st.commit(gv, hv, delta);
    }

    if config.find_exact_embedding && st.mapped_len() < g.vertex_count() {
        return;
    }
    let score = valuation.score(st.mapped_len(), st.matched_edges());
    best.offer(score, || {
        Solution::from_parts(score, st.matched_edges(), st.mapping(), false)
    });
}

/// One bounded branch-and-bound burst rooted at the random seed pair.
#[allow(clippy::too_many_arguments)]
fn grouped_trial(
    g: &Graph,
    h: &Graph,
    valuation: &dyn Valuation,
    best: &SharedBest,
    seed_g: VertexId,
    seed_h: VertexId,
    steps: u32,
    config: &Config,
) {
    let emit = |score: f64, mapping: &Mapping, edges: usize| {
        if config.find_exact_embedding && mapping.len() < g.vertex_count() {
            return;
        }
        best.offer(score, || Solution::from_parts(score, edges, mapping, false));
    };
    let ctx = SearchCtx {
        h,
        valuation,
        best,
        analyze_disconnected: config.analyze_disconnected,
        heuristic_pick: true,
        allow_omission: !config.find_exact_embedding,
        emit: &emit,
    };
    let mut work = g.clone();
    let mut st = MatchState::seeded(&work, h, seed_g, seed_h, Some(steps));
    ctx.extend(&mut work, &mut st);
}

fn batch_size() -> usize {
    #[cfg(feature = "rayon")]
    {
        rayon::current_num_threads().max(1) * 4
    }
    #[cfg(not(feature = "rayon"))]
    {
        16
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcsg_common::generate;
    use std::time::Duration;

    #[test]
    fn zero_trials_yield_no_solution() {
        let g = generate::cycle(4);
        let vertices = |v: usize, _e: usize| v as f64;
        let config = Config::builder().trials(0).build();
        assert!(run(&g, &g, &vertices, &config).is_empty());
    }

    #[test]
    fn greedy_trials_find_the_self_match() {
        // Greedy growth on a clique never gets stuck: every envelope pair is
        // compatible, so any trial maps the whole graph.
        let g = generate::complete(5);
        let vertices = |v: usize, _e: usize| v as f64;
        let config = Config::builder().trials(4).seed(7).build();
        let solution = run(&g, &g, &vertices, &config);
        assert_eq!(solution.score, 5.0);
        assert_eq!(solution.matched_edges, 10);
    }

    #[test]
    fn grouped_trials_respect_the_step_budget() {
        let g = generate::cycle(6);
        let vertices = |v: usize, _e: usize| v as f64;
        let config = Config::builder().trials(8).lookahead(2).seed(3).build();
        let solution = run(&g, &g, &vertices, &config);
        // seed pair plus at most two committed steps
        assert!(solution.forward.len() <= 3);
        assert!(!solution.is_empty());
    }

    #[test]
    fn same_seed_reproduces_the_result() {
        let g = generate::gnp(10, 0.4, 21);
        let h = generate::gnp(10, 0.4, 22);
        let objective = |v: usize, e: usize| (v + e) as f64;
        let config = Config::builder().trials(32).seed(99).build();
        let first = run(&g, &h, &objective, &config);
        let second = run(&g, &h, &objective, &config);
        // trials are seeded per index, so the best score is seed-determined
        // even though equal-score ties may land in either order
        assert_eq!(first.score, second.score);
    }

    #[test]
    fn emitted_mappings_preserve_structure() {
        let g = generate::gnp(9, 0.5, 5);
        let h = generate::gnp(9, 0.5, 6);
        let objective = |v: usize, e: usize| (v + e) as f64;
        let config = Config::builder().trials(64).seed(1).build();
        let solution = run(&g, &h, &objective, &config);
        for (&g1, &h1) in &solution.forward {
            for (&g2, &h2) in &solution.forward {
                if g1 < g2 {
                    assert_eq!(g.connection_exists(g1, g2), h.connection_exists(h1, h2));
                }
            }
        }
    }

    #[test]
    fn time_budget_still_reports_a_result() {
        let g = generate::gnp(12, 0.3, 8);
        let objective = |v: usize, e: usize| (v + e) as f64;
        let config = Config::builder()
            .trials(usize::MAX)
            .time_budget(Duration::from_millis(50))
            .seed(2)
            .build();
        let solution = run(&g, &g, &objective, &config);
        assert!(!solution.is_empty());
    }
}
