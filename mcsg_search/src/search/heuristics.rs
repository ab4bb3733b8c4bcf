use std::collections::BTreeSet;

use mcsg_common::{Graph, VertexId};

use crate::state::MatchState;

/// Chooses the next G-envelope vertex to extend with.
///
/// Default mode takes the first vertex in order (every envelope member is
/// frontier-eligible, so order is a tie-break, not a constraint). Heuristic
/// mode, active while a lookahead budget is running, prefers the vertex with
/// the fewest connections into the current mapping to diversify the limited
/// number of steps; ties fall back to vertex order.
pub(crate) fn pick_extension(g: &Graph, st: &MatchState, heuristic: bool) -> Option<VertexId> {
    if heuristic {
        st.envelope_g()
            .iter()
            .copied()
            .min_by_key(|&v| mapped_connections(g, st, v))
    } else {
        st.envelope_g().iter().next().copied()
    }
}

fn mapped_connections(g: &Graph, st: &MatchState, v: VertexId) -> usize {
    g.neighbors(v)
        .into_iter()
        .flatten()
        .filter(|&&n| st.mapping().contains_g(n))
        .count()
}

/// Chooses the next seed vertex for the exact orchestrator's removal states:
/// smallest degree in the remaining graph, ties broken by fewest links to
/// already-removed vertices, then by vertex order.
pub(crate) fn pick_seed(
    work: &Graph,
    original: &Graph,
    removed: &BTreeSet<VertexId>,
) -> Option<VertexId> {
    work.vertices().min_by(|&a, &b| {
        work.degree(a)
            .cmp(&work.degree(b))
            .then_with(|| removed_links(original, removed, a).cmp(&removed_links(original, removed, b)))
            .then_with(|| a.cmp(&b))
    })
}

fn removed_links(original: &Graph, removed: &BTreeSet<VertexId>, v: VertexId) -> usize {
    original
        .neighbors(v)
        .into_iter()
        .flatten()
        .filter(|n| removed.contains(n))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcsg_common::Graph;

    #[test]
    fn pick_seed_prefers_min_degree() {
        // star: 0 is the hub
        let g = Graph::from_edges(0..4, [(0, 1), (0, 2), (0, 3)]).unwrap();
        let seed = pick_seed(&g, &g, &BTreeSet::new());
        assert_eq!(seed, Some(1));
    }

    #[test]
    fn pick_seed_breaks_ties_by_removed_links() {
        // path 0-1-2-3; with 0 removed, vertices 1 and 3 share degree 1 in
        // the remaining path, but 1 touches the removed set.
        let original = Graph::from_edges(0..4, [(0, 1), (1, 2), (2, 3)]).unwrap();
        let mut work = original.clone();
        work.remove_vertex(0);
        let removed = BTreeSet::from([0]);
        assert_eq!(pick_seed(&work, &original, &removed), Some(3));
    }

    #[test]
    fn pick_extension_default_is_first_in_order() {
        let g = Graph::from_edges(0..3, [(0, 1), (0, 2)]).unwrap();
        let st = MatchState::seeded(&g, &g, 0, 0, None);
        assert_eq!(pick_extension(&g, &st, false), Some(1));
    }

    #[test]
    fn pick_extension_heuristic_prefers_fewest_mapped_links() {
        // triangle 0-1-2 plus pendant 3 on 0: both 1, 2 and 3 are frontier
        // after seeding at 0, but 3 has no second mapped connection either,
        // so the tie resolves to vertex order among minimums.
        let g = Graph::from_edges(0..4, [(0, 1), (1, 2), (2, 0), (0, 3)]).unwrap();
        let st = MatchState::seeded(&g, &g, 0, 0, Some(8));
        assert_eq!(pick_extension(&g, &st, true), Some(1));
    }
}
