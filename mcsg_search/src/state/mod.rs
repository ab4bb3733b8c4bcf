//! Mutable record of one in-progress search branch.
//!
//! A [`MatchState`] owns the partial bijection, the per-side envelope
//! (frontier vertices adjacent to the mapped set, awaiting a decision) and
//! outsiders (vertices not yet discovered), the incrementally maintained
//! matched-edge count, and the optional lookahead step budget.
//!
//! The invariant at every consistent point of the recursion:
//! `mapped ∪ envelope ∪ outsiders` partitions each side's vertex set, and
//! `matched_edges` equals the induced edge count of the mapped subgraph.
//! Every mutator has an exact inverse; the search unwinds them in strict
//! LIFO order.

use std::collections::BTreeSet;

use mcsg_common::{Graph, VertexId};

mod mapping;

pub(crate) use mapping::Mapping;

pub(crate) struct MatchState {
    mapping: Mapping,
    envelope_g: BTreeSet<VertexId>,
    envelope_h: BTreeSet<VertexId>,
    outsiders_g: BTreeSet<VertexId>,
    outsiders_h: BTreeSet<VertexId>,
    matched_edges: usize,
    leftover_steps: Option<u32>,
}

impl MatchState {
    /// State with the seed pair already committed: envelopes are the seeds'
    /// neighborhoods, outsiders the rest of each vertex set.
    #[contracts::debug_requires(g.contains_vertex(seed_g), "G seed must exist")]
    #[contracts::debug_requires(h.contains_vertex(seed_h), "H seed must exist")]
    #[contracts::debug_ensures(ret.mapped_len() == 1 && ret.matched_edges() == 0)]
    pub(crate) fn seeded(
        g: &Graph,
        h: &Graph,
        seed_g: VertexId,
        seed_h: VertexId,
        leftover_steps: Option<u32>,
    ) -> Self {
        let mut mapping = Mapping::new();
        mapping.insert(seed_g, seed_h);

        let envelope_g = g.neighbors(seed_g).cloned().unwrap_or_default();
        let envelope_h = h.neighbors(seed_h).cloned().unwrap_or_default();
        let outsiders_g = g
            .vertices()
            .filter(|&v| v != seed_g && !envelope_g.contains(&v))
            .collect();
        let outsiders_h = h
            .vertices()
            .filter(|&v| v != seed_h && !envelope_h.contains(&v))
            .collect();

        Self {
            mapping,
            envelope_g,
            envelope_h,
            outsiders_g,
            outsiders_h,
            matched_edges: 0,
            leftover_steps,
        }
    }

    pub(crate) const fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    pub(crate) fn mapped_len(&self) -> usize {
        self.mapping.len()
    }

    pub(crate) const fn matched_edges(&self) -> usize {
        self.matched_edges
    }

    pub(crate) const fn envelope_g(&self) -> &BTreeSet<VertexId> {
        &self.envelope_g
    }

    pub(crate) const fn envelope_h(&self) -> &BTreeSet<VertexId> {
        &self.envelope_h
    }

    pub(crate) const fn outsiders_g(&self) -> &BTreeSet<VertexId> {
        &self.outsiders_g
    }

    pub(crate) const fn outsiders_h(&self) -> &BTreeSet<VertexId> {
        &self.outsiders_h
    }

    pub(crate) const fn leftover_steps(&self) -> Option<u32> {
        self.leftover_steps
    }

    /// True once an active step budget has been spent.
    pub(crate) fn steps_exhausted(&self) -> bool {
        self.leftover_steps == Some(0)
    }

    /// Moves `center`'s outsider neighbors into the G envelope, returning the
    /// promoted vertices as the undo token for [`Self::retract_g`].
    pub(crate) fn discover_g(&mut self, center: VertexId, g: &Graph) -> Vec<VertexId> {
        Self::discover(&mut self.envelope_g, &mut self.outsiders_g, center, g)
    }

    /// H-side analogue of [`Self::discover_g`].
    pub(crate) fn discover_h(&mut self, center: VertexId, h: &Graph) -> Vec<VertexId> {
        Self::discover(&mut self.envelope_h, &mut self.outsiders_h, center, h)
    }

    fn discover(
        envelope: &mut BTreeSet<VertexId>,
        outsiders: &mut BTreeSet<VertexId>,
        center: VertexId,
        graph: &Graph,
    ) -> Vec<VertexId> {
        let promoted: Vec<VertexId> = graph
            .neighbors(center)
            .into_iter()
            .flatten()
            .copied()
            .filter(|v| outsiders.contains(v))
            .collect();
        for &v in &promoted {
            outsiders.remove(&v);
            envelope.insert(v);
        }
        promoted
    }

    /// Demotes previously promoted vertices back to G outsiders.
    #[contracts::debug_requires(promoted.iter().all(|v| self.envelope_g.contains(v)))]
    pub(crate) fn retract_g(&mut self, promoted: &[VertexId]) {
        for &v in promoted {
            self.envelope_g.remove(&v);
            self.outsiders_g.insert(v);
        }
    }

    /// Demotes previously promoted vertices back to H outsiders.
    #[contracts::debug_requires(promoted.iter().all(|v| self.envelope_h.contains(v)))]
    pub(crate) fn retract_h(&mut self, promoted: &[VertexId]) {
        for &v in promoted {
            self.envelope_h.remove(&v);
            self.outsiders_h.insert(v);
        }
    }

    /// Commits a compatible pair: both vertices leave their envelopes, the
    /// mapping gains the pair, and the matched-edge count grows by
    /// `edge_delta` (the pair's connections into the existing mapping).
    #[contracts::debug_requires(self.envelope_g.contains(&g), "G candidate must be frontier")]
    #[contracts::debug_requires(self.envelope_h.contains(&h), "H candidate must be frontier")]
    #[contracts::debug_requires(!self.steps_exhausted())]
    pub(crate) fn commit(&mut self, g: VertexId, h: VertexId, edge_delta: usize) {
        self.envelope_g.remove(&g);
        self.envelope_h.remove(&h);
        self.mapping.insert(g, h);
        self.matched_edges += edge_delta;
        if let Some(steps) = self.leftover_steps.as_mut() {
            *steps -= 1;
        }
    }

    /// Exact inverse of [`Self::commit`], restoring envelope membership, the
    /// mapping, the edge count, and the step budget.
    #[contracts::debug_requires(self.mapping.image_of(g) == Some(h))]
    pub(crate) fn uncommit(&mut self, g: VertexId, h: VertexId, edge_delta: usize) {
        if let Some(steps) = self.leftover_steps.as_mut() {
            *steps += 1;
        }
        self.matched_edges -= edge_delta;
        self.mapping.remove(g, h);
        self.envelope_h.insert(h);
        self.envelope_g.insert(g);
    }

    /// Takes the chosen vertex out of the G envelope for the omission branch
    /// (the vertex is simultaneously detached from the graph).
    #[contracts::debug_requires(self.envelope_g.contains(&v))]
    pub(crate) fn envelope_remove_g(&mut self, v: VertexId) {
        self.envelope_g.remove(&v);
    }

    /// Inverse of [`Self::envelope_remove_g`].
    #[contracts::debug_requires(!self.envelope_g.contains(&v))]
    pub(crate) fn envelope_insert_g(&mut self, v: VertexId) {
        self.envelope_g.insert(v);
    }

    /// Debug helper: mapped, envelope, and outsiders partition each side.
    #[cfg(test)]
    pub(crate) fn partition_consistent(&self, g: &Graph, h: &Graph) -> bool {
        let side = |mapped: Vec<VertexId>, env: &BTreeSet<VertexId>, out: &BTreeSet<VertexId>, graph: &Graph| {
            let mut all: BTreeSet<VertexId> = mapped.iter().copied().collect();
            let disjoint = env.iter().all(|v| !all.contains(v))
                && out.iter().all(|v| !all.contains(v) && !env.contains(v));
            all.extend(env.iter().copied());
            all.extend(out.iter().copied());
            disjoint && all == graph.vertices().collect::<BTreeSet<_>>()
        };
        side(
            self.mapping.forward().keys().copied().collect(),
            &self.envelope_g,
            &self.outsiders_g,
            g,
        ) && side(
            self.mapping.reverse().keys().copied().collect(),
            &self.envelope_h,
            &self.outsiders_h,
            h,
        )
    }
}
