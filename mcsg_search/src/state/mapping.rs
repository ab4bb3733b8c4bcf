use std::collections::BTreeMap;

use mcsg_common::VertexId;

/// Bidirectional partial bijection between G and H vertices.
///
/// The two directions are mutual inverses at every consistent point of the
/// search; the mutators carry debug contracts instead of runtime checks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Mapping {
    /// G to H vertex mapping
    forward: BTreeMap<VertexId, VertexId>,
    /// H to G vertex mapping
    reverse: BTreeMap<VertexId, VertexId>,
}

impl Mapping {
    #[contracts::debug_ensures(ret.is_empty())]
    pub(crate) fn new() -> Self {
        Self {
            forward: BTreeMap::new(),
            reverse: BTreeMap::new(),
        }
    }

    pub(crate) fn is_consistent(&self) -> bool {
        self.forward.len() == self.reverse.len()
            && self
                .forward
                .iter()
                .all(|(g, h)| self.reverse.get(h) == Some(g))
    }

    #[contracts::debug_requires(!self.contains_g(g) && !self.contains_h(h))]
    #[contracts::debug_ensures(self.is_consistent())]
    pub(crate) fn insert(&mut self, g: VertexId, h: VertexId) {
        self.forward.insert(g, h);
        self.reverse.insert(h, g);
    }

    #[contracts::debug_requires(self.image_of(g) == Some(h))]
    #[contracts::debug_ensures(self.is_consistent())]
    pub(crate) fn remove(&mut self, g: VertexId, h: VertexId) {
        self.forward.remove(&g);
        self.reverse.remove(&h);
    }

    pub(crate) fn image_of(&self, g: VertexId) -> Option<VertexId> {
        self.forward.get(&g).copied()
    }

    pub(crate) fn preimage_of(&self, h: VertexId) -> Option<VertexId> {
        self.reverse.get(&h).copied()
    }

    pub(crate) fn contains_g(&self, g: VertexId) -> bool {
        self.forward.contains_key(&g)
    }

    pub(crate) fn contains_h(&self, h: VertexId) -> bool {
        self.reverse.contains_key(&h)
    }

    pub(crate) fn len(&self) -> usize {
        debug_assert_eq!(self.forward.len(), self.reverse.len());
        self.forward.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Mapped pairs in ascending G-vertex order.
    pub(crate) fn pairs(&self) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
        self.forward.iter().map(|(&g, &h)| (g, h))
    }

    pub(crate) const fn forward(&self) -> &BTreeMap<VertexId, VertexId> {
        &self.forward
    }

    pub(crate) const fn reverse(&self) -> &BTreeMap<VertexId, VertexId> {
        &self.reverse
    }

    /// Disjoint union with a sub-search mapping (disconnected continuation).
    #[contracts::debug_requires(
        other.pairs().all(|(g, h)| !self.contains_g(g) && !self.contains_h(h)),
        "merged mappings must be vertex-disjoint on both sides"
    )]
    #[contracts::debug_ensures(ret.len() == self.len() + other.len())]
    pub(crate) fn merged_with(&self, other: &Self) -> Self {
        let mut merged = self.clone();
        for (g, h) in other.pairs() {
            merged.insert(g, h);
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_maintains_both_directions() {
        let mut mapping = Mapping::new();
        mapping.insert(1, 10);
        mapping.insert(2, 20);
        assert_eq!(mapping.image_of(1), Some(10));
        assert_eq!(mapping.preimage_of(20), Some(2));
        assert_eq!(mapping.len(), 2);
        assert!(mapping.is_consistent());
    }

    #[test]
    fn remove_clears_both_directions() {
        let mut mapping = Mapping::new();
        mapping.insert(1, 10);
        mapping.remove(1, 10);
        assert!(mapping.is_empty());
        assert_eq!(mapping.preimage_of(10), None);
    }

    #[test]
    fn merged_with_unions_disjoint_pairs() {
        let mut base = Mapping::new();
        base.insert(0, 5);
        let mut sub = Mapping::new();
        sub.insert(2, 7);
        sub.insert(3, 6);
        let merged = base.merged_with(&sub);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.image_of(0), Some(5));
        assert_eq!(merged.image_of(3), Some(6));
        assert!(merged.is_consistent());
    }
}
