//! Maximum-valuation common subgraph search.
//!
//! Given two undirected graphs G and H and a monotone scoring function of
//! (matched vertices, matched edges), the engine finds a structure-preserving
//! partial vertex bijection maximizing the score. Two orchestration layers
//! sit on one recursive branch-and-bound core: an exhaustive parallel exact
//! search over all seed pairs, and a randomized greedy approximate search run
//! in parallel batches.
//!
//! Entry points live on [`McsFinder`]; inputs come from `mcsg_common`.

mod approx;
mod best;
mod exact;
mod search;
mod state;

use std::collections::BTreeMap;

use mcsg_common::{Config, ConfigError, Graph, Valuation, VertexId};
use thiserror::Error;

use crate::state::Mapping;

/// Errors reported before any search work starts.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Invalid mode combination, see [`ConfigError`].
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Best match found by a search.
///
/// The two mapping directions are mutual inverses, always reported in the
/// caller's (G, H) orientation regardless of any internal swap. An empty
/// mapping is the distinguished "no solution" value; under exact-embedding
/// mode it means no embedding of all of G exists in H.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    /// Score of the match under the supplied valuation.
    pub score: f64,
    /// Edges between mapped vertices (equal on both sides by isomorphism).
    pub matched_edges: usize,
    /// G vertex to its H counterpart.
    pub forward: BTreeMap<VertexId, VertexId>,
    /// H vertex to its G counterpart.
    pub reverse: BTreeMap<VertexId, VertexId>,
}

impl Solution {
    /// The "no solution" value.
    pub(crate) fn none() -> Self {
        Self {
            score: f64::NEG_INFINITY,
            matched_edges: 0,
            forward: BTreeMap::new(),
            reverse: BTreeMap::new(),
        }
    }

    pub(crate) fn from_parts(
        score: f64,
        matched_edges: usize,
        mapping: &Mapping,
        swapped: bool,
    ) -> Self {
        let (forward, reverse) = if swapped {
            (mapping.reverse().clone(), mapping.forward().clone())
        } else {
            (mapping.forward().clone(), mapping.reverse().clone())
        };
        Self {
            score,
            matched_edges,
            forward,
            reverse,
        }
    }

    /// Number of mapped vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// True when no match was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}

/// Entry point for common subgraph searches.
///
/// Construction validates the configuration; both run methods report the
/// best solution over their respective search spaces.
pub struct McsFinder<'a> {
    g: &'a Graph,
    h: &'a Graph,
    valuation: &'a dyn Valuation,
    config: &'a Config,
}

impl<'a> McsFinder<'a> {
    /// Validates the configuration and prepares a finder.
    ///
    /// # Errors
    ///
    /// [`SearchError::Config`] for invalid mode combinations.
    pub fn new(
        g: &'a Graph,
        h: &'a Graph,
        valuation: &'a dyn Valuation,
        config: &'a Config,
    ) -> Result<Self, SearchError> {
        config.validate()?;
        Ok(Self {
            g,
            h,
            valuation,
            config,
        })
    }

    /// Exhaustive parallel exact search over every seed pair.
    #[must_use]
    pub fn run_exact(&self) -> Solution {
        exact::run(self.g, self.h, self.valuation, self.config)
    }

    /// Randomized greedy approximate search in parallel batches.
    #[must_use]
    pub fn run_approximate(&self) -> Solution {
        approx::run(self.g, self.h, self.valuation, self.config)
    }

    /// Convenience: validate and run the exact search in one call.
    ///
    /// # Errors
    ///
    /// [`SearchError::Config`] for invalid mode combinations.
    pub fn search_exact(
        g: &'a Graph,
        h: &'a Graph,
        valuation: &'a dyn Valuation,
        config: &'a Config,
    ) -> Result<Solution, SearchError> {
        Ok(Self::new(g, h, valuation, config)?.run_exact())
    }

    /// Convenience: validate and run the approximate search in one call.
    ///
    /// # Errors
    ///
    /// [`SearchError::Config`] for invalid mode combinations.
    pub fn search_approximate(
        g: &'a Graph,
        h: &'a Graph,
        valuation: &'a dyn Valuation,
        config: &'a Config,
    ) -> Result<Solution, SearchError> {
        Ok(Self::new(g, h, valuation, config)?.run_approximate())
    }
}
