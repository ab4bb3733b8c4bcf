//! Shared model types for the MCSG workspace.
//!
//! This crate owns everything the search engine and the CLI agree on: the
//! undirected [`Graph`] model with its backtracking mutators, the
//! [`Valuation`] objective trait and the textual scoring-expression parser,
//! the search [`Config`], and seeded graph generators for demos and tests.

pub mod config;
pub mod expr;
pub mod generate;
pub mod graph;
pub mod valuation;

pub use config::{Config, ConfigBuilder, ConfigError};
pub use expr::{ParseError, ScoreExpr};
pub use graph::{Graph, GraphDoc, GraphError, VertexId};
pub use valuation::{OffsetValuation, Valuation};
