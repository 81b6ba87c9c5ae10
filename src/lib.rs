//! Viterbi-style shortest-path search over time-indexed trellises.
//!
//! This crate finds the minimum-cost sequence of candidate states through a
//! trellis: one column of candidates per discrete time step, per-state
//! emission costs, and pairwise transition costs between adjacent columns.
//! It is the decoding core of an HMM map-matcher, but knows nothing about
//! maps; costs come from a host-supplied [`CostModel`] and states are
//! opaque payloads.
//!
//! ## Core idea
//! 1. Describe your scoring scheme by implementing [`CostModel`] (or use a
//!    ready-made model from [`models`]).
//! 2. Feed candidate states column by column into an engine.
//! 3. Query the winner at any time step and walk the optimal path backward.
//!
//! Two engines answer the same [`ViterbiSearch`] interface. [`NaiveSearch`]
//! labels every column in full and can minimize or maximize.
//! [`LazySearch`] expands labels best-first, explores only as much of the
//! trellis as queries demand, reuses work across queries, and recovers from
//! columns no path can reach.
//!
//! ## Quick start
//! ```
//! use trellis_search::models::table::TableModel;
//! use trellis_search::{LazySearch, ViterbiSearch};
//!
//! // Three time steps, one candidate each, joined by cost-2 transitions.
//! let mut model = TableModel::new();
//! let k0 = model.add_candidate(Some(1.0));
//! let k1 = model.add_candidate(Some(1.0));
//! let k2 = model.add_candidate(Some(1.0));
//! model.link(k0, k1, 2.0);
//! model.link(k1, k2, 2.0);
//!
//! let mut search = LazySearch::new(model);
//! let a = search.add_state(0, k0);
//! let b = search.add_state(1, k1);
//! let c = search.add_state(2, k2);
//!
//! assert_eq!(search.search_winner(2), Some(c));
//! assert_eq!(search.accumulated_cost(c), Some(7.0));
//! let path: Vec<_> = search.search_path(2).collect();
//! assert_eq!(path, vec![c, b, a]);
//! ```
//!
//! ## Built-in models
//! The [`models`] module contains reference cost models:
//! - explicit cost tables, for tests and hand-built instances
//! - discrete log-space HMM decoding via the max polarity
//!
//! These serve both as ready-to-use tools and as templates for writing
//! models of your own.

pub mod builder;
pub mod lazy;
pub mod models;
pub mod naive;
pub mod path;
pub mod queue;
pub mod traits;
pub mod trellis;
pub mod utils;

pub use crate::builder::{EngineKind, SearchBuilder, Searcher};
pub use crate::lazy::LazySearch;
pub use crate::naive::{NaiveSearch, Polarity};
pub use crate::path::PathIter;
pub use crate::traits::{CostModel, ViterbiSearch};
pub use crate::trellis::{Label, StateId, Time, Trellis};
