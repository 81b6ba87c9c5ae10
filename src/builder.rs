//! Runtime engine selection.
//!
//! Hosts that decide between the two engines at runtime (configuration,
//! benchmarking, fallback) can build a [`Searcher`] instead of naming a
//! concrete engine type.

use crate::lazy::LazySearch;
use crate::naive::{NaiveSearch, Polarity};
use crate::traits::{CostModel, ViterbiSearch};
use crate::trellis::{StateId, Time};

/// Which engine a [`SearchBuilder`] produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineKind {
    /// Full-trellis dynamic programming; minimizes or maximizes.
    Naive,
    /// Incremental best-first expansion; minimizes only.
    Lazy,
}

/// Builder for a [`Searcher`]. Defaults to the lazy minimizing engine.
pub struct SearchBuilder<M: CostModel> {
    model: M,
    kind: EngineKind,
    polarity: Polarity,
}

impl<M: CostModel> SearchBuilder<M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            kind: EngineKind::Lazy,
            polarity: Polarity::Minimize,
        }
    }

    pub fn engine(mut self, kind: EngineKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn polarity(mut self, polarity: Polarity) -> Self {
        self.polarity = polarity;
        self
    }

    /// # Panics
    /// Panics when asked for a maximizing lazy engine; only the naive
    /// engine supports maximization.
    pub fn build(self) -> Searcher<M> {
        match self.kind {
            EngineKind::Naive => {
                Searcher::Naive(NaiveSearch::with_polarity(self.model, self.polarity))
            }
            EngineKind::Lazy => {
                assert_eq!(
                    self.polarity,
                    Polarity::Minimize,
                    "the lazy engine only minimizes"
                );
                Searcher::Lazy(LazySearch::new(self.model))
            }
        }
    }
}

/// Either engine behind one concrete type.
pub enum Searcher<M: CostModel> {
    Naive(NaiveSearch<M>),
    Lazy(LazySearch<M>),
}

impl<M: CostModel> Searcher<M> {
    /// Insert a candidate state into the column at `time`.
    ///
    /// # Panics
    /// Panics under the same conditions as the underlying engine's
    /// `add_state`.
    pub fn add_state(&mut self, time: Time, payload: M::State) -> StateId {
        match self {
            Searcher::Naive(search) => search.add_state(time, payload),
            Searcher::Lazy(search) => search.add_state(time, payload),
        }
    }

    /// Release all states and search results.
    pub fn clear(&mut self) {
        match self {
            Searcher::Naive(search) => search.clear(),
            Searcher::Lazy(search) => search.clear(),
        }
    }

    pub fn kind(&self) -> EngineKind {
        match self {
            Searcher::Naive(_) => EngineKind::Naive,
            Searcher::Lazy(_) => EngineKind::Lazy,
        }
    }
}

impl<M: CostModel> ViterbiSearch for Searcher<M> {
    type State = M::State;

    fn search_winner(&mut self, time: Time) -> Option<StateId> {
        match self {
            Searcher::Naive(search) => search.search_winner(time),
            Searcher::Lazy(search) => search.search_winner(time),
        }
    }

    fn predecessor(&self, id: StateId) -> Option<StateId> {
        match self {
            Searcher::Naive(search) => search.predecessor(id),
            Searcher::Lazy(search) => search.predecessor(id),
        }
    }

    fn state(&self, id: StateId) -> &M::State {
        match self {
            Searcher::Naive(search) => search.state(id),
            Searcher::Lazy(search) => search.state(id),
        }
    }

    fn state_time(&self, id: StateId) -> Time {
        match self {
            Searcher::Naive(search) => search.state_time(id),
            Searcher::Lazy(search) => search.state_time(id),
        }
    }

    fn accumulated_cost(&self, id: StateId) -> Option<f64> {
        match self {
            Searcher::Naive(search) => search.accumulated_cost(id),
            Searcher::Lazy(search) => search.accumulated_cost(id),
        }
    }
}
