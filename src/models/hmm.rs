//! Discrete HMM decoding as a cost model.
//!
//! Log-probabilities are costs to be maximized, so this model pairs with
//! the naive engine's max polarity; the classic Viterbi recurrence falls
//! out of the engine's relaxation once each (time, state) pair becomes a
//! trellis candidate. Zero probabilities map to `-inf`, which the engine
//! treats as unreachable.

use std::sync::Arc;

use crate::naive::{NaiveSearch, Polarity};
use crate::traits::{CostModel, ViterbiSearch};

/// Parameters of a discrete-output hidden Markov chain, stored in log
/// space so the cost callbacks are plain additions.
///
/// Every table row belongs to one hidden state; an entry of
/// `f64::NEG_INFINITY` encodes probability zero.
#[derive(Clone, Debug)]
pub struct Hmm {
    /// How many hidden states the chain has.
    pub n_states: usize,
    /// Log probability of the chain starting in each state.
    pub log_initial: Vec<f64>,
    /// Log probability of stepping from the row's state to the column's.
    pub log_transition: Vec<Vec<f64>>,
    /// Log probability of a state producing each observation symbol.
    pub log_emission: Vec<Vec<f64>>,
}

/// One trellis candidate: hidden state `state` at observation index `time`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HmmState {
    pub time: usize,
    pub state: usize,
}

/// Decoding instance: fixed HMM plus an observation sequence.
#[derive(Clone)]
pub struct HmmModel {
    hmm: Arc<Hmm>,
    obs: Vec<usize>,
}

impl HmmModel {
    /// # Panics
    /// Panics if the HMM's tables disagree with `n_states` or an
    /// observation symbol is out of range for the emission table.
    pub fn new(hmm: Hmm, obs: Vec<usize>) -> Self {
        assert_eq!(hmm.log_initial.len(), hmm.n_states);
        assert_eq!(hmm.log_transition.len(), hmm.n_states);
        for row in &hmm.log_transition {
            assert_eq!(row.len(), hmm.n_states);
        }
        assert_eq!(hmm.log_emission.len(), hmm.n_states);
        for &symbol in &obs {
            assert!(
                hmm.log_emission.iter().all(|row| symbol < row.len()),
                "observation symbol {symbol} out of range"
            );
        }
        Self {
            hmm: Arc::new(hmm),
            obs,
        }
    }

    pub fn hmm(&self) -> &Hmm {
        &self.hmm
    }

    pub fn observations(&self) -> &[usize] {
        &self.obs
    }

    /// Decode the most likely state sequence.
    ///
    /// Builds a maximizing naive search with one candidate per (time,
    /// state) pair and walks the winning path back. Returns the path's
    /// log-probability and the state indices in time order, or `None` when
    /// there are no observations or no state can produce them.
    pub fn decode(&self) -> Option<(f64, Vec<usize>)> {
        if self.obs.is_empty() {
            return None;
        }
        let last = self.obs.len() - 1;
        let n_states = self.hmm.n_states;

        let mut search = NaiveSearch::with_polarity(self.clone(), Polarity::Maximize);
        for time in 0..self.obs.len() {
            for state in 0..n_states {
                search.add_state(time, HmmState { time, state });
            }
        }

        let winner = search.search_winner(last)?;
        let log_prob = search.accumulated_cost(winner)?;
        let ids: Vec<_> = search.search_path(last).collect();
        let mut states: Vec<usize> = ids.iter().map(|&id| search.state(id).state).collect();
        states.reverse();
        Some((log_prob, states))
    }
}

impl CostModel for HmmModel {
    type State = HmmState;

    fn emission_cost(&self, state: &HmmState) -> Option<f64> {
        let mut cost = self.hmm.log_emission[state.state][self.obs[state.time]];
        if state.time == 0 {
            cost += self.hmm.log_initial[state.state];
        }
        Some(cost)
    }

    fn transition_cost(&self, left: &HmmState, right: &HmmState) -> Option<f64> {
        Some(self.hmm.log_transition[left.state][right.state])
    }
}
