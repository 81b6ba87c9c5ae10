//! Full-trellis dynamic-programming engine.
//!
//! Fills the trellis column by column with Bellman relaxation up to the
//! requested time, keeping every column's label vector so predecessor and
//! cost queries can be answered later. Supports minimization and
//! maximization through a [`Polarity`] chosen at construction.

use crate::traits::{CostModel, ViterbiSearch};
use crate::trellis::{Label, StateId, Time, Trellis};

/// Whether a search looks for the smallest or the largest accumulated cost.
///
/// The polarity only shows up in the label comparator and in the sentinel
/// that marks unreachable states (`+inf` when minimizing, `-inf` when
/// maximizing).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Polarity {
    Minimize,
    Maximize,
}

impl Polarity {
    /// The cost marking a label as unreachable under this polarity.
    #[inline]
    pub fn invalid_cost(self) -> f64 {
        match self {
            Polarity::Minimize => f64::INFINITY,
            Polarity::Maximize => f64::NEG_INFINITY,
        }
    }

    /// Strictly-better comparison under this polarity.
    #[inline]
    fn better(self, candidate: f64, incumbent: f64) -> bool {
        match self {
            Polarity::Minimize => candidate < incumbent,
            Polarity::Maximize => candidate > incumbent,
        }
    }
}

/// Textbook trellis search: every column is fully labeled before the next.
///
/// Per step this costs O(|previous column| × |current column|) model calls,
/// which is fine for the column widths map-matching produces (tens). The
/// upside over [`LazySearch`](crate::lazy::LazySearch) is the polarity
/// choice and a complete label history.
pub struct NaiveSearch<M: CostModel> {
    model: M,
    polarity: Polarity,
    trellis: Trellis<M::State>,
    /// history[t] holds one label per state of column t, in column order.
    history: Vec<Vec<Label>>,
    winners: Vec<Option<StateId>>,
}

impl<M: CostModel> NaiveSearch<M> {
    /// A minimizing search over an empty trellis.
    pub fn new(model: M) -> Self {
        Self::with_polarity(model, Polarity::Minimize)
    }

    pub fn with_polarity(model: M, polarity: Polarity) -> Self {
        Self {
            model,
            polarity,
            trellis: Trellis::new(),
            history: Vec::new(),
            winners: Vec::new(),
        }
    }

    /// Insert a candidate state into the column at `time`.
    ///
    /// # Panics
    /// Panics if the column at `time` has already been searched, or if
    /// `time` violates the trellis column order.
    pub fn add_state(&mut self, time: Time, payload: M::State) -> StateId {
        assert!(
            time >= self.winners.len(),
            "cannot add a state at time {time}: winners are already fixed through time {}",
            self.winners.len().saturating_sub(1)
        );
        self.trellis.add_state(time, payload)
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Release all states and search results.
    pub fn clear(&mut self) {
        self.trellis.clear();
        self.history.clear();
        self.winners.clear();
    }

    fn emission(&self, id: StateId) -> f64 {
        self.model
            .emission_cost(self.trellis.state(id))
            .unwrap_or_else(|| self.polarity.invalid_cost())
    }

    /// One label per state of the column, seeded from emission cost or from
    /// the unreachable sentinel.
    fn init_labels(&self, time: Time, use_emission_cost: bool) -> Vec<Label> {
        self.trellis
            .column(time)
            .iter()
            .map(|&id| {
                let costsofar = if use_emission_cost {
                    self.emission(id)
                } else {
                    self.polarity.invalid_cost()
                };
                Label {
                    costsofar,
                    state: id,
                    predecessor: None,
                }
            })
            .collect()
    }

    /// Relax every (previous, current) state pair, keeping the better label.
    /// Cost ties keep the incumbent, so the first optimal predecessor in
    /// column order wins.
    fn relax(&self, labels: &mut [Label], time: Time) {
        let invalid = self.polarity.invalid_cost();
        let emissions: Vec<f64> = labels.iter().map(|l| self.emission(l.state)).collect();
        for prev in &self.history[time - 1] {
            if prev.costsofar == invalid {
                continue;
            }
            for (label, &emission_cost) in labels.iter_mut().zip(&emissions) {
                if emission_cost == invalid {
                    continue;
                }
                let Some(transition_cost) = self
                    .model
                    .transition_cost(self.trellis.state(prev.state), self.trellis.state(label.state))
                else {
                    continue;
                };
                if transition_cost == invalid {
                    continue;
                }
                let costsofar = self
                    .model
                    .cost_sofar(prev.costsofar, transition_cost, emission_cost);
                if costsofar == invalid {
                    continue;
                }
                if self.polarity.better(costsofar, label.costsofar) {
                    label.costsofar = costsofar;
                    label.predecessor = Some(prev.state);
                }
            }
        }
    }

    /// The first label with optimal valid cost, in column order.
    fn find_winner(&self, labels: &[Label]) -> Option<StateId> {
        let invalid = self.polarity.invalid_cost();
        let mut best: Option<&Label> = None;
        for label in labels {
            if label.costsofar == invalid {
                continue;
            }
            if best.map_or(true, |b| self.polarity.better(label.costsofar, b.costsofar)) {
                best = Some(label);
            }
        }
        best.map(|label| label.state)
    }

    fn label(&self, id: StateId) -> Option<&Label> {
        if id >= self.trellis.len() {
            return None;
        }
        let time = self.trellis.time(id);
        if time >= self.history.len() {
            return None;
        }
        Some(
            self.history[time]
                .iter()
                .find(|label| label.state == id)
                .expect("label missing from a searched column"),
        )
    }
}

impl<M: CostModel> ViterbiSearch for NaiveSearch<M> {
    type State = M::State;

    fn search_winner(&mut self, target: Time) -> Option<StateId> {
        if target >= self.trellis.num_columns() {
            return None;
        }
        if target < self.winners.len() {
            return self.winners[target];
        }

        #[cfg(feature = "tracing")]
        let span = tracing::trace_span!("naive_search", target, from = self.winners.len());
        #[cfg(feature = "tracing")]
        let _enter = span.enter();

        for time in self.winners.len()..=target {
            let mut labels = if time == 0 {
                self.init_labels(time, true)
            } else {
                let mut labels = self.init_labels(time, false);
                self.relax(&mut labels, time);
                labels
            };
            debug_assert_eq!(labels.len(), self.trellis.column(time).len());

            let mut winner = self.find_winner(&labels);
            if winner.is_none() && time > 0 {
                // Nothing in this column is reachable from the previous one.
                // Sever the path here and restart from emission cost alone.
                labels = self.init_labels(time, true);
                winner = self.find_winner(&labels);
            }
            self.winners.push(winner);
            self.history.push(labels);
        }

        self.winners[target]
    }

    fn predecessor(&self, id: StateId) -> Option<StateId> {
        self.label(id).and_then(|label| label.predecessor)
    }

    fn state(&self, id: StateId) -> &M::State {
        self.trellis.state(id)
    }

    fn state_time(&self, id: StateId) -> Time {
        self.trellis.time(id)
    }

    fn accumulated_cost(&self, id: StateId) -> Option<f64> {
        self.label(id)
            .map(|label| label.costsofar)
            .filter(|&cost| cost != self.polarity.invalid_cost())
    }
}
