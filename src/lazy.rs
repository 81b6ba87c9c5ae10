//! Incremental best-first engine with pruning.
//!
//! Instead of labeling whole columns, this engine runs a Dijkstra-style
//! expansion over the implicit transition graph: labels are popped cheapest
//! first, a state is settled on its first pop, and the first settlement in a
//! column is that column's winner. The trellis is only explored as far as
//! queries demand, and consecutive queries continue from where the last one
//! stopped.
//!
//! Two mechanisms carry the engineering weight:
//!
//! - **Column-emptiness pruning.** Once every state of column t is settled,
//!   no label at time ≤ t still in the queue can lie on an optimal path to a
//!   later winner (its cost is no smaller than any settled label there), so
//!   the `earliest_time` watermark rises to t + 1 and such labels are
//!   discarded unscanned.
//! - **Breakage recovery.** When the queue drains before the target time is
//!   reached, no path crosses into the next column. The engine records the
//!   unreachable times as having no winner and reseeds the queue from the
//!   next column's emission costs, severing predecessor chains at the gap.
//!
//! Minimization only, and costs must be non-negative with a monotone
//! accumulation; negative model costs are treated as invalid, matching the
//! convention that a negative accumulated cost means "unreachable".

use std::collections::HashMap;

use crate::queue::SearchQueue;
use crate::traits::{CostModel, ViterbiSearch};
use crate::trellis::{Label, StateId, Time, Trellis};

/// Best-first trellis search with lazy column expansion.
///
/// Work already done is never repeated: winners, settled labels, and the
/// pruning watermark survive across [`search_winner`](ViterbiSearch::search_winner)
/// calls, so a query for time t after a query for time s < t only pays for
/// the columns in between.
pub struct LazySearch<M: CostModel> {
    model: M,
    trellis: Trellis<M::State>,
    queue: SearchQueue,
    /// Final label per settled state; costs in here are optimal.
    scanned: HashMap<StateId, Label>,
    /// unreached[t]: states of column t not yet settled, in column order.
    unreached: Vec<Vec<StateId>>,
    winners: Vec<Option<StateId>>,
    /// Labels at a time before this watermark are stale.
    earliest_time: Time,
}

impl<M: CostModel> LazySearch<M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            trellis: Trellis::new(),
            queue: SearchQueue::new(),
            scanned: HashMap::new(),
            unreached: Vec::new(),
            winners: Vec::new(),
            earliest_time: 0,
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
        let id = self.trellis.add_state(time, payload);
        if time == self.unreached.len() {
            self.unreached.push(Vec::new());
        }
        self.unreached[time].push(id);
        id
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Release all states and search results.
    pub fn clear(&mut self) {
        self.trellis.clear();
        self.queue.clear();
        self.scanned.clear();
        self.unreached.clear();
        self.winners.clear();
        self.earliest_time = 0;
    }

    fn emission(&self, id: StateId) -> Option<f64> {
        self.model
            .emission_cost(self.trellis.state(id))
            .filter(|&cost| cost >= 0.0)
    }

    fn transition(&self, left: StateId, right: StateId) -> Option<f64> {
        self.model
            .transition_cost(self.trellis.state(left), self.trellis.state(right))
            .filter(|&cost| cost >= 0.0)
    }

    /// Reseed the queue with emission-only labels for the unsettled states
    /// of the column at `time`.
    fn init_queue(&mut self, time: Time) {
        self.queue.clear();
        for position in 0..self.unreached[time].len() {
            let id = self.unreached[time][position];
            let Some(emission_cost) = self.emission(id) else {
                continue;
            };
            self.queue.push(Label {
                costsofar: emission_cost,
                state: id,
                predecessor: None,
            });
        }
    }

    /// Push labels for every valid edge from a settled state into the
    /// unsettled part of the next column.
    ///
    /// # Panics
    /// Panics if `id` has no successor column or has not been settled.
    fn add_successors(&mut self, id: StateId) {
        let time = self.trellis.time(id);
        assert!(
            time + 1 < self.unreached.len(),
            "state at time {time} cannot have successors"
        );
        let costsofar = self
            .scanned
            .get(&id)
            .unwrap_or_else(|| panic!("successors requested for unsettled state {id}"))
            .costsofar;
        debug_assert!(costsofar >= 0.0);

        // Settled states have left unreached, so none of these pushes can
        // resurrect an already-optimal state.
        for position in 0..self.unreached[time + 1].len() {
            let next = self.unreached[time + 1][position];
            let Some(emission_cost) = self.emission(next) else {
                continue;
            };
            let Some(transition_cost) = self.transition(id, next) else {
                continue;
            };
            let next_costsofar = self
                .model
                .cost_sofar(costsofar, transition_cost, emission_cost);
            if next_costsofar < 0.0 {
                continue;
            }
            self.queue.push(Label {
                costsofar: next_costsofar,
                state: next,
                predecessor: Some(id),
            });
        }
    }

    /// One expansion round: settle states best-first until the winner at
    /// `target` is found or the queue drains.
    ///
    /// Returns the last time with a recorded winner entry (present or
    /// absent). A return value below `target` means a breakage: no path
    /// connects the frontier column to the next, and the caller should
    /// request a new start.
    ///
    /// # Panics
    /// Panics if the trellis is empty or `target` lies past its last
    /// column, and on the internal-consistency violations documented on
    /// the type: a state settled at a cost below an earlier settlement, a
    /// settled state missing from its column, or a settlement ahead of the
    /// winner frontier.
    fn iterative_search(&mut self, target: Time, request_new_start: bool) -> Time {
        assert!(
            !self.unreached.is_empty(),
            "add some states before searching"
        );
        assert!(
            target < self.unreached.len(),
            "target time {target} is past the last column {}",
            self.unreached.len() - 1
        );

        // The winner at the target is already known.
        if target < self.winners.len() {
            return target;
        }

        #[cfg(feature = "tracing")]
        let span = tracing::trace_span!("iterative_search", target, request_new_start);
        #[cfg(feature = "tracing")]
        let _enter = span.enter();

        let source = match self.winners.last() {
            Some(&Some(winner)) if !request_new_start => {
                // Continue the last search from its winner.
                let source = self.winners.len() - 1;
                self.add_successors(winner);
                source
            }
            _ => {
                // Fresh start (first search, or recovery after breakage):
                // seed from emission costs alone.
                let source = self.winners.len();
                self.init_queue(source);
                source
            }
        };

        let mut searched_time = source;

        while let Some(label) = self.queue.pop() {
            let id = label.state;
            let time = self.trellis.time(id);

            // Stale: every state at `time` is settled already, and this
            // label cannot improve anything beyond them.
            if time < self.earliest_time {
                continue;
            }

            if let Some(settled) = self.scanned.get(&id) {
                // Pop costs are non-decreasing, so a second label for a
                // settled state is a harmless duplicate from another
                // predecessor -- unless it is cheaper, which means the cost
                // model broke the monotone non-negative requirement.
                assert!(
                    label.costsofar >= settled.costsofar,
                    "optimality violated at state {id}: cost {} beats settled cost {}",
                    label.costsofar,
                    settled.costsofar
                );
                continue;
            }
            self.scanned.insert(id, label);

            let column = &mut self.unreached[time];
            let position = column
                .iter()
                .position(|&state| state == id)
                .unwrap_or_else(|| panic!("settled state {id} is missing from its column"));
            column.remove(position);
            if column.is_empty() {
                self.earliest_time = time + 1;
            }

            // First arrival at a column is its winner.
            if self.winners.len() <= time {
                assert_eq!(
                    time,
                    self.winners.len(),
                    "settled a state past the winner frontier"
                );
                self.winners.push(Some(id));
            }

            searched_time = searched_time.max(time);

            // The target winner is found; its successors are expanded on
            // the next round.
            if target <= searched_time {
                break;
            }

            self.add_successors(id);
        }

        // Times the expansion never arrived at have no winner.
        while self.winners.len() <= searched_time {
            self.winners.push(None);
        }

        searched_time
    }
}

impl<M: CostModel> ViterbiSearch for LazySearch<M> {
    type State = M::State;

    fn search_winner(&mut self, time: Time) -> Option<StateId> {
        if time < self.winners.len() {
            return self.winners[time];
        }
        if time >= self.trellis.num_columns() {
            return None;
        }

        #[cfg(feature = "tracing")]
        let span = tracing::trace_span!("lazy_search", target = time, from = self.winners.len());
        #[cfg(feature = "tracing")]
        let _enter = span.enter();

        let mut searched_time = self.iterative_search(time, false);
        while searched_time < time {
            // A breakage interrupted the last round; restart from emission
            // costs at the first winnerless column.
            searched_time = self.iterative_search(time, true);
        }

        self.winners[time]
    }

    fn predecessor(&self, id: StateId) -> Option<StateId> {
        self.scanned.get(&id).and_then(|label| label.predecessor)
    }

    fn state(&self, id: StateId) -> &M::State {
        self.trellis.state(id)
    }

    fn state_time(&self, id: StateId) -> Time {
        self.trellis.time(id)
    }

    fn accumulated_cost(&self, id: StateId) -> Option<f64> {
        self.scanned.get(&id).map(|label| label.costsofar)
    }
}
