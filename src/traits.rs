//! Core trait definitions for trellis search.
//!
//! To run a search, implement [`CostModel`] for a struct that captures your
//! instance (observation data, distance tables, probability matrices, …) and
//! hand it to one of the engines. Both engines expose their results through
//! the common [`ViterbiSearch`] interface.

use crate::path::PathIter;
use crate::trellis::{StateId, Time};

/// Cost callbacks supplied by the host, pure in their inputs.
///
/// The three callbacks score a trellis: how well a state explains the
/// observation at its time (emission), how costly it is to move between
/// states in adjacent columns (transition), and how a predecessor's
/// accumulated cost combines with both (accumulation).
///
/// # Contract
/// Implementations must guarantee:
///
/// - `emission_cost` and `transition_cost` return `None` for "unreachable" /
///   "no edge"; engines never call `cost_sofar` with such components.
/// - `transition_cost(left, right)` is only ever called for states in
///   adjacent columns, with `left` one time step before `right`.
/// - `cost_sofar` is monotone non-decreasing in its first argument. The lazy
///   engine additionally requires `cost_sofar(prev, ..) >= prev` and treats
///   any negative cost as invalid; a model that violates this will trip the
///   engine's optimality check (a panic), not return a wrong path.
///
/// Costs are compared on the total order of `f64::total_cmp`.
pub trait CostModel {
    /// Candidate-state payload stored in the trellis. Engines treat it
    /// opaquely; only the model interprets it.
    type State;

    /// Observation cost of a state at its own time step.
    fn emission_cost(&self, state: &Self::State) -> Option<f64>;

    /// Cost of moving from `left` to `right`, where `right` sits one time
    /// step after `left`.
    fn transition_cost(&self, left: &Self::State, right: &Self::State) -> Option<f64>;

    /// Combine a predecessor's accumulated cost with a transition and an
    /// emission. Plain addition is the usual choice.
    fn cost_sofar(&self, prev_costsofar: f64, transition_cost: f64, emission_cost: f64) -> f64 {
        prev_costsofar + transition_cost + emission_cost
    }
}

/// The search interface shared by both engines.
///
/// `search_winner` is idempotent and monotone: once it has produced an
/// answer for a time step, no later query changes that answer. The remaining
/// accessors answer from state the search has already materialized.
pub trait ViterbiSearch {
    /// Candidate-state payload, matching the engine's cost model.
    type State;

    /// The optimal state at `time`, or `None` if no state there is
    /// reachable (or the column does not exist). Extends the search as far
    /// as needed; queries past the last column return `None` untouched.
    fn search_winner(&mut self, time: Time) -> Option<StateId>;

    /// The state chosen one step before `id` on its optimal prefix. `None`
    /// at time 0, after a restart, or when `id` has not been reached yet.
    fn predecessor(&self, id: StateId) -> Option<StateId>;

    /// The state payload for `id`.
    ///
    /// # Panics
    /// Panics if `id` does not name a state of this engine's trellis.
    fn state(&self, id: StateId) -> &Self::State;

    /// The time step of the state with `id`.
    ///
    /// # Panics
    /// Panics if `id` does not name a state of this engine's trellis.
    fn state_time(&self, id: StateId) -> Time;

    /// Accumulated cost of the optimal prefix ending at `id`, or `None` if
    /// the search has not (or cannot) reach it.
    fn accumulated_cost(&self, id: StateId) -> Option<f64>;

    /// Walk backward from the winner at `time` to time 0.
    ///
    /// The iterator yields one state id per time step, newest first. At a
    /// breakage it resumes from the cached winner on the far side of the
    /// gap, which may trigger further search work; it ends early if a time
    /// step has neither predecessor nor winner.
    fn search_path(&mut self, time: Time) -> PathIter<'_, Self>
    where
        Self: Sized,
    {
        PathIter::new(self, time)
    }
}
