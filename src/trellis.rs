//! The trellis: candidate states organized into per-time columns.
//!
//! States are owned by the [`Trellis`] in an arena indexed by [`StateId`];
//! everything else in the crate refers to states by id. A state's time is
//! fixed when it is inserted and equals the index of its column.

/// Discrete time step (column index) within a trellis.
pub type Time = usize;

/// Dense identifier of a state, assigned by the trellis on insertion.
///
/// Ids equal the insertion index, so the n-th state added to a trellis has
/// id `n - 1` regardless of which column it landed in.
pub type StateId = usize;

/// Per-state dynamic-programming record.
///
/// `costsofar` is the accumulated cost of the best prefix found so far that
/// ends at `state`. `predecessor` is `None` for states seeded from emission
/// cost alone: at time 0, or on the near side of a restart after breakage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Label {
    /// Accumulated cost since time 0 (or since the last restart).
    pub costsofar: f64,
    /// The state this label scores.
    pub state: StateId,
    /// The state chosen at the previous time step, if any.
    pub predecessor: Option<StateId>,
}

/// Owner of candidate states, organized by time step.
///
/// Columns must be populated front to back: a state may be added to the
/// newest column or open the next one, never to an earlier column.
#[derive(Clone, Debug, Default)]
pub struct Trellis<S> {
    payloads: Vec<S>,
    times: Vec<Time>,
    columns: Vec<Vec<StateId>>,
}

impl<S> Trellis<S> {
    pub fn new() -> Self {
        Self {
            payloads: Vec::new(),
            times: Vec::new(),
            columns: Vec::new(),
        }
    }

    /// Insert a state into the column at `time` and return its id.
    ///
    /// # Panics
    /// Panics if `time` is neither the newest column nor the one directly
    /// after it: columns are append-only and gap-free.
    pub fn add_state(&mut self, time: Time, payload: S) -> StateId {
        if time == self.columns.len() {
            self.columns.push(Vec::new());
        } else if time + 1 != self.columns.len() {
            panic!(
                "states must be added in time order: got time {time}, expected {} or {}",
                self.columns.len().saturating_sub(1),
                self.columns.len()
            );
        }
        let id = self.payloads.len();
        self.payloads.push(payload);
        self.times.push(time);
        self.columns[time].push(id);
        id
    }

    /// The state payload for `id`.
    ///
    /// # Panics
    /// Panics if `id` was never returned by [`add_state`](Self::add_state).
    #[inline]
    pub fn state(&self, id: StateId) -> &S {
        &self.payloads[id]
    }

    /// The time step the state with `id` belongs to.
    ///
    /// # Panics
    /// Panics if `id` was never returned by [`add_state`](Self::add_state).
    #[inline]
    pub fn time(&self, id: StateId) -> Time {
        self.times[id]
    }

    /// Ids of the states in the column at `time`, in insertion order.
    #[inline]
    pub fn column(&self, time: Time) -> &[StateId] {
        &self.columns[time]
    }

    /// Number of columns populated so far.
    #[inline]
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Total number of states across all columns.
    #[inline]
    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }

    /// Release all states and columns.
    pub fn clear(&mut self) {
        self.payloads.clear();
        self.times.clear();
        self.columns.clear();
    }
}
