//! Backward walk over the winning path.

use crate::traits::ViterbiSearch;
use crate::trellis::{StateId, Time};

/// Iterator over the optimal state sequence, newest time first.
///
/// Starting from the winner at the queried time, each step follows the
/// predecessor link one time step back. Where a predecessor is missing
/// (time 0, or the near side of a breakage) the walk resumes from the
/// cached winner at the previous time; if there is no winner there either,
/// the walk ends early.
///
/// The iterator holds the engine mutably: resuming across a breakage asks
/// the engine for a winner, which may extend the search.
pub struct PathIter<'a, V: ViterbiSearch> {
    search: &'a mut V,
    id: Option<StateId>,
    time: Time,
    exhausted: bool,
}

impl<'a, V: ViterbiSearch> PathIter<'a, V> {
    pub(crate) fn new(search: &'a mut V, time: Time) -> Self {
        let id = search.search_winner(time);
        Self {
            search,
            id,
            time,
            exhausted: false,
        }
    }
}

impl<V: ViterbiSearch> Iterator for PathIter<'_, V> {
    type Item = StateId;

    fn next(&mut self) -> Option<StateId> {
        if self.exhausted {
            return None;
        }
        let Some(current) = self.id else {
            self.exhausted = true;
            return None;
        };

        if self.time == 0 {
            self.exhausted = true;
        } else {
            self.time -= 1;
            let mut previous = self.search.predecessor(current);
            if previous.is_none() {
                // Breakage boundary: pick the walk up again from the winner
                // on the far side of the gap.
                previous = self.search.search_winner(self.time);
            }
            debug_assert!(
                previous.map_or(true, |id| self.search.state_time(id) == self.time),
                "path stepped to a state outside its time step"
            );
            self.id = previous;
        }

        Some(current)
    }
}
