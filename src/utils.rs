//! Small shared helpers.

use std::cmp::Ordering;

/// An `f64` cost under IEEE total ordering, so labels can key ordered
/// containers such as the search queue's heap entries.
///
/// The total order makes every comparison deterministic, NaN included: a
/// poisoned cost sorts above `+inf` and sinks to the back of a min-queue
/// instead of winning it. Two values compare equal only when their bit
/// patterns do.
#[derive(Clone, Copy, Debug)]
pub struct TotalF64(pub f64);

impl Ord for TotalF64 {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl PartialOrd for TotalF64 {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for TotalF64 {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        matches!(self.cmp(other), Ordering::Equal)
    }
}

impl Eq for TotalF64 {}

#[cfg(test)]
mod tests {
    use super::TotalF64;
    use std::cmp::Ordering;

    #[test]
    fn orders_costs_like_a_min_queue_key() {
        assert!(TotalF64(0.5) < TotalF64(2.0));
        assert_eq!(TotalF64(2.0).cmp(&TotalF64(2.0)), Ordering::Equal);
        // A NaN cost must lose every pop, not crash the comparison.
        assert!(TotalF64(f64::NAN) > TotalF64(f64::INFINITY));
    }

    #[test]
    fn equality_tracks_bit_patterns() {
        assert_eq!(TotalF64(1.25), TotalF64(1.25));
        assert!(TotalF64(-0.0) != TotalF64(0.0));
        assert_eq!(TotalF64(-0.0).cmp(&TotalF64(0.0)), Ordering::Less);
    }

    #[test]
    fn infinities_bound_the_order() {
        let mut costs = vec![
            TotalF64(f64::INFINITY),
            TotalF64(2.0),
            TotalF64(f64::NEG_INFINITY),
            TotalF64(0.5),
        ];
        costs.sort();
        assert_eq!(costs[0].0, f64::NEG_INFINITY);
        assert_eq!(costs[3].0, f64::INFINITY);
    }
}
