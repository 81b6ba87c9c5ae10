//! Randomized cross-checks: the lazy engine, the minimizing naive engine,
//! and a hand-rolled full-table baseline must agree on every winner, cost,
//! and reconstructed path.

use proptest::prelude::*;
use trellis_search::models::table::TableModel;
use trellis_search::{LazySearch, NaiveSearch, StateId, ViterbiSearch};

/// A concrete trellis instance with explicit per-column emissions and
/// per-pair transitions. `None` marks unreachable states and missing edges.
#[derive(Debug, Clone)]
struct Instance {
    emissions: Vec<Vec<Option<f64>>>,
    /// transitions[t][i][j]: from state i of column t to state j of column t+1.
    transitions: Vec<Vec<Vec<Option<f64>>>>,
}

impl Instance {
    /// Deterministically expand flat random bytes into an instance. Costs
    /// are small half-integer steps so ties actually occur.
    fn synth(widths: &[usize], emission_raw: &[u8], transition_raw: &[u8]) -> Self {
        let mut e_idx = 0usize;
        let mut next_emission = || {
            let raw = emission_raw.get(e_idx).copied().unwrap_or(3);
            e_idx += 1;
            if raw >= 28 {
                None
            } else {
                Some((raw % 12) as f64 * 0.5)
            }
        };
        let emissions: Vec<Vec<Option<f64>>> = widths
            .iter()
            .map(|&w| (0..w).map(|_| next_emission()).collect())
            .collect();

        let mut t_idx = 0usize;
        let mut next_transition = || {
            let raw = transition_raw.get(t_idx).copied().unwrap_or(1);
            t_idx += 1;
            if raw >= 24 {
                None
            } else {
                Some((raw % 12) as f64 * 0.5)
            }
        };
        let transitions: Vec<Vec<Vec<Option<f64>>>> = widths
            .windows(2)
            .map(|pair| {
                (0..pair[0])
                    .map(|_| (0..pair[1]).map(|_| next_transition()).collect())
                    .collect()
            })
            .collect();

        Self {
            emissions,
            transitions,
        }
    }

    fn len(&self) -> usize {
        self.emissions.len()
    }

    /// Build the instance as a table model plus the column layout; state
    /// ids come out t-major, matching the reference's numbering.
    fn to_model(&self) -> TableModel {
        let mut model = TableModel::new();
        let mut keys: Vec<Vec<usize>> = Vec::new();
        for column in &self.emissions {
            keys.push(
                column
                    .iter()
                    .map(|&emission| model.add_candidate(emission))
                    .collect(),
            );
        }
        for (t, layer) in self.transitions.iter().enumerate() {
            for (i, row) in layer.iter().enumerate() {
                for (j, &cost) in row.iter().enumerate() {
                    if let Some(cost) = cost {
                        model.link(keys[t][i], keys[t + 1][j], cost);
                    }
                }
            }
        }
        model
    }

    fn populate<F: FnMut(usize, usize) -> StateId>(&self, mut add: F) {
        let mut key = 0usize;
        for (t, column) in self.emissions.iter().enumerate() {
            for _ in column {
                let id = add(t, key);
                assert_eq!(id, key, "dense ids must equal the model keys");
                key += 1;
            }
        }
    }
}

/// Full-table minimizing reference: relax every pair, restart from emission
/// when a column is unreachable, first optimum in column order wins.
/// Returns per time the winner's global id and cost.
fn reference_winners(instance: &Instance) -> Vec<Option<(StateId, f64)>> {
    let mut offsets = vec![0usize];
    for column in &instance.emissions {
        offsets.push(offsets.last().unwrap() + column.len());
    }

    let mut winners = Vec::new();
    let mut prev_labels: Vec<Option<f64>> = Vec::new();
    for (t, column) in instance.emissions.iter().enumerate() {
        let emission_labels: Vec<Option<f64>> = column.to_vec();
        let mut labels: Vec<Option<f64>> = if t == 0 {
            emission_labels.clone()
        } else {
            let mut labels = vec![None; column.len()];
            for (i, &prev) in prev_labels.iter().enumerate() {
                let Some(prev) = prev else { continue };
                for (j, label) in labels.iter_mut().enumerate() {
                    let Some(emission) = column[j] else { continue };
                    let Some(transition) = instance.transitions[t - 1][i][j] else {
                        continue;
                    };
                    let candidate = prev + transition + emission;
                    if label.map_or(true, |cost| candidate < cost) {
                        *label = Some(candidate);
                    }
                }
            }
            labels
        };
        if t > 0 && labels.iter().all(Option::is_none) {
            labels = emission_labels;
        }

        let mut winner: Option<(StateId, f64)> = None;
        for (j, &label) in labels.iter().enumerate() {
            let Some(cost) = label else { continue };
            if winner.map_or(true, |(_, best)| cost < best) {
                winner = Some((offsets[t] + j, cost));
            }
        }
        winners.push(winner);
        prev_labels = labels;
    }
    winners
}

proptest! {
    #[test]
    fn engines_match_each_other_and_the_reference(
        widths in prop::collection::vec(1usize..4, 1usize..6),
        emission_raw in prop::collection::vec(0u8..32, 0usize..64),
        transition_raw in prop::collection::vec(0u8..32, 0usize..256),
    ) {
        let instance = Instance::synth(&widths, &emission_raw, &transition_raw);
        let last = instance.len() - 1;

        let mut lazy = LazySearch::new(instance.to_model());
        instance.populate(|t, key| lazy.add_state(t, key));
        let mut naive = NaiveSearch::new(instance.to_model());
        instance.populate(|t, key| naive.add_state(t, key));

        let expected = reference_winners(&instance);
        lazy.search_winner(last);
        naive.search_winner(last);

        for (t, expected) in expected.iter().enumerate() {
            let lazy_winner = lazy.search_winner(t);
            let naive_winner = naive.search_winner(t);
            prop_assert_eq!(lazy_winner, naive_winner, "winner mismatch at t={}", t);
            prop_assert_eq!(lazy_winner, expected.map(|(id, _)| id), "reference mismatch at t={}", t);
            if let Some((id, cost)) = *expected {
                prop_assert_eq!(lazy.accumulated_cost(id), Some(cost));
                prop_assert_eq!(naive.accumulated_cost(id), Some(cost));
                prop_assert_eq!(lazy.state_time(id), t);
            }
        }

        let lazy_path: Vec<_> = lazy.search_path(last).collect();
        let naive_path: Vec<_> = naive.search_path(last).collect();
        prop_assert_eq!(&lazy_path, &naive_path, "paths diverge");

        // Yielded states count down in time from the queried step.
        for (offset, &id) in lazy_path.iter().enumerate() {
            prop_assert_eq!(lazy.state_time(id), last - offset);
        }
    }

    #[test]
    fn repeat_queries_are_stable(
        widths in prop::collection::vec(1usize..4, 1usize..5),
        emission_raw in prop::collection::vec(0u8..32, 0usize..32),
        transition_raw in prop::collection::vec(0u8..32, 0usize..128),
    ) {
        let instance = Instance::synth(&widths, &emission_raw, &transition_raw);
        let last = instance.len() - 1;

        let mut search = LazySearch::new(instance.to_model());
        instance.populate(|t, key| search.add_state(t, key));

        // Query front to back, then back to front: answers never change.
        let forward: Vec<_> = (0..=last).map(|t| search.search_winner(t)).collect();
        let backward: Vec<_> = (0..=last).rev().map(|t| search.search_winner(t)).collect();
        let backward: Vec<_> = backward.into_iter().rev().collect();
        prop_assert_eq!(&forward, &backward);

        // A fresh engine queried only at the end agrees time by time.
        let mut oneshot = LazySearch::new(instance.to_model());
        instance.populate(|t, key| oneshot.add_state(t, key));
        oneshot.search_winner(last);
        for (t, &winner) in forward.iter().enumerate() {
            prop_assert_eq!(oneshot.search_winner(t), winner);
        }
    }
}
