//! The HMM cost model plus the maximizing naive engine must reproduce the
//! classic Viterbi recurrence exactly.

use proptest::prelude::*;
use trellis_search::models::hmm::{Hmm, HmmModel};

/// Textbook Viterbi over log-probabilities: forward maxima with argument
/// tracking, then a backward readout. Ties keep the smallest state index,
/// matching the engine's first-optimum rule.
fn viterbi_reference(hmm: &Hmm, obs: &[usize]) -> Option<(f64, Vec<usize>)> {
    if obs.is_empty() {
        return None;
    }
    let n = hmm.n_states;
    let mut delta = vec![vec![f64::NEG_INFINITY; n]; obs.len()];
    let mut psi = vec![vec![0usize; n]; obs.len()];

    for s in 0..n {
        delta[0][s] = hmm.log_emission[s][obs[0]] + hmm.log_initial[s];
    }
    for t in 1..obs.len() {
        for s_to in 0..n {
            let mut best = f64::NEG_INFINITY;
            let mut arg = 0;
            for s_from in 0..n {
                let cand = delta[t - 1][s_from]
                    + hmm.log_transition[s_from][s_to]
                    + hmm.log_emission[s_to][obs[t]];
                if cand > best {
                    best = cand;
                    arg = s_from;
                }
            }
            delta[t][s_to] = best;
            psi[t][s_to] = arg;
        }
    }

    let last = obs.len() - 1;
    let mut state = 0;
    let mut best = f64::NEG_INFINITY;
    for (s, &cost) in delta[last].iter().enumerate() {
        if cost > best {
            best = cost;
            state = s;
        }
    }
    if best == f64::NEG_INFINITY {
        return None;
    }

    let mut path = vec![0usize; obs.len()];
    path[last] = state;
    for t in (1..=last).rev() {
        path[t - 1] = psi[t][path[t]];
        // path[t] was reached, so its argument is meaningful
    }
    Some((best, path))
}

/// Normalize raw bytes into a strictly positive stochastic row.
fn stochastic_row(raw: &[u8]) -> Vec<f64> {
    let weights: Vec<f64> = raw.iter().map(|&r| r as f64 + 1.0).collect();
    let total: f64 = weights.iter().sum();
    weights.into_iter().map(|w| (w / total).ln()).collect()
}

fn build_hmm(n_states: usize, vocab: usize, raw: &[u8]) -> Hmm {
    let mut idx = 0usize;
    let mut take = |len: usize| -> Vec<u8> {
        (0..len)
            .map(|_| {
                let value = raw.get(idx).copied().unwrap_or(7);
                idx += 1;
                value
            })
            .collect()
    };
    Hmm {
        n_states,
        log_initial: stochastic_row(&take(n_states)),
        log_transition: (0..n_states)
            .map(|_| stochastic_row(&take(n_states)))
            .collect(),
        log_emission: (0..n_states).map(|_| stochastic_row(&take(vocab))).collect(),
    }
}

proptest! {
    #[test]
    fn decoding_matches_the_textbook_recurrence(
        n_states in 1usize..4,
        vocab in 1usize..3,
        raw in prop::collection::vec(0u8..16, 0usize..48),
        obs_raw in prop::collection::vec(0usize..8, 1usize..12),
    ) {
        let hmm = build_hmm(n_states, vocab, &raw);
        let obs: Vec<usize> = obs_raw.into_iter().map(|o| o % vocab).collect();

        let (expected_logp, expected_path) =
            viterbi_reference(&hmm, &obs).expect("positive HMM always decodes");
        let (logp, path) = HmmModel::new(hmm, obs.clone())
            .decode()
            .expect("positive HMM always decodes");

        prop_assert!((logp - expected_logp).abs() < 1e-9,
            "log-prob {} vs reference {}", logp, expected_logp);
        prop_assert_eq!(path, expected_path);
    }

    #[test]
    fn decoded_paths_have_one_state_per_observation(
        obs_raw in prop::collection::vec(0usize..2, 1usize..20),
    ) {
        let hmm = Hmm {
            n_states: 2,
            log_initial: vec![(0.5f64).ln(), (0.5f64).ln()],
            log_transition: vec![
                vec![(0.9f64).ln(), (0.1f64).ln()],
                vec![(0.2f64).ln(), (0.8f64).ln()],
            ],
            log_emission: vec![
                vec![(0.8f64).ln(), (0.2f64).ln()],
                vec![(0.3f64).ln(), (0.7f64).ln()],
            ],
        };
        let model = HmmModel::new(hmm, obs_raw.clone());
        let (_logp, path) = model.decode().expect("decodable");
        prop_assert_eq!(path.len(), obs_raw.len());
    }
}

#[test]
fn an_impossible_observation_severs_the_sequence() {
    // The single state cannot emit symbol 1, so the middle observation is
    // unreachable and decoding restarts after it.
    let hmm = Hmm {
        n_states: 1,
        log_initial: vec![0.0],
        log_transition: vec![vec![0.0]],
        log_emission: vec![vec![0.0, f64::NEG_INFINITY]],
    };
    let model = HmmModel::new(hmm, vec![0, 1, 0]);
    // Decoding reaches the final observation even though no complete
    // sequence exists; the path is cut at the impossible step.
    let decoded = model.decode();
    assert!(decoded.is_some());
    let (logp, path) = decoded.unwrap();
    assert!(logp.is_finite());
    assert!(path.len() < 3);
}
