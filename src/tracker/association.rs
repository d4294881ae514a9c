//! Greedy gated nearest-neighbor association of candidates to hypotheses.
//!
//! Each candidate either fuses into the best matching hypothesis inside an
//! adaptive distance gate or is inserted as a new hypothesis. This is a
//! deliberate greedy scheme, not an optimal assignment: candidates are
//! processed in batch order and ties on the minimum distance go to the
//! first hypothesis in store order.

use crate::config::{MergeRadiusFn, TrackerConfig};
use crate::hypothesis::Hypothesis;
use crate::reporter::TrackerReporter;
use smallvec::SmallVec;

/// Transient per-batch marker: `matched[i]` blocks hypothesis `i` from
/// absorbing a second candidate of the same batch. Sized to the live
/// hypothesis count at the start of each ingestion pass and kept aligned
/// with the store as candidates are inserted.
pub type MatchedMarker = SmallVec<[bool; 16]>;

/// Create a fresh marker for a batch over `len` hypotheses.
pub fn new_marker(len: usize) -> MatchedMarker {
    let mut marker = MatchedMarker::new();
    marker.resize(len, false);
    marker
}

/// Merge a candidate into the store or insert it as a new hypothesis.
pub fn try_to_merge(
    store: &mut Vec<Hypothesis>,
    matched: &mut MatchedMarker,
    candidate: Hypothesis,
    config: &TrackerConfig,
    merge_radius: MergeRadiusFn,
    reporter: &mut dyn TrackerReporter,
) {
    debug_assert_eq!(store.len(), matched.len());

    if store.is_empty() {
        reporter.on_new_hypothesis(&candidate);
        store.push(candidate);
        matched.push(true);
        return;
    }

    let gate = merge_radius(candidate.distance(), config);
    let gate_squared = gate * gate;
    let mut best_distance_squared = f32::MAX;
    let mut best: Option<usize> = None;

    // First-found minimum wins; scan order is store order.
    for (i, hypothesis) in store.iter().enumerate() {
        if matched[i] {
            continue;
        }
        let distance_squared = (candidate.center - hypothesis.center).norm_squared();
        if distance_squared <= gate_squared && distance_squared < best_distance_squared {
            best_distance_squared = distance_squared;
            best = Some(i);
        }
    }

    match best {
        Some(i) => {
            let target = &mut store[i];
            target.last_seen = candidate.last_seen;
            target.fuse_measurement(&candidate, config.weighted_sum, config.robot_radius);
            target.consider_type(&candidate, config.team_threshold, config.upright_threshold);
            target.seen_count += candidate.seen_count;
            target.not_seen_count = 0;
            matched[i] = true;
            reporter.on_merge(&candidate.center, &store[i]);
        }
        None => {
            reporter.on_new_hypothesis(&candidate);
            store.push(candidate);
            matched.push(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_merge_radius;
    use crate::hypothesis::ObstacleType;
    use crate::reporter::NoOpReporter;
    use nalgebra::{Matrix2, Vector2};

    fn candidate(x: f32, y: f32) -> Hypothesis {
        let mut h = Hypothesis::new(
            Matrix2::identity() * 100.0,
            Vector2::new(x, y),
            Vector2::zeros(),
            Vector2::zeros(),
            1000,
            ObstacleType::Unknown,
            1,
        );
        h.set_left_right(100.0, 100.0);
        h
    }

    fn merge(
        store: &mut Vec<Hypothesis>,
        matched: &mut MatchedMarker,
        c: Hypothesis,
        config: &TrackerConfig,
    ) {
        try_to_merge(store, matched, c, config, default_merge_radius, &mut NoOpReporter);
    }

    #[test]
    fn test_empty_store_inserts() {
        let config = TrackerConfig::default();
        let mut store = Vec::new();
        let mut matched = new_marker(0);
        merge(&mut store, &mut matched, candidate(1000.0, 0.0), &config);
        assert_eq!(store.len(), 1);
        assert_eq!(matched.len(), 1);
        assert!(matched[0]);
    }

    #[test]
    fn test_candidate_inside_gate_merges() {
        let config = TrackerConfig::default();
        let mut store = vec![candidate(1000.0, 0.0)];
        let mut matched = new_marker(store.len());
        merge(&mut store, &mut matched, candidate(1100.0, 0.0), &config);
        assert_eq!(store.len(), 1);
        assert_eq!(store[0].seen_count, 2);
        assert_eq!(store[0].not_seen_count, 0);
        assert!(store[0].center.x > 1000.0 && store[0].center.x < 1100.0);
    }

    #[test]
    fn test_candidate_outside_gate_spawns() {
        let config = TrackerConfig::default();
        let mut store = vec![candidate(500.0, 0.0)];
        let mut matched = new_marker(store.len());
        merge(&mut store, &mut matched, candidate(3000.0, 2000.0), &config);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_nearest_hypothesis_wins() {
        let config = TrackerConfig::default();
        let mut store = vec![candidate(1000.0, 200.0), candidate(1000.0, -50.0)];
        let mut matched = new_marker(store.len());
        merge(&mut store, &mut matched, candidate(1000.0, 0.0), &config);
        assert_eq!(store.len(), 2);
        assert_eq!(store[1].seen_count, 2);
        assert_eq!(store[0].seen_count, 1);
    }

    #[test]
    fn test_tie_goes_to_first_in_store_order() {
        let config = TrackerConfig::default();
        let mut store = vec![candidate(1000.0, 100.0), candidate(1000.0, -100.0)];
        let mut matched = new_marker(store.len());
        merge(&mut store, &mut matched, candidate(1000.0, 0.0), &config);
        assert_eq!(store[0].seen_count, 2);
        assert_eq!(store[1].seen_count, 1);
    }

    #[test]
    fn test_marker_blocks_second_merge_in_batch() {
        let config = TrackerConfig::default();
        let mut store = vec![candidate(1000.0, 0.0)];
        let mut matched = new_marker(store.len());
        merge(&mut store, &mut matched, candidate(1050.0, 0.0), &config);
        // Second candidate of the same batch must spawn, not collapse.
        merge(&mut store, &mut matched, candidate(1050.0, 50.0), &config);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_fresh_marker_allows_cross_batch_merge() {
        let config = TrackerConfig::default();
        let mut store = vec![candidate(1000.0, 0.0)];
        let mut matched = new_marker(store.len());
        merge(&mut store, &mut matched, candidate(1050.0, 0.0), &config);
        // New batch, new marker: the same hypothesis may match again.
        let mut matched = new_marker(store.len());
        merge(&mut store, &mut matched, candidate(1050.0, 50.0), &config);
        assert_eq!(store.len(), 1);
        assert_eq!(store[0].seen_count, 3);
    }
}
