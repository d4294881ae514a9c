//! Overlap resolution: fuse hypotheses that describe the same robot.
//!
//! A pairwise scan over the store (n is bounded by the number of robots on
//! the field, so O(n^2) is fine) fuses pairs that geometrically overlap or
//! are statistically indistinguishable, provided their types are compatible
//! and their last observations happened close enough in time.

use crate::common::linalg;
use crate::config::TrackerConfig;
use crate::hypothesis::Hypothesis;
use crate::reporter::TrackerReporter;

/// Fuse all overlapping hypothesis pairs; donors are removed from the store.
pub fn merge_overlapping(
    store: &mut Vec<Hypothesis>,
    config: &TrackerConfig,
    reporter: &mut dyn TrackerReporter,
) {
    if store.len() < 2 {
        return;
    }

    let mut i = 0;
    while i < store.len() {
        let mut j = store.len() - 1;
        while j > i {
            if should_fuse(&store[i], &store[j], config) {
                let donor = store.remove(j);
                fuse_pair(&mut store[i], &donor, config);
                reporter.on_overlap_fused(&store[i], &donor);
            }
            j -= 1;
        }
        i += 1;
    }
}

/// Decide whether a pair of hypotheses describes the same robot.
fn should_fuse(a: &Hypothesis, b: &Hypothesis, config: &TrackerConfig) -> bool {
    // Hypotheses last seen at distinctly different times are treated as
    // genuinely two robots.
    if a.last_seen.abs_diff(b.last_seen) >= config.merge_overlap_time_diff {
        return false;
    }

    // The sum of the two radii against the distance of the centers.
    let overlap = (a.width() + b.width()) * 0.5;
    let distance = (b.center - a.center).norm();
    let geometrically_overlapping =
        distance <= overlap || distance < 2.0 * config.robot_radius;

    let statistically_close = a.squared_mahalanobis(b)
        < config.min_mahalanobis_distance * config.min_mahalanobis_distance
        && a.seen_count >= config.min_percepts
        && b.seen_count >= config.min_percepts;

    let types_compatible = a.kind.is_generic() || b.kind.is_generic() || a.kind == b.kind;

    (geometrically_overlapping || statistically_close) && types_compatible
}

/// Fuse `donor` into `kept`.
///
/// Position and covariance use information-form fusion; a singular pair
/// leaves the kept estimate untouched. The wider extent survives, the
/// classification is re-voted, recency and confidence take the maximum and
/// the invisibility counters are averaged.
fn fuse_pair(kept: &mut Hypothesis, donor: &Hypothesis, config: &TrackerConfig) {
    if let Some((mean, cov)) = linalg::fuse_information(
        &kept.center,
        &kept.covariance,
        &donor.center,
        &donor.covariance,
    ) {
        kept.center = mean;
        kept.covariance = cov;
    }
    let half_width = kept.half_width().max(donor.half_width());
    kept.set_left_right(half_width, config.robot_radius);

    kept.consider_type(donor, config.team_threshold, config.upright_threshold);
    kept.last_seen = kept.last_seen.max(donor.last_seen);
    kept.seen_count = kept.seen_count.max(donor.seen_count);
    kept.not_seen_count = (kept.not_seen_count + donor.not_seen_count) / 2;
}
