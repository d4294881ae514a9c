//! Hypothesis lifecycle: removal of dead, implausible and stale entries.
//!
//! Pruning runs at the start of every cycle, before prediction, so that no
//! later stage wastes work on hypotheses that are already lost. Every
//! hypothesis is either kept or removed; nothing is mutated here.

use crate::config::TrackerConfig;
use crate::hypothesis::Hypothesis;
use crate::inputs::CycleInput;
use crate::reporter::TrackerReporter;
use nalgebra::Point2;

/// Remove all hypotheses that no longer describe a plausible robot.
pub fn prune(
    store: &mut Vec<Hypothesis>,
    input: &CycleInput,
    config: &TrackerConfig,
    reporter: &mut dyn TrackerReporter,
) {
    let mut removed = Vec::new();
    let mut kept = Vec::with_capacity(store.len());
    for hypothesis in store.drain(..) {
        if should_remove(&hypothesis, input, config) {
            removed.push(hypothesis);
        } else {
            kept.push(hypothesis);
        }
    }
    *store = kept;
    reporter.on_pruning(&removed, store);
}

fn should_remove(
    hypothesis: &Hypothesis,
    input: &CycleInput,
    config: &TrackerConfig,
) -> bool {
    // Missed too many expected detections.
    if hypothesis.not_seen_count >= config.not_seen_threshold {
        return true;
    }

    // Not observed for too long in wall-clock time.
    if input.frame.time_since(hypothesis.last_seen) >= config.delete_after as i64 {
        return true;
    }

    let distance_squared = hypothesis.center.norm_squared();

    // Too far away to track reliably.
    if distance_squared >= config.max_distance * config.max_distance {
        return true;
    }

    // Inside the own body: a percept of ourselves.
    let inner = 0.5 * config.robot_radius;
    if distance_squared <= inner * inner {
        return true;
    }

    // Right after leaving the playing state a referee walks between the
    // robots; stale hypotheses from before the whistle are likely their
    // legs and hands.
    if input.game.was_playing
        && !input.game.playing
        && input.frame.time_since(hypothesis.last_seen) > config.referee_ignore_time as i64
    {
        return true;
    }

    // Well off the carpet in the field frame: a localization artifact or a
    // person outside the field.
    let on_field = input.robot_pose.transform_point(&Point2::from(hypothesis.center));
    if config.field.distance_outside(&on_field.coords) > config.field_border_tolerance {
        return true;
    }

    false
}
