//! Visibility reasoning: penalize hypotheses that should have been seen.
//!
//! A hypothesis that was not updated this cycle, projects into the current
//! image and is inside the reliable part of the camera cone should have
//! produced a percept. If a nearer obstacle shadows it the miss is
//! explained and no penalty applies; if the field boundary is nearer than
//! the hypothesis the view is presumed blocked and a reduced penalty
//! applies; otherwise the full penalty grows the missed-detection counter.

use crate::config::TrackerConfig;
use crate::hypothesis::{Hypothesis, ObstacleType};
use crate::inputs::CycleInput;
use crate::reporter::TrackerReporter;

/// Grow the missed-detection counters of unseen-but-expected hypotheses.
pub fn should_be_seen(
    store: &mut [Hypothesis],
    input: &CycleInput,
    config: &TrackerConfig,
    reporter: &mut dyn TrackerReporter,
) {
    if store.is_empty() {
        return;
    }
    let Some(camera) = input.camera else {
        return;
    };

    let reliable_half_angle = camera.opening_angle_width * config.camera_angle_factor;
    let angle_left = camera.pan + reliable_half_angle;
    let angle_right = camera.pan - reliable_half_angle;

    for i in 0..store.len() {
        // Recently seen, outside the cone or not in the image: nothing to
        // conclude from a missing percept.
        if input.frame.time_since(store[i].last_seen) < config.recently_seen_time as i64
            || !store[i].is_between(angle_left, angle_right)
        {
            continue;
        }
        let Some(center_in_image) = camera.project_ground(&store[i].center) else {
            continue;
        };

        // A nearer obstacle shadows this one: the miss is explained.
        if is_any_obstacle_in_shadow(store, i, angle_left, angle_right, camera, input.frame.time) {
            continue;
        }

        // The field boundary being nearer means the view of the ground spot
        // is blocked by terrain or an unmodeled object.
        let boundary_nearer = input
            .field_boundary
            .filter(|b| b.is_valid)
            .and_then(|b| b.y_at(center_in_image.x))
            .is_some_and(|boundary_y| boundary_y > center_in_image.y);
        let amount = if boundary_nearer {
            (config.not_seen_threshold / 10).max(1)
        } else {
            1
        };

        store[i].not_seen_count += amount;
        reporter.on_visibility_penalty(&store[i], amount);
    }
}

/// Whether any other visible-but-unmatched hypothesis shadows hypothesis `i`.
///
/// The closer/further decision is made per pair via indices into the store;
/// the store itself stays the single source of truth.
fn is_any_obstacle_in_shadow(
    store: &[Hypothesis],
    i: usize,
    angle_left: f32,
    angle_right: f32,
    camera: &crate::inputs::CameraView,
    now: crate::inputs::Timestamp,
) -> bool {
    for j in (i + 1..store.len()).rev() {
        let other_unseen_but_in_sight = store[j].last_seen != now
            && store[j].is_between(angle_left, angle_right)
            && camera.project_ground(&store[j].center).is_some();
        if !other_unseen_but_in_sight {
            continue;
        }

        let (closer, further) =
            if store[j].center.norm_squared() < store[i].center.norm_squared() {
                (j, i)
            } else {
                (i, j)
            };

        // A fallen robot is too flat to shadow anything behind it.
        if store[closer].kind < ObstacleType::FallenSomeRobot
            && store[further].is_behind(&store[closer])
        {
            return true;
        }
    }
    false
}
