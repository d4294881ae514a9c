//! Observation ingestion: sensor events become candidate hypotheses.
//!
//! Three independent sources feed the store: arm contacts, foot bumpers and
//! vision percepts. Each source is ingested as one atomic batch with its
//! own matched-marker, so two candidates of the same batch never collapse
//! into one hypothesis (both arms touching means two obstacles), while a
//! later batch may still match a hypothesis updated by an earlier one.

use crate::config::{MergeRadiusFn, TrackerConfig};
use crate::hypothesis::{Hypothesis, ObstacleType};
use crate::inputs::{CycleInput, ObstaclePercept, PerceptKind};
use crate::reporter::{SensorSource, TrackerReporter};
use crate::tracker::association::{new_marker, try_to_merge};
use nalgebra::{Matrix2, Vector2};

/// Ingest arm contact events.
///
/// Returns the per-arm latched contact states for the next cycle.
pub fn add_arm_contacts(
    store: &mut Vec<Hypothesis>,
    input: &CycleInput,
    latched: &mut [bool; 2],
    config: &TrackerConfig,
    merge_radius: MergeRadiusFn,
    reporter: &mut dyn TrackerReporter,
) {
    let mut matched = new_marker(store.len());
    let mut candidates = 0;

    for (arm, contact) in input.arm_contacts.iter().enumerate().take(2) {
        let active = contact.contact
            && input.frame.time_since(contact.last_contact) <= config.max_contact_time as i64;
        if !active {
            latched[arm] = false;
            continue;
        }
        latched[arm] = true;

        // Push the candidate outward from the shoulder, past the body shell.
        let mut center = contact.position;
        center.y += center.y.signum() * (config.robot_radius + config.arm_contact_clearance);

        let covariance = Matrix2::identity() * config.arm_contact_deviation.powi(2);
        let mut candidate = Hypothesis::new(
            covariance,
            center,
            Vector2::zeros(),
            Vector2::zeros(),
            input.frame.time,
            ObstacleType::Unknown,
            1,
        );
        candidate.set_left_right(config.robot_radius, config.robot_radius);
        try_to_merge(store, &mut matched, candidate, config, merge_radius, reporter);
        candidates += 1;
    }

    reporter.on_batch_ingested(SensorSource::ArmContact, candidates);
}

/// Ingest foot bumper events.
pub fn add_foot_contacts(
    store: &mut Vec<Hypothesis>,
    input: &CycleInput,
    latched: &mut [bool; 2],
    config: &TrackerConfig,
    merge_radius: MergeRadiusFn,
    reporter: &mut dyn TrackerReporter,
) {
    let mut matched = new_marker(store.len());
    let mut candidates = 0;

    for (leg, contact) in input.foot_contacts.iter().enumerate().take(2) {
        let active = contact.contact
            && input.frame.time_since(contact.last_contact) <= config.max_contact_time as i64;
        if !active {
            latched[leg] = false;
            continue;
        }
        latched[leg] = true;

        // The bumper sits in front of the toe; the obstacle is one body
        // radius beyond it.
        let mut center = contact.position;
        center.x += config.robot_radius + config.dist_joint_to_toe + config.dist_toe_to_bumper;

        let covariance = Matrix2::identity() * config.foot_contact_deviation.powi(2);
        let mut candidate = Hypothesis::new(
            covariance,
            center,
            Vector2::zeros(),
            Vector2::zeros(),
            input.frame.time,
            ObstacleType::Unknown,
            1,
        );
        candidate.set_left_right(config.robot_radius, config.robot_radius);
        try_to_merge(store, &mut matched, candidate, config, merge_radius, reporter);
        candidates += 1;
    }

    reporter.on_batch_ingested(SensorSource::FootContact, candidates);
}

/// Ingest vision obstacle percepts.
pub fn add_player_percepts(
    store: &mut Vec<Hypothesis>,
    input: &CycleInput,
    config: &TrackerConfig,
    merge_radius: MergeRadiusFn,
    reporter: &mut dyn TrackerReporter,
) {
    if input.percepts.is_empty() {
        return;
    }

    let mut matched = new_marker(store.len());
    let mut candidates = 0;

    for percept in input.percepts {
        if percept.center.norm_squared() >= config.max_distance * config.max_distance {
            continue;
        }

        let kind = classify(percept);
        let mut candidate = Hypothesis::new(
            percept.covariance,
            percept.center,
            extend_outward(&percept.left, config.robot_radius),
            extend_outward(&percept.right, config.robot_radius),
            input.frame.time,
            kind,
            1,
        );

        // Obstacles have a minimum size.
        let min_width = 2.0 * config.robot_radius;
        if candidate.width() < min_width {
            candidate.set_left_right(config.robot_radius, config.robot_radius);
        }

        try_to_merge(store, &mut matched, candidate, config, merge_radius, reporter);
        candidates += 1;
    }

    reporter.on_batch_ingested(SensorSource::Vision, candidates);
}

/// Map a percept's team/role/fallen flags to an obstacle type.
fn classify(percept: &ObstaclePercept) -> ObstacleType {
    match percept.kind {
        PerceptKind::OpponentPlayer | PerceptKind::OpponentGoalkeeper => {
            if percept.fallen {
                ObstacleType::FallenOpponent
            } else {
                ObstacleType::Opponent
            }
        }
        PerceptKind::OwnPlayer | PerceptKind::OwnGoalkeeper => {
            if percept.fallen {
                ObstacleType::FallenTeammate
            } else {
                ObstacleType::Teammate
            }
        }
        PerceptKind::Unknown => {
            if percept.fallen {
                ObstacleType::FallenSomeRobot
            } else {
                ObstacleType::SomeRobot
            }
        }
    }
}

/// Lengthen a boundary vector outward by `radius`.
///
/// A zero-length vector has no direction to extend along and is returned
/// unchanged; the minimum-width rule catches it afterwards.
fn extend_outward(v: &Vector2<f32>, radius: f32) -> Vector2<f32> {
    let norm = v.norm();
    if norm > f32::EPSILON {
        v * ((norm + radius) / norm)
    } else {
        *v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_merge_radius;
    use crate::inputs::{FrameInfo, GameContext, LimbContact, OdometryOffset};
    use crate::reporter::NoOpReporter;
    use approx::assert_relative_eq;
    use nalgebra::Isometry2;

    fn percept(x: f32, y: f32, kind: PerceptKind, fallen: bool) -> ObstaclePercept {
        ObstaclePercept {
            center: Vector2::new(x, y),
            covariance: Matrix2::identity() * 400.0,
            left: Vector2::new(x, y + 120.0),
            right: Vector2::new(x, y - 120.0),
            kind,
            fallen,
        }
    }

    fn input_with<'a>(
        percepts: &'a [ObstaclePercept],
        arms: &'a [LimbContact],
        feet: &'a [LimbContact],
    ) -> CycleInput<'a> {
        CycleInput {
            frame: FrameInfo { time: 5000 },
            odometry: OdometryOffset::default(),
            robot_pose: Isometry2::identity(),
            percepts,
            arm_contacts: arms,
            foot_contacts: feet,
            camera: None,
            field_boundary: None,
            game: GameContext::default(),
            opponent_roster: &[],
        }
    }

    #[test]
    fn test_both_arms_spawn_two_hypotheses() {
        let config = TrackerConfig::default();
        let arms = [
            LimbContact { contact: true, last_contact: 4900, position: Vector2::new(0.0, 100.0) },
            LimbContact { contact: true, last_contact: 4900, position: Vector2::new(0.0, -100.0) },
        ];
        let input = input_with(&[], &arms, &[]);
        let mut store = Vec::new();
        let mut latched = [false; 2];
        add_arm_contacts(&mut store, &input, &mut latched, &config, default_merge_radius, &mut NoOpReporter);
        assert_eq!(store.len(), 2, "arm candidates of one batch must stay distinct");
        assert_eq!(latched, [true, true]);
        assert!(store[0].center.y > 100.0);
        assert!(store[1].center.y < -100.0);
    }

    #[test]
    fn test_stale_contact_ignored() {
        let config = TrackerConfig::default();
        let arms = [
            LimbContact { contact: true, last_contact: 1000, position: Vector2::new(0.0, 100.0) },
            LimbContact { contact: false, last_contact: 4900, position: Vector2::new(0.0, -100.0) },
        ];
        let input = input_with(&[], &arms, &[]);
        let mut store = Vec::new();
        let mut latched = [true; 2];
        add_arm_contacts(&mut store, &input, &mut latched, &config, default_merge_radius, &mut NoOpReporter);
        assert!(store.is_empty());
        assert_eq!(latched, [false, false]);
    }

    #[test]
    fn test_foot_candidate_offset_forward() {
        let config = TrackerConfig::default();
        let feet = [
            LimbContact { contact: true, last_contact: 5000, position: Vector2::new(80.0, 50.0) },
            LimbContact { contact: false, last_contact: 0, position: Vector2::new(80.0, -50.0) },
        ];
        let input = input_with(&[], &[], &feet);
        let mut store = Vec::new();
        let mut latched = [false; 2];
        add_foot_contacts(&mut store, &input, &mut latched, &config, default_merge_radius, &mut NoOpReporter);
        assert_eq!(store.len(), 1);
        let expected_x =
            80.0 + config.robot_radius + config.dist_joint_to_toe + config.dist_toe_to_bumper;
        assert_relative_eq!(store[0].center.x, expected_x, epsilon = 1e-3);
    }

    #[test]
    fn test_percept_beyond_max_distance_skipped() {
        let config = TrackerConfig::default();
        let percepts = [percept(5000.0, 0.0, PerceptKind::Unknown, false)];
        let input = input_with(&percepts, &[], &[]);
        let mut store = Vec::new();
        add_player_percepts(&mut store, &input, &config, default_merge_radius, &mut NoOpReporter);
        assert!(store.is_empty());
    }

    #[test]
    fn test_percept_classification() {
        let config = TrackerConfig::default();
        let percepts = [
            percept(1000.0, 0.0, PerceptKind::OpponentPlayer, false),
            percept(1000.0, 1000.0, PerceptKind::OwnGoalkeeper, true),
            percept(1000.0, -1000.0, PerceptKind::Unknown, true),
        ];
        let input = input_with(&percepts, &[], &[]);
        let mut store = Vec::new();
        add_player_percepts(&mut store, &input, &config, default_merge_radius, &mut NoOpReporter);
        assert_eq!(store.len(), 3);
        assert_eq!(store[0].kind, ObstacleType::Opponent);
        assert_eq!(store[1].kind, ObstacleType::FallenTeammate);
        assert_eq!(store[2].kind, ObstacleType::FallenSomeRobot);
    }

    #[test]
    fn test_narrow_percept_forced_to_minimum_width() {
        let config = TrackerConfig::default();
        let mut p = percept(1000.0, 0.0, PerceptKind::Unknown, false);
        p.left = Vector2::new(1000.0, 10.0);
        p.right = Vector2::new(1000.0, -10.0);
        let input_percepts = [p];
        let input = input_with(&input_percepts, &[], &[]);
        let mut store = Vec::new();
        add_player_percepts(&mut store, &input, &config, default_merge_radius, &mut NoOpReporter);
        assert!(store[0].width() >= 2.0 * config.robot_radius - 1e-3);
    }

    #[test]
    fn test_zero_length_boundary_vectors_normalized() {
        let config = TrackerConfig::default();
        let mut p = percept(1000.0, 0.0, PerceptKind::Unknown, false);
        p.left = Vector2::zeros();
        p.right = Vector2::zeros();
        let input_percepts = [p];
        let input = input_with(&input_percepts, &[], &[]);
        let mut store = Vec::new();
        add_player_percepts(&mut store, &input, &config, default_merge_radius, &mut NoOpReporter);
        assert_eq!(store.len(), 1);
        assert!(store[0].width() >= 2.0 * config.robot_radius - 1e-3);
    }

    #[test]
    fn test_vision_batch_can_match_contact_hypothesis() {
        let config = TrackerConfig::default();
        let arms = [
            LimbContact { contact: true, last_contact: 4950, position: Vector2::new(100.0, 150.0) },
            LimbContact { contact: false, last_contact: 0, position: Vector2::new(0.0, -100.0) },
        ];
        let percepts = [percept(150.0, 280.0, PerceptKind::OpponentPlayer, false)];
        let input = input_with(&percepts, &arms, &[]);
        let mut store = Vec::new();
        let mut latched = [false; 2];
        add_arm_contacts(&mut store, &input, &mut latched, &config, default_merge_radius, &mut NoOpReporter);
        assert_eq!(store.len(), 1);
        add_player_percepts(&mut store, &input, &config, default_merge_radius, &mut NoOpReporter);
        // The vision batch starts with a fresh marker, so the contact
        // hypothesis may absorb the percept.
        assert_eq!(store.len(), 1);
        assert_eq!(store[0].seen_count, 2);
    }
}
