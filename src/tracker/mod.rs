//! The per-cycle tracking pipeline.
//!
//! [`OpponentTracker`] owns the hypothesis store and runs one full pass per
//! control cycle: gate check, pruning, motion prediction, ingestion of the
//! three sensor batches, overlap resolution, width re-symmetrization,
//! visibility reasoning and finally publication of the consolidated model.
//! Everything is synchronous and allocation is limited to store growth.

pub mod association;
pub mod ingestion;
pub mod lifecycle;
pub mod overlap;
pub mod prediction;
pub mod visibility;

use crate::config::{default_merge_radius, MergeRadiusFn, TrackerConfig};
use crate::field::StaticZones;
use crate::hypothesis::{Hypothesis, ObstacleType};
use crate::inputs::{CycleInput, PlayerState};
use crate::model::{OpponentEstimate, OpponentsModel};
use crate::reporter::TrackerReporter;
use nalgebra::Point2;

/// Multi-hypothesis tracker for opponent robots.
///
/// Construct once, call [`update`](OpponentTracker::update) every control
/// cycle with the current sensor snapshot, read the returned model. The
/// tracker is single-threaded and never blocks.
pub struct OpponentTracker {
    config: TrackerConfig,
    zones: StaticZones,
    hypotheses: Vec<Hypothesis>,
    model: OpponentsModel,
    merge_radius: MergeRadiusFn,
    arm_contact_latched: [bool; 2],
    foot_contact_latched: [bool; 2],
}

impl OpponentTracker {
    /// Create a tracker with the default association gate.
    pub fn new(config: TrackerConfig) -> Self {
        Self::with_merge_radius(config, default_merge_radius)
    }

    /// Create a tracker with a custom association-gate function.
    pub fn with_merge_radius(config: TrackerConfig, merge_radius: MergeRadiusFn) -> Self {
        let zones = StaticZones::new(&config.field);
        Self {
            config,
            zones,
            hypotheses: Vec::new(),
            model: OpponentsModel::default(),
            merge_radius,
            arm_contact_latched: [false; 2],
            foot_contact_latched: [false; 2],
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// The static penalty and return-from-penalty zones.
    pub fn static_zones(&self) -> &StaticZones {
        &self.zones
    }

    /// The current internal hypotheses, robot-local.
    pub fn hypotheses(&self) -> &[Hypothesis] {
        &self.hypotheses
    }

    /// The most recently published model.
    pub fn model(&self) -> &OpponentsModel {
        &self.model
    }

    /// Drop all internal state and the published model.
    pub fn clear(&mut self) {
        self.hypotheses.clear();
        self.model.clear();
        self.arm_contact_latched = [false; 2];
        self.foot_contact_latched = [false; 2];
    }

    /// Run one full tracking cycle and publish the resulting model.
    pub fn update(
        &mut self,
        input: &CycleInput,
        reporter: &mut dyn TrackerReporter,
    ) -> &OpponentsModel {
        reporter.on_static_zones(&self.zones);

        if self.gate(input, reporter) {
            return &self.model;
        }

        lifecycle::prune(&mut self.hypotheses, input, &self.config, reporter);

        prediction::predict_all(&mut self.hypotheses, &input.odometry, &self.config);
        reporter.on_prediction(&self.hypotheses);

        if self.config.use_arm_contact_model {
            ingestion::add_arm_contacts(
                &mut self.hypotheses,
                input,
                &mut self.arm_contact_latched,
                &self.config,
                self.merge_radius,
                reporter,
            );
        }
        if self.config.use_foot_bumper_state {
            ingestion::add_foot_contacts(
                &mut self.hypotheses,
                input,
                &mut self.foot_contact_latched,
                &self.config,
                self.merge_radius,
                reporter,
            );
        }
        ingestion::add_player_percepts(
            &mut self.hypotheses,
            input,
            &self.config,
            self.merge_radius,
            reporter,
        );

        overlap::merge_overlapping(&mut self.hypotheses, &self.config, reporter);

        // Fusion may leave the boundary points slightly skewed; put them
        // back symmetric and orthogonal to the viewing ray.
        for hypothesis in &mut self.hypotheses {
            let half_width = hypothesis.half_width();
            hypothesis.set_left_right(half_width, self.config.robot_radius);
        }

        visibility::should_be_seen(&mut self.hypotheses, input, &self.config, reporter);

        self.publish(input, reporter);
        &self.model
    }

    /// Decide whether tracking is suspended this cycle.
    ///
    /// While suspended the store and the published model are wiped, except
    /// when the game is already finished: the final model stays readable.
    fn gate(&mut self, input: &CycleInput, reporter: &mut dyn TrackerReporter) -> bool {
        let game = &input.game;
        let suspended = game.penalized
            || game.initial
            || game.penalty_shootout
            || game.falling
            || game.fallen
            || game.getting_up;
        if suspended {
            let cleared = !game.finished;
            if cleared {
                self.hypotheses.clear();
                self.model.clear();
            }
            reporter.on_gate_suspended(cleared);
        }
        suspended
    }

    /// Rebuild the published model from the surviving hypotheses.
    fn publish(&mut self, input: &CycleInput, reporter: &mut dyn TrackerReporter) {
        self.model.opponents.clear();

        // During a sideline kickoff setup the goalkeeper knows nobody can
        // legally stand inside the own goal area; the zone filter is off by
        // default.
        let ignore_goal_area = self.config.goal_area_ignore_tolerance != 0.0
            && input.game.kickoff_setup_from_sidelines
            && input.game.is_goalkeeper;

        for hypothesis in &self.hypotheses {
            if hypothesis.kind.is_teammate() {
                continue;
            }
            let established = hypothesis.seen_count >= self.config.min_percepts
                || hypothesis.kind > ObstacleType::SomeRobot;
            if !established {
                continue;
            }

            let position = input
                .robot_pose
                .transform_point(&Point2::from(hypothesis.center))
                .coords;
            if ignore_goal_area {
                let tolerance = self.config.goal_area_ignore_tolerance;
                let field = &self.config.field;
                if position.x < field.x_pos_own_goal_area + tolerance
                    && position.y.abs() < field.y_pos_left_goal_area + tolerance
                {
                    continue;
                }
            }

            let left = input
                .robot_pose
                .transform_point(&Point2::from(hypothesis.left))
                .coords;
            let right = input
                .robot_pose
                .transform_point(&Point2::from(hypothesis.right))
                .coords;
            self.model.opponents.push(OpponentEstimate { position, left, right });
        }

        let mut unpenalized = 0;
        let mut penalized = 0;
        for state in input.opponent_roster {
            match state {
                PlayerState::Substitute => {}
                // Illegal motion in set leaves the robot standing on the
                // pitch, so it still counts as an active obstacle.
                PlayerState::Active | PlayerState::PenalizedIllegalMotionInSet => {
                    unpenalized += 1;
                }
                PlayerState::Penalized => penalized += 1,
            }
        }
        self.model.unpenalized_opponents = unpenalized;
        self.model.penalized_opponents = penalized;

        reporter.on_published(&self.model);
    }
}
