//! Tracker configuration.
//!
//! All thresholds and noise parameters of the pipeline live here. A
//! configuration can be loaded from a JSON file at construction time;
//! loading failures are non-fatal and callers fall back to
//! [`TrackerConfig::default`], which must behave identically to a missing
//! file.

use crate::errors::ConfigError;
use crate::field::FieldDimensions;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Pluggable gating-radius function for measurement association.
///
/// Maps the candidate's distance from the observer to the maximum
/// center-distance at which it may merge into an existing hypothesis.
/// Implementations must be monotonically non-decreasing in the distance and
/// must never exceed `config.max_merge_radius`.
pub type MergeRadiusFn = fn(distance: f32, config: &TrackerConfig) -> f32;

/// Default gating radius: linear growth with distance, capped.
///
/// `min(max_merge_radius, base_merge_radius + merge_radius_slope * distance)`.
/// Farther obstacles are measured less precisely, so they are granted a
/// larger association gate.
pub fn default_merge_radius(distance: f32, config: &TrackerConfig) -> f32 {
    (config.base_merge_radius + config.merge_radius_slope * distance).min(config.max_merge_radius)
}

/// All tunable parameters of the opponent tracker.
///
/// Distances are millimetres, times milliseconds, angles radians.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Body radius of a robot; hypotheses never get narrower than twice this.
    pub robot_radius: f32,
    /// Maximum distance at which obstacles are tracked at all.
    pub max_distance: f32,
    /// Maximum age of a contact event to still produce a candidate.
    pub max_contact_time: u32,
    /// Extra clearance added outward to arm-contact candidates.
    pub arm_contact_clearance: f32,
    /// Standard deviation assumed for arm-contact measurements.
    pub arm_contact_deviation: f32,
    /// Standard deviation assumed for foot-contact measurements.
    pub foot_contact_deviation: f32,
    /// Distance from the ankle joint to the toe.
    pub dist_joint_to_toe: f32,
    /// Distance from the toe to the bumper surface.
    pub dist_toe_to_bumper: f32,
    /// Whether arm contacts produce candidates.
    pub use_arm_contact_model: bool,
    /// Whether foot bumpers produce candidates.
    pub use_foot_bumper_state: bool,
    /// Odometry-proportional process noise coefficients per axis.
    pub odo_deviation: [f32; 2],
    /// Minimum process noise added per axis each prediction step.
    pub process_noise_min: f32,
    /// Width-blending weight of the measurement merge (running average).
    pub weighted_sum: f32,
    /// Votes needed before a hypothesis switches team classification.
    pub team_threshold: i32,
    /// Votes needed before a hypothesis switches upright/fallen.
    pub upright_threshold: i32,
    /// Base association gate at zero distance.
    pub base_merge_radius: f32,
    /// Growth of the association gate per millimetre of distance.
    pub merge_radius_slope: f32,
    /// Hard cap on the association gate.
    pub max_merge_radius: f32,
    /// Two hypotheses only fuse if their last-seen times are closer than this.
    pub merge_overlap_time_diff: u32,
    /// Mahalanobis gate for the statistical overlap merge.
    pub min_mahalanobis_distance: f32,
    /// Observations both hypotheses need before a statistical merge.
    pub min_percepts: u32,
    /// Missed-detection count at which a hypothesis is pruned.
    pub not_seen_threshold: u32,
    /// A hypothesis seen this recently is never penalized for invisibility.
    pub recently_seen_time: u32,
    /// Fraction of the camera opening angle considered reliable.
    pub camera_angle_factor: f32,
    /// Maximum time since the last observation before pruning.
    pub delete_after: u32,
    /// Referee heuristic: prune hypotheses unseen for longer than this when
    /// the game leaves the playing state.
    pub referee_ignore_time: u32,
    /// Tolerance before an off-field hypothesis is pruned.
    pub field_border_tolerance: f32,
    /// Size of the goal-area ignore zone for the goalkeeper; zero disables it.
    pub goal_area_ignore_tolerance: f32,
    /// Field geometry.
    pub field: FieldDimensions,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            robot_radius: 100.0,
            max_distance: 4000.0,
            max_contact_time: 2000,
            arm_contact_clearance: 15.0,
            arm_contact_deviation: 120.0,
            foot_contact_deviation: 150.0,
            dist_joint_to_toe: 110.0,
            dist_toe_to_bumper: 25.0,
            use_arm_contact_model: true,
            use_foot_bumper_state: true,
            odo_deviation: [0.5, 0.5],
            process_noise_min: 50.0,
            weighted_sum: 100.0,
            team_threshold: 3,
            upright_threshold: 2,
            base_merge_radius: 250.0,
            merge_radius_slope: 0.15,
            max_merge_radius: 1000.0,
            merge_overlap_time_diff: 1500,
            min_mahalanobis_distance: 2.0,
            min_percepts: 3,
            not_seen_threshold: 40,
            recently_seen_time: 300,
            camera_angle_factor: 0.45,
            delete_after: 2000,
            referee_ignore_time: 1500,
            field_border_tolerance: 500.0,
            goal_area_ignore_tolerance: 0.0,
            field: FieldDimensions::default(),
        }
    }
}

impl TrackerConfig {
    /// Load a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().display().to_string();
        let content = fs::read_to_string(&path).map_err(|e| ConfigError::Io {
            path: path_str.clone(),
            message: e.to_string(),
        })?;
        let config: TrackerConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path_str,
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration, falling back to defaults when the file is
    /// missing or broken. The failure is logged, not propagated.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::from_json_file(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{}, using built-in defaults", e);
                Self::default()
            }
        }
    }

    /// Basic range checks on loaded values.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.robot_radius <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "robot_radius",
                message: format!("must be positive, got {}", self.robot_radius),
            });
        }
        if self.weighted_sum < 1.0 {
            return Err(ConfigError::InvalidValue {
                field: "weighted_sum",
                message: format!("must be >= 1, got {}", self.weighted_sum),
            });
        }
        if self.merge_radius_slope < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "merge_radius_slope",
                message: "gating radius must not shrink with distance".to_string(),
            });
        }
        Ok(())
    }
}
