//! Motion prediction: ego-motion compensation of all hypotheses.
//!
//! Obstacles are assumed static in the world, so the prediction applies the
//! inverse of the robot's own odometry delta to every hypothesis and grows
//! the covariance by the rotation Jacobian plus additive process noise.

use crate::config::TrackerConfig;
use crate::hypothesis::Hypothesis;
use crate::inputs::OdometryOffset;
use nalgebra::{Matrix2, Rotation2};

/// Advance all hypotheses by one cycle.
pub fn predict_all(hypotheses: &mut [Hypothesis], odometry: &OdometryOffset, config: &TrackerConfig) {
    // The obstacle has to move in the opposite direction.
    let rotation = -odometry.rotation;
    let translation = -(Rotation2::new(rotation) * odometry.translation);
    let jacobian = Matrix2::new(
        rotation.cos(),
        -rotation.sin(),
        rotation.sin(),
        rotation.cos(),
    );

    // Process noise per axis: odometry-proportional term plus a fixed floor.
    let deviation_x = (translation.x * config.odo_deviation[0]).powi(2);
    let deviation_y = (translation.y * config.odo_deviation[1]).powi(2);
    let noise_x = deviation_x + config.process_noise_min.powi(2);
    let noise_y = deviation_y + config.process_noise_min.powi(2);

    for hypothesis in hypotheses {
        hypothesis.predict(&jacobian, &translation, noise_x, noise_y);
    }
}
