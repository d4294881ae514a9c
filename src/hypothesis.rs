//! Obstacle hypothesis: the core tracked entity.
//!
//! A [`Hypothesis`] is a single tracked-obstacle estimate: a 2D position
//! with covariance, an apparent width given by two boundary points, a
//! classification with hysteresis counters and recency/confidence counters.

use crate::common::linalg;
use crate::inputs::Timestamp;
use nalgebra::{Matrix2, Vector2};

/// Classification of a tracked obstacle.
///
/// The variants form an explicit total order (ascending discriminants):
///
/// `Unknown < SomeRobot < Opponent < Teammate
///  < FallenSomeRobot < FallenOpponent < FallenTeammate`
///
/// The order carries two meanings used throughout the tracker: everything
/// from [`FallenSomeRobot`](ObstacleType::FallenSomeRobot) upward is a
/// fallen-class type, and the distance from `Unknown` measures how specific
/// the classification is. Comparisons in the code rely on these
/// discriminants, never on declaration-order accidents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ObstacleType {
    /// No robot-shape evidence beyond "something is there".
    Unknown = 0,
    /// A robot of unclassified team, upright.
    SomeRobot = 1,
    /// An upright opponent robot.
    Opponent = 2,
    /// An upright robot of the own team.
    Teammate = 3,
    /// A fallen robot of unclassified team.
    FallenSomeRobot = 4,
    /// A fallen opponent robot.
    FallenOpponent = 5,
    /// A fallen robot of the own team.
    FallenTeammate = 6,
}

impl ObstacleType {
    /// Whether this is one of the fallen-class types.
    pub fn is_fallen(self) -> bool {
        self >= ObstacleType::FallenSomeRobot
    }

    /// Whether the team is unresolved (`Unknown`, `SomeRobot`,
    /// `FallenSomeRobot`).
    pub fn is_generic(self) -> bool {
        matches!(
            self,
            ObstacleType::Unknown | ObstacleType::SomeRobot | ObstacleType::FallenSomeRobot
        )
    }

    /// Whether this is an own-team classification.
    pub fn is_teammate(self) -> bool {
        matches!(self, ObstacleType::Teammate | ObstacleType::FallenTeammate)
    }

    /// Whether this is an opponent classification.
    pub fn is_opponent(self) -> bool {
        matches!(self, ObstacleType::Opponent | ObstacleType::FallenOpponent)
    }

    /// Initial team vote of a fresh observation of this type:
    /// +1 opponent-side, -1 teammate-side, 0 generic.
    fn team_vote(self) -> i32 {
        if self.is_opponent() {
            1
        } else if self.is_teammate() {
            -1
        } else {
            0
        }
    }

    /// Initial upright vote: +1 upright, -1 fallen.
    fn upright_vote(self) -> i32 {
        if self.is_fallen() {
            -1
        } else {
            1
        }
    }

    /// Compose a type from resolved team and posture.
    fn compose(team: TeamSide, fallen: bool, keep_unknown: bool) -> Self {
        match (team, fallen) {
            (TeamSide::Opponent, false) => ObstacleType::Opponent,
            (TeamSide::Opponent, true) => ObstacleType::FallenOpponent,
            (TeamSide::Teammate, false) => ObstacleType::Teammate,
            (TeamSide::Teammate, true) => ObstacleType::FallenTeammate,
            (TeamSide::Generic, true) => ObstacleType::FallenSomeRobot,
            (TeamSide::Generic, false) => {
                if keep_unknown {
                    ObstacleType::Unknown
                } else {
                    ObstacleType::SomeRobot
                }
            }
        }
    }

    fn team_side(self) -> TeamSide {
        if self.is_opponent() {
            TeamSide::Opponent
        } else if self.is_teammate() {
            TeamSide::Teammate
        } else {
            TeamSide::Generic
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TeamSide {
    Generic,
    Opponent,
    Teammate,
}

/// A single tracked-obstacle estimate in the robot-local frame.
#[derive(Debug, Clone)]
pub struct Hypothesis {
    /// Position estimate of the obstacle center.
    pub center: Vector2<f32>,
    /// Estimation uncertainty of `center`; symmetric positive semi-definite.
    pub covariance: Matrix2<f32>,
    /// Left boundary point, symmetric to `right` about `center`.
    pub left: Vector2<f32>,
    /// Right boundary point.
    pub right: Vector2<f32>,
    /// Current classification.
    pub kind: ObstacleType,
    /// Time of the last supporting observation.
    pub last_seen: Timestamp,
    /// Number of observations folded into this hypothesis.
    pub seen_count: u32,
    /// Cycles in which the obstacle should have been visible but was not.
    /// Non-decreasing; reset to zero only when an observation is fused in.
    pub not_seen_count: u32,
    /// Accumulated team evidence, clamped to the team threshold.
    team_votes: i32,
    /// Accumulated posture evidence, clamped to the upright threshold.
    upright_votes: i32,
}

impl Hypothesis {
    /// Create a hypothesis from a single observation.
    ///
    /// The covariance is symmetrized on admission; an unusable covariance is
    /// replaced by a large diagonal fallback so the store never holds a
    /// degenerate matrix.
    pub fn new(
        covariance: Matrix2<f32>,
        center: Vector2<f32>,
        left: Vector2<f32>,
        right: Vector2<f32>,
        last_seen: Timestamp,
        kind: ObstacleType,
        seen_count: u32,
    ) -> Self {
        let covariance = linalg::sanitized_covariance(&covariance)
            .unwrap_or_else(|| Matrix2::identity() * 1.0e6);
        Self {
            center,
            covariance,
            left,
            right,
            kind,
            last_seen,
            seen_count,
            not_seen_count: 0,
            team_votes: kind.team_vote(),
            upright_votes: kind.upright_vote(),
        }
    }

    /// Apparent width, the distance between `left` and `right`.
    pub fn width(&self) -> f32 {
        (self.left - self.right).norm()
    }

    /// Half of the apparent width.
    pub fn half_width(&self) -> f32 {
        self.width() * 0.5
    }

    /// Distance of the center from the observer.
    pub fn distance(&self) -> f32 {
        self.center.norm()
    }

    /// Place `left` and `right` symmetric about `center`, orthogonal to the
    /// viewing ray, with half-width `max(half_width, min_half_width)`.
    pub fn set_left_right(&mut self, half_width: f32, min_half_width: f32) {
        let radius = half_width.max(min_half_width);
        let norm = self.center.norm();
        // An obstacle on top of the observer has no defined bearing.
        let orthogonal = if norm > f32::EPSILON {
            Vector2::new(-self.center.y, self.center.x) / norm
        } else {
            Vector2::new(0.0, 1.0)
        };
        self.left = self.center + orthogonal * radius;
        self.right = self.center - orthogonal * radius;
    }

    /// Kalman prediction step compensating the ego motion.
    ///
    /// `rotation`/`translation` are the inverse of the robot's odometry
    /// delta, `jacobian` the corresponding rotation matrix, and the noise
    /// terms are added per axis. Obstacles are assumed static in the world.
    pub fn predict(
        &mut self,
        jacobian: &Matrix2<f32>,
        translation: &Vector2<f32>,
        noise_x: f32,
        noise_y: f32,
    ) {
        self.center = jacobian * self.center + translation;
        self.left = jacobian * self.left + translation;
        self.right = jacobian * self.right + translation;

        let mut predicted = jacobian * self.covariance * jacobian.transpose();
        predicted[(0, 0)] += noise_x;
        predicted[(1, 1)] += noise_y;
        if let Some(cov) = linalg::sanitized_covariance(&predicted) {
            self.covariance = cov;
        }
    }

    /// Fuse a measurement into this hypothesis.
    ///
    /// Position and covariance are updated by a Kalman step; the width is
    /// blended as a running average weighted by `weighted_sum` and floored
    /// at twice the robot radius. A numerically unusable update is discarded
    /// and the previous state kept.
    pub fn fuse_measurement(
        &mut self,
        measurement: &Hypothesis,
        weighted_sum: f32,
        robot_radius: f32,
    ) {
        if let Some((mean, cov)) = linalg::kalman_position_update(
            &self.center,
            &self.covariance,
            &measurement.center,
            &measurement.covariance,
        ) {
            self.center = mean;
            self.covariance = cov;
        }

        let blended_width =
            (measurement.width() + self.width() * (weighted_sum - 1.0)) / weighted_sum;
        self.set_left_right(blended_width * 0.5, robot_radius);
    }

    /// Re-vote the classification after fusing with `other`.
    ///
    /// Evidence counters accumulate and are clamped to their thresholds, so
    /// a saturated classification needs a full run of contradicting
    /// observations before it flips; a single one never does. A specific
    /// classification immediately beats a generic one, and any robot-shaped
    /// evidence upgrades `Unknown` to `SomeRobot`.
    pub fn consider_type(&mut self, other: &Hypothesis, team_threshold: i32, upright_threshold: i32) {
        self.team_votes =
            (self.team_votes + other.team_votes).clamp(-team_threshold, team_threshold);
        self.upright_votes =
            (self.upright_votes + other.upright_votes).clamp(-upright_threshold, upright_threshold);

        let team = if self.kind.is_generic() && !other.kind.is_generic() {
            other.kind.team_side()
        } else if self.team_votes >= team_threshold {
            TeamSide::Opponent
        } else if self.team_votes <= -team_threshold {
            TeamSide::Teammate
        } else {
            self.kind.team_side()
        };

        let fallen = if self.upright_votes >= upright_threshold {
            false
        } else if self.upright_votes <= -upright_threshold {
            true
        } else {
            self.kind.is_fallen()
        };

        let keep_unknown =
            self.kind == ObstacleType::Unknown && other.kind == ObstacleType::Unknown;
        self.kind = ObstacleType::compose(team, fallen, keep_unknown);
    }

    /// Squared Mahalanobis distance to another hypothesis under the averaged
    /// covariance of the pair.
    pub fn squared_mahalanobis(&self, other: &Hypothesis) -> f32 {
        let cov = (self.covariance + other.covariance) * 0.5;
        linalg::squared_mahalanobis(&(self.center - other.center), &cov)
    }

    /// Whether the center's bearing lies inside the camera cone
    /// `[angle_right, angle_left]`.
    pub fn is_between(&self, angle_left: f32, angle_right: f32) -> bool {
        let bearing = self.center.y.atan2(self.center.x);
        angle_right < bearing && bearing < angle_left
    }

    /// Whether this hypothesis is geometrically behind `closer` as seen from
    /// the observer: both boundary points are farther away and the center's
    /// bearing falls inside the closer obstacle's angular span.
    pub fn is_behind(&self, closer: &Hypothesis) -> bool {
        let farther = self.left.norm_squared() > closer.left.norm_squared()
            && self.right.norm_squared() > closer.right.norm_squared();
        let left_bearing = closer.left.y.atan2(closer.left.x);
        let right_bearing = closer.right.y.atan2(closer.right.x);
        let bearing = self.center.y.atan2(self.center.x);
        farther && right_bearing <= bearing && bearing <= left_bearing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn hypothesis(center: Vector2<f32>, kind: ObstacleType) -> Hypothesis {
        let mut h = Hypothesis::new(
            Matrix2::identity() * 100.0,
            center,
            Vector2::zeros(),
            Vector2::zeros(),
            1000,
            kind,
            1,
        );
        h.set_left_right(100.0, 100.0);
        h
    }

    #[test]
    fn test_type_total_order() {
        assert!(ObstacleType::Unknown < ObstacleType::SomeRobot);
        assert!(ObstacleType::Teammate < ObstacleType::FallenSomeRobot);
        assert!(ObstacleType::FallenSomeRobot.is_fallen());
        assert!(!ObstacleType::Teammate.is_fallen());
    }

    #[test]
    fn test_set_left_right_symmetric() {
        let mut h = hypothesis(Vector2::new(1000.0, 0.0), ObstacleType::Unknown);
        h.set_left_right(150.0, 100.0);
        assert_relative_eq!(h.width(), 300.0, epsilon = 1e-3);
        assert_relative_eq!((h.left + h.right).scale(0.5).x, h.center.x, epsilon = 1e-3);
        // Boundary points orthogonal to the viewing ray.
        assert_relative_eq!(h.left.x, 1000.0, epsilon = 1e-3);
        assert_relative_eq!(h.left.y, 150.0, epsilon = 1e-3);
    }

    #[test]
    fn test_set_left_right_enforces_minimum() {
        let mut h = hypothesis(Vector2::new(500.0, 500.0), ObstacleType::Unknown);
        h.set_left_right(10.0, 100.0);
        assert!(h.width() >= 200.0 - 1e-3);
    }

    #[test]
    fn test_degenerate_center_gets_fallback_extent() {
        let mut h = hypothesis(Vector2::zeros(), ObstacleType::Unknown);
        h.set_left_right(100.0, 100.0);
        assert_relative_eq!(h.width(), 200.0, epsilon = 1e-3);
    }

    #[test]
    fn test_invalid_covariance_replaced_on_admission() {
        let h = Hypothesis::new(
            Matrix2::new(f32::NAN, 0.0, 0.0, 1.0),
            Vector2::new(100.0, 0.0),
            Vector2::zeros(),
            Vector2::zeros(),
            0,
            ObstacleType::Unknown,
            1,
        );
        assert!(h.covariance.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_predict_applies_rotation_and_noise() {
        let mut h = hypothesis(Vector2::new(1000.0, 0.0), ObstacleType::Unknown);
        let angle = std::f32::consts::FRAC_PI_2;
        let jacobian = Matrix2::new(angle.cos(), -angle.sin(), angle.sin(), angle.cos());
        let before = h.covariance[(0, 0)];
        h.predict(&jacobian, &Vector2::zeros(), 25.0, 25.0);
        assert_relative_eq!(h.center.x, 0.0, epsilon = 1e-3);
        assert_relative_eq!(h.center.y, 1000.0, epsilon = 1e-3);
        assert!(h.covariance[(0, 0)] > before);
    }

    #[test]
    fn test_single_contradiction_does_not_flip_type() {
        let mut h = hypothesis(Vector2::new(1000.0, 0.0), ObstacleType::Opponent);
        let teammate = hypothesis(Vector2::new(1000.0, 0.0), ObstacleType::Teammate);
        h.consider_type(&teammate, 3, 2);
        assert_eq!(h.kind, ObstacleType::Opponent);
    }

    #[test]
    fn test_accumulated_evidence_flips_type() {
        let mut h = hypothesis(Vector2::new(1000.0, 0.0), ObstacleType::Opponent);
        let teammate = hypothesis(Vector2::new(1000.0, 0.0), ObstacleType::Teammate);
        for _ in 0..6 {
            h.consider_type(&teammate, 3, 2);
        }
        assert_eq!(h.kind, ObstacleType::Teammate);
    }

    #[test]
    fn test_specific_beats_generic() {
        let mut h = hypothesis(Vector2::new(1000.0, 0.0), ObstacleType::Unknown);
        let opponent = hypothesis(Vector2::new(1000.0, 0.0), ObstacleType::Opponent);
        h.consider_type(&opponent, 3, 2);
        assert_eq!(h.kind, ObstacleType::Opponent);
    }

    #[test]
    fn test_unknown_pair_stays_unknown() {
        let mut h = hypothesis(Vector2::new(1000.0, 0.0), ObstacleType::Unknown);
        let other = hypothesis(Vector2::new(1000.0, 0.0), ObstacleType::Unknown);
        h.consider_type(&other, 3, 2);
        assert_eq!(h.kind, ObstacleType::Unknown);
    }

    #[test]
    fn test_fallen_needs_threshold() {
        let mut h = hypothesis(Vector2::new(1000.0, 0.0), ObstacleType::SomeRobot);
        let fallen = hypothesis(Vector2::new(1000.0, 0.0), ObstacleType::FallenSomeRobot);
        h.consider_type(&fallen, 3, 2);
        assert!(!h.kind.is_fallen());
        h.consider_type(&fallen, 3, 2);
        h.consider_type(&fallen, 3, 2);
        assert!(h.kind.is_fallen());
    }

    #[test]
    fn test_fuse_measurement_blends_width() {
        let mut h = hypothesis(Vector2::new(1000.0, 0.0), ObstacleType::SomeRobot);
        let mut wide = hypothesis(Vector2::new(1000.0, 0.0), ObstacleType::SomeRobot);
        wide.set_left_right(300.0, 100.0);
        let before = h.width();
        h.fuse_measurement(&wide, 10.0, 100.0);
        assert!(h.width() > before);
        assert!(h.width() < wide.width());
        assert!(h.width() >= 200.0);
    }

    #[test]
    fn test_is_behind() {
        let closer = hypothesis(Vector2::new(1000.0, 0.0), ObstacleType::SomeRobot);
        let further = hypothesis(Vector2::new(2000.0, 0.0), ObstacleType::SomeRobot);
        assert!(further.is_behind(&closer));
        assert!(!closer.is_behind(&further));
    }

    #[test]
    fn test_is_between_camera_cone() {
        let h = hypothesis(Vector2::new(1000.0, 100.0), ObstacleType::SomeRobot);
        assert!(h.is_between(0.5, -0.5));
        assert!(!h.is_between(-0.05, -0.5));
    }
}
