//! Per-cycle read-only inputs.
//!
//! The tracker consumes a snapshot of external state each control cycle:
//! odometry, the self pose, vision percepts, contact events, camera
//! parameters, the field boundary and the game context. None of these are
//! owned or mutated by the tracker.
//!
//! Positions are millimetres in the robot-local frame (x forward, y left)
//! unless stated otherwise; times are milliseconds.

use nalgebra::{Isometry2, Matrix2, Matrix3, Vector2, Vector3};

/// Milliseconds since system start.
pub type Timestamp = u32;

/// Current frame time.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInfo {
    /// Time at which the current cycle's sensor data was captured.
    pub time: Timestamp,
}

impl FrameInfo {
    /// Signed milliseconds elapsed since `t`.
    pub fn time_since(&self, t: Timestamp) -> i64 {
        self.time as i64 - t as i64
    }
}

/// Ego motion since the previous cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct OdometryOffset {
    /// Rotation in radians.
    pub rotation: f32,
    /// Translation in millimetres.
    pub translation: Vector2<f32>,
}

/// Classification reported by the vision pipeline for one percept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerceptKind {
    /// An opponent field player.
    OpponentPlayer,
    /// The opponent goalkeeper.
    OpponentGoalkeeper,
    /// A player of the own team.
    OwnPlayer,
    /// The own goalkeeper.
    OwnGoalkeeper,
    /// A robot whose jersey could not be classified.
    Unknown,
}

/// One raw obstacle percept from the vision pipeline, in the robot frame.
#[derive(Debug, Clone)]
pub struct ObstaclePercept {
    /// Position of the obstacle's center on the ground.
    pub center: Vector2<f32>,
    /// Measurement covariance of the center.
    pub covariance: Matrix2<f32>,
    /// Left boundary point as seen from the robot.
    pub left: Vector2<f32>,
    /// Right boundary point as seen from the robot.
    pub right: Vector2<f32>,
    /// Team/role classification.
    pub kind: PerceptKind,
    /// Whether the robot appears to be lying on the ground.
    pub fallen: bool,
}

/// Contact state of a single limb (arm or foot).
///
/// The host resolves the limb-to-body transform; `position` is the limb's
/// current position projected into the robot's ground frame.
#[derive(Debug, Clone, Copy)]
pub struct LimbContact {
    /// Whether the contact sensor currently reports a collision.
    pub contact: bool,
    /// Time of the most recent contact.
    pub last_contact: Timestamp,
    /// Limb position in the robot frame.
    pub position: Vector2<f32>,
}

/// Camera parameters used for visibility reasoning.
///
/// A minimal pinhole model: extrinsics as a camera-to-robot rotation and a
/// camera position in the robot frame, intrinsics as focal length and
/// optical center. The camera looks along its local +x axis.
#[derive(Debug, Clone)]
pub struct CameraView {
    /// Z-rotation of the camera in the robot frame (pan).
    pub pan: f32,
    /// Horizontal opening angle in radians.
    pub opening_angle_width: f32,
    /// Image width in pixels.
    pub image_width: f32,
    /// Image height in pixels.
    pub image_height: f32,
    /// Focal length in pixels.
    pub focal_length: f32,
    /// Optical center in pixels.
    pub optical_center: Vector2<f32>,
    /// Camera-to-robot rotation.
    pub rotation: Matrix3<f32>,
    /// Camera position in the robot frame (millimetres).
    pub translation: Vector3<f32>,
}

impl CameraView {
    /// Project a ground point (robot frame, z = 0) into the image.
    ///
    /// Returns `None` when the point is behind the image plane or projects
    /// outside the image bounds.
    pub fn project_ground(&self, p: &Vector2<f32>) -> Option<Vector2<f32>> {
        let world = Vector3::new(p.x, p.y, 0.0);
        let cam = self.rotation.transpose() * (world - self.translation);
        if cam.x < 1.0 {
            return None;
        }
        let u = self.optical_center.x - self.focal_length * cam.y / cam.x;
        let v = self.optical_center.y - self.focal_length * cam.z / cam.x;
        let in_image =
            u >= 0.0 && u < self.image_width && v >= 0.0 && v < self.image_height;
        in_image.then_some(Vector2::new(u, v))
    }
}

/// Detected boundary between field and background, in image coordinates.
#[derive(Debug, Clone, Default)]
pub struct FieldBoundary {
    /// Whether the boundary estimate is usable this cycle.
    pub is_valid: bool,
    /// Boundary spots in image coordinates, x ascending.
    pub spots: Vec<Vector2<f32>>,
}

impl FieldBoundary {
    /// Interpolated boundary row at image column `x`.
    pub fn y_at(&self, x: f32) -> Option<f32> {
        let first = self.spots.first()?;
        let last = self.spots.last()?;
        if x <= first.x {
            return Some(first.y);
        }
        if x >= last.x {
            return Some(last.y);
        }
        for pair in self.spots.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if x >= a.x && x <= b.x {
                let t = if b.x > a.x { (x - a.x) / (b.x - a.x) } else { 0.0 };
                return Some(a.y + t * (b.y - a.y));
            }
        }
        None
    }
}

/// Game-context flags consumed by gating and publishing, read-only per cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct GameContext {
    /// This robot is penalized.
    pub penalized: bool,
    /// Initial game state.
    pub initial: bool,
    /// Terminal finished state.
    pub finished: bool,
    /// The game is in the playing state.
    pub playing: bool,
    /// The game was in the playing state during the previous cycle.
    pub was_playing: bool,
    /// Penalty shootout in progress.
    pub penalty_shootout: bool,
    /// The robot is currently falling.
    pub falling: bool,
    /// The robot is lying on the ground.
    pub fallen: bool,
    /// The robot is executing a get-up motion.
    pub getting_up: bool,
    /// Kickoff setup where robots enter from the sidelines.
    pub kickoff_setup_from_sidelines: bool,
    /// This robot plays goalkeeper.
    pub is_goalkeeper: bool,
}

/// State of one opponent roster entry as reported by the game controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    /// Not part of the active lineup.
    Substitute,
    /// On the pitch and playing.
    Active,
    /// Penalized and removed from the pitch.
    Penalized,
    /// Penalized for illegal motion in set, but still standing on the pitch.
    PenalizedIllegalMotionInSet,
}

impl PlayerState {
    /// Whether the player currently counts as penalized.
    pub fn is_penalized(self) -> bool {
        matches!(self, PlayerState::Penalized | PlayerState::PenalizedIllegalMotionInSet)
    }
}

/// Snapshot of all external inputs for one tracker cycle.
#[derive(Debug, Clone)]
pub struct CycleInput<'a> {
    /// Current frame time.
    pub frame: FrameInfo,
    /// Ego motion since the previous cycle.
    pub odometry: OdometryOffset,
    /// Self pose estimate in the field frame.
    pub robot_pose: Isometry2<f32>,
    /// Vision obstacle percepts for this cycle.
    pub percepts: &'a [ObstaclePercept],
    /// Arm contact states (left, right).
    pub arm_contacts: &'a [LimbContact],
    /// Foot bumper states (left, right).
    pub foot_contacts: &'a [LimbContact],
    /// Camera parameters; visibility reasoning is skipped when absent.
    pub camera: Option<&'a CameraView>,
    /// Field boundary estimate, if any.
    pub field_boundary: Option<&'a FieldBoundary>,
    /// Game-context flags.
    pub game: GameContext,
    /// Opponent roster states.
    pub opponent_roster: &'a [PlayerState],
}
