//! The externally published opponents model.

use nalgebra::Vector2;

/// One published opponent estimate in the field frame.
#[derive(Debug, Clone, PartialEq)]
pub struct OpponentEstimate {
    /// Center position on the field.
    pub position: Vector2<f32>,
    /// Left extent of the obstacle.
    pub left: Vector2<f32>,
    /// Right extent of the obstacle.
    pub right: Vector2<f32>,
}

/// Consolidated model handed to downstream planning once per cycle.
///
/// Each cycle's model is a complete snapshot, never an incremental diff;
/// consumers replace their copy wholesale.
#[derive(Debug, Clone, Default)]
pub struct OpponentsModel {
    /// Tracked opponents, local hypotheses transformed to the field frame.
    pub opponents: Vec<OpponentEstimate>,
    /// Opponents currently allowed to play (or still standing on the pitch).
    pub unpenalized_opponents: u32,
    /// Opponents currently penalized and off the pitch.
    pub penalized_opponents: u32,
}

impl OpponentsModel {
    /// Reset the model to an empty state.
    pub fn clear(&mut self) {
        self.opponents.clear();
        self.unpenalized_opponents = 0;
        self.penalized_opponents = 0;
    }
}
