//! Field geometry: dimensions, rectangles and the static heuristic zones.
//!
//! All coordinates are millimetres in the field frame (x towards the
//! opponent goal, y to the left).

use nalgebra::Vector2;
use serde::Deserialize;

/// Axis-aligned rectangle spanned by two corner points.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Rect {
    /// First corner.
    pub a: Vector2<f32>,
    /// Opposite corner.
    pub b: Vector2<f32>,
}

impl Rect {
    /// Create a rectangle from two opposite corners.
    pub fn new(a: Vector2<f32>, b: Vector2<f32>) -> Self {
        Self { a, b }
    }

    /// Whether the point lies inside the rectangle (corners included).
    pub fn contains(&self, p: &Vector2<f32>) -> bool {
        let (x_min, x_max) = (self.a.x.min(self.b.x), self.a.x.max(self.b.x));
        let (y_min, y_max) = (self.a.y.min(self.b.y), self.a.y.max(self.b.y));
        p.x >= x_min && p.x <= x_max && p.y >= y_min && p.y <= y_max
    }
}

/// Static field dimension constants.
///
/// Defaults describe a standard 9m x 6m pitch with a 700mm border strip.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FieldDimensions {
    /// x of the opponent-side outer border (carpet edge).
    pub x_pos_opponent_field_border: f32,
    /// x of the opponent penalty mark.
    pub x_pos_opponent_penalty_mark: f32,
    /// y of the left sideline.
    pub y_pos_left_sideline: f32,
    /// y of the left outer border (carpet edge).
    pub y_pos_left_field_border: f32,
    /// x of the own goal area front line.
    pub x_pos_own_goal_area: f32,
    /// y of the left goal area edge.
    pub y_pos_left_goal_area: f32,
}

impl Default for FieldDimensions {
    fn default() -> Self {
        Self {
            x_pos_opponent_field_border: 5200.0,
            x_pos_opponent_penalty_mark: 3200.0,
            y_pos_left_sideline: 3000.0,
            y_pos_left_field_border: 3700.0,
            x_pos_own_goal_area: -3900.0,
            y_pos_left_goal_area: 1100.0,
        }
    }
}

impl FieldDimensions {
    /// y of the right sideline.
    pub fn y_pos_right_sideline(&self) -> f32 {
        -self.y_pos_left_sideline
    }

    /// y of the right outer border.
    pub fn y_pos_right_field_border(&self) -> f32 {
        -self.y_pos_left_field_border
    }

    /// y of the right goal area edge.
    pub fn y_pos_right_goal_area(&self) -> f32 {
        -self.y_pos_left_goal_area
    }

    /// Distance of a field-frame point to the outer border rectangle.
    ///
    /// Zero for points on the carpet, otherwise the clipping distance.
    pub fn distance_outside(&self, p: &Vector2<f32>) -> f32 {
        let dx = (p.x.abs() - self.x_pos_opponent_field_border).max(0.0);
        let dy = (p.y.abs() - self.y_pos_left_field_border).max(0.0);
        (dx * dx + dy * dy).sqrt()
    }
}

/// Rough zones in which opponent robots stand while penalized and through
/// which they walk when returning from a penalty.
///
/// The exact positions depend on the referees; the offsets used here cover
/// most placements. Computed once at tracker construction and read-only
/// thereafter.
#[derive(Debug, Clone)]
pub struct StaticZones {
    /// Zones next to the opponent border where penalized robots are placed.
    pub penalized_robot_zones: Vec<Rect>,
    /// Sideline zones crossed when re-entering from a penalty.
    pub return_from_penalty_zones: Vec<Rect>,
}

impl StaticZones {
    /// Compute the zones from the field dimensions.
    pub fn new(field: &FieldDimensions) -> Self {
        let penalty_placement_left = Rect::new(
            Vector2::new(1000.0, field.y_pos_left_sideline + 200.0),
            Vector2::new(field.x_pos_opponent_field_border, field.y_pos_left_field_border + 100.0),
        );
        let penalty_placement_right = Rect::new(
            Vector2::new(1000.0, field.y_pos_right_sideline() - 200.0),
            Vector2::new(field.x_pos_opponent_field_border, field.y_pos_right_field_border() - 100.0),
        );
        let return_left = Rect::new(
            Vector2::new(field.x_pos_opponent_penalty_mark - 700.0, field.y_pos_left_sideline - 200.0),
            Vector2::new(field.x_pos_opponent_penalty_mark + 700.0, field.y_pos_left_sideline + 400.0),
        );
        let return_right = Rect::new(
            Vector2::new(field.x_pos_opponent_penalty_mark - 700.0, field.y_pos_right_sideline() - 400.0),
            Vector2::new(field.x_pos_opponent_penalty_mark + 700.0, field.y_pos_right_sideline() + 200.0),
        );
        Self {
            penalized_robot_zones: vec![penalty_placement_left, penalty_placement_right],
            return_from_penalty_zones: vec![return_left, return_right],
        }
    }
}
