/*!
# opptrack - Opponent robot tracking

Multi-hypothesis tracking of opponent robots on a soccer field from noisy,
intermittent evidence: vision obstacle percepts, arm contact events and foot
bumper events. One full pipeline pass per control cycle produces a
consolidated [`OpponentsModel`] for downstream planning.

## Pipeline

Each cycle runs, in order: gate check, lifecycle pruning, odometry-based
motion prediction, ingestion of the three sensor batches with greedy gated
association, overlap resolution, visibility reasoning and publication.

## Modules

- [`tracker`] - The [`OpponentTracker`] and the per-cycle pipeline stages
- [`hypothesis`] - The tracked-obstacle estimate and its classification
- [`inputs`] - Per-cycle read-only sensor and game-state snapshot
- [`config`] - Tunable parameters, loadable from JSON
- [`reporter`] - Observability side channel
- [`common`] - Low-level 2x2 covariance math

## Example

```rust,no_run
use opptrack::{CycleInput, FrameInfo, GameContext, NoOpReporter, OdometryOffset, OpponentTracker, TrackerConfig};
use nalgebra::Isometry2;

let mut tracker = OpponentTracker::new(TrackerConfig::load_or_default("tracker.json"));

// One control cycle: hand in the current sensor snapshot.
let input = CycleInput {
    frame: FrameInfo { time: 5000 },
    odometry: OdometryOffset::default(),
    robot_pose: Isometry2::identity(),
    percepts: &[],
    arm_contacts: &[],
    foot_contacts: &[],
    camera: None,
    field_boundary: None,
    game: GameContext { playing: true, was_playing: true, ..GameContext::default() },
    opponent_roster: &[],
};
let model = tracker.update(&input, &mut NoOpReporter);
println!("{} opponents tracked", model.opponents.len());
```
*/

// ============================================================================
// Core modules
// ============================================================================

/// The tracking pipeline and its stages
///
/// Contains the [`OpponentTracker`] plus one module per pipeline step:
/// prediction, ingestion, association, overlap resolution, visibility
/// reasoning and lifecycle pruning.
pub mod tracker;

/// Tracked-obstacle estimate and classification
pub mod hypothesis;

/// Per-cycle read-only inputs
pub mod inputs;

/// The published opponents model
pub mod model;

/// Tracker configuration
pub mod config;

/// Configuration errors
pub mod errors;

/// Field geometry and static zones
pub mod field;

/// Observability side channel
pub mod reporter;

/// Low-level utilities (2x2 covariance math)
pub mod common;

// ============================================================================
// Re-exports for convenience
// ============================================================================

// Core types
pub use config::{default_merge_radius, MergeRadiusFn, TrackerConfig};
pub use field::{FieldDimensions, Rect, StaticZones};
pub use hypothesis::{Hypothesis, ObstacleType};
pub use model::{OpponentEstimate, OpponentsModel};
pub use tracker::OpponentTracker;

// Inputs
pub use inputs::{
    CameraView, CycleInput, FieldBoundary, FrameInfo, GameContext, LimbContact,
    ObstaclePercept, OdometryOffset, PerceptKind, PlayerState, Timestamp,
};

// Errors
pub use errors::ConfigError;

// Observability
pub use reporter::{LoggingReporter, NoOpReporter, SensorSource, TrackerReporter};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
