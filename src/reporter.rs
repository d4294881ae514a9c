//! Observability for tracker execution.
//!
//! [`TrackerReporter`] is a debug side channel: implementations receive
//! callbacks at key points of the per-cycle pipeline without touching
//! tracking state. The default [`NoOpReporter`] compiles to nothing, so the
//! hot path pays no cost when observability is not wanted.
//!
//! All methods have empty default implementations; override only the events
//! you care about.

use crate::field::StaticZones;
use crate::hypothesis::Hypothesis;
use crate::model::OpponentsModel;
use nalgebra::Vector2;

/// Sensor source of an ingestion batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorSource {
    /// Arm contact sensors.
    ArmContact,
    /// Foot bumpers.
    FootContact,
    /// Vision obstacle percepts.
    Vision,
}

/// Observability trait for the tracking pipeline.
///
/// Reporters use `&mut self` and are not required to be `Send + Sync`.
/// Callbacks receive references; clone inside the callback if you need to
/// keep the data.
pub trait TrackerReporter {
    /// Called when the gate keeper suspends tracking for this cycle.
    /// `cleared` tells whether the hypothesis store was also wiped.
    fn on_gate_suspended(&mut self, _cleared: bool) {}

    /// Called after pruning with the removed and surviving hypotheses.
    fn on_pruning(&mut self, _removed: &[Hypothesis], _kept: &[Hypothesis]) {}

    /// Called after the motion prediction step.
    fn on_prediction(&mut self, _hypotheses: &[Hypothesis]) {}

    /// Called after one sensor batch has been ingested.
    fn on_batch_ingested(&mut self, _source: SensorSource, _candidates: usize) {}

    /// Called when a candidate merges into an existing hypothesis.
    fn on_merge(&mut self, _candidate_center: &Vector2<f32>, _target: &Hypothesis) {}

    /// Called when a candidate is inserted as a new hypothesis.
    fn on_new_hypothesis(&mut self, _hypothesis: &Hypothesis) {}

    /// Called when the overlap resolver fuses two hypotheses.
    fn on_overlap_fused(&mut self, _kept: &Hypothesis, _donor: &Hypothesis) {}

    /// Called when a hypothesis receives a missed-detection penalty.
    fn on_visibility_penalty(&mut self, _hypothesis: &Hypothesis, _amount: u32) {}

    /// Called once per cycle with the published model.
    fn on_published(&mut self, _model: &OpponentsModel) {}

    /// Called with the static penalty zones, for field drawing.
    fn on_static_zones(&mut self, _zones: &StaticZones) {}
}

/// Zero-cost reporter that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpReporter;

impl TrackerReporter for NoOpReporter {}

/// Reporter that emits structured events via the `log` facade.
///
/// Intended for development and simulator sessions; the core algorithm
/// stays free of direct logging.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingReporter;

impl TrackerReporter for LoggingReporter {
    fn on_gate_suspended(&mut self, cleared: bool) {
        log::debug!("tracking suspended this cycle (store cleared: {cleared})");
    }

    fn on_pruning(&mut self, removed: &[Hypothesis], kept: &[Hypothesis]) {
        if !removed.is_empty() {
            log::debug!("pruned {} hypotheses, {} kept", removed.len(), kept.len());
        }
    }

    fn on_prediction(&mut self, hypotheses: &[Hypothesis]) {
        log::trace!("prediction complete: {} hypotheses", hypotheses.len());
    }

    fn on_batch_ingested(&mut self, source: SensorSource, candidates: usize) {
        if candidates > 0 {
            log::trace!("{source:?}: {candidates} candidates ingested");
        }
    }

    fn on_merge(&mut self, candidate_center: &Vector2<f32>, target: &Hypothesis) {
        log::trace!(
            "merged observation at ({:.0}, {:.0}) into hypothesis at ({:.0}, {:.0})",
            candidate_center.x,
            candidate_center.y,
            target.center.x,
            target.center.y
        );
    }

    fn on_new_hypothesis(&mut self, hypothesis: &Hypothesis) {
        log::debug!(
            "new {:?} hypothesis at ({:.0}, {:.0})",
            hypothesis.kind,
            hypothesis.center.x,
            hypothesis.center.y
        );
    }

    fn on_overlap_fused(&mut self, kept: &Hypothesis, donor: &Hypothesis) {
        log::debug!(
            "fused overlapping hypotheses at ({:.0}, {:.0}) and ({:.0}, {:.0})",
            kept.center.x,
            kept.center.y,
            donor.center.x,
            donor.center.y
        );
    }

    fn on_visibility_penalty(&mut self, hypothesis: &Hypothesis, amount: u32) {
        log::trace!(
            "hypothesis at ({:.0}, {:.0}) should have been seen (penalty {amount})",
            hypothesis.center.x,
            hypothesis.center.y
        );
    }

    fn on_published(&mut self, model: &OpponentsModel) {
        log::trace!(
            "published {} opponents ({} unpenalized, {} penalized)",
            model.opponents.len(),
            model.unpenalized_opponents,
            model.penalized_opponents
        );
    }
}
