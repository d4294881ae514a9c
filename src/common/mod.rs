//! Low-level utilities shared across the tracker.

pub mod linalg;
