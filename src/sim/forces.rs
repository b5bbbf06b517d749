//! Drift forces
//!
//! Every step each dynamic bubble gets a small push whose direction rotates
//! slowly with time. Neighbouring bubbles are a quarter turn out of phase, so
//! the field never settles.

use std::f64::consts::FRAC_PI_2;

use glam::Vec2;

use super::world::PhysicsWorld;
use crate::consts::DRIFT_ANGULAR_RATE;

/// Drift force for bubble `index` at `time_ms`
pub fn drift_force(time_ms: f64, index: usize, magnitude: f32) -> Vec2 {
    let angle = time_ms * DRIFT_ANGULAR_RATE + index as f64 * FRAC_PI_2;
    Vec2::new(angle.cos() as f32, angle.sin() as f32) * magnitude
}

/// Push every dynamic bubble; returns how many were pushed
///
/// Static bubbles are skipped, so nothing accumulates during settling.
pub fn apply_drift(world: &mut PhysicsWorld, time_ms: f64, magnitude: f32) -> usize {
    let mut pushed = 0;
    for index in 0..world.len() {
        if world.apply_force(index, drift_force(time_ms, index, magnitude)) {
            pushed += 1;
        }
    }
    pushed
}
