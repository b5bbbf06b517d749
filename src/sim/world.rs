//! The zero-gravity bubble world
//!
//! A fixed-timestep rigid-body simulation of N equal circles. A World is
//! built for one container size and is never patched for another: resizes
//! destroy it and build a fresh one (see `field`).

use glam::Vec2;

use super::body::{Bubble, Material};
use super::collision::{circle_circle, circle_wall, resolve_pair, resolve_wall};
use super::forces::apply_drift;
use super::layout::LayoutPlan;
use crate::config::EngineConfig;
use crate::consts::{MAX_FRAME_MS, STEP_MS};

/// Lifecycle of a World
///
/// `Uninitialized` is only ever reported by a field with no World yet; a
/// constructed World starts `Static`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldPhase {
    Uninitialized,
    /// Bodies placed, immobile
    Static,
    /// Forces applied, free motion
    Dynamic,
    /// Bodies removed, stepping stopped
    Destroyed,
}

/// Uniform gravity (direction scaled by `scale`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gravity {
    pub dir: Vec2,
    pub scale: f32,
}

impl Gravity {
    /// Bubbles float: no direction, no scale
    pub const NONE: Gravity = Gravity {
        dir: Vec2::ZERO,
        scale: 0.0,
    };

    #[inline]
    pub fn acceleration(&self) -> Vec2 {
        self.dir * self.scale
    }
}

/// Simulation state for one container size
#[derive(Debug)]
pub struct PhysicsWorld {
    bounds: Vec2,
    bubbles: Vec<Bubble>,
    gravity: Gravity,
    material: Material,
    phase: WorldPhase,
    contain: bool,
    max_substeps: u32,
    accumulator: f64,
    /// Fixed steps taken so far
    steps: u64,
    /// Simulated time in ms, advanced by one `STEP_MS` per step
    time_ms: f64,
    /// Drift magnitude applied every step, once armed
    drift: Option<f32>,
}

impl PhysicsWorld {
    /// Create a World with one static bubble per planned position
    pub fn new(bounds: Vec2, config: &EngineConfig, plan: &LayoutPlan) -> Self {
        let material = config.material();
        let bubbles = config
            .bubbles
            .iter()
            .zip(&plan.positions)
            .enumerate()
            .map(|(index, (spec, &pos))| Bubble::new(index, spec, &material, pos))
            .collect();

        Self {
            bounds,
            bubbles,
            gravity: Gravity::NONE,
            material,
            phase: WorldPhase::Static,
            contain: config.contain,
            max_substeps: config.max_substeps.max(1),
            accumulator: 0.0,
            steps: 0,
            time_ms: 0.0,
            drift: None,
        }
    }

    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }

    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    pub fn bubble(&self, index: usize) -> Option<&Bubble> {
        self.bubbles.get(index)
    }

    pub fn len(&self) -> usize {
        self.bubbles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }

    pub fn gravity(&self) -> Gravity {
        self.gravity
    }

    pub fn phase(&self) -> WorldPhase {
        self.phase
    }

    pub fn is_destroyed(&self) -> bool {
        self.phase == WorldPhase::Destroyed
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Simulated time since creation (ms)
    pub fn time_ms(&self) -> f64 {
        self.time_ms
    }

    /// Apply drift of `magnitude` at the start of every following step
    ///
    /// Only dynamic bubbles take it, so nothing builds up while static.
    pub fn arm_drift(&mut self, magnitude: f32) {
        if !self.is_destroyed() {
            self.drift = Some(magnitude);
        }
    }

    pub fn is_drift_armed(&self) -> bool {
        self.drift.is_some()
    }

    /// Release every bubble (Static -> Dynamic)
    ///
    /// Happens at most once per World; returns whether this call did it.
    pub fn make_dynamic(&mut self) -> bool {
        if self.phase != WorldPhase::Static {
            return false;
        }
        for bubble in &mut self.bubbles {
            bubble.is_static = false;
        }
        self.phase = WorldPhase::Dynamic;
        true
    }

    /// Accumulate a central force on a dynamic bubble
    ///
    /// Returns false (and drops the force) for static, missing, or destroyed
    /// bodies.
    pub fn apply_force(&mut self, index: usize, force: Vec2) -> bool {
        if self.phase != WorldPhase::Dynamic {
            return false;
        }
        match self.bubbles.get_mut(index) {
            Some(bubble) if !bubble.is_static => {
                bubble.apply_force(force);
                true
            }
            _ => false,
        }
    }

    /// Move existing bubbles to a new plan without rebuilding
    ///
    /// Velocities are kept, so motion continues from the new spot.
    pub fn reposition(&mut self, plan: &LayoutPlan) {
        if self.is_destroyed() {
            return;
        }
        self.bounds = plan.size;
        for (bubble, &pos) in self.bubbles.iter_mut().zip(&plan.positions) {
            bubble.pos = pos;
        }
    }

    /// Advance by a frame's worth of wall-clock time
    ///
    /// Runs whole fixed steps out of an accumulator, capped at
    /// `max_substeps`. Returns the number of steps taken.
    pub fn advance(&mut self, frame_ms: f64) -> u32 {
        if self.is_destroyed() {
            return 0;
        }
        self.accumulator += frame_ms.clamp(0.0, MAX_FRAME_MS);

        let mut substeps = 0;
        while self.accumulator >= STEP_MS && substeps < self.max_substeps {
            self.step();
            self.accumulator -= STEP_MS;
            substeps += 1;
        }
        // Drop the backlog rather than spiral
        if substeps == self.max_substeps {
            self.accumulator = self.accumulator.min(STEP_MS);
        }
        substeps
    }

    /// One fixed step: drift, integrate, then resolve contacts
    pub fn step(&mut self) {
        if self.is_destroyed() {
            return;
        }
        if let Some(magnitude) = self.drift {
            let now = self.time_ms;
            apply_drift(self, now, magnitude);
        }
        let dt = STEP_MS as f32;
        let damping = 1.0 - self.material.air_friction;
        let gravity = self.gravity.acceleration();

        for bubble in &mut self.bubbles {
            if !bubble.is_static {
                let accel = bubble.force * bubble.inv_mass() + gravity;
                bubble.vel = bubble.vel * damping + accel * (dt * dt);
                bubble.pos += bubble.vel;
            }
            bubble.force = Vec2::ZERO;
        }

        self.resolve_contacts();
        self.steps += 1;
        self.time_ms += STEP_MS;
    }

    fn resolve_contacts(&mut self) {
        let Material {
            restitution,
            friction,
            ..
        } = self.material;

        for i in 0..self.bubbles.len() {
            let (head, tail) = self.bubbles.split_at_mut(i + 1);
            let a = &mut head[i];
            for b in tail.iter_mut() {
                if a.is_static && b.is_static {
                    continue;
                }
                if let Some(contact) = circle_circle(a.pos, a.radius, b.pos, b.radius) {
                    resolve_pair(a, b, contact, restitution, friction);
                }
            }
        }

        if self.contain {
            let bounds = self.bounds;
            for bubble in &mut self.bubbles {
                // Two passes settle corner contacts
                for _ in 0..2 {
                    match circle_wall(bubble.pos, bubble.radius, bounds) {
                        Some(contact) => resolve_wall(bubble, contact, restitution),
                        None => break,
                    }
                }
            }
        }
    }

    /// Tear down: remove every body and stop stepping for good
    pub fn destroy(&mut self) {
        self.bubbles.clear();
        self.accumulator = 0.0;
        self.drift = None;
        self.phase = WorldPhase::Destroyed;
    }
}
