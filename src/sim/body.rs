//! Bubble bodies and their material
//!
//! Velocities are in pixels per fixed step, forces in mass·px/ms², matching
//! the integrator in `world`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Static description of one bubble (what the label shows)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BubbleSpec {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// CSS hex color, e.g. `#3B82F6`
    pub color: String,
}

impl BubbleSpec {
    pub fn new(title: &str, description: &str, color: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            color: color.to_string(),
        }
    }
}

/// Skill categories shown on the site
pub fn default_bubbles() -> Vec<BubbleSpec> {
    vec![
        BubbleSpec::new("Frontend", "React & Next.js", "#3B82F6"),
        BubbleSpec::new("Backend", "Python & Node.js", "#10B981"),
        BubbleSpec::new("Tools", "Docker & Git", "#8B5CF6"),
    ]
}

/// Physical properties shared by every bubble in a World
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub radius: f32,
    pub restitution: f32,
    pub friction: f32,
    pub air_friction: f32,
    pub density: f32,
}

impl Material {
    /// Mass of a disc of this material
    pub fn mass(&self) -> f32 {
        self.density * std::f32::consts::PI * self.radius * self.radius
    }
}

/// A simulated bubble
#[derive(Debug, Clone)]
pub struct Bubble {
    /// Position in the bubble list (labels refer to bubbles by this)
    pub index: usize,
    pub title: String,
    pub color: String,
    pub radius: f32,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Force accumulated since the last step
    pub force: Vec2,
    pub mass: f32,
    /// Immovable until the settling delay expires
    pub is_static: bool,
}

impl Bubble {
    /// Create a static bubble at `pos`
    pub fn new(index: usize, spec: &BubbleSpec, material: &Material, pos: Vec2) -> Self {
        Self {
            index,
            title: spec.title.clone(),
            color: spec.color.clone(),
            radius: material.radius,
            pos,
            vel: Vec2::ZERO,
            force: Vec2::ZERO,
            mass: material.mass(),
            is_static: true,
        }
    }

    /// Inverse mass (0 for static bodies)
    #[inline]
    pub fn inv_mass(&self) -> f32 {
        if self.is_static || self.mass <= 0.0 {
            0.0
        } else {
            1.0 / self.mass
        }
    }

    /// Accumulate a force through the center (no torque)
    pub fn apply_force(&mut self, force: Vec2) {
        self.force += force;
    }
}
