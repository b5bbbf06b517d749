//! Engine configuration
//!
//! Every field has a default, so a partial JSON document overrides only what
//! it names. The bubble list is part of the config because the World size is
//! fixed by it.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::{BubbleSpec, Material, default_bubbles};

/// Configuration load failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tunables for the bubble field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Bubbles to simulate, in layout order
    pub bubbles: Vec<BubbleSpec>,

    // === Bodies ===
    pub radius: f32,
    pub restitution: f32,
    pub friction: f32,
    pub air_friction: f32,
    pub density: f32,

    // === Motion ===
    /// Static settling period after a World is created (ms)
    pub settle_delay_ms: f64,
    /// Drift force magnitude applied every simulation step
    pub drift_force: f32,
    /// Keep bubbles inside the container bounds
    pub contain: bool,
    /// Substep cap per frame
    pub max_substeps: u32,

    // === Resize ===
    /// Coalesce size changes arriving within this window (0 = rebuild immediately)
    pub resize_debounce_ms: f64,

    // === Debug ===
    /// Draw bubble outlines on the rendering surface
    pub outlines: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bubbles: default_bubbles(),

            radius: BUBBLE_RADIUS,
            restitution: RESTITUTION,
            friction: FRICTION,
            air_friction: AIR_FRICTION,
            density: DENSITY,

            settle_delay_ms: SETTLE_DELAY_MS,
            drift_force: DRIFT_FORCE,
            contain: true,
            max_substeps: MAX_SUBSTEPS,

            resize_debounce_ms: 0.0,

            outlines: false,
        }
    }
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Read and parse a JSON config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config with {} bubbles", config.bubbles.len());
        Ok(config)
    }

    /// Body material shared by every bubble
    pub fn material(&self) -> Material {
        Material {
            radius: self.radius,
            restitution: self.restitution,
            friction: self.friction,
            air_friction: self.air_friction,
            density: self.density,
        }
    }
}
