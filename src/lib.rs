//! Bubble Drift - physics-driven floating labels
//!
//! Core modules:
//! - `sim`: Zero-gravity world, layout planning, drift forces
//! - `schedule`: Cancellable per-frame tasks and timers
//! - `sync`: Mirrors body positions onto label elements
//! - `field`: Resize coordination and World lifecycle
//! - `renderer`: Surface abstraction and outline geometry
//! - `platform`: Browser bindings and headless stand-ins
//! - `theme`, `contact`: The rest of the site that carries logic

pub mod config;
pub mod contact;
pub mod field;
pub mod platform;
pub mod renderer;
pub mod schedule;
pub mod sim;
pub mod sync;
pub mod theme;

pub use config::{ConfigError, EngineConfig};
pub use field::{BubbleField, FieldContext, WorldHandle};
pub use schedule::{CancelToken, FrameScheduler, ManualScheduler};
pub use sim::{BubbleSpec, LayoutPlan, PhysicsWorld, WorldPhase};
pub use sync::LabelSink;

/// Engine constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds (60 Hz)
    pub const STEP_MS: f64 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;
    /// Longest frame gap fed to the accumulator (tab switches, debugger pauses)
    pub const MAX_FRAME_MS: f64 = 100.0;

    /// Bubble defaults
    pub const BUBBLE_RADIUS: f32 = 40.0;
    pub const RESTITUTION: f32 = 0.2;
    pub const FRICTION: f32 = 0.01;
    pub const AIR_FRICTION: f32 = 0.01;
    pub const DENSITY: f32 = 0.02;

    /// Delay before static bubbles are released
    pub const SETTLE_DELAY_MS: f64 = 100.0;

    /// Drift force magnitude
    pub const DRIFT_FORCE: f32 = 0.002;
    /// Drift direction rotation rate (radians per ms)
    pub const DRIFT_ANGULAR_RATE: f64 = 0.001;

    /// Zig-zag layout: horizontal offset is min(MAX, FRACTION * width)
    pub const MAX_LAYOUT_OFFSET: f32 = 100.0;
    pub const LAYOUT_OFFSET_FRACTION: f32 = 0.12;

    /// Device pixel ratio cap for the rendering surface
    pub const MAX_PIXEL_RATIO: f32 = 2.0;
}
