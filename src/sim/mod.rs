//! Bubble simulation
//!
//! Pure and deterministic: no clocks, no platform calls. Time comes in
//! through `PhysicsWorld::advance` and `forces::apply_drift`.

pub mod body;
pub mod collision;
pub mod forces;
pub mod layout;
pub mod world;

pub use body::{Bubble, BubbleSpec, Material, default_bubbles};
pub use collision::{Contact, circle_circle, circle_wall};
pub use forces::{apply_drift, drift_force};
pub use layout::{LayoutPlan, plan};
pub use world::{Gravity, PhysicsWorld, WorldPhase};
