//! Platform abstraction layer
//!
//! The engine talks to its host through four traits: `FrameScheduler`,
//! `LabelSink`, `RenderSurface`, and `SizeSource` (below). This module holds
//! the implementations:
//! - `headless`: in-memory stand-ins for native runs and tests
//! - `web`: browser bindings (wasm32 only)

pub mod headless;
#[cfg(target_arch = "wasm32")]
pub mod web;

use glam::Vec2;

/// Listener for container content-box size changes (CSS pixels)
pub type SizeListener = Box<dyn FnMut(Vec2)>;

/// Reports container size changes
pub trait SizeSource {
    /// Start reporting to `listener`, replacing any previous one
    fn observe(&mut self, listener: SizeListener);
    /// Stop reporting and drop the listener
    fn disconnect(&mut self);
}
