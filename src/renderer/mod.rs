//! Rendering surface abstraction
//!
//! The surface is a transparent overlay behind the labels. It is sized in
//! CSS pixels and backed at up to 2x device resolution.

pub mod shapes;
pub mod vertex;

pub use vertex::Vertex;

use thiserror::Error;

use crate::consts::MAX_PIXEL_RATIO;

/// Surface binding failures
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("rendering surface is not available")]
    Unavailable,
    #[error("surface size {width}x{height} is empty")]
    EmptySize { width: f32, height: f32 },
    #[error("surface backend error: {0}")]
    Backend(String),
}

/// Size and scaling for one binding of the surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceConfig {
    /// CSS pixel size
    pub width: f32,
    pub height: f32,
    /// Backing store scale, `min(devicePixelRatio, 2)`
    pub pixel_ratio: f32,
    /// Always fully transparent
    pub clear_color: [f32; 4],
}

impl SurfaceConfig {
    pub fn new(width: f32, height: f32, device_pixel_ratio: f32) -> Result<Self, SurfaceError> {
        if !(width > 0.0 && height > 0.0) {
            return Err(SurfaceError::EmptySize { width, height });
        }
        Ok(Self {
            width,
            height,
            pixel_ratio: clamp_pixel_ratio(device_pixel_ratio),
            clear_color: [0.0; 4],
        })
    }

    /// Backing store size in device pixels
    pub fn physical_size(&self) -> (u32, u32) {
        (
            (self.width * self.pixel_ratio).round() as u32,
            (self.height * self.pixel_ratio).round() as u32,
        )
    }
}

/// Cap the device pixel ratio; nonsense values fall back to 1
pub fn clamp_pixel_ratio(device_pixel_ratio: f32) -> f32 {
    if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
        device_pixel_ratio.min(MAX_PIXEL_RATIO)
    } else {
        1.0
    }
}

/// A 2D drawable the World is bound to
pub trait RenderSurface {
    /// (Re)bind the surface at a new size
    fn configure(&mut self, config: &SurfaceConfig) -> Result<(), SurfaceError>;
    /// Clear to transparent, then draw `vertices` as a triangle list
    fn draw(&mut self, vertices: &[Vertex]);
    /// Drop the binding; the next `configure` rebinds
    fn release(&mut self);
}
