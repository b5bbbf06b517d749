//! In-memory platform stand-ins
//!
//! Everything here records what it was asked to do, so native runs can log
//! it and tests can count it.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;

use super::{SizeListener, SizeSource};
use crate::renderer::{RenderSurface, SurfaceConfig, SurfaceError, Vertex};
use crate::sync::LabelSink;

/// Labels with fixed rendered sizes; each can be mounted or not
#[derive(Debug, Clone)]
pub struct FixedLabels {
    sizes: Vec<Option<Vec2>>,
    offsets: Vec<Option<Vec2>>,
    translations: usize,
}

impl FixedLabels {
    /// `count` mounted labels of the same `size`
    pub fn new(count: usize, size: Vec2) -> Self {
        Self {
            sizes: vec![Some(size); count],
            offsets: vec![None; count],
            translations: 0,
        }
    }

    /// Mount or unmount label `index`; a remounted label takes the shared size
    pub fn set_mounted(&mut self, index: usize, mounted: bool) {
        let fallback = self.default_size();
        if let Some(slot) = self.sizes.get_mut(index) {
            *slot = match (mounted, *slot) {
                (true, None) => Some(fallback),
                (true, size) => size,
                (false, _) => None,
            };
        }
    }

    fn default_size(&self) -> Vec2 {
        self.sizes.iter().flatten().next().copied().unwrap_or(Vec2::ZERO)
    }

    /// Last translation written to label `index`
    pub fn offset(&self, index: usize) -> Option<Vec2> {
        self.offsets.get(index).copied().flatten()
    }

    /// Total translations written
    pub fn translations(&self) -> usize {
        self.translations
    }
}

impl LabelSink for FixedLabels {
    fn label_size(&self, index: usize) -> Option<Vec2> {
        self.sizes.get(index).copied().flatten()
    }

    fn translate(&mut self, index: usize, offset: Vec2) {
        if let Some(slot) = self.offsets.get_mut(index) {
            *slot = Some(offset);
            self.translations += 1;
        }
    }
}

/// Surface that remembers its binding and counts draws
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    config: Option<SurfaceConfig>,
    /// Refuse every `configure` (simulates a missing canvas)
    pub unavailable: bool,
    configures: usize,
    draws: usize,
    last_vertex_count: usize,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn config(&self) -> Option<SurfaceConfig> {
        self.config
    }

    pub fn is_bound(&self) -> bool {
        self.config.is_some()
    }

    pub fn configures(&self) -> usize {
        self.configures
    }

    pub fn draws(&self) -> usize {
        self.draws
    }

    pub fn last_vertex_count(&self) -> usize {
        self.last_vertex_count
    }
}

impl RenderSurface for HeadlessSurface {
    fn configure(&mut self, config: &SurfaceConfig) -> Result<(), SurfaceError> {
        if self.unavailable {
            return Err(SurfaceError::Unavailable);
        }
        self.config = Some(*config);
        self.configures += 1;
        Ok(())
    }

    fn draw(&mut self, vertices: &[Vertex]) {
        if self.config.is_some() {
            self.draws += 1;
            self.last_vertex_count = vertices.len();
        }
    }

    fn release(&mut self) {
        self.config = None;
    }
}

type SharedListener = Rc<RefCell<Option<SizeListener>>>;

/// Size source fed by hand through its `SizeEmitter`
#[derive(Default)]
pub struct ManualSizeSource {
    listener: SharedListener,
}

/// Sending half of a `ManualSizeSource`
#[derive(Clone)]
pub struct SizeEmitter {
    listener: SharedListener,
}

impl ManualSizeSource {
    pub fn new() -> (Self, SizeEmitter) {
        let listener: SharedListener = Rc::new(RefCell::new(None));
        (
            Self {
                listener: Rc::clone(&listener),
            },
            SizeEmitter { listener },
        )
    }
}

impl SizeSource for ManualSizeSource {
    fn observe(&mut self, listener: SizeListener) {
        *self.listener.borrow_mut() = Some(listener);
    }

    fn disconnect(&mut self) {
        self.listener.borrow_mut().take();
    }
}

impl SizeEmitter {
    /// Report a new content-box size; returns false if nobody is listening
    pub fn emit(&self, width: f32, height: f32) -> bool {
        match self.listener.borrow_mut().as_mut() {
            Some(listener) => {
                listener(Vec2::new(width, height));
                true
            }
            None => false,
        }
    }

    pub fn is_observed(&self) -> bool {
        self.listener.borrow().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emitter_reaches_listener() {
        let (mut source, emitter) = ManualSizeSource::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        assert!(!emitter.emit(1.0, 1.0));

        let s = seen.clone();
        source.observe(Box::new(move |size| s.borrow_mut().push(size)));
        assert!(emitter.is_observed());
        assert!(emitter.emit(400.0, 300.0));
        assert_eq!(*seen.borrow(), vec![Vec2::new(400.0, 300.0)]);

        source.disconnect();
        assert!(!emitter.is_observed());
        assert!(!emitter.emit(500.0, 300.0));
    }

    #[test]
    fn test_unavailable_surface() {
        let mut surface = HeadlessSurface::unavailable();
        let config = SurfaceConfig::new(400.0, 300.0, 1.0).unwrap();
        assert!(surface.configure(&config).is_err());
        surface.draw(&[]);
        assert_eq!(surface.draws(), 0);
    }
}
