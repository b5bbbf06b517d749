//! Bubble field: World lifecycle and resize coordination
//!
//! A mounted field owns at most one World at a time. Every content-box size
//! change destroys the current World (cancelling its three frame loops and
//! its settle timer) before building the next one, so two simulations never
//! drive the same labels.
//!
//! Lifecycle per World: Static (placed, immobile) -> Dynamic (after the
//! settle delay) -> Destroyed (resize or unmount).

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;

use crate::config::EngineConfig;
use crate::consts::STEP_MS;
use crate::platform::SizeSource;
use crate::renderer::shapes::bubble_outlines;
use crate::renderer::{RenderSurface, SurfaceConfig, SurfaceError};
use crate::schedule::{CancelToken, FrameScheduler, after_delay, repeat_every_frame};
use crate::sim::{LayoutPlan, PhysicsWorld, WorldPhase, layout};
use crate::sync::{LabelSink, synchronize};

/// Shared handle to a live World
pub type WorldHandle = Rc<RefCell<PhysicsWorld>>;

/// Host services a field runs against
pub struct FieldContext {
    pub scheduler: Rc<dyn FrameScheduler>,
    pub labels: Rc<RefCell<dyn LabelSink>>,
    /// `None` when the host has no drawable surface; no World is built then
    pub surface: Option<Rc<RefCell<dyn RenderSurface>>>,
    pub device_pixel_ratio: f32,
}

struct ActiveWorld {
    world: WorldHandle,
    /// Cancels the step, drift, and sync loops plus the settle timer
    token: CancelToken,
    plan: LayoutPlan,
}

struct FieldInner {
    ctx: FieldContext,
    config: EngineConfig,
    active: Option<ActiveWorld>,
    /// Debounce timer for the latest size change
    pending_resize: Option<CancelToken>,
    mounted: bool,
    worlds_created: u64,
}

/// A mounted bubble view
pub struct BubbleField {
    inner: Rc<RefCell<FieldInner>>,
    sizes: Box<dyn SizeSource>,
}

impl BubbleField {
    /// Mount on a container and start listening for its size
    ///
    /// No World exists until the size source reports a non-zero size.
    pub fn mount(ctx: FieldContext, config: EngineConfig, mut sizes: Box<dyn SizeSource>) -> Self {
        let bubble_count = config.bubbles.len();
        let inner = Rc::new(RefCell::new(FieldInner {
            ctx,
            config,
            active: None,
            pending_resize: None,
            mounted: true,
            worlds_created: 0,
        }));

        let weak = Rc::downgrade(&inner);
        sizes.observe(Box::new(move |size| {
            if let Some(inner) = weak.upgrade() {
                FieldInner::on_size_change(&inner, size);
            }
        }));

        log::info!("Bubble field mounted ({} bubbles)", bubble_count);
        Self { inner, sizes }
    }

    /// Rebuild for a new container size immediately (no debounce)
    pub fn resize(&self, width: f32, height: f32) {
        self.inner.borrow_mut().rebuild(Vec2::new(width, height));
    }

    /// Move the existing bubbles to the plan for a new size
    ///
    /// For window-level resizes that should not restart the simulation.
    /// Builds a World if there is none yet.
    pub fn reposition(&self, width: f32, height: f32) {
        self.inner.borrow_mut().reposition(Vec2::new(width, height));
    }

    /// Stop every loop, destroy the World, and stop observing size
    pub fn unmount(&mut self) {
        let mut inner = self.inner.borrow_mut();
        if !inner.mounted {
            return;
        }
        self.sizes.disconnect();
        inner.mounted = false;
        if let Some(pending) = inner.pending_resize.take() {
            pending.cancel();
        }
        inner.teardown();
        log::info!("Bubble field unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.borrow().mounted
    }

    /// The live World, if any
    pub fn world(&self) -> Option<WorldHandle> {
        self.inner
            .borrow()
            .active
            .as_ref()
            .map(|active| Rc::clone(&active.world))
    }

    /// Layout the live World was built from (or last repositioned to)
    pub fn plan(&self) -> Option<LayoutPlan> {
        self.inner.borrow().active.as_ref().map(|active| active.plan.clone())
    }

    pub fn phase(&self) -> WorldPhase {
        let inner = self.inner.borrow();
        if !inner.mounted {
            return WorldPhase::Destroyed;
        }
        match &inner.active {
            Some(active) => active.world.borrow().phase(),
            None => WorldPhase::Uninitialized,
        }
    }

    /// Worlds built since mount
    pub fn worlds_created(&self) -> u64 {
        self.inner.borrow().worlds_created
    }
}

impl Drop for BubbleField {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl FieldInner {
    fn on_size_change(this: &Rc<RefCell<Self>>, size: Vec2) {
        let (scheduler, token, delay) = {
            let mut inner = this.borrow_mut();
            if !inner.mounted {
                return;
            }
            let delay = inner.config.resize_debounce_ms;
            if delay <= 0.0 {
                inner.rebuild(size);
                return;
            }
            if let Some(previous) = inner.pending_resize.take() {
                previous.cancel();
            }
            let token = CancelToken::new();
            inner.pending_resize = Some(token.clone());
            (Rc::clone(&inner.ctx.scheduler), token, delay)
        };

        let weak = Rc::downgrade(this);
        after_delay(&scheduler, &token, delay, move || {
            if let Some(inner) = weak.upgrade() {
                let mut inner = inner.borrow_mut();
                inner.pending_resize = None;
                inner.rebuild(size);
            }
        });
    }

    /// Destroy the current World, then build one for `size`
    fn rebuild(&mut self, size: Vec2) {
        if !self.mounted {
            return;
        }
        self.teardown();

        let Some(plan) = layout::plan(size.x, size.y, self.config.bubbles.len()) else {
            log::debug!("Container not laid out yet ({}x{}), deferring", size.x, size.y);
            return;
        };
        if let Err(err) = self.bind_surface(size) {
            log::warn!("Bubble world not created: {}", err);
            return;
        }

        let world: WorldHandle = Rc::new(RefCell::new(PhysicsWorld::new(plan.size, &self.config, &plan)));
        let token = CancelToken::new();
        self.start_loops(&world, &token);

        self.worlds_created += 1;
        log::info!(
            "Bubble world #{} created at {}x{} ({} bubbles)",
            self.worlds_created,
            size.x,
            size.y,
            plan.len()
        );
        self.active = Some(ActiveWorld { world, token, plan });
    }

    fn reposition(&mut self, size: Vec2) {
        if !self.mounted {
            return;
        }
        if self.active.is_none() {
            self.rebuild(size);
            return;
        }
        let Some(plan) = layout::plan(size.x, size.y, self.config.bubbles.len()) else {
            log::debug!("Ignoring reposition to empty size {}x{}", size.x, size.y);
            return;
        };
        if let Err(err) = self.bind_surface(size) {
            log::warn!("Surface resize failed: {}", err);
        }
        if let Some(active) = self.active.as_mut() {
            active.world.borrow_mut().reposition(&plan);
            active.plan = plan;
            log::debug!("Bubbles repositioned for {}x{}", size.x, size.y);
        }
    }

    fn bind_surface(&self, size: Vec2) -> Result<(), SurfaceError> {
        let surface = self.ctx.surface.as_ref().ok_or(SurfaceError::Unavailable)?;
        let config = SurfaceConfig::new(size.x, size.y, self.ctx.device_pixel_ratio)?;
        surface.borrow_mut().configure(&config)
    }

    fn start_loops(&self, world: &WorldHandle, token: &CancelToken) {
        let scheduler = &self.ctx.scheduler;

        // Stepping (and the transparent overlay)
        {
            let world = Rc::clone(world);
            let surface = self.ctx.surface.clone();
            let outlines = self.config.outlines;
            let mut last_frame: Option<f64> = None;
            repeat_every_frame(scheduler, token, move |now| {
                let frame_ms = last_frame.map_or(STEP_MS, |t| now - t);
                last_frame = Some(now);

                let mut world = world.borrow_mut();
                if world.is_destroyed() {
                    return;
                }
                world.advance(frame_ms);

                if let Some(surface) = &surface {
                    let vertices = if outlines {
                        bubble_outlines(&world)
                    } else {
                        Vec::new()
                    };
                    surface.borrow_mut().draw(&vertices);
                }
            });
        }

        // Drift forces: applied per fixed step by the World while this loop
        // is alive, dropped while static
        {
            let world = Rc::clone(world);
            let magnitude = self.config.drift_force;
            repeat_every_frame(scheduler, token, move |_| {
                let mut world = world.borrow_mut();
                if !world.is_drift_armed() {
                    world.arm_drift(magnitude);
                }
            });
        }

        // Label positions
        {
            let world = Rc::clone(world);
            let labels = Rc::clone(&self.ctx.labels);
            repeat_every_frame(scheduler, token, move |_| {
                synchronize(&world.borrow(), &mut *labels.borrow_mut());
            });
        }

        // Release after settling
        {
            let world = Rc::clone(world);
            after_delay(scheduler, token, self.config.settle_delay_ms, move || {
                if world.borrow_mut().make_dynamic() {
                    log::debug!("Bubbles released");
                }
            });
        }
    }

    /// Cancel the loops, remove the bodies, release the surface
    fn teardown(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        active.token.cancel();
        let steps = {
            let mut world = active.world.borrow_mut();
            let steps = world.steps();
            world.destroy();
            steps
        };
        if let Some(surface) = &self.ctx.surface {
            surface.borrow_mut().release();
        }
        log::debug!("Bubble world destroyed after {} steps", steps);
    }
}
