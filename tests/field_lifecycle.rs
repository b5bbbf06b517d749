//! Lifecycle tests for the bubble field
//!
//! Drives a mounted field with a manual clock, a manual size source, and
//! recording labels/surface, then checks what the World did.

use std::cell::RefCell;
use std::rc::Rc;

use bubble_drift::platform::headless::{FixedLabels, HeadlessSurface, ManualSizeSource, SizeEmitter};
use bubble_drift::sim::layout;
use bubble_drift::{BubbleField, EngineConfig, FieldContext, FrameScheduler, ManualScheduler, WorldPhase};
use glam::Vec2;

const FRAME_MS: f64 = 16.0;

struct Harness {
    scheduler: Rc<ManualScheduler>,
    labels: Rc<RefCell<FixedLabels>>,
    surface: Rc<RefCell<HeadlessSurface>>,
    emitter: SizeEmitter,
    field: BubbleField,
}

impl Harness {
    fn new(config: EngineConfig) -> Self {
        Self::with_surface(config, HeadlessSurface::new())
    }

    fn with_surface(config: EngineConfig, surface: HeadlessSurface) -> Self {
        let scheduler = Rc::new(ManualScheduler::new());
        let labels = Rc::new(RefCell::new(FixedLabels::new(
            config.bubbles.len(),
            Vec2::new(100.0, 40.0),
        )));
        let surface = Rc::new(RefCell::new(surface));
        let (sizes, emitter) = ManualSizeSource::new();

        let field = BubbleField::mount(
            FieldContext {
                scheduler: scheduler.clone() as Rc<dyn FrameScheduler>,
                labels: labels.clone(),
                surface: Some(surface.clone()),
                device_pixel_ratio: 3.0,
            },
            config,
            Box::new(sizes),
        );

        Self {
            scheduler,
            labels,
            surface,
            emitter,
            field,
        }
    }

    fn positions(&self) -> Vec<Vec2> {
        let world = self.field.world().expect("world exists");
        let world = world.borrow();
        world.bubbles().iter().map(|b| b.pos).collect()
    }
}

fn assert_close(a: &[Vec2], b: &[Vec2]) {
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(b) {
        assert!((*x - *y).length() < 1e-3, "{x} != {y}");
    }
}

#[test]
fn test_no_world_until_sized() {
    let h = Harness::new(EngineConfig::default());
    assert_eq!(h.field.phase(), WorldPhase::Uninitialized);
    assert!(h.field.world().is_none());

    // Not laid out yet
    h.emitter.emit(0.0, 0.0);
    assert!(h.field.world().is_none());
    h.emitter.emit(400.0, 0.0);
    assert!(h.field.world().is_none());

    // Retried on the next real size
    h.emitter.emit(400.0, 300.0);
    assert_eq!(h.field.phase(), WorldPhase::Static);
    assert_eq!(h.field.worlds_created(), 1);
}

#[test]
fn test_reference_layout_on_mount() {
    let h = Harness::new(EngineConfig::default());
    h.emitter.emit(400.0, 300.0);

    let expected = [
        Vec2::new(152.0, 75.0),
        Vec2::new(248.0, 150.0),
        Vec2::new(152.0, 225.0),
    ];
    assert_close(&h.positions(), &expected);

    // Labels get centered on their bodies on the first frame
    h.scheduler.advance(FRAME_MS);
    let labels = h.labels.borrow();
    let offsets: Vec<Vec2> = (0..3).filter_map(|i| labels.offset(i)).collect();
    let centered: Vec<Vec2> = expected.iter().map(|c| *c - Vec2::new(50.0, 20.0)).collect();
    assert_close(&offsets, &centered);
}

#[test]
fn test_surface_bound_with_capped_pixel_ratio() {
    let h = Harness::new(EngineConfig::default());
    h.emitter.emit(400.0, 300.0);

    let config = h.surface.borrow().config().expect("surface bound");
    assert_eq!(config.pixel_ratio, 2.0);
    assert_eq!(config.physical_size(), (800, 600));
    assert_eq!(config.clear_color, [0.0; 4]);

    h.scheduler.run_frames(3, FRAME_MS);
    assert_eq!(h.surface.borrow().draws(), 3);
    // Outlines are off by default: transparent clears only
    assert_eq!(h.surface.borrow().last_vertex_count(), 0);
}

#[test]
fn test_outlines_drawn_when_enabled() {
    let config = EngineConfig {
        outlines: true,
        ..EngineConfig::default()
    };
    let h = Harness::new(config);
    h.emitter.emit(400.0, 300.0);
    h.scheduler.advance(FRAME_MS);
    assert!(h.surface.borrow().last_vertex_count() > 0);
}

#[test]
fn test_missing_surface_is_a_no_op() {
    let h = Harness::with_surface(EngineConfig::default(), HeadlessSurface::unavailable());
    h.emitter.emit(400.0, 300.0);
    assert!(h.field.world().is_none());
    assert_eq!(h.field.phase(), WorldPhase::Uninitialized);

    h.scheduler.run_frames(10, FRAME_MS);
    assert_eq!(h.labels.borrow().translations(), 0);
}

#[test]
fn test_static_through_settle_delay() {
    let h = Harness::new(EngineConfig::default());
    h.emitter.emit(800.0, 600.0);
    let planned = layout::plan(800.0, 600.0, 3).unwrap().positions;

    // Frames at t = 16, 32, 48
    h.scheduler.run_frames(3, FRAME_MS);
    h.scheduler.advance(2.0); // t = 50
    assert_eq!(h.field.phase(), WorldPhase::Static);
    assert_close(&h.positions(), &planned);

    // Still pinned right up to the delay
    h.scheduler.run_frames(3, FRAME_MS); // t = 98
    assert_eq!(h.field.phase(), WorldPhase::Static);
    assert_close(&h.positions(), &planned);

    h.scheduler.advance(2.0); // t = 100
    assert_eq!(h.field.phase(), WorldPhase::Dynamic);

    // Then the drift takes over
    h.scheduler.run_frames(120, FRAME_MS);
    let moved = h
        .positions()
        .iter()
        .zip(&planned)
        .any(|(now, start)| (*now - *start).length() > 1e-3);
    assert!(moved);
    assert_eq!(h.field.phase(), WorldPhase::Dynamic);
}

#[test]
fn test_resize_is_idempotent() {
    let h = Harness::new(EngineConfig::default());
    h.emitter.emit(640.0, 480.0);
    let first = h.field.plan().unwrap();
    h.emitter.emit(640.0, 480.0);
    let second = h.field.plan().unwrap();

    assert_eq!(first, second);
    assert_close(&h.positions(), &second.positions);
    assert_eq!(h.field.worlds_created(), 2);
}

#[test]
fn test_resize_mid_simulation_replaces_world() {
    let h = Harness::new(EngineConfig::default());
    h.emitter.emit(800.0, 600.0);
    h.scheduler.run_frames(30, FRAME_MS);
    assert_eq!(h.field.phase(), WorldPhase::Dynamic);

    let old = h.field.world().unwrap();
    h.emitter.emit(500.0, 900.0);

    // The old World is gone and its loops no longer run
    assert_eq!(old.borrow().phase(), WorldPhase::Destroyed);
    assert!(old.borrow().is_empty());
    let old_steps = old.borrow().steps();

    let new = h.field.world().unwrap();
    assert!(!Rc::ptr_eq(&old, &new));
    assert_eq!(new.borrow().len(), 3);
    assert_eq!(h.field.phase(), WorldPhase::Static);
    assert_close(
        &h.positions(),
        &layout::plan(500.0, 900.0, 3).unwrap().positions,
    );

    h.scheduler.run_frames(30, FRAME_MS);
    assert_eq!(old.borrow().steps(), old_steps);
    assert!(new.borrow().steps() > 0);

    // Exactly one set of loops is queued: step, drift, sync
    assert_eq!(h.scheduler.pending_frames(), 3);
}

#[test]
fn test_unmount_stops_all_work() {
    let mut h = Harness::new(EngineConfig::default());
    h.emitter.emit(800.0, 600.0);
    h.scheduler.run_frames(20, FRAME_MS);

    let world = h.field.world().unwrap();
    h.field.unmount();

    let translations = h.labels.borrow().translations();
    let draws = h.surface.borrow().draws();
    let steps = world.borrow().steps();

    h.scheduler.run_frames(60, FRAME_MS);

    assert_eq!(h.labels.borrow().translations(), translations);
    assert_eq!(h.surface.borrow().draws(), draws);
    assert_eq!(world.borrow().steps(), steps);
    assert!(world.borrow().is_empty());
    assert_eq!(h.scheduler.pending_frames(), 0);
    assert!(!h.surface.borrow().is_bound());

    // Size changes after unmount are not observed
    assert!(!h.emitter.emit(400.0, 300.0));
    assert!(h.field.world().is_none());
    assert_eq!(h.field.phase(), WorldPhase::Destroyed);
}

#[test]
fn test_unmount_during_settle_never_releases() {
    let mut h = Harness::new(EngineConfig::default());
    h.emitter.emit(800.0, 600.0);
    let world = h.field.world().unwrap();

    h.scheduler.advance(FRAME_MS);
    h.field.unmount();
    h.scheduler.run_frames(20, FRAME_MS);

    assert_eq!(world.borrow().phase(), WorldPhase::Destroyed);
    assert_eq!(h.scheduler.pending_timers(), 0);
}

#[test]
fn test_reposition_keeps_world() {
    let h = Harness::new(EngineConfig::default());
    h.emitter.emit(800.0, 600.0);
    h.scheduler.run_frames(10, FRAME_MS);
    let before = h.field.world().unwrap();

    h.field.reposition(400.0, 300.0);

    let after = h.field.world().unwrap();
    assert!(Rc::ptr_eq(&before, &after));
    assert_eq!(h.field.worlds_created(), 1);
    assert_eq!(after.borrow().bounds(), Vec2::new(400.0, 300.0));
    assert_close(&h.positions(), &layout::plan(400.0, 300.0, 3).unwrap().positions);
    assert_eq!(h.surface.borrow().config().unwrap().width, 400.0);
}

#[test]
fn test_missing_label_skipped() {
    let h = Harness::new(EngineConfig::default());
    h.labels.borrow_mut().set_mounted(2, false);
    h.emitter.emit(400.0, 300.0);

    h.scheduler.run_frames(2, FRAME_MS);
    assert!(h.labels.borrow().offset(2).is_none());
    assert!(h.labels.borrow().offset(0).is_some());

    h.labels.borrow_mut().set_mounted(2, true);
    h.scheduler.advance(FRAME_MS);
    assert!(h.labels.borrow().offset(2).is_some());
}

#[test]
fn test_debounced_resizes_coalesce() {
    let config = EngineConfig {
        resize_debounce_ms: 50.0,
        ..EngineConfig::default()
    };
    let h = Harness::new(config);

    h.emitter.emit(300.0, 300.0);
    h.scheduler.advance(20.0);
    h.emitter.emit(500.0, 400.0);
    h.scheduler.advance(20.0);
    h.emitter.emit(600.0, 450.0);
    assert!(h.field.world().is_none());

    h.scheduler.advance(60.0);
    assert_eq!(h.field.worlds_created(), 1);
    assert_eq!(h.field.plan().unwrap().size, Vec2::new(600.0, 450.0));
}

/// Velocity bubble 0 gains per simulation step over one second after release
fn drift_gain_per_step(frame_ms: f64) -> f32 {
    let h = Harness::new(EngineConfig::default());
    h.emitter.emit(800.0, 600.0);
    while h.field.phase() != WorldPhase::Dynamic {
        h.scheduler.advance(frame_ms);
    }

    let world = h.field.world().unwrap();
    let (start_vel, start_steps) = {
        let w = world.borrow();
        (w.bubble(0).unwrap().vel, w.steps())
    };

    let frames = (1000.0 / frame_ms).round() as usize;
    h.scheduler.run_frames(frames, frame_ms);

    let w = world.borrow();
    let steps = w.steps() - start_steps;
    assert!(steps >= 55, "only {steps} steps at {frame_ms}ms frames");
    (w.bubble(0).unwrap().vel - start_vel).length() / steps as f32
}

#[test]
fn test_drift_independent_of_frame_rate() {
    let reference = drift_gain_per_step(1000.0 / 60.0);
    assert!(reference > 0.0);

    for hz in [144.0, 30.0] {
        let gain = drift_gain_per_step(1000.0 / hz);
        let ratio = gain / reference;
        assert!((0.9..1.1).contains(&ratio), "{hz}Hz gain ratio {ratio}");
    }
}
