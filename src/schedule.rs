//! Frame scheduling
//!
//! Per-frame work is a repeating task that re-requests itself every frame
//! until its `CancelToken` is cancelled. The token is checked at the top of
//! every callback, so a frame that was already queued when teardown happened
//! returns without touching anything.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Callback for one animation frame; receives the frame timestamp (ms)
pub type FrameCallback = Box<dyn FnOnce(f64)>;
/// Callback for a one-shot timer
pub type TimerCallback = Box<dyn FnOnce()>;

/// Source of animation frames and timers (single-threaded)
pub trait FrameScheduler {
    /// Current time in milliseconds
    fn now(&self) -> f64;
    /// Run `callback` once on the next frame
    fn request_frame(&self, callback: FrameCallback);
    /// Run `callback` once after `delay_ms`
    fn set_timeout(&self, delay_ms: f64, callback: TimerCallback);
}

/// Shared cancellation flag for a group of tasks
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// Run `body` every frame until `token` is cancelled
pub fn repeat_every_frame<F>(scheduler: &Rc<dyn FrameScheduler>, token: &CancelToken, body: F)
where
    F: FnMut(f64) + 'static,
{
    let body: Rc<RefCell<dyn FnMut(f64)>> = Rc::new(RefCell::new(body));
    schedule_frame(Rc::clone(scheduler), token.clone(), body);
}

fn schedule_frame(
    scheduler: Rc<dyn FrameScheduler>,
    token: CancelToken,
    body: Rc<RefCell<dyn FnMut(f64)>>,
) {
    let next = Rc::clone(&scheduler);
    scheduler.request_frame(Box::new(move |now| {
        if token.is_cancelled() {
            return;
        }
        {
            let mut f = body.borrow_mut();
            (&mut *f)(now);
        }
        if !token.is_cancelled() {
            schedule_frame(next, token, body);
        }
    }));
}

/// Run `body` once after `delay_ms`, unless `token` is cancelled first
pub fn after_delay<F>(scheduler: &Rc<dyn FrameScheduler>, token: &CancelToken, delay_ms: f64, body: F)
where
    F: FnOnce() + 'static,
{
    let token = token.clone();
    scheduler.set_timeout(
        delay_ms,
        Box::new(move || {
            if !token.is_cancelled() {
                body();
            }
        }),
    );
}

struct Timer {
    due: f64,
    seq: u64,
    callback: TimerCallback,
}

/// Deterministic scheduler driven by hand
///
/// Time only moves in `advance`. Used for headless runs and tests.
#[derive(Default)]
pub struct ManualScheduler {
    now: Cell<f64>,
    frames: RefCell<Vec<FrameCallback>>,
    timers: RefCell<Vec<Timer>>,
    next_seq: Cell<u64>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame callbacks waiting for the next frame
    pub fn pending_frames(&self) -> usize {
        self.frames.borrow().len()
    }

    /// Timers not yet fired
    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    /// Move the clock forward, fire due timers, then run one frame
    pub fn advance(&self, ms: f64) {
        let now = self.now.get() + ms;
        self.now.set(now);

        // Timers queued by a timer are picked up in this loop if already due
        loop {
            let next = {
                let mut timers = self.timers.borrow_mut();
                let due = timers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due <= now)
                    .min_by(|(_, a), (_, b)| a.due.total_cmp(&b.due).then(a.seq.cmp(&b.seq)))
                    .map(|(i, _)| i);
                due.map(|i| timers.remove(i))
            };
            match next {
                Some(timer) => (timer.callback)(),
                None => break,
            }
        }

        let frames = std::mem::take(&mut *self.frames.borrow_mut());
        for callback in frames {
            callback(now);
        }
    }

    /// Run `count` frames spaced `frame_ms` apart
    pub fn run_frames(&self, count: usize, frame_ms: f64) {
        for _ in 0..count {
            self.advance(frame_ms);
        }
    }
}

impl FrameScheduler for ManualScheduler {
    fn now(&self) -> f64 {
        self.now.get()
    }

    fn request_frame(&self, callback: FrameCallback) {
        self.frames.borrow_mut().push(callback);
    }

    fn set_timeout(&self, delay_ms: f64, callback: TimerCallback) {
        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);
        self.timers.borrow_mut().push(Timer {
            due: self.now.get() + delay_ms.max(0.0),
            seq,
            callback,
        });
    }
}
