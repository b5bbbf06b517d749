//! Bubble Drift entry point
//!
//! On the web, mounts the bubble field and theme sync on page load. Natively,
//! runs the engine headless against a manual clock and logs what it does.

#[cfg(target_arch = "wasm32")]
mod wasm_page {
    use std::cell::RefCell;

    use wasm_bindgen::prelude::*;

    use bubble_drift::platform::web::{install_theme_sync, mount_in_document};
    use bubble_drift::{BubbleField, EngineConfig};

    const CONTAINER_ID: &str = "bubble-container";
    const CANVAS_ID: &str = "bubble-canvas";
    const LABEL_PREFIX: &str = "bubble-";

    thread_local! {
        static FIELD: RefCell<Option<BubbleField>> = const { RefCell::new(None) };
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"logger already initialized".into());
        }

        log::info!("Bubble Drift starting...");

        let Some(window) = web_sys::window() else {
            return;
        };

        // Lives for the whole page
        std::mem::forget(install_theme_sync(&window));

        match mount_in_document(CONTAINER_ID, CANVAS_ID, LABEL_PREFIX, EngineConfig::default()) {
            Ok(field) => {
                FIELD.with(|slot| *slot.borrow_mut() = Some(field));
                setup_window_resize(&window);
                log::info!("Bubble field running");
            }
            Err(err) => log::warn!("Bubble field not mounted: {:?}", err),
        }
    }

    /// Window resizes move the existing bubbles without a rebuild
    fn setup_window_resize(window: &web_sys::Window) {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(container) = web_sys::window()
                .and_then(|w| w.document())
                .and_then(|d| d.get_element_by_id(CONTAINER_ID))
            else {
                return;
            };
            let (w, h) = (container.client_width() as f32, container.client_height() as f32);
            FIELD.with(|slot| {
                if let Some(field) = slot.borrow().as_ref() {
                    field.reposition(w, h);
                }
            });
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Tear the field down (page navigation in a SPA host)
    #[wasm_bindgen]
    pub fn unmount_bubbles() {
        FIELD.with(|slot| {
            if let Some(mut field) = slot.borrow_mut().take() {
                field.unmount();
            }
        });
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_page::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Bubble Drift (native) starting...");

    let config = match std::env::args().nth(1) {
        Some(path) => match bubble_drift::EngineConfig::from_file(&path) {
            Ok(config) => config,
            Err(err) => {
                log::error!("{}: {}", path, err);
                std::process::exit(1);
            }
        },
        None => bubble_drift::EngineConfig::default(),
    };

    headless::run(config);
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::cell::RefCell;
    use std::rc::Rc;

    use bubble_drift::platform::headless::{FixedLabels, HeadlessSurface, ManualSizeSource};
    use bubble_drift::{BubbleField, EngineConfig, FieldContext, FrameScheduler, ManualScheduler};
    use glam::Vec2;

    const FRAME_MS: f64 = 1000.0 / 60.0;

    /// Mount, settle, drift, resize, drift, unmount
    pub fn run(config: EngineConfig) {
        let count = config.bubbles.len();
        let titles: Vec<String> = config.bubbles.iter().map(|b| b.title.clone()).collect();

        let scheduler = Rc::new(ManualScheduler::new());
        let labels = Rc::new(RefCell::new(FixedLabels::new(count, Vec2::new(120.0, 40.0))));
        let surface = Rc::new(RefCell::new(HeadlessSurface::new()));
        let (sizes, emitter) = ManualSizeSource::new();

        let mut field = BubbleField::mount(
            FieldContext {
                scheduler: scheduler.clone() as Rc<dyn FrameScheduler>,
                labels: labels.clone(),
                surface: Some(surface.clone()),
                device_pixel_ratio: 2.0,
            },
            config,
            Box::new(sizes),
        );

        emitter.emit(800.0, 600.0);
        report(&field, &labels, &titles, "after mount");

        scheduler.run_frames(180, FRAME_MS);
        report(&field, &labels, &titles, "after 3s of drift");

        emitter.emit(480.0, 720.0);
        scheduler.run_frames(180, FRAME_MS);
        report(&field, &labels, &titles, "3s after resize to 480x720");

        field.unmount();
        log::info!(
            "Done: {} worlds built, {} surface draws, {} label moves",
            field.worlds_created(),
            surface.borrow().draws(),
            labels.borrow().translations()
        );
    }

    fn report(field: &BubbleField, labels: &Rc<RefCell<FixedLabels>>, titles: &[String], when: &str) {
        log::info!("--- {} ({:?}) ---", when, field.phase());
        let Some(world) = field.world() else {
            log::info!("no world");
            return;
        };
        let world = world.borrow();
        for bubble in world.bubbles() {
            let label = labels.borrow().offset(bubble.index);
            log::info!(
                "{:>10}: pos=({:7.2}, {:7.2}) vel=({:6.3}, {:6.3}) label={:?}",
                titles.get(bubble.index).map(String::as_str).unwrap_or("?"),
                bubble.pos.x,
                bubble.pos.y,
                bubble.vel.x,
                bubble.vel.y,
                label
            );
        }
    }
}
