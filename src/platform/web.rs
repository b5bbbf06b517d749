//! Browser bindings
//!
//! - `BrowserScheduler`: requestAnimationFrame + setTimeout
//! - `ResizeObserverSource`: content-box size of the container
//! - `ElementLabels`: label elements found by id, moved with CSS transforms
//! - `CanvasSurface`: transparent 2D canvas overlay
//! - `BrowserThemeStore`: localStorage + prefers-color-scheme + `dark` class

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, HtmlElement, ResizeObserver,
    ResizeObserverEntry, Storage, StorageEvent, Window,
};

use super::{SizeListener, SizeSource};
use crate::config::EngineConfig;
use crate::field::{BubbleField, FieldContext};
use crate::renderer::{RenderSurface, SurfaceConfig, SurfaceError, Vertex};
use crate::schedule::{FrameCallback, FrameScheduler, TimerCallback};
use crate::sync::LabelSink;
use crate::theme::{STORAGE_KEY, Theme, ThemeStore, ThemeSync};

fn js_error(err: JsValue) -> SurfaceError {
    SurfaceError::Backend(format!("{:?}", err))
}

/// Frames and timers from the browser event loop
pub struct BrowserScheduler {
    window: Window,
}

impl BrowserScheduler {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl FrameScheduler for BrowserScheduler {
    fn now(&self) -> f64 {
        self.window
            .performance()
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    fn request_frame(&self, callback: FrameCallback) {
        let closure = Closure::once_into_js(move |time: f64| callback(time));
        if let Err(err) = self.window.request_animation_frame(closure.unchecked_ref()) {
            log::warn!("requestAnimationFrame failed: {:?}", err);
        }
    }

    fn set_timeout(&self, delay_ms: f64, callback: TimerCallback) {
        let closure = Closure::once_into_js(move || callback());
        if let Err(err) = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.unchecked_ref(),
                delay_ms.max(0.0).round() as i32,
            )
        {
            log::warn!("setTimeout failed: {:?}", err);
        }
    }
}

/// Container size via ResizeObserver
pub struct ResizeObserverSource {
    target: Element,
    observer: Option<ResizeObserver>,
    callback: Option<Closure<dyn FnMut(js_sys::Array)>>,
}

impl ResizeObserverSource {
    pub fn new(target: Element) -> Self {
        Self {
            target,
            observer: None,
            callback: None,
        }
    }
}

impl SizeSource for ResizeObserverSource {
    fn observe(&mut self, mut listener: SizeListener) {
        self.disconnect();

        let callback = Closure::<dyn FnMut(js_sys::Array)>::new(move |entries: js_sys::Array| {
            if let Ok(entry) = entries.get(0).dyn_into::<ResizeObserverEntry>() {
                let rect = entry.content_rect();
                listener(Vec2::new(rect.width() as f32, rect.height() as f32));
            }
        });

        match ResizeObserver::new(callback.as_ref().unchecked_ref()) {
            Ok(observer) => {
                observer.observe(&self.target);
                self.observer = Some(observer);
                self.callback = Some(callback);
            }
            Err(err) => log::warn!("ResizeObserver unavailable: {:?}", err),
        }
    }

    fn disconnect(&mut self) {
        if let Some(observer) = self.observer.take() {
            observer.disconnect();
        }
        self.callback = None;
    }
}

impl Drop for ResizeObserverSource {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Label elements with ids `{prefix}{index}`
///
/// Looked up every frame, so labels mounted late are picked up.
pub struct ElementLabels {
    document: Document,
    prefix: String,
}

impl ElementLabels {
    pub fn new(document: Document, prefix: &str) -> Self {
        Self {
            document,
            prefix: prefix.to_string(),
        }
    }

    fn element(&self, index: usize) -> Option<HtmlElement> {
        self.document
            .get_element_by_id(&format!("{}{}", self.prefix, index))?
            .dyn_into::<HtmlElement>()
            .ok()
    }
}

impl LabelSink for ElementLabels {
    fn label_size(&self, index: usize) -> Option<Vec2> {
        let el = self.element(index)?;
        Some(Vec2::new(el.offset_width() as f32, el.offset_height() as f32))
    }

    fn translate(&mut self, index: usize, offset: Vec2) {
        if let Some(el) = self.element(index) {
            let transform = format!("translate({}px, {}px)", offset.x, offset.y);
            let _ = el.style().set_property("transform", &transform);
        }
    }
}

/// Transparent 2D canvas overlay
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: Option<CanvasRenderingContext2d>,
    config: Option<SurfaceConfig>,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        Self {
            canvas,
            context: None,
            config: None,
        }
    }

    fn clear(&self) {
        if let (Some(ctx), Some(config)) = (&self.context, &self.config) {
            ctx.clear_rect(0.0, 0.0, config.width as f64, config.height as f64);
        }
    }
}

impl RenderSurface for CanvasSurface {
    fn configure(&mut self, config: &SurfaceConfig) -> Result<(), SurfaceError> {
        let context = self
            .canvas
            .get_context("2d")
            .map_err(js_error)?
            .ok_or(SurfaceError::Unavailable)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| SurfaceError::Backend("not a 2d context".to_string()))?;

        let (width, height) = config.physical_size();
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        let style = self.canvas.style();
        let _ = style.set_property("width", &format!("{}px", config.width));
        let _ = style.set_property("height", &format!("{}px", config.height));

        let ratio = config.pixel_ratio as f64;
        context
            .set_transform(ratio, 0.0, 0.0, ratio, 0.0, 0.0)
            .map_err(js_error)?;

        self.context = Some(context);
        self.config = Some(*config);
        Ok(())
    }

    fn draw(&mut self, vertices: &[Vertex]) {
        self.clear();
        let Some(ctx) = &self.context else {
            return;
        };
        for tri in vertices.chunks_exact(3) {
            let [r, g, b, a] = tri[0].color;
            ctx.set_fill_style_str(&format!(
                "rgba({}, {}, {}, {})",
                (r * 255.0) as u8,
                (g * 255.0) as u8,
                (b * 255.0) as u8,
                a
            ));
            ctx.begin_path();
            ctx.move_to(tri[0].position[0] as f64, tri[0].position[1] as f64);
            ctx.line_to(tri[1].position[0] as f64, tri[1].position[1] as f64);
            ctx.line_to(tri[2].position[0] as f64, tri[2].position[1] as f64);
            ctx.close_path();
            ctx.fill();
        }
    }

    fn release(&mut self) {
        self.clear();
        self.context = None;
        self.config = None;
    }
}

/// Theme storage in localStorage, shown via the root element's `dark` class
pub struct BrowserThemeStore {
    window: Window,
    storage: Option<Storage>,
    root: Option<Element>,
}

impl BrowserThemeStore {
    pub fn new(window: Window) -> Self {
        let storage = window.local_storage().ok().flatten();
        let root = window.document().and_then(|d| d.document_element());
        Self {
            window,
            storage,
            root,
        }
    }
}

impl ThemeStore for BrowserThemeStore {
    fn load(&self) -> Option<String> {
        self.storage.as_ref()?.get_item(STORAGE_KEY).ok().flatten()
    }

    fn save(&mut self, value: &str) {
        if let Some(storage) = &self.storage {
            let _ = storage.set_item(STORAGE_KEY, value);
        }
    }

    fn prefers_dark(&self) -> bool {
        self.window
            .match_media("(prefers-color-scheme: dark)")
            .ok()
            .flatten()
            .is_some_and(|mq| mq.matches())
    }

    fn apply(&mut self, theme: Theme) {
        if let Some(root) = &self.root {
            let classes = root.class_list();
            let _ = if theme.is_dark() {
                classes.add_1("dark")
            } else {
                classes.remove_1("dark")
            };
        }
    }
}

/// Resolve the theme and follow changes from other tabs for the page lifetime
pub fn install_theme_sync(window: &Window) -> Rc<RefCell<ThemeSync<BrowserThemeStore>>> {
    let sync = Rc::new(RefCell::new(ThemeSync::init(BrowserThemeStore::new(
        window.clone(),
    ))));

    let listener_sync = Rc::clone(&sync);
    let closure = Closure::<dyn FnMut(_)>::new(move |event: StorageEvent| {
        listener_sync
            .borrow_mut()
            .on_storage_event(event.key().as_deref(), event.new_value().as_deref());
    });
    let _ = window.add_event_listener_with_callback("storage", closure.as_ref().unchecked_ref());
    closure.forget();

    sync
}

/// Mount a bubble field on page elements
///
/// `container_id` is observed for size, `canvas_id` is the overlay, and
/// labels are `{label_prefix}0`, `{label_prefix}1`, ...
pub fn mount_in_document(
    container_id: &str,
    canvas_id: &str,
    label_prefix: &str,
    config: EngineConfig,
) -> Result<BubbleField, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let container = document
        .get_element_by_id(container_id)
        .ok_or_else(|| JsValue::from_str("bubble container not found"))?;

    // A missing canvas is tolerated: the field stays mounted without a World
    let surface = document
        .get_element_by_id(canvas_id)
        .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        .map(|canvas| Rc::new(RefCell::new(CanvasSurface::new(canvas))) as Rc<RefCell<dyn RenderSurface>>);
    if surface.is_none() {
        log::warn!("Canvas #{} not found, bubbles disabled", canvas_id);
    }

    let ctx = FieldContext {
        scheduler: Rc::new(BrowserScheduler::new(window.clone())),
        labels: Rc::new(RefCell::new(ElementLabels::new(document, label_prefix))),
        surface,
        device_pixel_ratio: window.device_pixel_ratio() as f32,
    };
    let sizes = Box::new(ResizeObserverSource::new(container));
    Ok(BubbleField::mount(ctx, config, sizes))
}
