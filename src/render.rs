//! Rendering of scrubber frames.

use crate::{EntranceTransform, ScrubberConfig};

/// Configuration for the output surface.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
    /// Surface width in logical pixels
    pub width: f64,
    /// Surface height in logical pixels
    pub height: f64,
}

impl RenderConfig {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Square surface of the configured size.
    pub fn from_config(config: &ScrubberConfig) -> Self {
        let side = config.surface_size as f64;
        Self::new(side, side)
    }

    #[inline]
    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::new(220.0, 220.0)
    }
}

/// Platform-agnostic description of one paint.
///
/// The frame image is stretched over the whole surface, then the entrance
/// transform is applied around the surface center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawCommand {
    /// Frame to draw
    pub frame_index: usize,
    /// Surface width in logical pixels
    pub width: f64,
    /// Surface height in logical pixels
    pub height: f64,
    pub opacity: f64,
    pub scale: f64,
    pub rotation_deg: f64,
}

impl DrawCommand {
    /// Destination rectangle `(x, y, w, h)` after scaling, ignoring rotation.
    pub fn scaled_rect(&self) -> (f64, f64, f64, f64) {
        let w = self.width * self.scale;
        let h = self.height * self.scale;
        ((self.width - w) / 2.0, (self.height - h) / 2.0, w, h)
    }

    pub fn is_identity(&self) -> bool {
        self.opacity == 1.0 && self.scale == 1.0 && self.rotation_deg == 0.0
    }
}

/// Build the draw command for a frame.
///
/// ## Example
///
/// ```rust
/// use sprite_scrubber::{EntranceTransform, RenderConfig};
///
/// let cmd = sprite_scrubber::render::render_frame(131, &RenderConfig::default(), EntranceTransform::START);
/// assert_eq!(cmd.scaled_rect(), (55.0, 55.0, 110.0, 110.0));
/// ```
pub fn render_frame(frame_index: usize, config: &RenderConfig, transform: EntranceTransform) -> DrawCommand {
    DrawCommand {
        frame_index,
        width: config.width,
        height: config.height,
        opacity: transform.opacity,
        scale: transform.scale,
        rotation_deg: transform.rotation_deg,
    }
}

/// A frame image together with how to draw it.
#[derive(Debug)]
pub struct Paint<'a, I> {
    pub image: &'a I,
    pub command: DrawCommand,
}

/// An output surface frames are painted into.
pub trait FrameSurface {
    type Image;
    type Error;

    /// Replace the surface contents with one frame.
    fn paint(&mut self, paint: &Paint<'_, Self::Image>) -> Result<(), Self::Error>;

    /// Blank the surface, leaving its reserved size intact.
    fn clear(&mut self) -> Result<(), Self::Error>;
}

/// Web-specific rendering implementation.
#[cfg(feature = "web")]
pub mod web {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::future::Future;
    use std::rc::Rc;

    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::{JsCast, JsValue};
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, MouseEvent, TouchEvent, Window};

    use crate::loader::{load_frame_set, FrameImageProvider, LoadResult};
    use crate::{FrameSource, LoadState, LoadingProgress, PointerInput, PointerPosition, Scrubber, ScrubberConfig, ViewMode, Viewport};

    /// Route `log` output to the browser console and panics to `console.error`.
    pub fn init_logging() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);
    }

    /// Loads frames through `HtmlImageElement`s.
    ///
    /// The request starts as soon as `load_image` is called; the returned
    /// future resolves on `onload` and fails on `onerror`.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct HtmlImageProvider;

    impl FrameImageProvider for HtmlImageProvider {
        type Image = HtmlImageElement;

        fn load_image(&self, source: &FrameSource) -> impl Future<Output = LoadResult<HtmlImageElement>> {
            let path = source.path.clone();
            let request = start_image_request(&path);
            async move {
                let (image, promise) = request?;
                let settled = wasm_bindgen_futures::JsFuture::from(promise).await;
                image.set_onload(None);
                image.set_onerror(None);
                settled.map_err(|_| format!("Failed to load {path}"))?;
                Ok(image)
            }
        }
    }

    fn start_image_request(path: &str) -> LoadResult<(HtmlImageElement, js_sys::Promise)> {
        let image = HtmlImageElement::new().map_err(|_| "Failed to create image element".to_string())?;
        let promise = js_sys::Promise::new(&mut |resolve, reject| {
            image.set_onload(Some(&resolve));
            image.set_onerror(Some(&reject));
        });
        image.set_src(path);
        Ok((image, promise))
    }

    /// A 2D canvas the scrubber paints into.
    pub struct CanvasSurface {
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
    }

    impl CanvasSurface {
        /// Wrap a canvas, sizing its backing store to the surface.
        pub fn new(canvas: HtmlCanvasElement, config: &RenderConfig) -> Result<Self, String> {
            canvas.set_width(config.width.ceil() as u32);
            canvas.set_height(config.height.ceil() as u32);

            let ctx = canvas
                .get_context("2d")
                .map_err(|_| "Failed to get 2d context")?
                .ok_or("No 2d context available")?
                .dyn_into::<CanvasRenderingContext2d>()
                .map_err(|_| "Failed to cast to CanvasRenderingContext2d")?;

            Ok(Self { canvas, ctx })
        }

        pub fn canvas(&self) -> &HtmlCanvasElement {
            &self.canvas
        }

        fn reset_transform(&self) -> Result<(), String> {
            self.ctx
                .set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
                .map_err(|_| "Failed to reset transform".to_string())?;
            self.ctx.set_global_alpha(1.0);
            Ok(())
        }
    }

    impl FrameSurface for CanvasSurface {
        type Image = HtmlImageElement;
        type Error = String;

        fn paint(&mut self, paint: &Paint<'_, HtmlImageElement>) -> Result<(), String> {
            let cmd = &paint.command;
            self.clear()?;

            let (cx, cy) = (cmd.width / 2.0, cmd.height / 2.0);
            self.ctx.set_global_alpha(cmd.opacity);
            self.ctx
                .translate(cx, cy)
                .map_err(|_| "Failed to translate")?;
            self.ctx
                .rotate(cmd.rotation_deg.to_radians())
                .map_err(|_| "Failed to rotate")?;
            self.ctx
                .scale(cmd.scale, cmd.scale)
                .map_err(|_| "Failed to scale")?;
            self.ctx
                .draw_image_with_html_image_element_and_dw_and_dh(paint.image, -cx, -cy, cmd.width, cmd.height)
                .map_err(|_| "Failed to draw frame")?;

            self.reset_transform()
        }

        fn clear(&mut self) -> Result<(), String> {
            self.reset_transform()?;
            let width = self.canvas.width() as f64;
            let height = self.canvas.height() as f64;
            self.ctx.clear_rect(0.0, 0.0, width, height);
            Ok(())
        }
    }

    type FrameCallback = Closure<dyn FnMut(f64)>;

    /// A self-rescheduling `requestAnimationFrame` loop.
    ///
    /// Dropping the handle cancels the pending frame and frees the callback.
    pub struct AnimationLoop {
        window: Window,
        callback: Rc<RefCell<Option<FrameCallback>>>,
        pending: Rc<Cell<Option<i32>>>,
    }

    impl AnimationLoop {
        /// Start calling `on_frame(timestamp_ms)` once per display refresh.
        pub fn start(mut on_frame: impl FnMut(f64) + 'static) -> Result<Self, JsValue> {
            let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window available"))?;
            let callback: Rc<RefCell<Option<FrameCallback>>> = Rc::new(RefCell::new(None));
            let pending = Rc::new(Cell::new(None));

            let callback_weak = Rc::downgrade(&callback);
            let pending_tick = pending.clone();
            let window_tick = window.clone();
            *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp: f64| {
                pending_tick.set(None);
                on_frame(timestamp);
                let Some(callback) = callback_weak.upgrade() else {
                    return;
                };
                let callback = callback.borrow();
                if let Some(cb) = callback.as_ref() {
                    if let Ok(id) = window_tick.request_animation_frame(cb.as_ref().unchecked_ref()) {
                        pending_tick.set(Some(id));
                    }
                }
            }) as Box<dyn FnMut(f64)>));

            let id = {
                let callback = callback.borrow();
                let cb = callback
                    .as_ref()
                    .ok_or_else(|| JsValue::from_str("Animation callback missing"))?;
                window.request_animation_frame(cb.as_ref().unchecked_ref())?
            };
            pending.set(Some(id));

            Ok(Self { window, callback, pending })
        }
    }

    impl Drop for AnimationLoop {
        fn drop(&mut self) {
            if let Some(id) = self.pending.take() {
                let _ = self.window.cancel_animation_frame(id);
            }
            self.callback.borrow_mut().take();
        }
    }

    /// Read the live viewport size from the window.
    pub fn current_viewport(window: &Window) -> Viewport {
        let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        Viewport::new(dim(window.inner_width()), dim(window.inner_height()))
    }

    /// Window-level `mousemove` and `touchmove` listeners.
    ///
    /// Both listeners are removed when the subscription is dropped.
    pub struct PointerSubscription {
        window: Window,
        mouse: Closure<dyn FnMut(MouseEvent)>,
        touch: Closure<dyn FnMut(TouchEvent)>,
    }

    impl PointerSubscription {
        pub fn subscribe(handler: Rc<dyn Fn(PointerInput, Viewport)>) -> Result<Self, JsValue> {
            let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window available"))?;

            let mouse_handler = handler.clone();
            let mouse_window = window.clone();
            let mouse = Closure::wrap(Box::new(move |ev: MouseEvent| {
                let pos = PointerPosition::new(ev.client_x() as f64, ev.client_y() as f64);
                mouse_handler(PointerInput::Mouse(pos), current_viewport(&mouse_window));
            }) as Box<dyn FnMut(MouseEvent)>);

            let touch_window = window.clone();
            let touch = Closure::wrap(Box::new(move |ev: TouchEvent| {
                let touches = ev.touches();
                let points = (0..touches.length())
                    .filter_map(|i| touches.get(i))
                    .map(|t| PointerPosition::new(t.client_x() as f64, t.client_y() as f64))
                    .collect::<Vec<_>>();
                if !points.is_empty() {
                    handler(PointerInput::Touch(points), current_viewport(&touch_window));
                }
            }) as Box<dyn FnMut(TouchEvent)>);

            window.add_event_listener_with_callback("mousemove", mouse.as_ref().unchecked_ref())?;
            window.add_event_listener_with_callback("touchmove", touch.as_ref().unchecked_ref())?;

            Ok(Self { window, mouse, touch })
        }
    }

    impl Drop for PointerSubscription {
        fn drop(&mut self) {
            let _ = self
                .window
                .remove_event_listener_with_callback("mousemove", self.mouse.as_ref().unchecked_ref());
            let _ = self
                .window
                .remove_event_listener_with_callback("touchmove", self.touch.as_ref().unchecked_ref());
        }
    }

    /// A scrubber bound to a canvas and the browser's event loop.
    ///
    /// Dropping it unmounts the viewer: listeners are removed, the animation
    /// loop is cancelled, and a load still in flight is discarded.
    pub struct MountedScrubber {
        scrubber: Rc<RefCell<Scrubber<HtmlImageElement>>>,
        animation: Rc<RefCell<Option<AnimationLoop>>>,
        _pointer: PointerSubscription,
    }

    impl MountedScrubber {
        pub fn set_display_active(&self, active: bool) {
            self.scrubber.borrow_mut().set_display_active(active);
        }

        pub fn view_mode(&self) -> ViewMode {
            self.scrubber.borrow().view_mode()
        }

        pub fn progress(&self) -> LoadingProgress {
            self.scrubber.borrow().progress().clone()
        }

        /// Unmount explicitly; same as dropping.
        pub fn unmount(self) {}
    }

    impl Drop for MountedScrubber {
        fn drop(&mut self) {
            log::debug!("unmounting scrubber");
            self.animation.borrow_mut().take();
        }
    }

    /// Mount a scrubber on `canvas`.
    ///
    /// Pointer listeners are registered immediately; frames load in the
    /// background and the animation loop starts once all of them resolved.
    /// `on_loaded` runs once, after the initial frame is painted.
    pub fn mount(canvas: HtmlCanvasElement, config: ScrubberConfig, on_loaded: impl FnOnce() + 'static) -> Result<MountedScrubber, JsValue> {
        let render_config = RenderConfig::from_config(&config);
        let mut scrubber = Scrubber::new(config).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let sources = scrubber
            .begin_loading()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let surface = CanvasSurface::new(canvas, &render_config).map_err(|e| JsValue::from_str(&e))?;

        let scrubber = Rc::new(RefCell::new(scrubber));
        let surface = Rc::new(RefCell::new(surface));
        let animation: Rc<RefCell<Option<AnimationLoop>>> = Rc::new(RefCell::new(None));

        let pointer_target = Rc::downgrade(&scrubber);
        let pointer = PointerSubscription::subscribe(Rc::new(move |input: PointerInput, viewport: Viewport| {
            if let Some(scrubber) = pointer_target.upgrade() {
                scrubber.borrow_mut().handle_pointer(&input, viewport);
            }
        }))?;

        let scrubber_weak = Rc::downgrade(&scrubber);
        let animation_weak = Rc::downgrade(&animation);
        wasm_bindgen_futures::spawn_local(async move {
            let progress_target = scrubber_weak.clone();
            let result = load_frame_set(&HtmlImageProvider, &sources, |loaded, _| {
                if let Some(scrubber) = progress_target.upgrade() {
                    scrubber.borrow_mut().record_progress(loaded);
                }
            })
            .await;

            let Some(scrubber) = scrubber_weak.upgrade() else {
                log::debug!("scrubber unmounted before frames loaded");
                return;
            };
            if scrubber.borrow_mut().finish_loading(result) != LoadState::Loaded {
                return;
            }

            if let Some(paint) = scrubber.borrow().initial_paint() {
                if let Err(err) = surface.borrow_mut().paint(&paint) {
                    log::warn!("initial paint failed: {err}");
                }
            }
            on_loaded();

            let Some(slot) = animation_weak.upgrade() else {
                return;
            };
            let tick_target = scrubber_weak.clone();
            let mut last_timestamp: Option<f64> = None;
            let started = AnimationLoop::start(move |timestamp| {
                let dt = last_timestamp.map_or(0.0, |last| (timestamp - last) / 1000.0);
                last_timestamp = Some(timestamp);
                let Some(scrubber) = tick_target.upgrade() else {
                    return;
                };
                let mut scrubber = scrubber.borrow_mut();
                if let Err(err) = scrubber.tick_and_paint(dt, &mut *surface.borrow_mut()) {
                    log::warn!("frame paint failed: {err}");
                }
            });
            match started {
                Ok(handle) => *slot.borrow_mut() = Some(handle),
                Err(err) => log::warn!("failed to start animation loop: {err:?}"),
            }
        });

        log::debug!("scrubber mounted");
        Ok(MountedScrubber {
            scrubber,
            animation,
            _pointer: pointer,
        })
    }
}
