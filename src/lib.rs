// Re-export all public modules so they can be used from main.rs
pub mod logging;
pub mod config;
pub mod error;
pub mod assets;
pub mod ui;
#[cfg(target_arch = "wasm32")]
pub mod dom_controls;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::convert::FromWasmAbi;
    use wasm_bindgen::{JsCast, JsValue};
    use web_sys::{Document, Event, EventTarget, HtmlCanvasElement, KeyboardEvent, MouseEvent, WheelEvent, Window};

    use crate::config::{ControlSurface, DemoConfig};
    use crate::controller::input::wasm::{keyboard_event_to_input, mouse_button_to_input, mouse_move_to_input, mouse_wheel_to_input};
    use crate::controller::{push_event, EventQueue, FrameLoopContext, InputEvent, KeyBindings};
    use crate::dom_controls;
    use crate::error::{ControlBindingError, DemoError};
    use crate::view::{GpuContext, RenderState};

    type EguiEvents = Rc<RefCell<Vec<egui::Event>>>;

    /// Main application setup for WASM
    pub async fn setup_app(
        window: &Window,
        document: &Document,
        canvas: &HtmlCanvasElement,
        config: DemoConfig,
        width: u32,
        height: u32,
    ) -> Result<(), DemoError> {
        let gpu = GpuContext::new(canvas, width, height).await?;
        let width = gpu.config.width;
        let height = gpu.config.height;

        let events: EventQueue = Rc::new(RefCell::new(Vec::new()));
        let egui_events: EguiEvents = Rc::new(RefCell::new(Vec::new()));

        let mut dom_panel = match config.control_surface {
            ControlSurface::HostPage => Some(dom_controls::bind(document, &events, config.profile)?),
            ControlSurface::Overlay => None,
        };

        let mut frame_ctx = FrameLoopContext::new(&config, width, height, events.clone());
        let mut render_state = RenderState::new(
            gpu.device.as_ref(),
            gpu.queue.as_ref(),
            gpu.format,
            gpu.config.alpha_mode,
            width,
            height,
            &frame_ctx.session.materials.object,
            &frame_ctx.session.materials.ground,
            &frame_ctx.session.markers,
        );

        setup_input_listeners(
            document,
            window,
            canvas,
            events,
            egui_events.clone(),
            frame_ctx.session.input.bindings().clone(),
        )?;

        // Continuous redraw using requestAnimationFrame
        let f = RcCellCallback::new(window.clone(), {
            let window = window.clone();

            move || {
                let dpr = window.device_pixel_ratio() as f32;
                let raw_input = egui_input(&window, &egui_events, render_state.width, render_state.height, dpr);

                frame_ctx.update(gpu.device.as_ref(), gpu.queue.as_ref(), &gpu.surface, &mut render_state, raw_input, dpr);
                if let Some(panel) = dom_panel.as_mut() {
                    panel.sync(&frame_ctx.session.panel);
                }

                match render_state.draw_frame(gpu.device.as_ref(), gpu.queue.as_ref(), &gpu.surface) {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::error!("rendering stopped: {}", e);
                        false
                    }
                }
            }
        });
        f.start();

        Ok(())
    }

    /// Build egui input from queued pointer events
    fn egui_input(window: &Window, egui_events: &EguiEvents, width: u32, height: u32, dpr: f32) -> egui::RawInput {
        let now = window.performance().map(|p| p.now()).unwrap_or(0.0);
        let mut raw_input = egui::RawInput::default();
        raw_input.time = Some(now / 1000.0);
        raw_input.screen_rect = Some(egui::Rect::from_min_size(
            egui::Pos2::new(0.0, 0.0),
            egui::vec2(width as f32 / dpr, height as f32 / dpr),
        ));
        raw_input.events.extend(egui_events.borrow_mut().drain(..));
        raw_input
    }

    fn egui_button(button: i16) -> Option<egui::PointerButton> {
        match button {
            0 => Some(egui::PointerButton::Primary),
            1 => Some(egui::PointerButton::Middle),
            2 => Some(egui::PointerButton::Secondary),
            _ => None,
        }
    }

    /// Window size in physical pixels
    pub fn window_size(window: &Window) -> (u32, u32) {
        let dpr = window.device_pixel_ratio();
        let css = |v: Result<JsValue, JsValue>, fallback: f64| v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback);
        let w = css(window.inner_width(), 800.0) * dpr;
        let h = css(window.inner_height(), 600.0) * dpr;
        ((w as u32).max(1), (h as u32).max(1))
    }

    fn listen<E: FromWasmAbi + 'static>(
        target: &EventTarget,
        name: &'static str,
        event: &'static str,
        handler: impl FnMut(E) + 'static,
    ) -> Result<(), ControlBindingError> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(E)>);
        target
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(|_| ControlBindingError::Listener { selector: name.to_string(), event })?;
        closure.forget();
        Ok(())
    }

    /// Listeners only translate DOM events and queue them; the frame loop applies them
    fn setup_input_listeners(
        document: &Document,
        window: &Window,
        canvas: &HtmlCanvasElement,
        events: EventQueue,
        egui_events: EguiEvents,
        bindings: KeyBindings,
    ) -> Result<(), ControlBindingError> {
        // Keyboard down
        {
            let events = events.clone();
            listen(document, "document", "keydown", move |e: KeyboardEvent| {
                // Keep space and the movement keys from scrolling the page
                if bindings.is_bound(&e.key()) {
                    e.prevent_default();
                }
                push_event(&events, keyboard_event_to_input(&e, true));
            })?;
        }

        // Keyboard up
        {
            let events = events.clone();
            listen(document, "document", "keyup", move |e: KeyboardEvent| {
                push_event(&events, keyboard_event_to_input(&e, false));
            })?;
        }

        // Focus loss - clear all keys
        {
            let events = events.clone();
            listen(window, "window", "blur", move |_e: Event| {
                push_event(&events, InputEvent::FocusLost);
            })?;
        }

        // Visibility change - clear all keys when hidden
        {
            let events = events.clone();
            let doc = document.clone();
            listen(document, "document", "visibilitychange", move |_e: Event| {
                push_event(&events, InputEvent::VisibilityChanged { visible: !doc.hidden() });
            })?;
        }

        // Mouse move
        {
            let events = events.clone();
            let egui_events = egui_events.clone();
            listen(document, "document", "mousemove", move |e: MouseEvent| {
                egui_events
                    .borrow_mut()
                    .push(egui::Event::PointerMoved(egui::pos2(e.client_x() as f32, e.client_y() as f32)));
                push_event(&events, mouse_move_to_input(&e));
            })?;
        }

        // Presses on the canvas only, releases anywhere so drags end
        let canvas_target: &EventTarget = canvas;
        let document_target: &EventTarget = document;
        let button_targets = [
            (canvas_target, "canvas", "mousedown", true),
            (document_target, "document", "mouseup", false),
        ];
        for (target, name, event, pressed) in button_targets {
            let events = events.clone();
            let egui_events = egui_events.clone();
            listen(target, name, event, move |e: MouseEvent| {
                if let Some(button) = egui_button(e.button()) {
                    egui_events.borrow_mut().push(egui::Event::PointerButton {
                        pos: egui::pos2(e.client_x() as f32, e.client_y() as f32),
                        button,
                        pressed,
                        modifiers: egui::Modifiers::default(),
                    });
                }
                push_event(&events, mouse_button_to_input(&e, pressed));
            })?;
        }

        // Context menu prevention, right drag pans
        listen(canvas, "canvas", "contextmenu", move |e: MouseEvent| {
            e.prevent_default();
        })?;

        // Mouse wheel
        {
            let events = events.clone();
            listen(canvas, "canvas", "wheel", move |e: WheelEvent| {
                e.prevent_default();
                push_event(&events, mouse_wheel_to_input(&e));
            })?;
        }

        // Resize the canvas with the window
        {
            let canvas = canvas.clone();
            let win = window.clone();
            listen(window, "window", "resize", move |_e: Event| {
                let (width, height) = window_size(&win);
                canvas.set_width(width);
                canvas.set_height(height);
                push_event(&events, InputEvent::Resized { width, height });
            })?;
        }

        Ok(())
    }

    /// Full-window canvas, drawn at device pixel resolution
    pub fn init_canvas(
        window: &Window,
        surface: ControlSurface,
        width: u32,
        height: u32,
    ) -> Result<(Document, HtmlCanvasElement), JsValue> {
        let document = window.document().ok_or(js_error("no document on window"))?;
        let body = document.body().ok_or(js_error("no body on document"))?;
        let canvas_el = document
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| js_error("failed to create canvas"))?;
        canvas_el.set_width(width);
        canvas_el.set_height(height);
        let style = canvas_el.style();
        for (property, value) in surface.canvas_style() {
            style.set_property(property, value)?;
        }
        match surface {
            ControlSurface::HostPage => {
                body.insert_before(&canvas_el, body.first_child().as_ref())?;
            }
            ControlSurface::Overlay => {
                body.append_child(&canvas_el)?;
            }
        }
        Ok((document, canvas_el))
    }

    pub fn js_error<E: Into<String>>(msg: E) -> JsValue {
        JsValue::from_str(&msg.into())
    }

    /// requestAnimationFrame loop that runs until the callback returns false
    struct RcCellCallback {
        inner: Rc<RefCell<Box<dyn FnMut() -> bool>>>,
        window: Window,
    }

    impl RcCellCallback {
        fn new(window: Window, f: impl FnMut() -> bool + 'static) -> Self {
            Self {
                inner: Rc::new(RefCell::new(Box::new(f))),
                window,
            }
        }

        fn start(self) {
            let inner = self.inner.clone();
            let window = self.window.clone();

            let callback = Rc::new(RefCell::new(None::<Closure<dyn FnMut()>>));
            let callback_clone = callback.clone();

            *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
                if !inner.borrow_mut().as_mut()() {
                    return;
                }

                // Recursively schedule next frame
                let cb_ref = callback_clone.borrow();
                if let Some(cb) = cb_ref.as_ref() {
                    if let Err(e) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                        tracing::error!("requestAnimationFrame failed: {:?}", e);
                    }
                }
            }) as Box<dyn FnMut()>));

            if let Some(cb) = callback.borrow().as_ref() {
                if let Err(e) = self.window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    tracing::error!("requestAnimationFrame failed: {:?}", e);
                }
            }

            // Leak the closure to keep it alive
            std::mem::forget(callback);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub async fn start() -> Result<(), wasm_bindgen::JsValue> {
    logging::init();

    let window = web_sys::window().ok_or(web::js_error("no global `window`"))?;
    let query = window.location().search().unwrap_or_default();
    let config = config::DemoConfig::from_query(&query).map_err(|e| web::js_error(e.to_string()))?;
    tracing::info!("starting with {:?}", config);

    let (width, height) = web::window_size(&window);
    let (document, canvas) = web::init_canvas(&window, config.control_surface, width, height)?;
    web::setup_app(&window, &document, &canvas, config, width, height)
        .await
        .map_err(|e| {
            tracing::error!("startup failed: {}", e);
            web::js_error(e.to_string())
        })
}
