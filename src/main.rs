use winit::{
    event::*,
    event_loop::EventLoop,
    keyboard::{Key, NamedKey},
    window::Window,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

// Import from the library crate
use relief::{logging, config, error, view, controller};

use config::DemoConfig;
use controller::{push_event, EventQueue, FrameLoopContext, InputEvent};
use error::DemoError;
use view::{GpuContext, RenderState};

struct App {
    window: Arc<Window>,
    gpu: GpuContext,
    events: EventQueue,
    frame_ctx: FrameLoopContext,
    render_state: RenderState,
    egui_state: egui_winit::State,
    last_cursor: Option<(f64, f64)>,
}

/// Browser-style key name, so native and web share the same bindings
fn key_name(key: &Key) -> Option<String> {
    match key {
        Key::Character(s) => Some(s.to_string()),
        Key::Named(NamedKey::Space) => Some(" ".to_string()),
        _ => None,
    }
}

fn mouse_button(button: MouseButton) -> Option<controller::MouseButton> {
    match button {
        MouseButton::Left => Some(controller::MouseButton::Left),
        MouseButton::Right => Some(controller::MouseButton::Right),
        MouseButton::Middle => Some(controller::MouseButton::Middle),
        _ => None,
    }
}

/// Positive means scrolling down, as the DOM `deltaY` does
fn wheel_delta(delta: &MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => -y * 100.0,
        MouseScrollDelta::PixelDelta(p) => -p.y as f32,
    }
}

impl App {
    async fn new(window: Arc<Window>, config: &DemoConfig) -> Result<Self, DemoError> {
        let size = window.inner_size();
        let gpu = GpuContext::new_native(window.clone(), size.width, size.height).await?;
        let width = gpu.config.width;
        let height = gpu.config.height;

        let events: EventQueue = Rc::new(RefCell::new(Vec::new()));
        let frame_ctx = FrameLoopContext::new(config, width, height, events.clone());
        let render_state = RenderState::new(
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

        // Initialize egui
        let egui_state = egui_winit::State::new(
            frame_ctx.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            None,
            None,
            None,
        );

        Ok(Self {
            window,
            gpu,
            events,
            frame_ctx,
            render_state,
            egui_state,
            last_cursor: None,
        })
    }

    /// Translate a window event into the shared input queue
    fn input(&mut self, event: &WindowEvent) {
        // First let egui process the event
        let egui_captured = self.egui_state.on_window_event(self.window.as_ref(), event).consumed;

        match event {
            WindowEvent::KeyboardInput { event: KeyEvent { state, logical_key, .. }, .. } => {
                let Some(key) = key_name(logical_key) else { return };
                match state {
                    ElementState::Pressed if !egui_captured => push_event(&self.events, InputEvent::KeyDown(key)),
                    ElementState::Released => push_event(&self.events, InputEvent::KeyUp(key)),
                    _ => {}
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let Some(button) = mouse_button(*button) else { return };
                let is_down = *state == ElementState::Pressed;
                if !is_down || !egui_captured {
                    push_event(&self.events, InputEvent::MouseButton { button, is_down });
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some((lx, ly)) = self.last_cursor {
                    let (dx, dy) = ((position.x - lx) as f32, (position.y - ly) as f32);
                    push_event(&self.events, InputEvent::MouseMove { dx, dy });
                }
                self.last_cursor = Some((position.x, position.y));
            }
            WindowEvent::CursorLeft { .. } => self.last_cursor = None,
            WindowEvent::MouseWheel { delta, .. } if !egui_captured => {
                push_event(&self.events, InputEvent::MouseWheel { delta_y: wheel_delta(delta) });
            }
            WindowEvent::Focused(false) => push_event(&self.events, InputEvent::FocusLost),
            WindowEvent::Occluded(occluded) => {
                push_event(&self.events, InputEvent::VisibilityChanged { visible: !occluded });
            }
            WindowEvent::Resized(size) => {
                push_event(&self.events, InputEvent::Resized { width: size.width, height: size.height });
            }
            _ => {}
        }
    }

    fn redraw(&mut self) -> Result<(), relief::error::RenderError> {
        let raw_input = self.egui_state.take_egui_input(&self.window);
        let pixels_per_point = self.window.scale_factor() as f32;

        let platform_output = self.frame_ctx.update(
            self.gpu.device.as_ref(),
            self.gpu.queue.as_ref(),
            &self.gpu.surface,
            &mut self.render_state,
            raw_input,
            pixels_per_point,
        );
        self.egui_state.handle_platform_output(&self.window, platform_output);

        self.render_state
            .draw_frame(self.gpu.device.as_ref(), self.gpu.queue.as_ref(), &self.gpu.surface)
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = DemoConfig::from_env()?;
    tracing::info!("starting with {:?}", config);

    let event_loop = EventLoop::new()?;
    let window_attributes = Window::default_attributes()
        .with_title("Relief - bump, normal and displacement mapping")
        .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
    let window = Arc::new(event_loop.create_window(window_attributes)?);

    let mut app = pollster::block_on(App::new(window, &config))?;

    event_loop.run(move |event, elwt| {
        match event {
            Event::WindowEvent {
                ref event,
                window_id,
            } if window_id == app.window.id() => {
                match event {
                    WindowEvent::CloseRequested => elwt.exit(),
                    WindowEvent::RedrawRequested => {
                        if let Err(e) = app.redraw() {
                            tracing::error!("rendering stopped: {}", e);
                            elwt.exit();
                        }
                    }
                    other => app.input(other),
                }
            }
            Event::AboutToWait => {
                app.window.request_redraw();
            }
            _ => {}
        }
    })?;

    Ok(())
}

fn main() {
    logging::init();

    if let Err(e) = run() {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}
