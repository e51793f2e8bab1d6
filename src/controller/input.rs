/// Platform-agnostic input handling system
use std::cell::RefCell;
use std::rc::Rc;
use glam::Vec2;
use crate::model::MappingMode;

/// Listeners push here, the frame loop drains it once per tick
pub type EventQueue = Rc<RefCell<Vec<InputEvent>>>;

pub fn push_event(queue: &EventQueue, event: InputEvent) {
    queue.borrow_mut().push(event);
}

/// Platform-independent input events, queued by listeners and drained once per tick
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    // Keyboard events
    KeyDown(String),
    KeyUp(String),

    // Mouse events
    MouseMove { dx: f32, dy: f32 },
    MouseButton { button: MouseButton, is_down: bool },
    MouseWheel { delta_y: f32 },

    // Window events
    FocusLost,
    VisibilityChanged { visible: bool },
    Resized { width: u32, height: u32 },

    // UI controls
    Control(ControlEvent),
}

/// Changes requested through the mapping controls
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlEvent {
    SelectMode(MappingMode),
    SetDisplacement(bool),
    SetLightRate(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    pub fn from_web_button(button: i16) -> Self {
        match button {
            0 => MouseButton::Left,
            1 => MouseButton::Middle,
            2 => MouseButton::Right,
            _ => MouseButton::Left,
        }
    }
}

/// Pointer motion gathered since the camera controller last looked
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerDelta {
    pub rotate: Vec2,
    pub pan: Vec2,
    pub zoom: f32,
}

impl PointerDelta {
    pub fn is_zero(&self) -> bool {
        self.rotate == Vec2::ZERO && self.pan == Vec2::ZERO && self.zoom == 0.0
    }
}

/// Key mapping configuration
#[derive(Clone, Debug)]
pub struct KeyBindings {
    pub forward: String,
    pub backward: String,
    pub left: String,
    pub right: String,
    pub jump: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: "w".to_string(),
            backward: "s".to_string(),
            left: "a".to_string(),
            right: "d".to_string(),
            jump: " ".to_string(),
        }
    }
}

impl KeyBindings {
    /// Keys whose browser default (scrolling) should be suppressed
    pub fn is_bound(&self, key: &str) -> bool {
        [&self.forward, &self.backward, &self.left, &self.right, &self.jump]
            .iter()
            .any(|k| k.as_str() == key)
    }
}

/// Movement flags, jump trigger and pending pointer motion
#[derive(Debug, Default)]
pub struct InputState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    jump_pressed: bool,
    left_button: bool,
    right_button: bool,
    pointer: PointerDelta,
    bindings: KeyBindings,
}

impl InputState {
    pub fn new() -> Self {
        Self::with_bindings(KeyBindings::default())
    }

    pub fn with_bindings(bindings: KeyBindings) -> Self {
        Self { bindings, ..Default::default() }
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Process an input event and update state
    pub fn process_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(key) => self.set_key(key, true),
            InputEvent::KeyUp(key) => self.set_key(key, false),
            InputEvent::MouseMove { dx, dy } => {
                let delta = Vec2::new(*dx, *dy);
                if self.left_button {
                    self.pointer.rotate += delta;
                } else if self.right_button {
                    self.pointer.pan += delta;
                }
            }
            InputEvent::MouseButton { button, is_down } => match button {
                MouseButton::Left => self.left_button = *is_down,
                MouseButton::Right => self.right_button = *is_down,
                MouseButton::Middle => {}
            },
            InputEvent::MouseWheel { delta_y } => {
                self.pointer.zoom += *delta_y;
            }
            InputEvent::FocusLost | InputEvent::VisibilityChanged { visible: false } => {
                self.clear_keys();
            }
            _ => {}
        }
    }

    fn set_key(&mut self, key: &str, is_down: bool) {
        let b = &self.bindings;
        if key == b.forward {
            self.forward = is_down;
        } else if key == b.backward {
            self.backward = is_down;
        } else if key == b.left {
            self.left = is_down;
        } else if key == b.right {
            self.right = is_down;
        } else if key == b.jump && is_down {
            // Release does nothing: the jump runs its course
            self.jump_pressed = true;
        }
    }

    /// Returns whether jump was pressed since the last call
    pub fn take_jump(&mut self) -> bool {
        std::mem::take(&mut self.jump_pressed)
    }

    pub fn consume_pointer(&mut self) -> PointerDelta {
        std::mem::take(&mut self.pointer)
    }

    pub fn clear_keys(&mut self) {
        self.forward = false;
        self.backward = false;
        self.left = false;
        self.right = false;
        self.jump_pressed = false;
        self.left_button = false;
        self.right_button = false;
    }

    #[cfg(test)]
    pub fn is_moving(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }
}

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use super::*;
    use web_sys::{KeyboardEvent, MouseEvent, WheelEvent};

    pub fn keyboard_event_to_input(e: &KeyboardEvent, is_down: bool) -> InputEvent {
        let key = e.key();
        if is_down {
            InputEvent::KeyDown(key)
        } else {
            InputEvent::KeyUp(key)
        }
    }

    pub fn mouse_move_to_input(e: &MouseEvent) -> InputEvent {
        InputEvent::MouseMove {
            dx: e.movement_x() as f32,
            dy: e.movement_y() as f32,
        }
    }

    pub fn mouse_button_to_input(e: &MouseEvent, is_down: bool) -> InputEvent {
        InputEvent::MouseButton {
            button: MouseButton::from_web_button(e.button()),
            is_down,
        }
    }

    pub fn mouse_wheel_to_input(e: &WheelEvent) -> InputEvent {
        InputEvent::MouseWheel { delta_y: e.delta_y() as f32 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down(key: &str) -> InputEvent {
        InputEvent::KeyDown(key.to_string())
    }

    fn up(key: &str) -> InputEvent {
        InputEvent::KeyUp(key.to_string())
    }

    #[test]
    fn test_key_down_up_restores_flags() {
        let mut input = InputState::new();
        for key in ["w", "a", "s", "d"] {
            input.process_event(&down(key));
            assert!(input.is_moving());
            input.process_event(&up(key));
            assert!(!input.is_moving(), "flag for {key:?} should be cleared");
        }
    }

    #[test]
    fn test_flags_map_to_directions() {
        let mut input = InputState::new();
        input.process_event(&down("w"));
        input.process_event(&down("d"));
        assert!(input.forward && input.right);
        assert!(!input.backward && !input.left);
    }

    #[test]
    fn test_unbound_and_uppercase_keys_are_ignored() {
        let mut input = InputState::new();
        input.process_event(&down("W"));
        input.process_event(&down("ArrowUp"));
        input.process_event(&down("Shift"));
        assert!(!input.is_moving());
        assert!(!input.take_jump());
    }

    #[test]
    fn test_jump_is_edge_triggered() {
        let mut input = InputState::new();
        input.process_event(&down(" "));
        input.process_event(&up(" "));
        assert!(input.take_jump());
        assert!(!input.take_jump());
    }

    #[test]
    fn test_focus_loss_clears_keys() {
        let mut input = InputState::new();
        input.process_event(&down("w"));
        input.process_event(&down("a"));
        input.process_event(&InputEvent::FocusLost);
        assert!(!input.is_moving());
    }

    #[test]
    fn test_drag_routes_by_button() {
        let mut input = InputState::new();
        // Motion without a button does not move the camera
        input.process_event(&InputEvent::MouseMove { dx: 5.0, dy: 5.0 });
        assert!(input.consume_pointer().is_zero());

        input.process_event(&InputEvent::MouseButton { button: MouseButton::Left, is_down: true });
        input.process_event(&InputEvent::MouseMove { dx: 3.0, dy: -1.0 });
        input.process_event(&InputEvent::MouseButton { button: MouseButton::Left, is_down: false });
        input.process_event(&InputEvent::MouseButton { button: MouseButton::Right, is_down: true });
        input.process_event(&InputEvent::MouseMove { dx: 2.0, dy: 2.0 });
        input.process_event(&InputEvent::MouseWheel { delta_y: 100.0 });

        let delta = input.consume_pointer();
        assert_eq!(delta.rotate, Vec2::new(3.0, -1.0));
        assert_eq!(delta.pan, Vec2::new(2.0, 2.0));
        assert_eq!(delta.zoom, 100.0);
        assert!(input.consume_pointer().is_zero());
    }
}
