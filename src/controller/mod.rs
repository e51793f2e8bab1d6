// CONTROLLER: Input, game logic, and update loop
pub mod input;
pub mod physics;
pub mod camera_controller;
pub mod interaction;
pub mod mapping;
pub mod session;
pub mod frame_loop;

pub use input::{
    push_event, ControlEvent, EventQueue, InputEvent, InputState, KeyBindings, MouseButton,
    PointerDelta,
};
pub use physics::PhysicsSystem;
pub use camera_controller::CameraController;
pub use interaction::{InteractionDetector, MessagePanel, PanelPolicy};
pub use mapping::{MappingModeController, MappingProfile};
pub use session::{LightOrbit, Session, TickOutcome};
pub use frame_loop::{
    CameraUniform, FrameLoopContext, LightingUniform, MaterialUniform, ObjectUniform,
};
