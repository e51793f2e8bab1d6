use glam::Vec3;

use crate::config::DemoConfig;
use crate::controller::{
    CameraController, ControlEvent, InputEvent, InputState, InteractionDetector, MappingModeController,
    MessagePanel, PhysicsSystem,
};
use crate::model::{Camera, Marker, MaterialSet, MovableObject};

/// Directional light circling the origin
#[derive(Debug, Clone, PartialEq)]
pub struct LightOrbit {
    pub angle: f32,
    /// Radians per tick
    pub rate: f32,
    pub radius: f32,
    pub height: f32,
}

impl LightOrbit {
    /// Advance one tick and return the new light position.
    /// The angle is never wrapped, only its sin/cos are used.
    pub fn advance(&mut self) -> Vec3 {
        self.angle += self.rate;
        self.position()
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(
            self.radius * self.angle.cos(),
            self.height,
            self.radius * self.angle.sin(),
        )
    }
}

/// What a tick changed that the view layer has to act on
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    pub resized: Option<(u32, u32)>,
    pub landed: bool,
    pub marker: Option<usize>,
}

/// All state of one interactive session
pub struct Session {
    pub object: MovableObject,
    pub markers: Vec<Marker>,
    pub materials: MaterialSet,
    pub camera: Camera,
    pub input: InputState,
    pub light: LightOrbit,
    pub light_position: Vec3,
    pub panel: MessagePanel,
    pub mapping: MappingModeController,
    pub viewport: (u32, u32),
    physics: PhysicsSystem,
    interaction: InteractionDetector,
    camera_controller: CameraController,
}

impl Session {
    pub fn new(config: &DemoConfig, width: u32, height: u32) -> Self {
        let light = LightOrbit {
            angle: 0.0,
            rate: config.light_rate,
            radius: config.light_radius,
            height: config.light_height,
        };
        Self {
            object: MovableObject::new(config.ground_height),
            markers: Marker::default_set(),
            materials: MaterialSet::authored(),
            camera: Camera::new(width, height),
            input: InputState::new(),
            light_position: light.position(),
            light,
            panel: MessagePanel::default(),
            mapping: MappingModeController::new(config.profile),
            viewport: (width, height),
            physics: PhysicsSystem::new(
                config.move_speed,
                config.gravity,
                config.jump_strength,
                config.ground_height,
            ),
            interaction: InteractionDetector::new(config.interaction_threshold, config.panel_policy),
            camera_controller: CameraController::new(),
        }
    }

    /// Run one frame of game logic. Queued events are applied first, in order,
    /// then camera, movement, jump integration, light orbit and proximity.
    pub fn tick<I>(&mut self, events: I) -> TickOutcome
    where
        I: IntoIterator<Item = InputEvent>,
    {
        let mut outcome = TickOutcome::default();

        for event in events {
            if let Some(size) = self.apply_event(&event) {
                outcome.resized = Some(size);
            }
        }
        if self.input.take_jump() {
            self.physics.try_jump(&mut self.object);
        }

        let pointer = self.input.consume_pointer();
        self.camera_controller.update(&mut self.camera, pointer);

        self.physics.apply_movement(&mut self.object, &self.input);
        outcome.landed = self.physics.integrate(&mut self.object);

        self.light_position = self.light.advance();

        outcome.marker = self
            .interaction
            .check(self.object.position, &self.markers, &mut self.panel);

        outcome
    }

    /// Returns the new viewport size for resize events
    fn apply_event(&mut self, event: &InputEvent) -> Option<(u32, u32)> {
        match event {
            InputEvent::Control(control) => {
                self.apply_control(*control);
                None
            }
            InputEvent::Resized { width, height } => {
                if *width == 0 || *height == 0 {
                    return None;
                }
                tracing::debug!("viewport resized to {}x{}", width, height);
                self.viewport = (*width, *height);
                self.camera.set_aspect(*width, *height);
                Some((*width, *height))
            }
            other => {
                self.input.process_event(other);
                None
            }
        }
    }

    fn apply_control(&mut self, control: ControlEvent) {
        match control {
            ControlEvent::SelectMode(mode) => {
                self.mapping.select_mode(mode, &mut self.materials);
            }
            ControlEvent::SetDisplacement(enabled) => {
                self.mapping.set_displacement(enabled, &mut self.materials);
            }
            ControlEvent::SetLightRate(rate) if rate.is_finite() => {
                self.light.rate = rate;
            }
            ControlEvent::SetLightRate(rate) => {
                tracing::warn!("ignoring non-finite light rate {}", rate);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{MappingProfile, PanelPolicy};
    use crate::model::{MappingMode, TextureKey};
    use approx::assert_relative_eq;

    fn session() -> Session {
        Session::new(&DemoConfig::default(), 800, 600)
    }

    fn no_events() -> Vec<InputEvent> {
        Vec::new()
    }

    fn key(down: bool, k: &str) -> InputEvent {
        if down { InputEvent::KeyDown(k.to_string()) } else { InputEvent::KeyUp(k.to_string()) }
    }

    #[test]
    fn test_light_after_one_tick() {
        let mut s = session();
        s.tick(no_events());
        assert_relative_eq!(s.light_position.x, 2.0 * 0.03f32.cos(), epsilon = 1e-6);
        assert_relative_eq!(s.light_position.z, 2.0 * 0.03f32.sin(), epsilon = 1e-6);
        assert_relative_eq!(s.light_position.x, 1.999, epsilon = 1e-3);
        assert_relative_eq!(s.light_position.z, 0.060, epsilon = 1e-3);
        assert_eq!(s.light_position.y, 1.0);
    }

    #[test]
    fn test_light_rate_control_applies_before_orbit() {
        let mut s = session();
        s.tick([InputEvent::Control(ControlEvent::SetLightRate(0.5))]);
        assert_relative_eq!(s.light.angle, 0.5);
        s.tick([InputEvent::Control(ControlEvent::SetLightRate(f32::NAN))]);
        assert_relative_eq!(s.light.angle, 1.0);
    }

    #[test]
    fn test_events_apply_before_movement() {
        let mut s = session();
        s.tick([key(true, "w")]);
        assert_relative_eq!(s.object.position.z, -0.05);
        s.tick([key(false, "w")]);
        assert_relative_eq!(s.object.position.z, -0.05);
    }

    #[test]
    fn test_jump_and_land() {
        let mut s = session();
        s.tick([key(true, " ")]);
        assert!(!s.object.grounded);
        assert_relative_eq!(s.object.position.y, 1.2);

        // Mid-air presses do nothing
        let v = s.object.vertical_velocity;
        s.tick([key(false, " "), key(true, " ")]);
        assert_relative_eq!(s.object.vertical_velocity, v - 0.01, epsilon = 1e-6);

        let mut landed = false;
        for _ in 0..100 {
            if s.tick(no_events()).landed {
                landed = true;
                break;
            }
        }
        assert!(landed);
        assert_eq!(s.object.position.y, 1.0);
    }

    #[test]
    fn test_starting_position_shows_normal_marker() {
        let mut s = session();
        let outcome = s.tick(no_events());
        assert_eq!(outcome.marker, Some(1));
        assert!(s.panel.visible);
        assert!(s.panel.text.starts_with("Normal Mapping"));
    }

    #[test]
    fn test_walking_away_hides_panel() {
        let mut s = session();
        s.tick([key(true, "s")]);
        for _ in 0..60 {
            s.tick(no_events());
        }
        // z = 3.05, beyond every marker
        assert!(!s.panel.visible);
    }

    #[test]
    fn test_sticky_panel_profile() {
        let config = DemoConfig { panel_policy: PanelPolicy::Sticky, ..DemoConfig::default() };
        let mut s = Session::new(&config, 800, 600);
        s.tick([key(true, "s")]);
        for _ in 0..60 {
            s.tick(no_events());
        }
        assert!(s.panel.visible);
    }

    #[test]
    fn test_mapping_controls_through_queue() {
        let config = DemoConfig { profile: MappingProfile::Exclusive, ..DemoConfig::default() };
        let mut s = Session::new(&config, 800, 600);
        s.tick([InputEvent::Control(ControlEvent::SelectMode(MappingMode::Normal))]);
        assert_eq!(s.mapping.mode(), Some(MappingMode::Normal));
        assert_eq!(s.materials.ground.slots.normal, Some(TextureKey::GroundNormal));
        assert_eq!(s.materials.ground.slots.bump, None);
    }

    #[test]
    fn test_resize_updates_camera() {
        let mut s = session();
        let outcome = s.tick([InputEvent::Resized { width: 1000, height: 500 }]);
        assert_eq!(outcome.resized, Some((1000, 500)));
        assert_relative_eq!(s.camera.aspect, 2.0);
        assert_eq!(s.tick([InputEvent::Resized { width: 0, height: 0 }]).resized, None);
    }
}
