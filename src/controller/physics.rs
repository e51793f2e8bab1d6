use crate::controller::InputState;
use crate::model::MovableObject;

/// Moves the object from the input flags and integrates jumps.
/// All quantities are per tick; there is no time step.
pub struct PhysicsSystem {
    pub move_speed: f32,
    pub gravity: f32,
    pub jump_strength: f32,
    pub ground_height: f32,
}

impl PhysicsSystem {
    pub fn new(move_speed: f32, gravity: f32, jump_strength: f32, ground_height: f32) -> Self {
        Self {
            move_speed,
            gravity,
            jump_strength,
            ground_height,
        }
    }

    /// Start a jump if the object is resting on the ground. No double jumps.
    pub fn try_jump(&self, object: &mut MovableObject) -> bool {
        if !object.grounded {
            return false;
        }
        object.grounded = false;
        object.vertical_velocity = self.jump_strength;
        true
    }

    /// Translate and roll the object along the pressed directions
    pub fn apply_movement(&self, object: &mut MovableObject, input: &InputState) {
        let step = self.move_speed;
        if input.forward {
            object.position.z -= step;
            object.rotation.x -= step;
        }
        if input.backward {
            object.position.z += step;
            object.rotation.x += step;
        }
        if input.left {
            object.position.x -= step;
            object.rotation.z += step;
        }
        if input.right {
            object.position.x += step;
            object.rotation.z -= step;
        }
    }

    /// One step of jump integration. Returns true on the tick the object lands.
    pub fn integrate(&self, object: &mut MovableObject) -> bool {
        if object.grounded {
            return false;
        }

        object.position.y += object.vertical_velocity;
        object.vertical_velocity -= self.gravity;

        if object.position.y <= self.ground_height {
            object.position.y = self.ground_height;
            object.vertical_velocity = 0.0;
            object.grounded = true;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::InputEvent;
    use approx::assert_relative_eq;

    fn physics() -> PhysicsSystem {
        PhysicsSystem::new(0.05, 0.01, 0.2, 1.0)
    }

    #[test]
    fn test_no_double_jump() {
        let physics = physics();
        let mut object = MovableObject::new(1.0);
        assert!(physics.try_jump(&mut object));
        physics.integrate(&mut object);
        let velocity = object.vertical_velocity;

        assert!(!physics.try_jump(&mut object));
        assert_eq!(object.vertical_velocity, velocity);
    }

    #[test]
    fn test_jump_follows_recurrence_until_landing() {
        let physics = physics();
        let mut object = MovableObject::new(1.0);
        physics.try_jump(&mut object);

        let (mut h, mut v) = (1.0_f32, 0.2_f32);
        let mut ticks = 0;
        loop {
            let landed = physics.integrate(&mut object);
            ticks += 1;
            h += v;
            v -= 0.01;
            if h <= 1.0 {
                assert!(landed);
                assert_eq!(object.position.y, 1.0);
                assert_eq!(object.vertical_velocity, 0.0);
                assert!(object.grounded);
                break;
            }
            assert!(!landed);
            assert_relative_eq!(object.position.y, h, epsilon = 1e-5);
            assert_relative_eq!(object.vertical_velocity, v, epsilon = 1e-5);
            assert!(ticks < 100, "jump never landed");
        }
        // v0 = 0.2, g = 0.01: back on the ground after ~41 ticks (f32 rounding may add one)
        assert!((41..=42).contains(&ticks), "landed after {ticks} ticks");
    }

    #[test]
    fn test_grounded_object_does_not_fall() {
        let physics = physics();
        let mut object = MovableObject::new(1.0);
        assert!(!physics.integrate(&mut object));
        assert_eq!(object.position.y, 1.0);
    }

    #[test]
    fn test_movement_rolls_the_object() {
        let physics = physics();
        let mut object = MovableObject::new(1.0);
        let mut input = InputState::new();
        input.process_event(&InputEvent::KeyDown("w".into()));
        input.process_event(&InputEvent::KeyDown("d".into()));

        physics.apply_movement(&mut object, &input);
        assert_relative_eq!(object.position.z, -0.05);
        assert_relative_eq!(object.position.x, 0.05);
        assert_relative_eq!(object.rotation.x, -0.05);
        assert_relative_eq!(object.rotation.z, -0.05);
        assert_eq!(object.position.y, 1.0);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let physics = physics();
        let mut object = MovableObject::new(1.0);
        let mut input = InputState::new();
        input.process_event(&InputEvent::KeyDown("a".into()));
        input.process_event(&InputEvent::KeyDown("d".into()));
        physics.apply_movement(&mut object, &input);
        assert_relative_eq!(object.position.x, 0.0);
    }
}
