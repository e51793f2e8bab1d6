use glam::{Mat4, Quat, Vec3};

/// The sphere the player rolls around
#[derive(Clone, Debug, PartialEq)]
pub struct MovableObject {
    pub position: Vec3,
    /// Euler angles in radians, applied in XYZ order
    pub rotation: Vec3,
    pub vertical_velocity: f32,
    pub grounded: bool,
}

impl MovableObject {
    pub const RADIUS: f32 = 1.0;

    /// Resting on the ground at the origin
    pub fn new(ground_height: f32) -> Self {
        Self {
            position: Vec3::new(0.0, ground_height, 0.0),
            rotation: Vec3::ZERO,
            vertical_velocity: 0.0,
            grounded: true,
        }
    }

    pub fn model_matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            glam::EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_rotation_translation(rotation, self.position)
    }
}
