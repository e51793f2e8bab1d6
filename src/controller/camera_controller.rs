use glam::Vec3;
use crate::controller::PointerDelta;
use crate::model::Camera;

const MIN_POLAR: f32 = 0.01;
const MAX_POLAR: f32 = std::f32::consts::PI - 0.01;

/// Trackball-style orbit controls around the camera target.
/// Static: nothing carries over between ticks.
pub struct CameraController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl CameraController {
    pub fn new() -> Self {
        Self {
            rotate_speed: 2.0,
            zoom_speed: 1.2,
            pan_speed: 0.8,
            min_distance: 0.5,
            max_distance: 500.0,
        }
    }

    /// Consume one tick worth of pointer motion
    pub fn update(&self, camera: &mut Camera, delta: PointerDelta) {
        if delta.is_zero() {
            return;
        }
        if delta.rotate.length_squared() > 0.0 {
            self.rotate(camera, delta.rotate.x, delta.rotate.y);
        }
        if delta.zoom != 0.0 {
            self.zoom(camera, delta.zoom);
        }
        if delta.pan.length_squared() > 0.0 {
            self.pan(camera, delta.pan.x, delta.pan.y);
        }
    }

    /// Orbit the eye around the target; dragging right spins the scene right
    pub fn rotate(&self, camera: &mut Camera, dx: f32, dy: f32) {
        let offset = camera.eye - camera.target;
        let radius = offset.length();
        if radius == 0.0 {
            return;
        }

        let sensitivity = self.rotate_speed * 0.005;
        let mut azimuth = offset.x.atan2(offset.z);
        let mut polar = (offset.y / radius).clamp(-1.0, 1.0).acos();

        azimuth -= dx * sensitivity;
        polar = (polar - dy * sensitivity).clamp(MIN_POLAR, MAX_POLAR);

        camera.eye = camera.target
            + Vec3::new(
                radius * polar.sin() * azimuth.sin(),
                radius * polar.cos(),
                radius * polar.sin() * azimuth.cos(),
            );
    }

    /// Wheel zoom along the view direction, positive deltas move away
    pub fn zoom(&self, camera: &mut Camera, delta_y: f32) {
        let factor = (1.0 + delta_y * 0.001 * self.zoom_speed).max(0.1);
        let distance = (camera.distance() * factor).clamp(self.min_distance, self.max_distance);
        camera.eye = camera.target - camera.forward() * distance;
    }

    /// Move eye and target together in the view plane
    pub fn pan(&self, camera: &mut Camera, dx: f32, dy: f32) {
        let right = camera.right();
        let screen_up = right.cross(camera.forward());
        let scale = self.pan_speed * camera.distance() * 0.002;
        let shift = (-right * dx + screen_up * dy) * scale;
        camera.eye += shift;
        camera.target += shift;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::Vec2;

    #[test]
    fn test_rotate_keeps_distance() {
        let controller = CameraController::new();
        let mut cam = Camera::new(800, 600);
        let before = cam.distance();
        controller.rotate(&mut cam, 120.0, -40.0);
        assert_relative_eq!(cam.distance(), before, epsilon = 1e-4);
        assert_eq!(cam.target, Vec3::ZERO);
    }

    #[test]
    fn test_rotate_never_flips_over_the_pole() {
        let controller = CameraController::new();
        let mut cam = Camera::new(800, 600);
        controller.rotate(&mut cam, 0.0, 10_000.0);
        assert!(cam.eye.y > 0.0);
        assert!(cam.right().length() > 0.9);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let controller = CameraController::new();
        let mut cam = Camera::new(800, 600);
        for _ in 0..50 {
            controller.zoom(&mut cam, -500.0);
        }
        assert!(cam.distance() >= controller.min_distance - 1e-4);
        controller.zoom(&mut cam, 100.0);
        assert!(cam.distance() > controller.min_distance);
    }

    #[test]
    fn test_pan_moves_target_with_eye() {
        let controller = CameraController::new();
        let mut cam = Camera::new(800, 600);
        let offset = cam.eye - cam.target;
        controller.update(&mut cam, PointerDelta { pan: Vec2::new(50.0, 0.0), ..Default::default() });
        assert!(cam.target.x < 0.0);
        assert_relative_eq!((cam.eye - cam.target).x, offset.x, epsilon = 1e-5);
        assert_relative_eq!((cam.eye - cam.target).z, offset.z, epsilon = 1e-5);
    }
}
