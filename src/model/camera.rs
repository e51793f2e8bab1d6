use glam::{Mat4, Vec3};

pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            eye: Vec3::new(0.0, 2.0, 5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: 75f32.to_radians(),
            aspect: aspect_of(width, height),
            z_near: 0.1,
            z_far: 1000.0,
        }
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.eye).normalize_or_zero()
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(self.up).normalize_or_zero()
    }

    pub fn distance(&self) -> f32 {
        self.eye.distance(self.target)
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = aspect_of(width, height);
    }

    pub fn view_proj(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye, self.target, self.up);
        let proj = Mat4::perspective_rh(self.fov_y, self.aspect, self.z_near, self.z_far);
        proj * view
    }
}

// A minimised window reports 0x0
fn aspect_of(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_aspect_follows_viewport() {
        let mut cam = Camera::new(800, 600);
        assert_relative_eq!(cam.aspect, 800.0 / 600.0);
        cam.set_aspect(1920, 1080);
        assert_relative_eq!(cam.aspect, 1920.0 / 1080.0);
        cam.set_aspect(0, 0);
        assert!(cam.aspect.is_finite());
    }

    #[test]
    fn test_target_projects_to_screen_center() {
        let cam = Camera::new(800, 600);
        let clip = cam.view_proj() * cam.target.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert_relative_eq!(ndc.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(ndc.y, 0.0, epsilon = 1e-5);
    }
}
