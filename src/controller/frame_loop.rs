use glam::{Mat4, Vec3};
use wgpu::{Device, Queue, Surface};

use crate::assets::AssetLoader;
use crate::config::{ControlSurface, DemoConfig};
use crate::controller::{EventQueue, InputEvent, Session};
use crate::model::{Camera, Material, MaterialId, TextureKey};
use crate::view::RenderState;
use crate::ui;

const LIGHT_INTENSITY: f32 = 1.0;
const AMBIENT: f32 = 0.15;

/// Main loop state and per-frame update logic, shared by the web and native entry points
pub struct FrameLoopContext {
    pub session: Session,
    pub events: EventQueue,
    pub assets: AssetLoader,
    pub egui_ctx: egui::Context,
    pub control_surface: ControlSurface,
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub eye: [f32; 4],
}

impl CameraUniform {
    pub fn from_camera(camera: &Camera) -> Self {
        Self {
            view_proj: camera.view_proj().to_cols_array_2d(),
            eye: camera.eye.extend(1.0).to_array(),
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightingUniform {
    /// Points from the scene towards the light
    pub light_dir: [f32; 3],
    pub intensity: f32,
    pub color: [f32; 3],
    pub ambient: f32,
}

impl LightingUniform {
    /// A directional light placed at `position` and aimed at the origin
    pub fn directional(position: Vec3) -> Self {
        let dir = position.try_normalize().unwrap_or(Vec3::Y);
        Self {
            light_dir: dir.to_array(),
            intensity: LIGHT_INTENSITY,
            color: [1.0, 1.0, 1.0],
            ambient: AMBIENT,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
}

impl ObjectUniform {
    pub fn new(model: Mat4) -> Self {
        Self { model: model.to_cols_array_2d() }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub color: [f32; 4],
    pub normal_scale: [f32; 2],
    pub bump_scale: f32,
    pub displacement_scale: f32,
    pub displacement_bias: f32,
    pub flags: u32,
    pub _pad: [f32; 2],
}

impl MaterialUniform {
    pub const COLOR_MAP: u32 = 1;
    pub const BUMP_MAP: u32 = 2;
    pub const NORMAL_MAP: u32 = 4;
    pub const DISPLACEMENT_MAP: u32 = 8;

    /// `flags` marks the maps that are both assigned and loaded
    pub fn new(material: &Material, flags: u32) -> Self {
        Self {
            color: material.color,
            normal_scale: material.normal_scale.to_array(),
            bump_scale: material.bump_scale,
            displacement_scale: material.displacement_scale,
            displacement_bias: material.displacement_bias,
            flags,
            _pad: [0.0; 2],
        }
    }
}

/// Pointer input the overlay is using never reaches the camera.
/// Button releases always pass so a drag that ends over a window still stops.
pub fn forward_to_scene(event: &InputEvent, ui_owns_pointer: bool) -> bool {
    if !ui_owns_pointer {
        return true;
    }
    !matches!(
        event,
        InputEvent::MouseMove { .. } | InputEvent::MouseWheel { .. } | InputEvent::MouseButton { is_down: true, .. }
    )
}

/// Whether a material has to be rebuilt after this frame's texture arrivals
fn needs_rebuild(material: &mut Material, arrived: &[TextureKey]) -> bool {
    let dirty = material.take_needs_update();
    dirty || material.referenced_textures().any(|key| arrived.contains(&key))
}

impl FrameLoopContext {
    pub fn new(config: &DemoConfig, width: u32, height: u32, events: EventQueue) -> Self {
        let mut assets = AssetLoader::new();
        assets.request_all(config);

        Self {
            session: Session::new(config, width, height),
            events,
            assets,
            egui_ctx: egui::Context::default(),
            control_surface: config.control_surface,
        }
    }

    /// Run one tick and prepare everything `RenderState::draw_frame` needs
    pub fn update(
        &mut self,
        device: &Device,
        queue: &Queue,
        surface: &Surface,
        render_state: &mut RenderState,
        raw_input: egui::RawInput,
        pixels_per_point: f32,
    ) -> egui::PlatformOutput {
        // Decided by last frame's layout, the current one does not exist yet
        let ui_owns_pointer = self.egui_ctx.is_pointer_over_area() || self.egui_ctx.is_using_pointer();
        let events: Vec<InputEvent> = self
            .events
            .borrow_mut()
            .drain(..)
            .filter(|e| forward_to_scene(e, ui_owns_pointer))
            .collect();

        let outcome = self.session.tick(events);

        if let Some((width, height)) = outcome.resized {
            render_state.resize(device, surface, width, height);
        }

        self.upload_textures(device, queue, render_state);

        render_state.write_frame_uniforms(
            queue,
            &CameraUniform::from_camera(&self.session.camera),
            &LightingUniform::directional(self.session.light_position),
        );
        render_state.write_object_transform(queue, self.session.object.model_matrix());

        // Build UI and store output for rendering
        self.egui_ctx.set_pixels_per_point(pixels_per_point);
        let session = &self.session;
        let events = &self.events;
        let control_surface = self.control_surface;
        let mut full_output = self
            .egui_ctx
            .run(raw_input, |ctx| ui::build_ui(ctx, session, events, control_surface));

        let primitives = self
            .egui_ctx
            .tessellate(std::mem::take(&mut full_output.shapes), pixels_per_point);
        let platform_output = std::mem::take(&mut full_output.platform_output);
        render_state.egui_primitives = Some(primitives);
        render_state.egui_full_output = Some(full_output);
        render_state.egui_dpr = pixels_per_point;

        platform_output
    }

    /// Upload finished loads and rebind any material that changed or can now use them
    fn upload_textures(&mut self, device: &Device, queue: &Queue, render_state: &mut RenderState) {
        let mut arrived = Vec::new();
        for load in self.assets.drain() {
            match load.result {
                Ok(image) => {
                    tracing::debug!("loaded {} ({}x{})", load.key.relative_path(), image.width, image.height);
                    render_state.insert_texture(device, queue, load.key, &image);
                    arrived.push(load.key);
                }
                Err(e) => tracing::warn!("{}", e),
            }
        }

        for id in [MaterialId::Object, MaterialId::Ground] {
            let material = self.session.materials.get_mut(id);
            if needs_rebuild(material, &arrived) {
                render_state.update_material(device, queue, id, material);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::MouseButton;

    #[test]
    fn test_pointer_filter() {
        let drag = InputEvent::MouseMove { dx: 3.0, dy: 1.0 };
        let press = InputEvent::MouseButton { button: MouseButton::Left, is_down: true };
        let release = InputEvent::MouseButton { button: MouseButton::Left, is_down: false };
        let wheel = InputEvent::MouseWheel { delta_y: 100.0 };
        let key = InputEvent::KeyDown("w".to_string());

        for event in [&drag, &press, &release, &wheel, &key] {
            assert!(forward_to_scene(event, false));
        }
        assert!(!forward_to_scene(&drag, true));
        assert!(!forward_to_scene(&press, true));
        assert!(!forward_to_scene(&wheel, true));
        assert!(forward_to_scene(&release, true));
        assert!(forward_to_scene(&key, true));
    }

    #[test]
    fn test_rebuild_on_dirty_or_arrival() {
        let mut ground = Material::ground();
        // Freshly authored materials start dirty
        assert!(needs_rebuild(&mut ground, &[]));
        assert!(!needs_rebuild(&mut ground, &[]));
        assert!(!needs_rebuild(&mut ground, &[TextureKey::RockColor]));
        assert!(needs_rebuild(&mut ground, &[TextureKey::GroundNormal]));
    }

    #[test]
    fn test_uniform_sizes_match_shader() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 80);
        assert_eq!(std::mem::size_of::<LightingUniform>(), 32);
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 64);
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 48);
    }

    #[test]
    fn test_material_uniform_copies_scales() {
        let uniform = MaterialUniform::new(&Material::rock(), MaterialUniform::COLOR_MAP);
        assert_eq!(uniform.bump_scale, 100.0);
        assert_eq!(uniform.normal_scale, [10.0, 10.0]);
        assert_eq!(uniform.displacement_scale, 0.5);
        assert_eq!(uniform.displacement_bias, -0.1);
        assert_eq!(uniform.flags, MaterialUniform::COLOR_MAP);
    }

    #[test]
    fn test_light_points_at_origin() {
        let light = LightingUniform::directional(Vec3::new(2.0, 1.0, 0.0));
        let dir = Vec3::from(light.light_dir);
        assert!((dir.length() - 1.0).abs() < 1e-6);
        assert!(dir.x > 0.0 && dir.y > 0.0);
        assert_eq!(LightingUniform::directional(Vec3::ZERO).light_dir, [0.0, 1.0, 0.0]);
    }
}
