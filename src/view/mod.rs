// VIEW: Rendering and graphics
pub mod render;
pub mod gpu_init;
pub mod mesh;
pub mod texture;

pub use render::{DrawTransform, FrameResources, GpuMaterial, RenderState};
pub use gpu_init::GpuContext;
pub use mesh::{Mesh, MeshBuffer, Vertex};
pub use texture::{DecodedImage, TextureLibrary};
