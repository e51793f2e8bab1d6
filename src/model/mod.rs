// MODEL: Scene entities and data
pub mod camera;
pub mod material;
pub mod marker;
pub mod object;

pub use camera::Camera;
pub use material::{DetailSlots, Material, MaterialId, MaterialSet, TextureKey, TextureSet};
pub use marker::{MappingMode, Marker};
pub use object::MovableObject;
