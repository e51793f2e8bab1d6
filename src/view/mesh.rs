use std::f32::consts::PI;
use wgpu::util::DeviceExt;
use bytemuck::NoUninit;

#[repr(C)]
#[derive(Debug, Clone, Copy, NoUninit)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 3] = [
        wgpu::VertexAttribute { offset: 0, shader_location: 0, format: wgpu::VertexFormat::Float32x3 },
        wgpu::VertexAttribute { offset: 12, shader_location: 1, format: wgpu::VertexFormat::Float32x3 },
        wgpu::VertexAttribute { offset: 24, shader_location: 2, format: wgpu::VertexFormat::Float32x2 },
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.indices.is_empty()
    }

    pub fn upload(&self, device: &wgpu::Device, label: &str) -> MeshBuffer {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} vertices")),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} indices")),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        MeshBuffer {
            vertex_buffer,
            index_buffer,
            index_count: self.indices.len() as u32,
        }
    }

    /// UV sphere centred at the origin. Seam and pole vertices are duplicated
    /// so every vertex has its own uv.
    pub fn uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> Mesh {
        let (ws, hs) = (width_segments.max(3), height_segments.max(2));
        let mut vertices = Vec::with_capacity(((ws + 1) * (hs + 1)) as usize);
        let mut indices = Vec::new();

        for iy in 0..=hs {
            let v = iy as f32 / hs as f32;
            for ix in 0..=ws {
                let u = ix as f32 / ws as f32;
                let normal = [
                    -(u * 2.0 * PI).cos() * (v * PI).sin(),
                    (v * PI).cos(),
                    (u * 2.0 * PI).sin() * (v * PI).sin(),
                ];
                vertices.push(Vertex {
                    pos: [normal[0] * radius, normal[1] * radius, normal[2] * radius],
                    normal,
                    uv: [u, 1.0 - v],
                });
            }
        }

        let row = ws + 1;
        for iy in 0..hs {
            for ix in 0..ws {
                let a = iy * row + ix + 1;
                let b = iy * row + ix;
                let c = (iy + 1) * row + ix;
                let d = (iy + 1) * row + ix + 1;
                // The pole rows collapse to a single triangle per quad
                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != hs - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        Mesh { vertices, indices }
    }

    /// Flat ground in the XZ plane facing +Y, subdivided so displacement has vertices to move
    pub fn plane(width: f32, depth: f32, segments: u32) -> Mesh {
        let segments = segments.max(1);
        let (half_w, half_d) = (width / 2.0, depth / 2.0);
        let row = segments + 1;
        let mut vertices = Vec::with_capacity((row * row) as usize);
        let mut indices = Vec::with_capacity((segments * segments * 6) as usize);

        for iz in 0..=segments {
            let fz = iz as f32 / segments as f32;
            for ix in 0..=segments {
                let fx = ix as f32 / segments as f32;
                vertices.push(Vertex {
                    pos: [fx * width - half_w, 0.0, fz * depth - half_d],
                    normal: [0.0, 1.0, 0.0],
                    uv: [fx, 1.0 - fz],
                });
            }
        }

        for iz in 0..segments {
            for ix in 0..segments {
                let a = iz * row + ix;
                let b = (iz + 1) * row + ix;
                let c = (iz + 1) * row + ix + 1;
                let d = iz * row + ix + 1;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        Mesh { vertices, indices }
    }

    /// Axis-aligned cube centred at the origin with per-face normals
    pub fn cube(size: f32) -> Mesh {
        let h = size / 2.0;
        // (normal, u axis, v axis) for each face
        let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
            ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
            ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
            ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
            ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
            ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (n, u, v) in faces {
            let base = vertices.len() as u32;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let pos = [
                    (n[0] + u[0] * su + v[0] * sv) * h,
                    (n[1] + u[1] * su + v[1] * sv) * h,
                    (n[2] + u[2] * su + v[2] * sv) * h,
                ];
                vertices.push(Vertex {
                    pos,
                    normal: n,
                    uv: [(su + 1.0) / 2.0, (1.0 - sv) / 2.0],
                });
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Mesh { vertices, indices }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn length(v: [f32; 3]) -> f32 {
        (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
    }

    #[test]
    fn test_sphere_counts_and_radius() {
        let mesh = Mesh::uv_sphere(1.0, 64, 64);
        assert_eq!(mesh.vertices.len(), 65 * 65);
        // Two triangles per quad minus one per quad in each pole row
        assert_eq!(mesh.indices.len(), (2 * 64 * 64 - 2 * 64) * 3);
        assert!(mesh.vertices.iter().all(|v| (length(v.pos) - 1.0).abs() < 1e-5));
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }

    #[test]
    fn test_plane_is_flat_and_centred() {
        let mesh = Mesh::plane(20.0, 20.0, 4);
        assert_eq!(mesh.vertices.len(), 25);
        assert_eq!(mesh.indices.len(), 4 * 4 * 6);
        assert!(mesh.vertices.iter().all(|v| v.pos[1] == 0.0 && v.normal == [0.0, 1.0, 0.0]));
        assert_eq!(mesh.vertices[0].pos, [-10.0, 0.0, -10.0]);
        assert_eq!(mesh.vertices[24].pos, [10.0, 0.0, 10.0]);
    }

    #[test]
    fn test_cube_faces_point_outward() {
        let mesh = Mesh::cube(1.0);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        for v in &mesh.vertices {
            let along_normal = v.pos[0] * v.normal[0] + v.pos[1] * v.normal[1] + v.pos[2] * v.normal[2];
            assert!((along_normal - 0.5).abs() < 1e-6);
            assert!(v.pos.iter().all(|c| c.abs() <= 0.5 + 1e-6));
        }
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = Mesh { vertices: Vec::new(), indices: Vec::new() };
        assert!(mesh.is_empty());
        assert!(!Mesh::cube(1.0).is_empty());
    }
}
