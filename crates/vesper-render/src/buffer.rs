//! UI vertex format and borrowed geometry submitted to the batcher.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::error::BatchError;

/// Vertex format shared by every batched UI renderer.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct UiVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

static_assertions::assert_eq_size!(UiVertex, [u8; 36]);

impl UiVertex {
    pub fn new(position: [f32; 3], uv: [f32; 2], color: [f32; 4]) -> Self {
        Self {
            position,
            uv,
            color,
        }
    }

    /// This vertex with its position moved by `transform`.
    pub fn transformed(&self, transform: &Mat4) -> Self {
        Self {
            position: transform
                .transform_point3(Vec3::from_array(self.position))
                .to_array(),
            ..*self
        }
    }

    /// Get the vertex buffer layout for this vertex type.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        use wgpu::{VertexAttribute, VertexFormat};

        const ATTRIBUTES: [VertexAttribute; 3] = [
            VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: VertexFormat::Float32x3,
            },
            VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: VertexFormat::Float32x2,
            },
            VertexAttribute {
                offset: 20,
                shader_location: 2,
                format: VertexFormat::Float32x4,
            },
        ];

        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<UiVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Vertices plus indices local to them (index 0 is the first vertex).
#[derive(Clone, Copy, Debug)]
pub struct Geometry<'a> {
    pub vertices: &'a [UiVertex],
    pub indices: &'a [u16],
}

impl<'a> Geometry<'a> {
    pub fn new(vertices: &'a [UiVertex], indices: &'a [u16]) -> Self {
        Self { vertices, indices }
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Check that every index refers to one of this geometry's vertices.
    pub fn validate(&self) -> Result<(), BatchError> {
        let vertex_count = self.vertices.len();
        match self.indices.iter().find(|&&i| usize::from(i) >= vertex_count) {
            Some(&index) => Err(BatchError::IndexOutOfBounds {
                index,
                vertex_count,
            }),
            None => Ok(()),
        }
    }
}

/// An axis-aligned textured quad, the common case for sprites and labels.
#[derive(Clone, Copy, Debug)]
pub struct Quad {
    pub vertices: [UiVertex; 4],
    pub indices: [u16; 6],
}

impl Quad {
    /// Quad with its lower-left corner at `(x, y)` on the z = 0 plane.
    pub fn new(x: f32, y: f32, width: f32, height: f32, color: [f32; 4]) -> Self {
        let (x1, y1) = (x + width, y + height);
        Self {
            vertices: [
                UiVertex::new([x, y, 0.0], [0.0, 1.0], color),
                UiVertex::new([x1, y, 0.0], [1.0, 1.0], color),
                UiVertex::new([x1, y1, 0.0], [1.0, 0.0], color),
                UiVertex::new([x, y1, 0.0], [0.0, 0.0], color),
            ],
            indices: [0, 1, 2, 0, 2, 3],
        }
    }

    pub fn geometry(&self) -> Geometry<'_> {
        Geometry::new(&self.vertices, &self.indices)
    }
}
