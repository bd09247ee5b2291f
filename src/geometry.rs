//! Geometry accumulation, flat normal synthesis, and finished meshes.

use crate::rules::PrimitiveKind;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Flat vertex positions (xyz) with a parallel RGBA colour per vertex.
///
/// [`push_vertex`](Self::push_vertex) is the only way to append, so
/// `colors.len() * 3 == vertices.len() * 4` holds at every point.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometryBuffer {
    vertices: Vec<f32>,
    colors: Vec<f32>,
}

impl GeometryBuffer {
    /// An empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one vertex and its colour.
    pub fn push_vertex(&mut self, position: Vec3, color: [f32; 4]) {
        self.vertices.extend_from_slice(&position.to_array());
        self.colors.extend_from_slice(&color);
    }

    /// Flat `xyz` positions.
    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    /// Flat `rgba` colours, one per vertex.
    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    /// Number of emitted vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// True before the first vertex.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Position of vertex `index`, if present.
    pub fn vertex(&self, index: usize) -> Option<Vec3> {
        self.vertices
            .get(index * 3..index * 3 + 3)
            .map(Vec3::from_slice)
    }

    /// Swaps the first and second vertex of the most recent triangle (the last three
    /// vertices), flipping its winding. Colours travel with their positions.
    /// No-op with fewer than three vertices.
    pub fn reverse_last_triangle(&mut self) {
        let n = self.vertex_count();
        if n < 3 {
            return;
        }
        let first = n - 3;
        swap_chunks(&mut self.vertices, 3, first, first + 1);
        swap_chunks(&mut self.colors, 4, first, first + 1);
    }

    /// Splits into `(vertices, colors)`.
    pub fn into_parts(self) -> (Vec<f32>, Vec<f32>) {
        (self.vertices, self.colors)
    }
}

fn swap_chunks(data: &mut [f32], width: usize, a: usize, b: usize) {
    let (head, tail) = data.split_at_mut(b * width);
    head[a * width..(a + 1) * width].swap_with_slice(&mut tail[..width]);
}

/// Computes one face normal per triangle and writes it to all three of its vertices.
///
/// Input is consecutive triangles of three xyz vertices. The normal is
/// `(v1 - v0) x (v2 - v0)`, so counter-clockwise faces point toward the viewer.
/// Zero-area faces get a zero normal. Fewer than nine values yields an empty array;
/// a trailing partial triangle is left zeroed.
pub fn flat_normals(vertices: &[f32]) -> Vec<f32> {
    if vertices.len() < 9 {
        return Vec::new();
    }
    let mut normals = vec![0.0; vertices.len()];
    for (tri, out) in vertices.chunks_exact(9).zip(normals.chunks_exact_mut(9)) {
        let v0 = Vec3::from_slice(&tri[0..3]);
        let v1 = Vec3::from_slice(&tri[3..6]);
        let v2 = Vec3::from_slice(&tri[6..9]);
        let n = (v1 - v0).cross(v2 - v0);
        let n = n.try_normalize().unwrap_or(n);
        for slot in out.chunks_exact_mut(3) {
            n.write_to_slice(slot);
        }
    }
    normals
}

/// A finished, named model ready to hand to a renderer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    /// Model name the renderer caches the upload under.
    pub name: String,
    /// Flat `xyz` positions.
    pub vertices: Vec<f32>,
    /// Flat `rgba` colours, one per vertex.
    pub colors: Vec<f32>,
    /// One face normal per vertex, parallel to `vertices`.
    pub normals: Vec<f32>,
    /// How the renderer assembles the vertices.
    pub primitive: PrimitiveKind,
    pub use_lighting: bool,
    pub backface_cull: bool,
}

impl Mesh {
    /// Finishes `geometry` by synthesizing its flat normals.
    pub fn from_geometry(
        name: impl Into<String>,
        geometry: GeometryBuffer,
        primitive: PrimitiveKind,
    ) -> Self {
        let normals = flat_normals(geometry.vertices());
        let (vertices, colors) = geometry.into_parts();
        Self {
            name: name.into(),
            vertices,
            colors,
            normals,
            primitive,
            use_lighting: false,
            backface_cull: false,
        }
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }
}
