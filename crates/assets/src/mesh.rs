use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::AssetError;

/// A triangle mesh in scripting-boundary layout.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeshData {
    /// Flat `x, y, z` triples.
    pub vertices: Vec<f32>,
    /// 1-based vertex indices, three per triangle.
    pub faces: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn face_count(&self) -> usize {
        self.faces.len() / 3
    }

    /// Faces as signed integers, the form the model registry takes.
    pub fn faces_i64(&self) -> Vec<i64> {
        self.faces.iter().map(|&f| f as i64).collect()
    }

    /// Recenter on the bounding-box center and scale so the farthest vertex
    /// sits at radius 1. A mesh collapsed to a point is only recentered.
    pub fn normalize(&mut self) {
        if self.vertex_count() == 0 {
            return;
        }
        let mut min = [f32::INFINITY; 3];
        let mut max = [f32::NEG_INFINITY; 3];
        for v in self.vertices.chunks_exact(3) {
            for axis in 0..3 {
                min[axis] = min[axis].min(v[axis]);
                max[axis] = max[axis].max(v[axis]);
            }
        }
        let center = [0, 1, 2].map(|axis| (min[axis] + max[axis]) * 0.5);

        let mut max_radius = 0.0f32;
        for v in self.vertices.chunks_exact_mut(3) {
            for axis in 0..3 {
                v[axis] -= center[axis];
            }
            max_radius = max_radius.max((v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt());
        }
        let scale = if max_radius > 0.0 { 1.0 / max_radius } else { 1.0 };
        for v in self.vertices.chunks_exact_mut(3) {
            for c in v {
                *c *= scale;
            }
        }
        tracing::debug!(
            vertices = self.vertex_count(),
            radius = max_radius,
            "mesh normalized"
        );
    }

    /// Save as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), AssetError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load from a JSON file written by [`MeshData::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let file = std::fs::File::open(path)?;
        let mesh: Self = serde_json::from_reader(file)?;
        if mesh.vertices.is_empty() || mesh.faces.is_empty() {
            return Err(AssetError::Empty);
        }
        Ok(mesh)
    }
}

/// Axis-aligned cube of side 1 centered on the origin: 8 vertices,
/// 12 triangles.
pub fn unit_cube() -> MeshData {
    #[rustfmt::skip]
    let vertices = vec![
        -0.5, -0.5, -0.5,
         0.5, -0.5, -0.5,
         0.5,  0.5, -0.5,
        -0.5,  0.5, -0.5,
        -0.5, -0.5,  0.5,
         0.5, -0.5,  0.5,
         0.5,  0.5,  0.5,
        -0.5,  0.5,  0.5,
    ];
    #[rustfmt::skip]
    let faces = vec![
        1, 3, 2,  1, 4, 3, // near (-z)
        5, 6, 7,  5, 7, 8, // far (+z)
        1, 5, 8,  1, 8, 4, // -x
        2, 3, 7,  2, 7, 6, // +x
        1, 2, 6,  1, 6, 5, // -y
        4, 8, 7,  4, 7, 3, // +y
    ];
    MeshData { vertices, faces }
}

/// Square pyramid, apex toward -y (up on screen): 5 vertices, 6 triangles.
pub fn pyramid() -> MeshData {
    #[rustfmt::skip]
    let vertices = vec![
        -0.5,  0.5, -0.5,
         0.5,  0.5, -0.5,
         0.5,  0.5,  0.5,
        -0.5,  0.5,  0.5,
         0.0, -0.5,  0.0,
    ];
    #[rustfmt::skip]
    let faces = vec![
        1, 2, 5,
        2, 3, 5,
        3, 4, 5,
        4, 1, 5,
        1, 3, 2,  1, 4, 3,
    ];
    MeshData { vertices, faces }
}
