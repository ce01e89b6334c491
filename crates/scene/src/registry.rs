use std::fmt;

use glam::Vec3;
use lge_common::Color565;

/// Handle to a registered model. Dense and 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(pub u32);

/// Handle to a registered instance. Dense and 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub u32);

/// Which registry a handle belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    Model,
    Instance,
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Model => f.write_str("model"),
            Self::Instance => f.write_str("instance"),
        }
    }
}

/// Errors from registry operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    #[error("invalid handle: {kind} {id}")]
    InvalidHandle { kind: HandleKind, id: i64 },
}

/// Immutable triangle mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Model3D {
    /// Flat `x, y, z` triples in model space.
    vertices: Vec<f32>,
    /// 0-based vertex indices, one triangle per triple.
    indices: Vec<u16>,
}

impl Model3D {
    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    /// Complete vertex triples. Trailing partial data is ignored.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Complete index triples. Trailing partial data is ignored.
    pub fn face_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertex(&self, i: usize) -> Option<Vec3> {
        self.vertices
            .get(i * 3..i * 3 + 3)
            .map(|v| Vec3::new(v[0], v[1], v[2]))
    }

    pub fn face(&self, i: usize) -> Option<[u16; 3]> {
        self.indices.get(i * 3..i * 3 + 3).map(|f| [f[0], f[1], f[2]])
    }
}

/// A model reference plus one color per triangle.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance3D {
    model: ModelId,
    face_colors: Vec<Color565>,
}

impl Instance3D {
    pub fn model(&self) -> ModelId {
        self.model
    }

    /// Exactly one entry per model face.
    pub fn face_colors(&self) -> &[Color565] {
        &self.face_colors
    }
}

/// Append-only arenas of models and instances.
///
/// Entries live for the lifetime of the registry; there is no removal, so
/// handles stay valid forever.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    models: Vec<Model3D>,
    instances: Vec<Instance3D>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mesh. `faces` are 1-based vertex indices as scripts write
    /// them; values `<= 0` clamp to the first vertex. Length problems are
    /// logged and the data kept as-is.
    pub fn create_model(&mut self, vertices: Vec<f32>, faces: &[i64]) -> ModelId {
        if vertices.len() % 3 != 0 {
            tracing::warn!(len = vertices.len(), "vertex array length is not a multiple of 3");
        }
        if faces.len() % 3 != 0 {
            tracing::warn!(len = faces.len(), "face index array length is not a multiple of 3");
        }
        let vertex_count = vertices.len() / 3;
        let mut out_of_range = 0usize;
        let indices: Vec<u16> = faces
            .iter()
            .map(|&raw| {
                let index = if raw <= 0 {
                    0
                } else {
                    (raw - 1).min(u16::MAX as i64) as u16
                };
                if index as usize >= vertex_count {
                    out_of_range += 1;
                }
                index
            })
            .collect();
        if out_of_range > 0 {
            tracing::warn!(
                out_of_range,
                vertex_count,
                "face indices reference missing vertices; those faces will not draw"
            );
        }

        self.models.push(Model3D { vertices, indices });
        let id = ModelId(self.models.len() as u32);
        tracing::debug!(id = id.0, vertex_count, faces = faces.len() / 3, "model created");
        id
    }

    /// Register an instance of `model`. Missing colors default to white;
    /// extras are ignored.
    pub fn create_instance(
        &mut self,
        model: ModelId,
        colors: &[Color565],
    ) -> Result<InstanceId, SceneError> {
        let face_count = self
            .model(model)
            .ok_or(SceneError::InvalidHandle {
                kind: HandleKind::Model,
                id: model.0 as i64,
            })?
            .face_count();

        if colors.len() < face_count {
            tracing::warn!(
                given = colors.len(),
                faces = face_count,
                "fewer colors than faces, padding with white"
            );
        }
        let mut face_colors: Vec<Color565> = colors.iter().copied().take(face_count).collect();
        face_colors.resize(face_count, Color565::WHITE);

        self.instances.push(Instance3D { model, face_colors });
        let id = InstanceId(self.instances.len() as u32);
        tracing::debug!(id = id.0, model = model.0, "instance created");
        Ok(id)
    }

    pub fn model(&self, id: ModelId) -> Option<&Model3D> {
        (id.0 as usize).checked_sub(1).and_then(|i| self.models.get(i))
    }

    pub fn instance(&self, id: InstanceId) -> Option<&Instance3D> {
        (id.0 as usize).checked_sub(1).and_then(|i| self.instances.get(i))
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle(registry: &mut Registry) -> ModelId {
        registry.create_model(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], &[1, 2, 3])
    }

    #[test]
    fn handles_are_dense_and_one_based() {
        let mut registry = Registry::new();
        assert_eq!(triangle(&mut registry), ModelId(1));
        assert_eq!(triangle(&mut registry), ModelId(2));
        let a = registry.create_instance(ModelId(1), &[Color565::RED]).unwrap();
        let b = registry.create_instance(ModelId(2), &[Color565::RED]).unwrap();
        assert_eq!((a, b), (InstanceId(1), InstanceId(2)));
        assert_eq!(registry.model_count(), 2);
        assert_eq!(registry.instance_count(), 2);
    }

    #[test]
    fn indices_are_normalized_to_zero_based() {
        let mut registry = Registry::new();
        let id = registry.create_model(vec![0.0; 9], &[1, 2, 3, 0, -5, 3]);
        let model = registry.model(id).unwrap();
        assert_eq!(model.indices(), &[0, 1, 2, 0, 0, 2]);
        assert_eq!(model.face(1), Some([0, 0, 2]));
        assert_eq!(model.vertex(1), Some(Vec3::ZERO));
    }

    #[test]
    fn malformed_lengths_are_kept() {
        let mut registry = Registry::new();
        let id = registry.create_model(vec![0.0; 10], &[1, 2, 3, 1]);
        let model = registry.model(id).unwrap();
        assert_eq!(model.vertices().len(), 10);
        assert_eq!(model.vertex_count(), 3);
        assert_eq!(model.indices().len(), 4);
        assert_eq!(model.face_count(), 1);
        assert_eq!(model.face(1), None);
    }

    #[test]
    fn instance_of_missing_model_is_rejected() {
        let mut registry = Registry::new();
        triangle(&mut registry);
        let err = registry.create_instance(ModelId(99), &[]).unwrap_err();
        assert_eq!(
            err,
            SceneError::InvalidHandle {
                kind: HandleKind::Model,
                id: 99
            }
        );
        assert_eq!(err.to_string(), "invalid handle: model 99");
        assert!(registry.create_instance(ModelId(0), &[]).is_err());
        assert_eq!(registry.instance_count(), 0);
    }

    #[test]
    fn missing_colors_default_to_white_and_extras_dropped() {
        let mut registry = Registry::new();
        let quad = registry.create_model(vec![0.0; 12], &[1, 2, 3, 1, 3, 4]);

        let short = registry.create_instance(quad, &[Color565::RED]).unwrap();
        assert_eq!(
            registry.instance(short).unwrap().face_colors(),
            &[Color565::RED, Color565::WHITE]
        );

        let long = registry
            .create_instance(quad, &[Color565::RED, Color565::GREEN, Color565::BLUE])
            .unwrap();
        let instance = registry.instance(long).unwrap();
        assert_eq!(instance.face_colors(), &[Color565::RED, Color565::GREEN]);
        assert_eq!(instance.model(), quad);
    }

    #[test]
    fn lookups_out_of_range_are_none() {
        let registry = Registry::new();
        assert!(registry.model(ModelId(0)).is_none());
        assert!(registry.model(ModelId(1)).is_none());
        assert!(registry.instance(InstanceId(7)).is_none());
    }
}
