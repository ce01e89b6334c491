use glam::{Vec2, Vec3};
use lge_common::{Color565, DirtyRect};
use lge_render::DrawBackend;

use crate::camera::{Camera, Light, Placement};
use crate::registry::{InstanceId, Registry};

/// Camera-space depth floor applied before the perspective divide.
const MIN_CAMERA_Z: f32 = 0.001;
/// Placement depth floor used for size scaling and translation.
const MIN_PLACEMENT_Z: f32 = 1.0;

/// What a single `draw` call produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawOutcome {
    /// Triangles sent to the backend.
    pub emitted: usize,
    /// Back faces discarded.
    pub culled: usize,
    /// Faces whose indices point past the vertex array.
    pub skipped: usize,
    /// Screen-space box around every emitted triangle, unclipped.
    pub bounds: Option<DirtyRect>,
}

#[derive(Debug, Clone, Copy)]
struct VisibleFace {
    points: [(i32, i32); 3],
    depth: f32,
    color: Color565,
}

/// Software 3D pipeline: transform, cull, light, sort, emit.
///
/// Holds the camera and light as plain values so several renderers can
/// coexist. Scratch buffers grow to the largest mesh drawn and are reused.
#[derive(Debug, Clone, Default)]
pub struct SceneRenderer {
    camera: Camera,
    light: Light,
    camera_space: Vec<Vec3>,
    screen_space: Vec<Vec2>,
    faces: Vec<VisibleFace>,
}

impl SceneRenderer {
    pub fn new(camera: Camera, light: Light) -> Self {
        Self {
            camera,
            light,
            ..Self::default()
        }
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    pub fn light(&self) -> Light {
        self.light
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    pub fn set_light(&mut self, light: Light) {
        self.light = light;
    }

    /// Vertex and face scratch capacity reached so far.
    pub fn scratch_capacity(&self) -> (usize, usize) {
        (self.camera_space.len(), self.faces.capacity())
    }

    /// Draw one instance. Unknown handles draw nothing and return an empty
    /// outcome; the caller marks `bounds` as damage.
    pub fn draw<B: DrawBackend + ?Sized>(
        &mut self,
        registry: &Registry,
        id: InstanceId,
        placement: &Placement,
        backend: &mut B,
    ) -> DrawOutcome {
        let Some(instance) = registry.instance(id) else {
            tracing::trace!(instance = id.0, "draw skipped: unknown instance");
            return DrawOutcome::default();
        };
        let Some(model) = registry.model(instance.model()) else {
            tracing::trace!(model = instance.model().0, "draw skipped: unknown model");
            return DrawOutcome::default();
        };
        let _span = tracing::debug_span!("draw_3d", instance = id.0).entered();

        let vertex_count = model.vertex_count();
        let face_count = model.face_count();
        if self.camera_space.len() < vertex_count {
            self.camera_space.resize(vertex_count, Vec3::ZERO);
            self.screen_space.resize(vertex_count, Vec2::ZERO);
        }
        self.faces.clear();
        self.faces.reserve(face_count);

        let size = backend.size();
        let center = Vec2::new(size.width as f32 / 2.0, size.height as f32 / 2.0);
        let fov = self.camera.fov;
        let mut position = placement.position;
        position.z = position.z.max(MIN_PLACEMENT_Z);
        let scale = placement.radius * position.z / fov;
        let (sx, cx) = placement.angles.x.sin_cos();
        let (sy, cy) = placement.angles.y.sin_cos();
        let (sz, cz) = placement.angles.z.sin_cos();

        for i in 0..vertex_count {
            let Some(v) = model.vertex(i) else { break };
            let v = v * scale;
            let v = Vec3::new(v.x, v.y * cx - v.z * sx, v.y * sx + v.z * cx);
            let v = Vec3::new(v.x * cy + v.z * sy, v.y, -v.x * sy + v.z * cy);
            let v = Vec3::new(v.x * cz - v.y * sz, v.x * sz + v.y * cz, v.z);
            let mut cam = v + position;
            cam.z = cam.z.max(MIN_CAMERA_Z);
            self.camera_space[i] = cam;
            self.screen_space[i] = Vec2::new(cam.x, cam.y) * (fov / cam.z) + center;
        }

        let mut outcome = DrawOutcome::default();
        let colors = instance.face_colors();
        for f in 0..face_count {
            let Some(face) = model.face(f) else { break };
            let [a, b, c] = face.map(usize::from);
            if a >= vertex_count || b >= vertex_count || c >= vertex_count {
                outcome.skipped += 1;
                continue;
            }

            let (s0, s1, s2) = (self.screen_space[a], self.screen_space[b], self.screen_space[c]);
            let area = (s1.x - s0.x) * (s2.y - s0.y) - (s1.y - s0.y) * (s2.x - s0.x);
            if area >= 0.0 {
                outcome.culled += 1;
                continue;
            }

            let (p0, p1, p2) = (self.camera_space[a], self.camera_space[b], self.camera_space[c]);
            let base = colors.get(f).copied().unwrap_or(Color565::WHITE);
            let color = if self.light.is_enabled() {
                let normal = (p1 - p0).cross(p2 - p0).normalize_or_zero();
                base.scale(self.light.brightness(normal))
            } else {
                base
            };

            self.faces.push(VisibleFace {
                points: [round(s0), round(s1), round(s2)],
                depth: (p0.z + p1.z + p2.z) / 3.0,
                color,
            });
        }

        sort_back_to_front(&mut self.faces);

        let mut bounds: Option<DirtyRect> = None;
        for face in &self.faces {
            let [(x0, y0), (x1, y1), (x2, y2)] = face.points;
            backend.fill_triangle(x0, y0, x1, y1, x2, y2, face.color);
            let rect = DirtyRect::new(
                x0.min(x1).min(x2),
                y0.min(y1).min(y2),
                x0.max(x1).max(x2),
                y0.max(y1).max(y2),
            );
            bounds = Some(match bounds {
                Some(b) => b.union(&rect),
                None => rect,
            });
        }
        outcome.emitted = self.faces.len();
        outcome.bounds = bounds;

        tracing::trace!(
            emitted = outcome.emitted,
            culled = outcome.culled,
            skipped = outcome.skipped,
            "instance drawn"
        );
        outcome
    }
}

fn round(p: Vec2) -> (i32, i32) {
    (p.x.round() as i32, p.y.round() as i32)
}

/// Stable insertion sort, farthest first.
fn sort_back_to_front(faces: &mut [VisibleFace]) {
    for i in 1..faces.len() {
        let mut j = i;
        while j > 0 && faces[j - 1].depth < faces[j].depth {
            faces.swap(j - 1, j);
            j -= 1;
        }
    }
}
