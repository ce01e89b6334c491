use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Default ambient term when a script omits it.
pub const DEFAULT_AMBIENT: f32 = 0.2;
/// Default diffuse term when a script omits it.
pub const DEFAULT_DIFFUSE: f32 = 0.8;

/// Perspective camera at the origin looking down +Z, y pointing down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Focal length in pixels: screen offset = camera offset * fov / depth.
    pub fov: f32,
    /// Kept as configuration; per-instance placement carries its own depth.
    pub cam_distance: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            fov: 200.0,
            cam_distance: 100.0,
        }
    }
}

impl Camera {
    /// Camera with the given parameters. A non-positive or non-finite fov
    /// is rejected and replaced by the default.
    pub fn new(fov: f32, cam_distance: f32) -> Self {
        let fov = if fov > 0.0 && fov.is_finite() {
            fov
        } else {
            tracing::warn!(fov, "fov must be positive, using default");
            Self::default().fov
        };
        Self { fov, cam_distance }
    }
}

/// Single directional light.
///
/// `direction` points from the surface toward the light; a zero direction
/// disables lighting so faces keep their base color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub direction: Vec3,
    pub ambient: f32,
    pub diffuse: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self::disabled()
    }
}

impl Light {
    /// Normalizes the direction. Terms are clamped to `[0, 1]`.
    pub fn new(dx: f32, dy: f32, dz: f32, ambient: f32, diffuse: f32) -> Self {
        Self {
            direction: Vec3::new(dx, dy, dz).normalize_or_zero(),
            ambient: ambient.clamp(0.0, 1.0),
            diffuse: diffuse.clamp(0.0, 1.0),
        }
    }

    pub fn disabled() -> Self {
        Self {
            direction: Vec3::ZERO,
            ambient: DEFAULT_AMBIENT,
            diffuse: DEFAULT_DIFFUSE,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.direction != Vec3::ZERO
    }

    /// Lambert brightness for a unit normal, in `[0, 1]`. Back-lit faces get
    /// ambient only.
    pub fn brightness(&self, normal: Vec3) -> f32 {
        let dot = normal.dot(self.direction).max(0.0);
        (self.ambient + self.diffuse * dot).clamp(0.0, 1.0)
    }
}

/// Per-draw placement of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Placement {
    /// Camera-space position of the model origin.
    pub position: Vec3,
    /// Approximate on-screen radius in pixels.
    pub radius: f32,
    /// Euler angles in radians, applied X then Y then Z.
    pub angles: Vec3,
}

impl Placement {
    #[allow(clippy::too_many_arguments)]
    pub fn new(wx: f32, wy: f32, wz: f32, radius: f32, ax: f32, ay: f32, az: f32) -> Self {
        Self {
            position: Vec3::new(wx, wy, wz),
            radius,
            angles: Vec3::new(ax, ay, az),
        }
    }
}
