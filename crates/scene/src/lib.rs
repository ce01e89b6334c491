//! Scene: 3D models, instances, and the pipeline that turns them into
//! ordered, lit, screen-space triangles.
//!
//! # Invariants
//! - Registries are append-only; handles are dense, 1-based, never reused.
//! - Draw-time problems (bad handles, degenerate geometry) never error;
//!   they degrade output instead.
//! - Scratch buffers only grow, so steady-state drawing does not allocate.

mod camera;
mod pipeline;
mod registry;

pub use camera::{Camera, DEFAULT_AMBIENT, DEFAULT_DIFFUSE, Light, Placement};
pub use pipeline::{DrawOutcome, SceneRenderer};
pub use registry::{HandleKind, Instance3D, InstanceId, Model3D, ModelId, Registry, SceneError};

pub fn crate_info() -> &'static str {
    concat!("lge-scene v", env!("CARGO_PKG_VERSION"))
}
