//! Mesh assets: the data scripts feed to `create_3d_model`.
//!
//! Meshes are flat `x, y, z` vertex triples plus 1-based triangle indices,
//! the same layout the scripting boundary accepts.
//!
//! # Invariants
//! - Face indices stay 1-based in every on-disk and in-memory form here.
//! - Built-in meshes are wound so their outward faces survive culling.

mod mesh;
mod obj;

pub use mesh::{MeshData, pyramid, unit_cube};
pub use obj::import_obj;

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("mesh has no vertices or faces")]
    Empty,
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn crate_info() -> &'static str {
    concat!("lge-assets v", env!("CARGO_PKG_VERSION"))
}
