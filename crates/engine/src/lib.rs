//! Engine: the object a scripting host binds its native functions to.
//!
//! Owns the drawing backend, one damage tracker, the model/instance
//! registry and the scene renderer. Every draw reports its screen bounds to
//! the tracker; `present` blits what the tracker returns.
//!
//! # Invariants
//! - Creation calls surface invalid handles as errors; draw calls with
//!   invalid handles do nothing.
//! - The full screen is marked on `clear_canvas` only when the clear color
//!   changed.
//! - The damage strategy is fixed at construction.

mod config;
mod engine;
mod error;
mod invoke;
mod timer;

pub use config::EngineConfig;
pub use engine::{Engine, PresentReport};
pub use error::EngineError;
pub use timer::{FpsCounter, FrameTimer};

/// Clear color used when a script passes none.
pub const DEFAULT_CLEAR_COLOR: &str = "#000000";
/// Fill color used when a 2D draw call passes none.
pub const DEFAULT_DRAW_COLOR: &str = "#ffffff";

pub fn crate_info() -> &'static str {
    concat!("lge-engine v", env!("CARGO_PKG_VERSION"))
}
