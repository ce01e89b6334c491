//! Shared types: packed 565 colors, dirty rectangles, framebuffer views.
//!
//! # Invariants
//! - `DirtyRect` bounds are inclusive and never inverted.
//! - Color parsing never fails; malformed input degrades to white.

mod color;
mod types;

pub use color::Color565;
pub use types::{DirtyRect, FrameView, ScreenSize};
