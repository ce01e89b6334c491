//! Drawing backends: the primitive fill/blit contract the engine drives.
//!
//! # Invariants
//! - Backends clip; callers may pass off-screen geometry.
//! - `blit_region` is the only path from the back buffer to the display.
//!
//! `Canvas` is a software stand-in for the TFT driver: a 565 back buffer
//! plus a simulated display that only changes through blits. The
//! `RecordingBackend` captures calls for tests and debug dumps.

mod backend;
mod canvas;
mod font;
mod recording;

pub use backend::DrawBackend;
pub use canvas::{BlitStats, Canvas};
pub use font::{GLYPH_HEIGHT, GLYPH_WIDTH, text_extent};
pub use recording::{DrawCommand, RecordingBackend};

pub fn crate_info() -> &'static str {
    concat!("lge-render v", env!("CARGO_PKG_VERSION"))
}
