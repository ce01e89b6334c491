//! Damage tracking: decides which screen areas must be pushed to the display.
//!
//! # Invariants
//! - Output covers every region marked this frame and the previous frame,
//!   except tiles whose content hash proves nothing changed.
//! - Strategy is picked once at construction; both share `DamageTracker`.
//!
//! `RectMerger` suits sparse, highly dynamic scenes. `TileGrid` suits mostly
//! static scenes or large changed areas, and stays bounded by grid size no
//! matter how often regions are marked.

mod rect_merge;
mod tile_grid;
mod tracker;

pub use rect_merge::{RectMerger, merge_rects};
pub use tile_grid::{TileGrid, fnv1a};
pub use tracker::{DamageStrategy, DamageTracker, DEFAULT_TILE_SIZE};

pub fn crate_info() -> &'static str {
    concat!("lge-damage v", env!("CARGO_PKG_VERSION"))
}
