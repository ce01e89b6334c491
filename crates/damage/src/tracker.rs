use lge_common::{DirtyRect, FrameView, ScreenSize};
use serde::{Deserialize, Serialize};

use crate::rect_merge::RectMerger;
use crate::tile_grid::TileGrid;

/// Default tile edge in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 16;

/// Shared contract of the damage tracking strategies.
///
/// One frame is: any number of `mark_region` calls, one
/// `compute_update_regions`, then `end_frame`.
pub trait DamageTracker {
    /// Record that `x, y, w, h` may have changed this frame. Regions are
    /// clipped to the screen; empty results are ignored.
    fn mark_region(&mut self, x: i32, y: i32, w: i32, h: i32);

    /// Rectangles to blit for this frame. `frame` is the back buffer, used by
    /// content-aware strategies to skip regions whose pixels did not change.
    fn compute_update_regions(&mut self, frame: Option<&FrameView<'_>>) -> Vec<DirtyRect>;

    /// Rotate current-frame state into previous-frame state.
    fn end_frame(&mut self);

    /// Drop all frame state (full re-init).
    fn clear(&mut self);

    /// Short strategy name for logs.
    fn name(&self) -> &'static str;
}

/// Which damage tracker to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DamageStrategy {
    /// Fixed-size tiles with content hashing.
    Tiles { tile_size: u32 },
    /// Per-draw rectangles merged at present time.
    Rects,
}

impl Default for DamageStrategy {
    fn default() -> Self {
        Self::Tiles {
            tile_size: DEFAULT_TILE_SIZE,
        }
    }
}

impl DamageStrategy {
    /// Build the tracker for a screen of the given size.
    pub fn build(self, screen: ScreenSize) -> Box<dyn DamageTracker> {
        match self {
            Self::Tiles { tile_size } => Box::new(TileGrid::new(screen, tile_size)),
            Self::Rects => Box::new(RectMerger::new(screen)),
        }
    }
}
