use lge_common::{DirtyRect, FrameView, ScreenSize};

use crate::tracker::DamageTracker;

const FNV_OFFSET: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

/// Continue a 32-bit FNV-1a hash over `bytes`.
pub fn fnv1a(mut hash: u32, bytes: &[u8]) -> u32 {
    for &b in bytes {
        hash ^= b as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Result of re-hashing a tile against its cached hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TileContent {
    Unchanged,
    Changed(u32),
    /// No framebuffer to read; assume changed, keep the cache.
    Unknown,
}

/// Tile-grid strategy.
///
/// The screen is split into `tile_size` square tiles. Marks set a per-tile
/// bit; at present time every tile marked this frame or last frame is
/// re-hashed against the framebuffer and only tiles whose content actually
/// changed are emitted, greedily grown into rectangles.
///
/// Hashes persist across frames: they describe the last content pushed to
/// the display, not frame state.
#[derive(Debug, Clone)]
pub struct TileGrid {
    screen: ScreenSize,
    tile_size: u32,
    tiles_x: u32,
    tiles_y: u32,
    current: Vec<bool>,
    previous: Vec<bool>,
    hashes: Vec<u32>,
    // Scratch, reused every frame.
    visited: Vec<bool>,
    row: Vec<TileContent>,
}

impl TileGrid {
    /// Tile sizes are clamped to `1..=max(width, height)`; one tile never
    /// needs to be larger than the screen.
    pub fn new(screen: ScreenSize, tile_size: u32) -> Self {
        let largest = screen.width.max(screen.height).max(1);
        let requested = tile_size;
        let tile_size = tile_size.clamp(1, largest);
        if tile_size != requested {
            tracing::warn!(requested, tile_size, "tile size out of range, clamped");
        }
        let tiles_x = screen.width.div_ceil(tile_size);
        let tiles_y = screen.height.div_ceil(tile_size);
        let total = (tiles_x * tiles_y) as usize;
        Self {
            screen,
            tile_size,
            tiles_x,
            tiles_y,
            current: vec![false; total],
            previous: vec![false; total],
            hashes: vec![0; total],
            visited: vec![false; total],
            row: Vec::with_capacity(tiles_x as usize),
        }
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Grid dimensions in tiles.
    pub fn tiles(&self) -> (u32, u32) {
        (self.tiles_x, self.tiles_y)
    }

    /// Whether the tile was marked during the current frame.
    pub fn is_marked(&self, tx: u32, ty: u32) -> bool {
        tx < self.tiles_x && ty < self.tiles_y && self.current[self.index(tx, ty)]
    }

    /// Last hash stored for a tile.
    pub fn cached_hash(&self, tx: u32, ty: u32) -> Option<u32> {
        (tx < self.tiles_x && ty < self.tiles_y).then(|| self.hashes[self.index(tx, ty)])
    }

    fn index(&self, tx: u32, ty: u32) -> usize {
        (ty * self.tiles_x + tx) as usize
    }

    fn is_candidate(&self, idx: usize) -> bool {
        self.current[idx] || self.previous[idx]
    }

    /// Pixel bounds `[x1, x2) x [y1, y2)` of a tile, clamped to the screen.
    fn tile_pixels(&self, tx: u32, ty: u32) -> (u32, u32, u32, u32) {
        let x1 = tx * self.tile_size;
        let y1 = ty * self.tile_size;
        let x2 = ((tx + 1) * self.tile_size).min(self.screen.width);
        let y2 = ((ty + 1) * self.tile_size).min(self.screen.height);
        (x1, y1, x2, y2)
    }

    /// FNV-1a over the tile's raw bytes in row-major order.
    fn tile_hash(&self, frame: &FrameView<'_>, tx: u32, ty: u32) -> u32 {
        let (x1, y1, x2, y2) = self.tile_pixels(tx, ty);
        (y1..y2).fold(FNV_OFFSET, |hash, y| fnv1a(hash, frame.row(y, x1, x2)))
    }

    fn probe(&self, frame: Option<&FrameView<'_>>, tx: u32, ty: u32) -> TileContent {
        let Some(frame) = frame else {
            return TileContent::Unknown;
        };
        if frame.width < self.screen.width || frame.height < self.screen.height {
            return TileContent::Unknown;
        }
        let hash = self.tile_hash(frame, tx, ty);
        if hash == self.hashes[self.index(tx, ty)] {
            TileContent::Unchanged
        } else {
            TileContent::Changed(hash)
        }
    }

    fn store(&mut self, idx: usize, content: TileContent) {
        if let TileContent::Changed(hash) = content {
            self.hashes[idx] = hash;
        }
    }

    /// Dirty, unvisited, and not proven unchanged. Marks proven-unchanged
    /// tiles visited so they are never re-tested this frame.
    fn accept(&mut self, frame: Option<&FrameView<'_>>, tx: u32, ty: u32) -> Option<TileContent> {
        let idx = self.index(tx, ty);
        if !self.is_candidate(idx) || self.visited[idx] {
            return None;
        }
        match self.probe(frame, tx, ty) {
            TileContent::Unchanged => {
                self.visited[idx] = true;
                None
            }
            content => Some(content),
        }
    }

    fn to_pixel_rect(&self, x1: u32, y1: u32, x2: u32, y2: u32) -> DirtyRect {
        DirtyRect::new(
            (x1 * self.tile_size) as i32,
            (y1 * self.tile_size) as i32,
            ((x2 + 1) * self.tile_size).min(self.screen.width) as i32 - 1,
            ((y2 + 1) * self.tile_size).min(self.screen.height) as i32 - 1,
        )
    }
}

impl DamageTracker for TileGrid {
    fn mark_region(&mut self, x: i32, y: i32, w: i32, h: i32) {
        let Some(rect) = DirtyRect::clipped(x, y, w, h, self.screen) else {
            return;
        };
        let ts = self.tile_size as i32;
        for ty in rect.y1 / ts..=rect.y2 / ts {
            for tx in rect.x1 / ts..=rect.x2 / ts {
                let idx = self.index(tx as u32, ty as u32);
                self.current[idx] = true;
            }
        }
    }

    fn compute_update_regions(&mut self, frame: Option<&FrameView<'_>>) -> Vec<DirtyRect> {
        self.visited.fill(false);
        let mut rects = Vec::new();
        let mut skipped = 0usize;

        for ty in 0..self.tiles_y {
            for tx in 0..self.tiles_x {
                let idx = self.index(tx, ty);
                if self.visited[idx] || !self.is_candidate(idx) {
                    continue;
                }
                let Some(content) = self.accept(frame, tx, ty) else {
                    skipped += 1;
                    continue;
                };
                self.store(idx, content);

                let (x1, y1) = (tx, ty);
                let (mut x2, mut y2) = (tx, ty);

                // Grow right along this row.
                while x2 + 1 < self.tiles_x {
                    match self.accept(frame, x2 + 1, ty) {
                        Some(content) => {
                            let next = self.index(x2 + 1, ty);
                            self.store(next, content);
                            x2 += 1;
                        }
                        None => break,
                    }
                }

                // Grow down a full row span at a time.
                'rows: while y2 + 1 < self.tiles_y {
                    let next_row = y2 + 1;
                    self.row.clear();
                    for x in x1..=x2 {
                        match self.accept(frame, x, next_row) {
                            Some(content) => self.row.push(content),
                            None => break 'rows,
                        }
                    }
                    for (x, i) in (x1..=x2).zip(0..) {
                        let content = self.row[i];
                        let idx = self.index(x, next_row);
                        self.store(idx, content);
                    }
                    y2 = next_row;
                }

                for y in y1..=y2 {
                    for x in x1..=x2 {
                        let idx = self.index(x, y);
                        self.visited[idx] = true;
                    }
                }
                rects.push(self.to_pixel_rect(x1, y1, x2, y2));
            }
        }

        tracing::trace!(rects = rects.len(), skipped, "tile grid regions");
        rects
    }

    fn end_frame(&mut self) {
        std::mem::swap(&mut self.current, &mut self.previous);
        self.current.fill(false);
    }

    fn clear(&mut self) {
        self.current.fill(false);
        self.previous.fill(false);
    }

    fn name(&self) -> &'static str {
        "tiles"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal 1-byte-per-pixel framebuffer for driving the grid.
    struct Pixels {
        size: ScreenSize,
        bytes: Vec<u8>,
    }

    impl Pixels {
        fn new(width: u32, height: u32) -> Self {
            Self {
                size: ScreenSize::new(width, height),
                bytes: vec![0; (width * height) as usize],
            }
        }

        fn fill(&mut self, x: u32, y: u32, w: u32, h: u32, value: u8) {
            for py in y..y + h {
                for px in x..x + w {
                    self.bytes[(py * self.size.width + px) as usize] = value;
                }
            }
        }

        fn view(&self) -> FrameView<'_> {
            FrameView::packed(&self.bytes, self.size.width, self.size.height, 1)
        }
    }

    /// Mark, compute against the pixels, and end the frame.
    fn frame(grid: &mut TileGrid, pixels: &Pixels) -> Vec<DirtyRect> {
        let rects = grid.compute_update_regions(Some(&pixels.view()));
        grid.end_frame();
        rects
    }

    #[test]
    fn fnv1a_known_values() {
        assert_eq!(fnv1a(FNV_OFFSET, b""), 0x811c_9dc5);
        assert_eq!(fnv1a(FNV_OFFSET, b"a"), 0xe40c_292c);
        assert_eq!(fnv1a(FNV_OFFSET, b"foobar"), 0xbf9c_f968);
    }

    #[test]
    fn grid_dimensions_round_up() {
        let grid = TileGrid::new(ScreenSize::new(240, 320), 16);
        assert_eq!(grid.tiles(), (15, 20));
        let grid = TileGrid::new(ScreenSize::new(100, 50), 16);
        assert_eq!(grid.tiles(), (7, 4));
    }

    #[test]
    fn oversized_tile_size_is_clamped_to_screen() {
        let mut grid = TileGrid::new(ScreenSize::new(40, 30), u32::MAX);
        assert_eq!(grid.tile_size(), 40);
        assert_eq!(grid.tiles(), (1, 1));

        let mut pixels = Pixels::new(40, 30);
        pixels.fill(35, 25, 5, 5, 9);
        grid.mark_region(35, 25, 5, 5);
        assert_eq!(frame(&mut grid, &pixels), vec![DirtyRect::new(0, 0, 39, 29)]);

        let grid = TileGrid::new(ScreenSize::new(40, 30), i32::MAX as u32 + 1);
        assert_eq!(grid.tile_size(), 40);
    }

    #[test]
    fn zero_tile_size_is_bumped_to_one() {
        let grid = TileGrid::new(ScreenSize::new(4, 4), 0);
        assert_eq!(grid.tile_size(), 1);
        assert_eq!(grid.tiles(), (4, 4));
    }

    #[test]
    fn mark_region_sets_covered_tiles() {
        let mut grid = TileGrid::new(ScreenSize::new(64, 64), 16);
        grid.mark_region(15, 15, 2, 2);
        assert!(grid.is_marked(0, 0));
        assert!(grid.is_marked(1, 0));
        assert!(grid.is_marked(0, 1));
        assert!(grid.is_marked(1, 1));
        assert!(!grid.is_marked(2, 2));
    }

    #[test]
    fn mark_region_clips_and_ignores_empty() {
        let mut grid = TileGrid::new(ScreenSize::new(64, 64), 16);
        grid.mark_region(-100, -100, 10, 10);
        grid.mark_region(10, 10, 0, 5);
        assert!(grid.compute_update_regions(None).is_empty());

        grid.mark_region(60, 60, 100, 100);
        assert!(grid.is_marked(3, 3));
    }

    #[test]
    fn changed_tiles_are_emitted_in_pixel_space() {
        let mut grid = TileGrid::new(ScreenSize::new(64, 64), 16);
        let mut pixels = Pixels::new(64, 64);
        pixels.fill(20, 20, 5, 5, 7);
        grid.mark_region(20, 20, 5, 5);
        assert_eq!(frame(&mut grid, &pixels), vec![DirtyRect::new(16, 16, 31, 31)]);
    }

    #[test]
    fn unchanged_content_is_suppressed() {
        let mut grid = TileGrid::new(ScreenSize::new(64, 64), 16);
        let mut pixels = Pixels::new(64, 64);
        pixels.fill(0, 0, 8, 8, 3);
        grid.mark_region(0, 0, 8, 8);
        assert_eq!(frame(&mut grid, &pixels).len(), 1);

        // Redraw the same pixels: marked, but nothing changed.
        grid.mark_region(0, 0, 8, 8);
        assert!(frame(&mut grid, &pixels).is_empty());
        assert!(frame(&mut grid, &pixels).is_empty());
    }

    #[test]
    fn previous_frame_tiles_are_rechecked() {
        let mut grid = TileGrid::new(ScreenSize::new(64, 64), 16);
        let mut pixels = Pixels::new(64, 64);
        pixels.fill(0, 0, 4, 4, 9);
        grid.mark_region(0, 0, 4, 4);
        assert_eq!(frame(&mut grid, &pixels).len(), 1);

        // Erase without marking: the previous-frame mark still catches it.
        pixels.fill(0, 0, 4, 4, 0);
        assert_eq!(frame(&mut grid, &pixels), vec![DirtyRect::new(0, 0, 15, 15)]);
    }

    #[test]
    fn adjacent_tiles_grow_into_one_rect() {
        let mut grid = TileGrid::new(ScreenSize::new(64, 64), 16);
        let mut pixels = Pixels::new(64, 64);
        pixels.fill(0, 0, 48, 32, 5);
        grid.mark_region(0, 0, 48, 32);
        assert_eq!(frame(&mut grid, &pixels), vec![DirtyRect::new(0, 0, 47, 31)]);
    }

    #[test]
    fn unchanged_tile_splits_the_rect() {
        let mut grid = TileGrid::new(ScreenSize::new(64, 16), 16);
        let mut pixels = Pixels::new(64, 16);
        pixels.fill(0, 0, 64, 16, 1);
        grid.mark_region(0, 0, 64, 16);
        frame(&mut grid, &pixels);

        // Change tiles 0, 1 and 3; tile 2 keeps its content.
        pixels.fill(0, 0, 32, 16, 2);
        pixels.fill(48, 0, 16, 16, 2);
        grid.mark_region(0, 0, 64, 16);
        assert_eq!(
            frame(&mut grid, &pixels),
            vec![DirtyRect::new(0, 0, 31, 15), DirtyRect::new(48, 0, 63, 15)]
        );
    }

    #[test]
    fn row_extension_stops_at_unchanged_row() {
        let mut grid = TileGrid::new(ScreenSize::new(32, 48), 16);
        let mut pixels = Pixels::new(32, 48);
        pixels.fill(0, 0, 32, 48, 1);
        grid.mark_region(0, 0, 32, 48);
        frame(&mut grid, &pixels);

        // Rows 0 and 2 change, row 1 does not.
        pixels.fill(0, 0, 32, 16, 4);
        pixels.fill(0, 32, 32, 16, 4);
        grid.mark_region(0, 0, 32, 48);
        assert_eq!(
            frame(&mut grid, &pixels),
            vec![DirtyRect::new(0, 0, 31, 15), DirtyRect::new(0, 32, 31, 47)]
        );
    }

    #[test]
    fn partial_edge_tiles_clamp_to_screen() {
        let mut grid = TileGrid::new(ScreenSize::new(40, 20), 16);
        let mut pixels = Pixels::new(40, 20);
        pixels.fill(35, 17, 5, 3, 8);
        grid.mark_region(35, 17, 5, 3);
        assert_eq!(frame(&mut grid, &pixels), vec![DirtyRect::new(32, 16, 39, 19)]);
    }

    #[test]
    fn without_framebuffer_every_candidate_is_emitted() {
        let mut grid = TileGrid::new(ScreenSize::new(64, 64), 16);
        grid.mark_region(0, 0, 10, 10);
        grid.mark_region(40, 40, 10, 10);
        let rects = grid.compute_update_regions(None);
        assert_eq!(
            rects,
            vec![DirtyRect::new(0, 0, 15, 15), DirtyRect::new(32, 32, 63, 63)]
        );
        grid.end_frame();
        // Still repainted from the previous frame.
        assert_eq!(grid.compute_update_regions(None).len(), 2);
    }

    #[test]
    fn output_covers_marks_when_content_changes() {
        let mut grid = TileGrid::new(ScreenSize::new(128, 96), 16);
        let mut pixels = Pixels::new(128, 96);
        let marks = [(3, 4, 20, 9), (50, 50, 1, 1), (100, 10, 28, 70)];
        for (i, &(x, y, w, h)) in marks.iter().enumerate() {
            pixels.fill(x, y, w, h, i as u8 + 1);
            grid.mark_region(x as i32, y as i32, w as i32, h as i32);
        }
        let rects = frame(&mut grid, &pixels);
        for &(x, y, w, h) in &marks {
            for py in y..y + h {
                for px in x..x + w {
                    assert!(rects.iter().any(|r| r.contains_point(px as i32, py as i32)));
                }
            }
        }
    }

    #[test]
    fn swap_keeps_hashes_and_clear_resets_marks() {
        let mut grid = TileGrid::new(ScreenSize::new(32, 32), 16);
        let mut pixels = Pixels::new(32, 32);
        pixels.fill(0, 0, 16, 16, 6);
        grid.mark_region(0, 0, 16, 16);
        frame(&mut grid, &pixels);
        let hash = grid.cached_hash(0, 0).unwrap();
        assert_ne!(hash, 0);

        grid.end_frame();
        assert_eq!(grid.cached_hash(0, 0), Some(hash));

        grid.mark_region(0, 0, 32, 32);
        grid.clear();
        assert!(!grid.is_marked(0, 0));
        assert!(grid.compute_update_regions(Some(&pixels.view())).is_empty());
    }
}
