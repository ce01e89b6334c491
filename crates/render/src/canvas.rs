use lge_common::{Color565, DirtyRect, FrameView, ScreenSize};

use crate::backend::DrawBackend;
use crate::font::{GLYPH_HEIGHT, GLYPH_WIDTH, glyph};

/// Counters for display transfers since the last reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlitStats {
    pub blits: usize,
    pub pixels: u64,
}

/// Software RGB565 canvas with a simulated display.
///
/// Fill operations only touch the back buffer. The display buffer changes
/// exclusively through `blit_region`, so tests can check that the damage
/// tracker pushed everything that changed.
#[derive(Debug, Clone)]
pub struct Canvas {
    size: ScreenSize,
    back: Vec<u16>,
    display: Vec<u16>,
    stats: BlitStats,
}

impl Canvas {
    /// Create a canvas with both buffers cleared to black.
    pub fn new(size: ScreenSize) -> Self {
        let len = size.area() as usize;
        Self {
            size,
            back: vec![0; len],
            display: vec![0; len],
            stats: BlitStats::default(),
        }
    }

    /// Back buffer pixel, or `None` off screen.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color565> {
        self.index(x, y).map(|i| Color565(self.back[i]))
    }

    /// Display pixel, or `None` off screen.
    pub fn display_pixel(&self, x: i32, y: i32) -> Option<Color565> {
        self.index(x, y).map(|i| Color565(self.display[i]))
    }

    /// Whether the simulated display shows exactly the back buffer.
    pub fn display_matches(&self) -> bool {
        self.back == self.display
    }

    /// Number of pixels where display and back buffer disagree.
    pub fn stale_pixels(&self) -> usize {
        self.back
            .iter()
            .zip(&self.display)
            .filter(|(b, d)| b != d)
            .count()
    }

    pub fn stats(&self) -> BlitStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = BlitStats::default();
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.size.width as i32 || y >= self.size.height as i32 {
            return None;
        }
        Some(y as usize * self.size.width as usize + x as usize)
    }

    /// Fill `[x1, x2]` on row `y`, clipped.
    fn hline(&mut self, x1: i64, x2: i64, y: i64, color: Color565) {
        if y < 0 || y >= self.size.height as i64 {
            return;
        }
        let x1 = x1.max(0);
        let x2 = x2.min(self.size.width as i64 - 1);
        if x1 > x2 {
            return;
        }
        let row = y as usize * self.size.width as usize;
        self.back[row + x1 as usize..=row + x2 as usize].fill(color.0);
    }
}

impl DrawBackend for Canvas {
    fn size(&self) -> ScreenSize {
        self.size
    }

    fn fill_circle(&mut self, x: i32, y: i32, r: i32, color: Color565) {
        if r < 0 {
            return;
        }
        let (x, y, r) = (x as i64, y as i64, r as i64);
        let r2 = r * r;
        // Only rows that land on screen.
        let first = (-r).max(-y);
        let last = r.min(self.size.height as i64 - 1 - y);
        for dy in first..=last {
            let span = ((r2 - dy * dy) as f64).sqrt() as i64;
            self.hline(x - span, x + span, y + dy, color);
        }
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color565) {
        let Some(rect) = DirtyRect::clipped(x, y, w, h, self.size) else {
            return;
        };
        for row in rect.y1..=rect.y2 {
            self.hline(rect.x1 as i64, rect.x2 as i64, row as i64, color);
        }
    }

    fn fill_triangle(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: Color565,
    ) {
        // Sort by y so (ax, ay) is the top vertex and (cx, cy) the bottom.
        let mut pts = [(x0, y0), (x1, y1), (x2, y2)];
        pts.sort_by_key(|p| p.1);
        let [(ax, ay), (bx, by), (cx, cy)] = pts;

        if ay == cy {
            let lo = ax.min(bx).min(cx);
            let hi = ax.max(bx).max(cx);
            self.hline(lo as i64, hi as i64, ay as i64, color);
            return;
        }

        let lerp = |xa: i32, ya: i32, xb: i32, yb: i32, y: i64| -> i64 {
            if ya == yb {
                return xa as i64;
            }
            let t = (y - ya as i64) as f64 / (yb as i64 - ya as i64) as f64;
            (xa as f64 + (xb as i64 - xa as i64) as f64 * t).round() as i64
        };

        let top = (ay as i64).max(0);
        let bottom = (cy as i64).min(self.size.height as i64 - 1);
        for y in top..=bottom {
            let long = lerp(ax, ay, cx, cy, y);
            let short = if y < by as i64 {
                lerp(ax, ay, bx, by, y)
            } else {
                lerp(bx, by, cx, cy, y)
            };
            let (lo, hi) = if long < short { (long, short) } else { (short, long) };
            self.hline(lo, hi, y, color);
        }
    }

    fn fill_screen(&mut self, color: Color565) {
        self.back.fill(color.0);
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str, color: Color565) {
        let (x, y) = (x as i64, y as i64);
        let (w, h) = (GLYPH_WIDTH as i64, GLYPH_HEIGHT as i64);
        if y >= self.size.height as i64 || y + h <= 0 {
            return;
        }
        for (i, byte) in text.bytes().enumerate() {
            let cx = x + i as i64 * w;
            if cx >= self.size.width as i64 {
                break;
            }
            if cx + w <= 0 {
                continue;
            }
            for (row, bits) in glyph(byte).iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if (bits >> (7 - col)) & 1 != 0 {
                        let px = cx + col as i64;
                        self.hline(px, px, y + row as i64, color);
                    }
                }
            }
        }
    }

    fn blit_region(&mut self, x: i32, y: i32, w: i32, h: i32) {
        let Some(rect) = DirtyRect::clipped(x, y, w, h, self.size) else {
            return;
        };
        let width = self.size.width as usize;
        for row in rect.y1..=rect.y2 {
            let start = row as usize * width + rect.x1 as usize;
            let end = row as usize * width + rect.x2 as usize + 1;
            self.display[start..end].copy_from_slice(&self.back[start..end]);
        }
        self.stats.blits += 1;
        self.stats.pixels += rect.area();
        tracing::trace!(?rect, "blit");
    }

    fn frame_view(&self) -> Option<FrameView<'_>> {
        Some(FrameView::packed(
            bytemuck::cast_slice(self.back.as_slice()),
            self.size.width,
            self.size.height,
            std::mem::size_of::<u16>(),
        ))
    }
}
